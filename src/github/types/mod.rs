pub mod branch_protection;

pub use branch_protection::ProtectionPolicy;
