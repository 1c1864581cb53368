pub mod errors;
pub mod manager;
pub mod messages;

pub use errors::{ProtectionError, RunError};
pub use manager::BranchProtector;

use crate::github::TransportResponse;

/// One entry of the ordered branch plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRule {
    pub branch: String,
    /// A failure on this branch stops the run and fails the process.
    pub fatal: bool,
}

impl BranchRule {
    pub fn new(branch: impl Into<String>, fatal: bool) -> Self {
        Self {
            branch: branch.into(),
            fatal,
        }
    }
}

/// How a request that reached GitHub is judged.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessCheck {
    /// The response status must be 2xx.
    HttpStatus,
    /// Any response counts as success, whatever its status.
    Transport,
}

impl SuccessCheck {
    pub fn evaluate(&self, response: TransportResponse) -> Result<(), ProtectionError> {
        match self {
            SuccessCheck::Transport => Ok(()),
            SuccessCheck::HttpStatus if response.is_success() => Ok(()),
            SuccessCheck::HttpStatus => Err(ProtectionError::Rejected {
                status: response.status,
                body: response.body.trim().to_string(),
            }),
        }
    }
}
