use crate::github::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum ProtectionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("GitHub answered {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("failed to serialize protection policy: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("protection of required branch '{branch}' failed: {source}")]
    FatalBranch {
        branch: String,
        #[source]
        source: ProtectionError,
    },
}
