use std::path::PathBuf;

use clap::Parser;

use crate::protector::SuccessCheck;

pub const DEFAULT_OWNER: &str = "agentic-crypto-influencer";
pub const DEFAULT_REPO: &str = "agentic_crypto_influencer";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Apply the standard branch protection policy to a repository.
///
/// Without arguments, protects `main` (failure aborts the run) and then
/// `develop` (failure is reported only).
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Repository owner (user or organization)
    #[arg(long, default_value = DEFAULT_OWNER)]
    pub owner: String,
    /// Repository name
    #[arg(long, default_value = DEFAULT_REPO)]
    pub repo: String,
    /// GitHub REST API root
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    /// Branch to protect, in order. The first one listed is fatal on failure.
    /// Repeat to protect several branches; defaults to `main` then `develop`
    #[arg(short, long = "branch", value_name = "BRANCH")]
    pub branches: Vec<String>,
    /// Treat a failure on any branch as fatal
    #[arg(long)]
    pub strict: bool,
    /// How a completed request is judged
    #[arg(long, value_enum, default_value_t = SuccessCheck::HttpStatus)]
    pub success_check: SuccessCheck,
    /// Per-request network timeout, in seconds
    #[arg(long, value_name = "SECONDS", default_value = "30")]
    pub timeout: u64,
    /// Dotenv file read for credentials before anything else
    #[arg(long,
        value_name = "PATH",
        value_hint = clap::ValueHint::FilePath,
        default_value = ".env")]
    pub env_file: PathBuf,
    /// Print the policy and the endpoints without calling the API
    #[arg(long)]
    pub dry_run: bool,
}
