//! Operator-facing console lines.
//!
//! Every line starts with a fixed symbol: 🔒 start, ✅ success, ❌ failure,
//! 🚫 abort, 📋 summary.

use crate::{
    config::TOKEN_ENV_VAR,
    github::types::ProtectionPolicy,
    repository::{Repository, TargetRef},
};

use super::{BranchRule, ProtectionError};

pub const TOKEN_SETTINGS_URL: &str = "https://github.com/settings/tokens";
pub const REQUIRED_SCOPES: &str = "repo, admin:repo_hook";

/// Diagnostic printed when no token could be found.
pub fn missing_credential() -> String {
    format!(
        "❌ {TOKEN_ENV_VAR} environment variable is not set\n\
        Create a personal access token at {TOKEN_SETTINGS_URL}\n\
        Required scopes: {REQUIRED_SCOPES}\n\
        Then export it, or add it to a .env file:\n\
        {TOKEN_ENV_VAR}=your_token_here"
    )
}

pub fn run_started(repository: &Repository) -> String {
    format!("🔒 Setting up branch protection rules for {repository}...")
}

pub fn branch_protected(branch: &str) -> String {
    format!("✅ Branch protection applied to '{branch}'")
}

pub fn branch_failed(branch: &str, error: &ProtectionError) -> String {
    format!("❌ Failed to apply branch protection to '{branch}': {error}")
}

pub fn run_aborted(branch: &str) -> String {
    format!("🚫 '{branch}' must be protected; remaining branches were not attempted")
}

/// Closing summary listing the rules that were applied.
pub fn summary(policy: &ProtectionPolicy) -> String {
    let reviews = &policy.required_pull_request_reviews;
    let checks = &policy.required_status_checks;

    let mut lines = vec!["📋 Branch protection rules configured:".to_string()];
    lines.push(format!(
        "  - Require {} approving review(s) before merging",
        reviews.required_approving_review_count
    ));
    if !checks.contexts.is_empty() {
        lines.push(format!(
            "  - Require status checks to pass ({})",
            checks.contexts.join(", ")
        ));
    }
    if checks.strict {
        lines.push("  - Require branches to be up to date before merging".to_string());
    }
    if policy.enforce_admins {
        lines.push("  - Include administrators".to_string());
    }
    if policy.required_linear_history {
        lines.push("  - Require linear history".to_string());
    }
    lines.push(format!(
        "  - Allowed merge strategies: {}",
        policy.merge_strategies().join(", ")
    ));

    lines.join("\n")
}

/// What a dry run would have done.
pub fn dry_run(api_url: &str, targets: &[(TargetRef, &BranchRule)], payload: &str) -> String {
    let mut out = String::from("📋 Dry run, no request will be sent\n");
    for (target, rule) in targets {
        let mode = if rule.fatal { "required" } else { "best effort" };
        out.push_str(&format!(
            "  PUT {}{} ({mode})\n",
            api_url.trim_end_matches('/'),
            target.protection_path()
        ));
    }
    out.push_str(payload);
    out
}
