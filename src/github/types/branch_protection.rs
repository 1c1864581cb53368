use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Body of `PUT /repos/{owner}/{repo}/branches/{branch}/protection`.
///
/// `restrictions` must be present (as `null`) for GitHub to accept the
/// request, so it is never skipped during serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionPolicy {
    pub required_status_checks: RequiredStatusChecks,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: RequiredPullRequestReviews,
    pub restrictions: Option<PushRestrictions>,
    pub allow_force_pushes: bool,
    pub allow_deletions: bool,
    pub required_linear_history: bool,
    pub allow_merge_commit: bool,
    pub allow_squash_merge: bool,
    pub allow_rebase_merge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging.
    pub strict: bool,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredPullRequestReviews {
    pub required_approving_review_count: u32,
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
}

/// Users, teams and apps allowed to push. Always sent as `null` by this tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRestrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
    #[serde(default)]
    pub apps: Vec<String>,
}

pub const REQUIRED_STATUS_CHECK_CONTEXTS: [&str; 3] = ["test", "lint", "security"];

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self {
            required_status_checks: RequiredStatusChecks {
                strict: true,
                contexts: REQUIRED_STATUS_CHECK_CONTEXTS
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            },
            enforce_admins: true,
            required_pull_request_reviews: RequiredPullRequestReviews {
                required_approving_review_count: 1,
                dismiss_stale_reviews: true,
                require_code_owner_reviews: false,
            },
            restrictions: None,
            allow_force_pushes: false,
            allow_deletions: false,
            required_linear_history: true,
            allow_merge_commit: true,
            allow_squash_merge: true,
            allow_rebase_merge: true,
        }
    }
}

impl ProtectionPolicy {
    /// Serializes the policy once.
    ///
    /// The returned raw value is handed to the transport for every branch, so
    /// all requests of a run carry the exact same bytes.
    pub fn to_payload(&self) -> Result<Box<RawValue>, serde_json::Error> {
        RawValue::from_string(serde_json::to_string(self)?)
    }

    /// Names of the merge strategies left enabled by this policy.
    pub fn merge_strategies(&self) -> Vec<&'static str> {
        let mut strategies = Vec::new();
        if self.allow_merge_commit {
            strategies.push("merge");
        }
        if self.allow_squash_merge {
            strategies.push("squash");
        }
        if self.allow_rebase_merge {
            strategies.push("rebase");
        }
        strategies
    }
}
