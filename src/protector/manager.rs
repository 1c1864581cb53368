use std::sync::Arc;

use serde_json::value::RawValue;
use tracing::{error, info, warn};

use crate::{
    github::{ProtectionTransport, types::ProtectionPolicy},
    repository::{Repository, TargetRef},
};

use super::{BranchRule, ProtectionError, RunError, SuccessCheck, messages};

#[derive(Debug)]
pub struct BranchOutcome {
    pub rule: BranchRule,
    pub result: Result<(), ProtectionError>,
}

/// Result of walking the branch plan.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<BranchOutcome>,
    /// Set when a fatal branch failed and the remaining ones were skipped.
    pub aborted: bool,
}

impl RunReport {
    pub fn attempted(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .map(|o| o.rule.branch.as_str())
            .collect()
    }

    /// Converts the report into the process outcome: only a failed fatal
    /// branch is an error.
    pub fn into_result(self) -> Result<(), RunError> {
        for outcome in self.outcomes {
            if let (true, Err(source)) = (outcome.rule.fatal, outcome.result) {
                return Err(RunError::FatalBranch {
                    branch: outcome.rule.branch,
                    source,
                });
            }
        }
        Ok(())
    }
}

pub struct BranchProtector {
    transport: Arc<dyn ProtectionTransport>,
    policy: ProtectionPolicy,
    success_check: SuccessCheck,
}

impl BranchProtector {
    pub fn new(
        transport: Arc<dyn ProtectionTransport>,
        policy: ProtectionPolicy,
        success_check: SuccessCheck,
    ) -> Self {
        BranchProtector {
            transport,
            policy,
            success_check,
        }
    }

    /// Applies the policy to a single branch.
    pub async fn protect_branch(
        &self,
        target: &TargetRef,
        payload: &RawValue,
    ) -> Result<(), ProtectionError> {
        let response = self.transport.put_protection(target, payload).await?;
        info!("GitHub answered {} for {}", response.status, target);
        self.success_check.evaluate(response)
    }

    /// Walks the plan in order, one request at a time.
    ///
    /// The policy is serialized once and the same bytes are sent for every
    /// branch. A failure on a fatal branch stops the walk; a failure on any
    /// other branch is reported and the walk continues.
    pub async fn run(
        &self,
        repository: &Repository,
        plan: &[BranchRule],
    ) -> Result<RunReport, ProtectionError> {
        let payload = self.policy.to_payload()?;
        let mut report = RunReport::default();

        println!("{}", messages::run_started(repository));

        for rule in plan {
            let target = repository.branch(rule.branch.as_str());
            let result = self.protect_branch(&target, &payload).await;

            match &result {
                Ok(()) => {
                    info!("Protected {}", target);
                    println!("{}", messages::branch_protected(&rule.branch));
                }
                Err(e) if rule.fatal => {
                    error!("Failed to protect required branch {}: {}", target, e);
                    println!("{}", messages::branch_failed(&rule.branch, e));
                }
                Err(e) => {
                    warn!("Failed to protect {}: {}", target, e);
                    println!("{}", messages::branch_failed(&rule.branch, e));
                }
            }

            let stop = rule.fatal && result.is_err();
            report.outcomes.push(BranchOutcome {
                rule: rule.clone(),
                result,
            });

            if stop {
                println!("{}", messages::run_aborted(&rule.branch));
                report.aborted = true;
                return Ok(report);
            }
        }

        println!("{}", messages::summary(&self.policy));
        Ok(report)
    }
}
