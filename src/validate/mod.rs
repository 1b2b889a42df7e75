//! Host precondition checks run once before a deployment.
//!
//! Checks are held in a statically-constructed ordered table (fatal checks
//! first); order matters and is expressed in one place rather than through
//! scattered registration calls.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{Result, ValidationError};
use crate::runtime::types::LabelFilters;
use crate::runtime::RuntimeBackend;

/// Severity of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckLevel {
    /// Failure aborts the deployment.
    Fatal,
    /// Failure is reported but does not abort.
    Warn,
}

/// One precondition check.
#[async_trait]
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn level(&self) -> CheckLevel;
    /// What the check asserts, for operator-facing output.
    fn message(&self) -> &'static str;
    /// Remediation hint shown on failure.
    fn hint(&self) -> &'static str;
    async fn verify(&self) -> std::result::Result<(), String>;
}

/// Outcome of running one rule.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub name: &'static str,
    pub level: CheckLevel,
    pub message: &'static str,
    pub hint: &'static str,
    pub failure: Option<String>,
}

impl CheckReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// The built-in checks, in execution order. Fatal checks come first so an
/// unusable runtime is reported before advisory findings.
#[must_use]
pub fn default_rules(backend: Arc<dyn RuntimeBackend>) -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(RuntimeConnectivityRule { backend }),
        Box::new(RootPrivilegeRule),
    ]
}

/// Run every rule in order, logging outcomes, and return all reports.
pub async fn run(rules: &[Box<dyn Rule>]) -> Vec<CheckReport> {
    let mut reports = Vec::with_capacity(rules.len());

    for rule in rules {
        let failure = rule.verify().await.err();
        match &failure {
            None => info!(check = rule.name(), "precondition check passed"),
            Some(reason) => match rule.level() {
                CheckLevel::Fatal => {
                    warn!(check = rule.name(), reason = %reason, "precondition check failed");
                }
                CheckLevel::Warn => {
                    warn!(check = rule.name(), reason = %reason, "precondition warning");
                }
            },
        }

        reports.push(CheckReport {
            name: rule.name(),
            level: rule.level(),
            message: rule.message(),
            hint: rule.hint(),
            failure,
        });
    }

    reports
}

/// Convert reports into a pass/fail gate: the first fatal failure aborts.
pub fn ensure_passed(reports: &[CheckReport]) -> Result<()> {
    for report in reports {
        if let Some(reason) = &report.failure {
            if report.level == CheckLevel::Fatal {
                return Err(ValidationError::CheckFailed {
                    name: report.name,
                    message: format!("{reason} (hint: {})", report.hint),
                }
                .into());
            }
        }
    }

    Ok(())
}

/// Fatal: the configured runtime backend must answer a basic query.
struct RuntimeConnectivityRule {
    backend: Arc<dyn RuntimeBackend>,
}

#[async_trait]
impl Rule for RuntimeConnectivityRule {
    fn name(&self) -> &'static str {
        "runtime-connectivity"
    }

    fn level(&self) -> CheckLevel {
        CheckLevel::Fatal
    }

    fn message(&self) -> &'static str {
        "the configured container runtime is reachable"
    }

    fn hint(&self) -> &'static str {
        "check the runtime API endpoint in the configuration and that the service is running"
    }

    async fn verify(&self) -> std::result::Result<(), String> {
        self.backend
            .list_pods(&LabelFilters::new())
            .await
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

/// Advisory: host tuning steps (SMT level and friends) need root.
struct RootPrivilegeRule;

#[async_trait]
impl Rule for RootPrivilegeRule {
    fn name(&self) -> &'static str {
        "root-privileges"
    }

    fn level(&self) -> CheckLevel {
        CheckLevel::Warn
    }

    fn message(&self) -> &'static str {
        "running with root privileges"
    }

    fn hint(&self) -> &'static str {
        "host tuning steps may fail without root; rerun as root if deployment requires them"
    }

    async fn verify(&self) -> std::result::Result<(), String> {
        // SAFETY: geteuid has no preconditions and cannot fail.
        let euid = unsafe { libc::geteuid() };
        if euid == 0 {
            Ok(())
        } else {
            Err(format!("running as uid {euid}, not root"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticRule {
        level: CheckLevel,
        outcome: std::result::Result<(), String>,
    }

    #[async_trait]
    impl Rule for StaticRule {
        fn name(&self) -> &'static str {
            "static"
        }
        fn level(&self) -> CheckLevel {
            self.level
        }
        fn message(&self) -> &'static str {
            "static check"
        }
        fn hint(&self) -> &'static str {
            "none"
        }
        async fn verify(&self) -> std::result::Result<(), String> {
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn fatal_failure_gates_deployment() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(StaticRule {
            level: CheckLevel::Fatal,
            outcome: Err("broken".into()),
        })];

        let reports = run(&rules).await;
        assert!(!reports[0].passed());
        assert!(ensure_passed(&reports).is_err());
    }

    #[tokio::test]
    async fn warn_failure_does_not_gate() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(StaticRule {
            level: CheckLevel::Warn,
            outcome: Err("advisory".into()),
        })];

        let reports = run(&rules).await;
        assert!(!reports[0].passed());
        assert!(ensure_passed(&reports).is_ok());
    }

    #[tokio::test]
    async fn all_rules_run_even_after_fatal_failure() {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(StaticRule {
                level: CheckLevel::Fatal,
                outcome: Err("broken".into()),
            }),
            Box::new(StaticRule {
                level: CheckLevel::Warn,
                outcome: Ok(()),
            }),
        ];

        let reports = run(&rules).await;
        assert_eq!(reports.len(), 2);
        assert!(reports[1].passed());
    }
}
