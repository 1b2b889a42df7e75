//! Deployment plans: ordered layers of pod template names.

use std::collections::HashSet;

use crate::error::DeployError;
use crate::templates::TemplateSet;

/// The ordered layer structure for an application's templates.
///
/// Templates inside a layer deploy concurrently; layers execute strictly in
/// sequence, so a later layer's pods may assume every pod from earlier
/// layers is healthy.
#[derive(Debug, Clone)]
pub struct DeploymentPlan {
    layers: Vec<Vec<String>>,
    /// Target SMT level hint from bundle metadata; carried for the host
    /// tuning step, never interpreted by the deploy core.
    smt_level: Option<u32>,
}

impl DeploymentPlan {
    #[must_use]
    pub fn new(layers: Vec<Vec<String>>, smt_level: Option<u32>) -> Self {
        Self { layers, smt_level }
    }

    #[must_use]
    pub fn layers(&self) -> &[Vec<String>] {
        &self.layers
    }

    #[must_use]
    pub fn smt_level(&self) -> Option<u32> {
        self.smt_level
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().flatten().map(String::as_str)
    }

    /// Check the plan against the loaded template set before anything is
    /// submitted: every declared template must appear exactly once, and
    /// every referenced name must resolve.
    pub fn validate(&self, templates: &TemplateSet) -> Result<(), DeployError> {
        let names: Vec<&str> = self.template_names().collect();

        if names.len() != templates.len() {
            return Err(DeployError::InvalidPlan(format!(
                "plan references {} template(s) but {} are declared; every pod template must be listed",
                names.len(),
                templates.len()
            )));
        }

        let mut seen = HashSet::new();
        for name in names {
            if !templates.contains(name) {
                return Err(DeployError::InvalidPlan(format!(
                    "plan references unknown template '{name}'; no matching template file exists"
                )));
            }
            if !seen.insert(name) {
                return Err(DeployError::InvalidPlan(format!(
                    "plan references template '{name}' more than once"
                )));
            }
        }

        Ok(())
    }
}
