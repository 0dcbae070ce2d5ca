//! Sequential provisioning run over an ordered list of steps.
//!
//! Steps execute strictly in declared order. Each step sees the bindings
//! produced by every earlier step, and the first failure aborts the run.
//! Declared dependencies are checked when the workflow is built, so a step can
//! never read a binding that a later step produces.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info};

use crate::bindings::{Bindings, GIFT_ADDRESS};
use crate::errors::{ProvisionError, StepFailure};
use crate::step::{ProvisioningStep, StepContext};
use crate::steps::standard_steps;

/// Record of a step that completed.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: &'static str,
    pub produced: Bindings,
    pub elapsed: Duration,
}

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisioningReport {
    pub steps: Vec<StepRecord>,
    pub bindings: Bindings,
    pub elapsed: Duration,
}

impl ProvisioningReport {
    pub fn gift_address(&self) -> Option<&str> {
        self.bindings.get(GIFT_ADDRESS)
    }
}

/// A validated, single-use sequence of provisioning steps.
pub struct Workflow {
    steps: Vec<Box<dyn ProvisioningStep>>,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow").field("steps", &self.step_names()).finish()
    }
}

impl Workflow {
    /// Builds a workflow after checking step names are unique, every binding
    /// has a single producer, and every required binding is produced by a
    /// strictly earlier step.
    pub fn new(steps: Vec<Box<dyn ProvisioningStep>>) -> Result<Self, ProvisionError> {
        let mut names = HashSet::new();
        let mut producers: HashMap<&'static str, &'static str> = HashMap::new();
        for step in &steps {
            if !names.insert(step.name()) {
                return Err(ProvisionError::DuplicateStep { step: step.name() });
            }
            if let Some(binding) = step.requires().iter().copied().find(|binding| !producers.contains_key(binding)) {
                return Err(ProvisionError::UnorderedBinding {
                    step: step.name(),
                    binding,
                });
            }
            for &binding in step.produces() {
                if let Some(earlier) = producers.insert(binding, step.name()) {
                    return Err(ProvisionError::DuplicateBinding {
                        step: step.name(),
                        earlier,
                        binding,
                    });
                }
            }
        }
        Ok(Self { steps })
    }

    /// The hongbao demo workflow.
    pub fn standard() -> Result<Self, ProvisionError> {
        Self::new(standard_steps())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Runs every step once, in order. Consumes the workflow.
    pub async fn run(self, ctx: &StepContext<'_>) -> Result<ProvisioningReport, ProvisionError> {
        let total = self.steps.len();
        let started = Instant::now();
        let mut bindings = Bindings::new();
        let mut records = Vec::with_capacity(total);

        for (position, step) in self.steps.iter().enumerate() {
            let index = position + 1;
            info!("[{index}/{total}] {}", step.description());
            let step_started = Instant::now();

            let produced = match run_step(step.as_ref(), ctx, &bindings).await {
                Ok(produced) => produced,
                Err(source) => {
                    error!(step = step.name(), index, error = %source, "Provisioning step failed");
                    return Err(ProvisionError::Step {
                        index,
                        step: step.name(),
                        source,
                    });
                }
            };

            let elapsed = step_started.elapsed();
            for (name, value) in produced.iter() {
                debug!(step = step.name(), binding = name, value, "Bound value");
            }
            bindings.extend(produced.clone());
            records.push(StepRecord {
                name: step.name(),
                produced,
                elapsed,
            });
        }

        let report = ProvisioningReport {
            steps: records,
            bindings,
            elapsed: started.elapsed(),
        };
        info!(
            steps = total,
            elapsed_ms = report.elapsed.as_millis() as u64,
            gift = report.gift_address().unwrap_or("-"),
            "Done, you can now interact with the localnet!"
        );
        Ok(report)
    }
}

/// Runs one step and checks it produced everything it declared.
async fn run_step(step: &dyn ProvisioningStep, ctx: &StepContext<'_>, bindings: &Bindings) -> Result<Bindings, StepFailure> {
    let produced = step.run(ctx, bindings).await?;
    if let Some(missing) = step.produces().iter().find(|name| !produced.contains(name)) {
        return Err(StepFailure::MissingOutput { name: missing.to_string() });
    }
    Ok(produced)
}
