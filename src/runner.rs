//! Sequential execution of the step registry.
use crate::error::RunError;
use crate::logging::StepStatus;
use crate::skip_state::SkipSet;
use crate::steps::{Context, FailurePolicy, StepRegistry, StepResult};
use crate::verify::{Probe, RunReport};

type ProbeSource = Box<dyn Fn(&Context) -> Vec<Probe> + Send + Sync>;

/// Runs registered steps in ordinal order, then the verification battery.
pub struct Runner {
    registry: StepRegistry,
    probes: ProbeSource,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn status_of(result: &StepResult) -> (StepStatus, Option<&str>) {
    match result {
        StepResult::Ok => (StepStatus::Ok, None),
        StepResult::AlreadyPresent => (StepStatus::AlreadyPresent, None),
        StepResult::Declined(reason) => (StepStatus::Declined, Some(reason)),
        StepResult::Warned(reason) => (StepStatus::Warned, Some(reason)),
        StepResult::DryRun => (StepStatus::DryRun, None),
    }
}

impl Runner {
    /// A runner with no verification probes.
    #[must_use]
    pub fn new(registry: StepRegistry) -> Self {
        Self {
            registry,
            probes: Box::new(|_| Vec::new()),
        }
    }

    /// Probes to run once every step is done, built from the final context.
    #[must_use]
    pub fn with_probes(
        mut self,
        probes: impl Fn(&Context) -> Vec<Probe> + Send + Sync + 'static,
    ) -> Self {
        self.probes = Box::new(probes);
        self
    }

    /// Steps this runner executes.
    #[must_use]
    pub const fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Execute every step not in `skip`, in ascending ordinal order.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Fatal`] when a step with [`FailurePolicy::Abort`]
    /// fails. Steps after it do not run and nothing is rolled back.
    pub fn run_steps(&self, skip: &SkipSet, ctx: &mut Context) -> Result<(), RunError> {
        let total = self.registry.len();
        for (index, (ordinal, step)) in self.registry.iter().enumerate() {
            let label = step.label();
            if skip.contains(ordinal) {
                ctx.log.info(&format!("skipping step {ordinal}: {label}"));
                ctx.log
                    .record_step(ordinal, label, StepStatus::Skipped, Some("skip list"));
                continue;
            }
            if !step.should_run(ctx) {
                ctx.log
                    .debug(&format!("step {ordinal}: {label} (not applicable)"));
                ctx.log
                    .record_step(ordinal, label, StepStatus::NotApplicable, None);
                continue;
            }

            ctx.log
                .stage(&format!("[{}/{total}] {ordinal}. {label}", index + 1));
            match step.run(ctx) {
                Ok(result) => {
                    let (status, message) = status_of(&result);
                    match &result {
                        StepResult::Declined(reason) => ctx.log.info(reason),
                        StepResult::Warned(reason) => ctx.log.warn(reason),
                        _ => {}
                    }
                    ctx.log.record_step(ordinal, label, status, message);
                }
                Err(e) => {
                    let reason = format!("{e:#}");
                    ctx.log
                        .record_step(ordinal, label, StepStatus::Failed, Some(&reason));
                    match step.failure_policy() {
                        FailurePolicy::Abort => {
                            ctx.log.error(&format!("{label}: {reason}"));
                            return Err(RunError::Fatal {
                                ordinal,
                                label: label.to_string(),
                                reason,
                            });
                        }
                        FailurePolicy::Continue => {
                            ctx.log
                                .warn(&format!("{label} failed, continuing: {reason}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Run the verification probes against `ctx` and print the results.
    #[must_use]
    pub fn verify(&self, ctx: &Context) -> RunReport {
        let report = RunReport::collect(ctx, &(self.probes)(ctx));
        report.print(ctx.log.as_ref());
        report
    }

    /// [`Runner::run_steps`], then [`Runner::verify`].
    ///
    /// Verification failures are reported but never turn into an error.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Fatal`] when an aborting step fails; verification
    /// does not run in that case.
    pub fn run(&self, skip: &SkipSet, ctx: &mut Context) -> Result<RunReport, RunError> {
        self.run_steps(skip, ctx)?;
        Ok(self.verify(ctx))
    }
}
