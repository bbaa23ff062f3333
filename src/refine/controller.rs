use super::policy::RefinementPolicy;
use super::report::{CycleReport, Phase, RefinementAttempt};
use crate::constraints::{ConstraintSet, evaluate};
use crate::error::{CycleError, Stage, StageFailure};
use crate::llm::Provider;
use crate::prompt::{SlotValues, Template};
use tracing::{debug, info, warn};

/// Drives render → generate → evaluate, refining the parameters after a
/// failed attempt until the policy's refinement budget is spent.
///
/// Holds no state between cycles; each [`run_cycle`](Self::run_cycle) call
/// starts from the caller's parameters.
pub struct RefinementController<'p> {
    provider: &'p dyn Provider,
    policy: RefinementPolicy,
}

impl<'p> RefinementController<'p> {
    pub fn new(provider: &'p dyn Provider) -> Self {
        Self {
            provider,
            policy: RefinementPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RefinementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RefinementPolicy {
        &self.policy
    }

    /// Run the initial attempt and, while constraints fail and the budget
    /// allows, refined attempts. Stops at the first passing attempt.
    ///
    /// Any stage failure aborts the cycle; attempts completed before it are
    /// carried in the error.
    pub async fn run_cycle(
        &self,
        template: &Template,
        parameters: &SlotValues,
        constraints: &ConstraintSet,
    ) -> Result<CycleReport, CycleError> {
        let mut attempts: Vec<RefinementAttempt> = Vec::new();
        let mut phase = Phase::Initial;
        let mut parameters = parameters.clone();
        let mut refinements = 0u32;

        loop {
            info!(phase = %phase, provider = self.provider.name(), "cycle.attempt.start");
            let attempt = match self
                .attempt(phase, template, &parameters, constraints)
                .await
            {
                Ok(attempt) => attempt,
                Err((stage, source)) => {
                    warn!(phase = %phase, stage = %stage, error = %source, "cycle.abort");
                    return Err(CycleError {
                        phase,
                        stage,
                        source,
                        attempts,
                    });
                }
            };

            let passed = attempt.passed();
            info!(phase = %phase, passed, "cycle.attempt.end");
            if passed {
                attempts.push(attempt);
                break;
            }

            let failed: Vec<&str> = attempt.evaluation.failed().collect();
            if refinements >= self.policy.max_refinement_attempts {
                warn!(phase = %phase, failed = ?failed, "cycle.final_attempt_failed");
                attempts.push(attempt);
                break;
            }

            warn!(phase = %phase, failed = ?failed, "cycle.refine");
            parameters = self.policy.refine(&parameters, &attempt.evaluation);
            attempts.push(attempt);
            refinements += 1;
            phase = phase.next();
        }

        Ok(CycleReport::new(attempts))
    }

    async fn attempt(
        &self,
        phase: Phase,
        template: &Template,
        parameters: &SlotValues,
        constraints: &ConstraintSet,
    ) -> Result<RefinementAttempt, (Stage, StageFailure)> {
        let instruction = template
            .render(parameters)
            .map_err(|e| (Stage::Render, e.into()))?;
        debug!(phase = %phase, instruction = %instruction, "cycle.instruction");

        let response = self
            .provider
            .generate(&instruction)
            .await
            .map_err(|e| (Stage::Generate, e.into()))?;
        debug!(phase = %phase, words = response.word_count(), "cycle.response");

        let evaluation =
            evaluate(response.as_str(), constraints).map_err(|e| (Stage::Evaluate, e.into()))?;

        Ok(RefinementAttempt {
            phase,
            parameters: parameters.clone(),
            instruction,
            response,
            evaluation,
        })
    }
}

/// One cycle with the default policy: exactly one refinement on failure.
pub async fn run_negative_prompt_cycle(
    provider: &dyn Provider,
    template: &Template,
    parameters: &SlotValues,
    constraints: &ConstraintSet,
) -> Result<CycleReport, CycleError> {
    RefinementController::new(provider)
        .run_cycle(template, parameters, constraints)
        .await
}
