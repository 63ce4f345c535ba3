//! LearningApplier - applies learning actions to stored profiles.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::foundation::{DomainError, ErrorCode, Mode, Timestamp, UserId};
use crate::domain::learning::{apply_to_profile, ApplyEffect, LearningAction};
use crate::ports::ProfileStore;

/// Confidence thresholds gating automatic application.
#[derive(Debug, Clone, Copy)]
pub struct LearningThresholds {
    /// At or above: applied without asking.
    pub auto_apply: f64,
    /// Below: rejected outright in batch application.
    pub suggest: f64,
}

impl Default for LearningThresholds {
    fn default() -> Self {
        Self {
            auto_apply: 0.85,
            suggest: 0.60,
        }
    }
}

impl From<&EngineConfig> for LearningThresholds {
    fn from(config: &EngineConfig) -> Self {
        Self {
            auto_apply: config.auto_apply_threshold,
            suggest: config.suggest_threshold,
        }
    }
}

/// Counts from one batch application pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub applied: usize,
    pub rejected: usize,
}

/// Applies learning actions against the profile store.
pub struct LearningApplier {
    profiles: Arc<dyn ProfileStore>,
    thresholds: LearningThresholds,
}

impl LearningApplier {
    /// Creates an applier with the given thresholds.
    pub fn new(profiles: Arc<dyn ProfileStore>, thresholds: LearningThresholds) -> Self {
        Self {
            profiles,
            thresholds,
        }
    }

    /// Applies the action iff its confidence clears the auto-apply
    /// threshold; otherwise returns false without side effects.
    pub async fn auto_apply_if_high_confidence(
        &self,
        action: &mut LearningAction,
        owner: &UserId,
        mode: Mode,
    ) -> Result<bool, DomainError> {
        if action.confidence < self.thresholds.auto_apply {
            return Ok(false);
        }
        self.apply(action, owner, mode).await
    }

    /// Resolves the action on the user's say-so.
    ///
    /// Not confirmed marks it rejected; confirmed applies it regardless
    /// of confidence.
    pub async fn apply_with_confirmation(
        &self,
        action: &mut LearningAction,
        owner: &UserId,
        mode: Mode,
        confirmed: bool,
    ) -> Result<bool, DomainError> {
        if !confirmed {
            action.mark_rejected()?;
            return Ok(false);
        }
        self.apply(action, owner, mode).await
    }

    /// Applies one pending action to the (owner, mode) profile.
    ///
    /// Advisory actions are never applied here; they stay pending for
    /// external handling. A store failure while resolving or saving the
    /// profile is a logged no-op, not an error: the action simply stays
    /// pending.
    pub async fn apply(
        &self,
        action: &mut LearningAction,
        owner: &UserId,
        mode: Mode,
    ) -> Result<bool, DomainError> {
        if !action.is_pending() {
            return Err(DomainError::new(
                ErrorCode::ActionAlreadyResolved,
                format!("Learning action {} was already resolved", action.id),
            ));
        }
        if action.kind.is_advisory() {
            tracing::debug!(kind = %action.kind, "Advisory action left for external handling");
            return Ok(false);
        }

        let mut profile = match self.profiles.get_or_create(owner, mode).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, owner = %owner, mode = %mode,
                    "No profile available; skipping learning application");
                return Ok(false);
            }
        };

        let now = Timestamp::now();
        match apply_to_profile(action, &mut profile, now)? {
            ApplyEffect::Advisory => Ok(false),
            ApplyEffect::Mutated => {
                if let Err(e) = self.profiles.save(&profile).await {
                    tracing::warn!(error = %e, owner = %owner, mode = %mode,
                        "Profile save failed; learning action stays pending");
                    return Ok(false);
                }
                action.mark_applied(now)?;
                tracing::debug!(kind = %action.kind, target = %action.target,
                    "Learning action applied");
                Ok(true)
            }
        }
    }

    /// Applies a batch: everything at or above auto-apply is applied,
    /// everything below suggest is rejected, the middle band stays
    /// pending for user confirmation.
    pub async fn batch_apply(
        &self,
        actions: &mut [LearningAction],
        owner: &UserId,
        mode: Mode,
    ) -> Result<BatchOutcome, DomainError> {
        let mut outcome = BatchOutcome::default();

        for action in actions.iter_mut() {
            if !action.is_pending() {
                continue;
            }
            if action.confidence >= self.thresholds.auto_apply {
                if self.apply(action, owner, mode).await? {
                    outcome.applied += 1;
                }
            } else if action.confidence < self.thresholds.suggest {
                action.mark_rejected()?;
                outcome.rejected += 1;
            }
        }

        Ok(outcome)
    }
}
