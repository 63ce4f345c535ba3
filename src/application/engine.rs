//! DecisionEngine - the single entry point the product talks to.
//!
//! Wires the stores, evaluator, mode service, persona classifier, and
//! learning applier behind the programmatic surface the request
//! handlers call. There is no wire protocol.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::domain::foundation::{DomainError, Mode, Persona, SessionId, UserId};
use crate::domain::learning::{self, LearningAction, Pattern};
use crate::domain::modes::ModeDescriptor;
use crate::domain::persona::{
    ClassificationContext, PersonaClassification, PersonaClassifier, PersonaOverride,
};
use crate::domain::policy::{
    evaluate_with_sets, ActionContext, Applicability, Constraint, ConstraintSet,
    EvaluationResult, ModeTransitionContext, ModeTransitionResult, TriggerPolicy,
};
use crate::ports::{ConstraintStore, ProfileStore};

use super::learning_applier::{BatchOutcome, LearningApplier, LearningThresholds};
use super::mode_service::{ModeChangeRequest, ModeService, SetModeOptions, SetModeOutcome};

/// The policy and persona decision engine.
pub struct DecisionEngine {
    constraints: Arc<dyn ConstraintStore>,
    profiles: Arc<dyn ProfileStore>,
    classifier: PersonaClassifier,
    mode_service: ModeService,
    applier: LearningApplier,
    trigger_policy: TriggerPolicy,
}

impl DecisionEngine {
    /// Wires an engine over the given stores.
    pub fn new(
        constraints: Arc<dyn ConstraintStore>,
        profiles: Arc<dyn ProfileStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            classifier: PersonaClassifier::with_recency_ttl(config.recent_persona_ttl_secs),
            mode_service: ModeService::new(constraints.clone()),
            applier: LearningApplier::new(profiles.clone(), LearningThresholds::from(&config)),
            trigger_policy: config.trigger_policy,
            constraints,
            profiles,
        }
    }

    // ------------------------------------------------------------------
    // Action evaluation
    // ------------------------------------------------------------------

    /// Evaluates a proposed action against every applicable constraint.
    ///
    /// Applicable sets come from the constraint store merged with the
    /// user's learned profile constraints for the current mode. Store
    /// errors propagate unchanged: evaluation never falls back to allow.
    pub async fn evaluate_action(
        &self,
        ctx: &ActionContext,
    ) -> Result<EvaluationResult, DomainError> {
        ctx.validate()?;

        let mut sets = self
            .constraints
            .constraint_sets_for(Some(&ctx.user_id), ctx.mode, ctx.persona)
            .await?;
        if let Some(profile_set) = self.profile_constraints(&ctx.user_id, ctx.mode).await? {
            sets.push(profile_set);
        }

        let result = evaluate_with_sets(ctx, &sets, self.trigger_policy)?;
        tracing::debug!(
            user = %ctx.user_id,
            action = %ctx.action,
            decision = ?result.decision,
            triggered = result.triggered.len(),
            "Action evaluated"
        );
        Ok(result)
    }

    /// Returns the active constraints applicable to (owner, mode, persona).
    pub async fn active_constraints(
        &self,
        owner: Option<&UserId>,
        mode: Mode,
        persona: Option<Persona>,
    ) -> Result<Vec<Constraint>, DomainError> {
        let sets = self
            .constraints
            .constraint_sets_for(owner, mode, persona)
            .await?;
        Ok(sets
            .iter()
            .flat_map(|set| set.active_constraints().cloned().collect::<Vec<_>>())
            .collect())
    }

    /// Learned profile constraints surface as a lowest-priority set
    /// scoped to the profile's mode.
    async fn profile_constraints(
        &self,
        owner: &UserId,
        mode: Mode,
    ) -> Result<Option<ConstraintSet>, DomainError> {
        let profile = self.profiles.find(owner, mode).await?;
        Ok(profile.filter(|p| !p.constraints.is_empty()).map(|p| {
            let mut set = ConstraintSet::new(owner.clone(), format!("profile:{}", mode), 0)
                .with_applicability(Applicability::for_modes(vec![mode]));
            set.constraints = p.constraints;
            set.updated_at = p.updated_at;
            set
        }))
    }

    // ------------------------------------------------------------------
    // Mode transitions
    // ------------------------------------------------------------------

    /// Validates a transition without committing it.
    pub async fn validate_mode_transition(
        &self,
        ctx: &ModeTransitionContext,
    ) -> Result<ModeTransitionResult, DomainError> {
        self.mode_service.validate(ctx).await
    }

    /// Attempts a mode change; see `ModeService::set_mode`.
    pub async fn set_mode(
        &self,
        request: ModeChangeRequest,
        options: SetModeOptions,
    ) -> Result<SetModeOutcome, DomainError> {
        self.mode_service.set_mode(request, options).await
    }

    /// Returns the current mode.
    pub async fn current_mode(&self) -> Mode {
        self.mode_service.current_mode().await
    }

    /// Returns the current mode's static descriptor.
    pub async fn mode_descriptor(&self) -> &'static ModeDescriptor {
        self.mode_service.descriptor().await
    }

    // ------------------------------------------------------------------
    // Persona classification
    // ------------------------------------------------------------------

    /// Classifies the active persona from ambient signals.
    pub fn classify_persona(
        &self,
        ctx: &ClassificationContext,
    ) -> Result<PersonaClassification, DomainError> {
        self.classifier.classify(ctx)
    }

    /// Installs a persona override.
    pub fn set_persona_override(&self, entry: PersonaOverride) {
        self.classifier.set_override(entry);
    }

    /// Returns the installed override for (user, session), if any.
    pub fn persona_override(
        &self,
        user_id: &UserId,
        session_id: Option<&SessionId>,
    ) -> Option<PersonaOverride> {
        self.classifier.override_for(user_id, session_id)
    }

    /// Clears overrides for a user (all of them, or one session's).
    pub fn clear_persona_override(&self, user_id: &UserId, session_id: Option<&SessionId>) {
        self.classifier.clear_override(user_id, session_id);
    }

    // ------------------------------------------------------------------
    // Preference learning
    // ------------------------------------------------------------------

    /// Turns a detected pattern into candidate learning actions.
    pub fn generate_learning_actions(
        &self,
        pattern: &Pattern,
    ) -> Result<Vec<LearningAction>, DomainError> {
        learning::generate(pattern)
    }

    /// Applies the action iff its confidence clears the auto-apply
    /// threshold.
    pub async fn auto_apply_if_high_confidence(
        &self,
        action: &mut LearningAction,
        owner: &UserId,
        mode: Mode,
    ) -> Result<bool, DomainError> {
        self.applier
            .auto_apply_if_high_confidence(action, owner, mode)
            .await
    }

    /// Resolves the action on the user's say-so.
    pub async fn apply_with_confirmation(
        &self,
        action: &mut LearningAction,
        owner: &UserId,
        mode: Mode,
        confirmed: bool,
    ) -> Result<bool, DomainError> {
        self.applier
            .apply_with_confirmation(action, owner, mode, confirmed)
            .await
    }

    /// Applies a whole batch by confidence band.
    pub async fn batch_apply(
        &self,
        actions: &mut [LearningAction],
        owner: &UserId,
        mode: Mode,
    ) -> Result<BatchOutcome, DomainError> {
        self.applier.batch_apply(actions, owner, mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryConstraintStore, InMemoryProfileStore};
    use crate::domain::foundation::{ConstraintId, RiskLevel, Role};
    use crate::domain::learning::{LearningActionKind, PatternKind};
    use crate::domain::policy::{ConstraintKind, Decision, Severity};
    use serde_json::json;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    struct Harness {
        engine: DecisionEngine,
        constraints: Arc<InMemoryConstraintStore>,
        profiles: Arc<InMemoryProfileStore>,
    }

    fn harness() -> Harness {
        let constraints = Arc::new(InMemoryConstraintStore::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let engine = DecisionEngine::new(
            constraints.clone(),
            profiles.clone(),
            EngineConfig::default(),
        );
        Harness {
            engine,
            constraints,
            profiles,
        }
    }

    fn action_ctx() -> ActionContext {
        ActionContext::new(user(), Role::Owner, "send-email", RiskLevel::Low, Mode::Work)
    }

    #[tokio::test]
    async fn evaluation_with_no_sets_allows() {
        let h = harness();

        let result = h.engine.evaluate_action(&action_ctx()).await.unwrap();

        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.reasons, vec!["No constraints triggered".to_string()]);
    }

    #[tokio::test]
    async fn stored_constraints_are_enforced() {
        let h = harness();
        h.constraints
            .save_set(&ConstraintSet::system("defaults", 0).with_constraint(Constraint::new(
                ConstraintId::new("block-delete").unwrap(),
                Severity::Hard,
                ConstraintKind::BlockTool {
                    tool_id: "delete-file".to_string(),
                },
                "No deleting",
            )))
            .await
            .unwrap();

        let result = h
            .engine
            .evaluate_action(&action_ctx().with_tool("delete-file"))
            .await
            .unwrap();

        assert_eq!(result.decision, Decision::Deny);
        assert_eq!(result.triggered[0].constraint_id.as_str(), "block-delete");
    }

    #[tokio::test]
    async fn learned_profile_constraints_feed_back_into_evaluation() {
        let h = harness();

        // Learn a guard the way the loop would: an error pattern over a
        // tool generates an adjust-constraint action which gets applied.
        let pattern = Pattern::new(
            PatternKind::ErrorPattern,
            0.95,
            json!({ "tool_id": "calendar-sync" }),
        )
        .unwrap();
        let mut actions = h.engine.generate_learning_actions(&pattern).unwrap();
        assert_eq!(actions[0].kind, LearningActionKind::AdjustConstraint);
        let applied = h
            .engine
            .auto_apply_if_high_confidence(&mut actions[0], &user(), Mode::Work)
            .await
            .unwrap();
        assert!(applied);

        let result = h
            .engine
            .evaluate_action(&action_ctx().with_tool("calendar-sync"))
            .await
            .unwrap();

        assert_eq!(result.decision, Decision::Deny);
        assert!(result
            .triggered
            .iter()
            .any(|t| t.constraint_id.as_str() == "learned-guard-calendar-sync"));
    }

    #[tokio::test]
    async fn profile_constraints_stay_scoped_to_their_mode() {
        let h = harness();
        let mut profile = h.profiles.get_or_create(&user(), Mode::Finance).await.unwrap();
        // Finance profiles seed a hard risk ceiling.
        assert!(!profile.constraints.is_empty());
        profile.set_preference("noop", "x", crate::domain::foundation::Timestamp::now());
        h.profiles.save(&profile).await.unwrap();

        // A high-risk action in Work mode is untouched by the Finance
        // profile's ceiling.
        let mut ctx = action_ctx();
        ctx.estimated_risk = RiskLevel::High;
        let result = h.engine.evaluate_action(&ctx).await.unwrap();

        assert_eq!(result.decision, Decision::Allow);
    }

    #[tokio::test]
    async fn active_constraints_flattens_applicable_sets() {
        let h = harness();
        h.constraints
            .save_set(
                &ConstraintSet::system("defaults", 0)
                    .with_constraint(Constraint::new(
                        ConstraintId::new("keep").unwrap(),
                        Severity::Soft,
                        ConstraintKind::Other {
                            note: "n".to_string(),
                        },
                        "kept",
                    ))
                    .with_constraint(
                        Constraint::new(
                            ConstraintId::new("inactive").unwrap(),
                            Severity::Soft,
                            ConstraintKind::Other {
                                note: "n".to_string(),
                            },
                            "dropped",
                        )
                        .with_active(false),
                    ),
            )
            .await
            .unwrap();

        let constraints = h
            .engine
            .active_constraints(Some(&user()), Mode::Work, None)
            .await
            .unwrap();

        let ids: Vec<&str> = constraints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["keep"]);
    }

    #[tokio::test]
    async fn persona_surface_delegates_to_the_classifier() {
        let h = harness();
        h.engine
            .set_persona_override(PersonaOverride::new(user(), Persona::Planner));

        let classification = h
            .engine
            .classify_persona(&ClassificationContext::new(user()).with_mode(Mode::Work))
            .unwrap();

        assert_eq!(classification.persona, Persona::Planner);
        assert!(classification.overridden);
        assert!(h.engine.persona_override(&user(), None).is_some());

        h.engine.clear_persona_override(&user(), None);
        assert!(h.engine.persona_override(&user(), None).is_none());
    }

    #[tokio::test]
    async fn mode_surface_delegates_to_the_service() {
        let h = harness();

        assert_eq!(h.engine.current_mode().await, Mode::Default);
        h.engine
            .set_mode(ModeChangeRequest::new(Mode::Work), SetModeOptions::default())
            .await
            .unwrap();
        assert_eq!(h.engine.current_mode().await, Mode::Work);
        assert_eq!(h.engine.mode_descriptor().await.home_persona, Persona::Operator);
    }
}
