//! The strategy workbench: one user's working surface.
//!
//! Owns the Session Store, the Step Orchestrator and the AI Gateway. Model
//! calls run without holding the state lock, so fields stay editable while a
//! call is in flight. A result is applied only if the session it was computed
//! for is still the active one.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use strum::{Display, EnumIter};
use thiserror::Error;
use tokio::sync::Mutex;

use strata_core::error::StrataError;
use strata_core::extractor::DocumentExtractor;
use strata_core::i18n::{Language, TextCatalog, TextKey};
use strata_core::provider::GroundingSource;
use strata_core::session::{
    Alternative, ChallengeField, ChallengePatch, DiagnosisField, DiagnosisPatch, FieldError,
    HistoryRecord, Session, SessionRepository,
};
use strata_core::step::{NavigationError, PendingError, Step, StepOrchestrator};

use crate::export::{export_file_name, render_markdown};
use crate::gateway::{AiGateway, GatewayError, suggestion_context};
use crate::intake::{self, IntakeNotice, Upload};
use crate::session_store::SessionStore;

/// A model-backed action that can be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ActionKind {
    AnalyzeBriefing,
    Formulate,
    Avenues,
}

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("{0} is already in progress")]
    Busy(ActionKind),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// The session changed while a model call was in flight; its result was dropped.
    #[error("The active session changed before the result arrived")]
    StaleSession,

    #[error(transparent)]
    Storage(#[from] StrataError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl WorkbenchError {
    pub fn text_key(&self) -> TextKey {
        match self {
            WorkbenchError::Gateway(e) => e.text_key(),
            WorkbenchError::Busy(_) => TextKey::ErrorActionInProgress,
            WorkbenchError::Navigation(e) => e.text_key(),
            WorkbenchError::StaleSession
            | WorkbenchError::Storage(_)
            | WorkbenchError::Field(_) => TextKey::ErrorGeneric,
        }
    }

    /// The user-facing message.
    pub fn localized(&self, catalog: &TextCatalog, lang: Language) -> String {
        match self {
            WorkbenchError::Gateway(GatewayError::Precondition(precondition)) => {
                precondition.localized(catalog, lang)
            }
            WorkbenchError::Field(e) => e.to_string(),
            _ => catalog.get(lang, self.text_key()),
        }
    }
}

/// Outcome of the write-through after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Autosave {
    Saved,
    /// No client name or business challenge yet.
    Skipped,
    /// The mutation stands; only the write failed.
    Failed(String),
}

/// Result of an upload: the autosave outcome plus notices for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub autosave: Autosave,
    pub notices: Vec<IntakeNotice>,
}

/// Actions with an outstanding model call.
#[derive(Debug, Clone, Default)]
struct InFlight(Arc<StdMutex<HashSet<ActionKind>>>);

impl InFlight {
    fn actions(&self) -> MutexGuard<'_, HashSet<ActionKind>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `None` when `kind` is already running.
    fn claim(&self, kind: ActionKind) -> Option<Claim> {
        self.actions().insert(kind).then(|| Claim {
            registry: self.clone(),
            kind,
        })
    }

    fn contains(&self, kind: ActionKind) -> bool {
        self.actions().contains(&kind)
    }

    fn ensure_idle(&self) -> Result<(), WorkbenchError> {
        match self.actions().iter().next() {
            Some(kind) => Err(WorkbenchError::Busy(*kind)),
            None => Ok(()),
        }
    }
}

/// Holds an action's slot; released on drop, also when the caller abandons
/// the action mid-call.
struct Claim {
    registry: InFlight,
    kind: ActionKind,
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.registry.actions().remove(&self.kind);
    }
}

/// Snapshot taken when an action starts.
struct Ticket {
    kind: ActionKind,
    claim: Claim,
    session: Session,
    epoch: u64,
    lang: Language,
}

struct WorkbenchState {
    store: SessionStore,
    steps: StepOrchestrator,
    language: Language,
    /// Bumped whenever the active session is replaced.
    epoch: u64,
    /// Grounding sources of the last formulation. Never persisted.
    sources: Vec<GroundingSource>,
}

impl WorkbenchState {
    fn replace_session(&mut self) {
        self.epoch += 1;
        self.steps.reset();
        self.sources.clear();
    }

    async fn autosave(&self) -> Autosave {
        match self.store.persist().await {
            Ok(true) => Autosave::Saved,
            Ok(false) => Autosave::Skipped,
            Err(e) => {
                tracing::warn!("Autosave of session {} failed: {}", self.store.active().id, e);
                Autosave::Failed(e.to_string())
            }
        }
    }
}

pub struct StrategyWorkbench {
    state: Mutex<WorkbenchState>,
    in_flight: InFlight,
    gateway: AiGateway,
    extractor: Arc<dyn DocumentExtractor>,
    catalog: TextCatalog,
}

impl StrategyWorkbench {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        gateway: AiGateway,
        extractor: Arc<dyn DocumentExtractor>,
        language: Language,
    ) -> Self {
        Self {
            state: Mutex::new(WorkbenchState {
                store: SessionStore::new(repository),
                steps: StepOrchestrator::new(),
                language,
                epoch: 0,
                sources: Vec::new(),
            }),
            in_flight: InFlight::default(),
            gateway,
            extractor,
            catalog: TextCatalog::new(),
        }
    }

    pub fn catalog(&self) -> &TextCatalog {
        &self.catalog
    }

    // ============================================================================
    // Read access
    // ============================================================================

    pub async fn session(&self) -> Session {
        self.state.lock().await.store.active().clone()
    }

    pub async fn current_step(&self) -> Step {
        self.state.lock().await.steps.current()
    }

    pub async fn pending_error(&self) -> Option<PendingError> {
        self.state.lock().await.steps.pending_error().cloned()
    }

    pub async fn sources(&self) -> Vec<GroundingSource> {
        self.state.lock().await.sources.clone()
    }

    pub async fn language(&self) -> Language {
        self.state.lock().await.language
    }

    pub async fn set_language(&self, language: Language) {
        self.state.lock().await.language = language;
    }

    pub async fn is_busy(&self, kind: ActionKind) -> bool {
        self.in_flight.contains(kind)
    }

    // ============================================================================
    // Session lifecycle
    // ============================================================================

    /// Starts a new session and marks it active.
    pub async fn new_session(&self) -> Result<Session, WorkbenchError> {
        let mut state = self.state.lock().await;
        state.store.create_session();
        state.replace_session();
        state.store.mark_active().await?;
        Ok(state.store.active().clone())
    }

    /// Loads a persisted session and returns to the first step.
    pub async fn load_session(&self, id: &str) -> Result<Session, WorkbenchError> {
        let mut state = self.state.lock().await;
        let session = state.store.find(id).await?;
        state.store.load_session(session).await?;
        state.replace_session();
        Ok(state.store.active().clone())
    }

    /// Resumes the session recorded as active by the last run.
    ///
    /// A pointer to a session that was never saved starts an empty session
    /// under the same id. Without a pointer a new session is started.
    pub async fn resume(&self) -> Result<Session, WorkbenchError> {
        let last = self.state.lock().await.store.last_active_id().await?;
        let Some(id) = last else {
            return self.new_session().await;
        };

        match self.load_session(&id).await {
            Err(WorkbenchError::Storage(e)) if e.is_not_found() => {
                tracing::debug!("Active session {} was never saved; starting it empty", id);
                let mut state = self.state.lock().await;
                state.store.create_session_with_id(&id);
                state.replace_session();
                Ok(state.store.active().clone())
            }
            other => other,
        }
    }

    pub async fn delete_session(&self, id: &str) -> Result<(), WorkbenchError> {
        let mut state = self.state.lock().await;
        if state.store.delete_session(id).await? {
            state.replace_session();
        }
        Ok(())
    }

    pub async fn history(&self) -> Result<Vec<HistoryRecord>, WorkbenchError> {
        Ok(self.state.lock().await.store.list_history().await?)
    }

    // ============================================================================
    // Navigation
    // ============================================================================

    pub async fn next(&self) -> Result<Step, WorkbenchError> {
        let mut state = self.state.lock().await;
        self.in_flight.ensure_idle()?;
        Ok(state.steps.next())
    }

    pub async fn back(&self) -> Result<Step, WorkbenchError> {
        let mut state = self.state.lock().await;
        self.in_flight.ensure_idle()?;
        Ok(state.steps.back())
    }

    pub async fn jump_to(&self, step: Step) -> Result<Step, WorkbenchError> {
        let mut state = self.state.lock().await;
        self.in_flight.ensure_idle()?;
        Ok(state.steps.jump_to(step)?)
    }

    // ============================================================================
    // Field edits
    // ============================================================================

    /// Sets one field by its serialized name, diagnosis or challenge.
    pub async fn set_field(&self, name: &str, value: &str) -> Result<Autosave, WorkbenchError> {
        if let Ok(field) = name.parse::<DiagnosisField>() {
            return self.update_diagnosis(DiagnosisPatch::for_field(field, value)?).await;
        }
        if let Ok(field) = name.parse::<ChallengeField>() {
            return self.update_challenge(ChallengePatch::for_field(field, value)).await;
        }
        Err(FieldError::UnknownField(name.to_string()).into())
    }

    pub async fn update_diagnosis(&self, patch: DiagnosisPatch) -> Result<Autosave, WorkbenchError> {
        let mut state = self.state.lock().await;
        state.store.update_diagnosis(patch);
        Ok(state.autosave().await)
    }

    pub async fn update_challenge(&self, patch: ChallengePatch) -> Result<Autosave, WorkbenchError> {
        let mut state = self.state.lock().await;
        state.store.update_challenge(patch);
        Ok(state.autosave().await)
    }

    pub async fn select_alternative(
        &self,
        alternative: Alternative,
    ) -> Result<Autosave, WorkbenchError> {
        self.update_challenge(ChallengePatch {
            selected_alternative: Some(alternative),
            ..Default::default()
        })
        .await
    }

    // ============================================================================
    // Uploads
    // ============================================================================

    /// Extracts and attaches a briefing file.
    ///
    /// Extraction runs without the lock; the result is dropped if the session
    /// was replaced meanwhile.
    pub async fn attach_briefing(&self, upload: Upload) -> Result<IntakeOutcome, WorkbenchError> {
        let (session_id, epoch) = {
            let state = self.state.lock().await;
            (state.store.active().id.clone(), state.epoch)
        };

        let (patch, notice) = intake::attach_briefing(self.extractor.as_ref(), upload).await;

        let mut state = self.state.lock().await;
        if state.store.active().id != session_id || state.epoch != epoch {
            tracing::warn!("Discarding briefing extraction for replaced session {}", session_id);
            return Err(WorkbenchError::StaleSession);
        }
        state.store.update_diagnosis(patch);
        Ok(IntakeOutcome {
            autosave: state.autosave().await,
            notices: notice.into_iter().collect(),
        })
    }

    pub async fn detach_briefing(&self) -> Result<Autosave, WorkbenchError> {
        self.update_diagnosis(intake::detach_briefing()).await
    }

    pub async fn add_images(&self, uploads: Vec<Upload>) -> Result<IntakeOutcome, WorkbenchError> {
        let mut state = self.state.lock().await;
        let (patch, notices) = intake::add_images(&state.store.active().diagnosis.screenshots, uploads);
        state.store.update_diagnosis(patch);
        Ok(IntakeOutcome {
            autosave: state.autosave().await,
            notices,
        })
    }

    /// Removes the image at `index`; `Ok(None)` when there is none.
    pub async fn remove_image(&self, index: usize) -> Result<Option<Autosave>, WorkbenchError> {
        let mut state = self.state.lock().await;
        let Some(patch) = intake::remove_image(&state.store.active().diagnosis.screenshots, index)
        else {
            return Ok(None);
        };
        state.store.update_diagnosis(patch);
        Ok(Some(state.autosave().await))
    }

    // ============================================================================
    // Model-backed actions
    // ============================================================================

    /// Deduces the context fields from the briefing and merges them in.
    pub async fn analyze_briefing(&self) -> Result<Autosave, WorkbenchError> {
        let ticket = self.begin(ActionKind::AnalyzeBriefing).await?;
        let result = self
            .gateway
            .analyze_briefing(&ticket.session.diagnosis, ticket.lang)
            .await;
        self.finish(ticket, result, |state, patch| {
            state.store.update_diagnosis(patch);
        })
        .await
    }

    /// Formulates the challenge, replacing the previous one.
    pub async fn formulate_challenge(&self) -> Result<Autosave, WorkbenchError> {
        let ticket = self.begin(ActionKind::Formulate).await?;
        let result = self
            .gateway
            .formulate_challenge(&ticket.session.diagnosis, ticket.lang)
            .await;
        self.finish(ticket, result, |state, formulation| {
            state.store.update_challenge(ChallengePatch::from(formulation.challenge));
            state.sources = formulation.sources;
        })
        .await
    }

    /// Generates avenues, replacing the previous list.
    pub async fn generate_avenues(&self) -> Result<Autosave, WorkbenchError> {
        let ticket = self.begin(ActionKind::Avenues).await?;
        let result = self
            .gateway
            .generate_avenues(
                &ticket.session.challenge,
                &ticket.session.diagnosis,
                ticket.lang,
            )
            .await;
        self.finish(ticket, result, |state, avenues| {
            state.store.update_prompts(avenues);
        })
        .await
    }

    /// Alternative phrasings for one field. Best effort, never an error
    /// beyond an unknown field name.
    pub async fn suggest(&self, name: &str) -> Result<Vec<String>, WorkbenchError> {
        let (session, lang) = {
            let state = self.state.lock().await;
            (state.store.active().clone(), state.language)
        };

        let (label, draft) = if let Ok(field) = name.parse::<DiagnosisField>() {
            (field.label_key(), field.value_in(&session.diagnosis))
        } else if let Ok(field) = name.parse::<ChallengeField>() {
            (field.label_key(), field.value_in(&session.challenge).to_string())
        } else {
            return Err(FieldError::UnknownField(name.to_string()).into());
        };

        let context = suggestion_context(&session.diagnosis);
        Ok(self
            .gateway
            .suggest_field_text(&self.catalog.get(lang, label), &draft, &context, lang)
            .await)
    }

    // ============================================================================
    // Export
    // ============================================================================

    /// Markdown export of the active session and its suggested file name.
    pub async fn export_markdown(&self) -> (String, String) {
        let state = self.state.lock().await;
        let session = state.store.active();
        let file_name = export_file_name(
            &session.diagnosis.client_name,
            chrono::Local::now().naive_local(),
        );
        (file_name, render_markdown(session, state.language, &self.catalog))
    }

    async fn begin(&self, kind: ActionKind) -> Result<Ticket, WorkbenchError> {
        let state = self.state.lock().await;
        let claim = self.in_flight.claim(kind).ok_or(WorkbenchError::Busy(kind))?;
        tracing::debug!("{} started for session {}", kind, state.store.active().id);
        Ok(Ticket {
            kind,
            claim,
            session: state.store.active().clone(),
            epoch: state.epoch,
            lang: state.language,
        })
    }

    async fn finish<T>(
        &self,
        ticket: Ticket,
        result: Result<T, GatewayError>,
        apply: impl FnOnce(&mut WorkbenchState, T),
    ) -> Result<Autosave, WorkbenchError> {
        let mut state = self.state.lock().await;
        drop(ticket.claim);

        if state.store.active().id != ticket.session.id || state.epoch != ticket.epoch {
            tracing::warn!(
                "Discarding {} result for session {}; the active session changed",
                ticket.kind,
                ticket.session.id
            );
            return Err(WorkbenchError::StaleSession);
        }

        match result {
            Ok(value) => {
                apply(&mut *state, value);
                tracing::info!("{} applied to session {}", ticket.kind, ticket.session.id);
                Ok(state.autosave().await)
            }
            Err(e) => {
                state.steps.set_error(e.text_key(), Some(e.to_string()));
                Err(e.into())
            }
        }
    }
}
