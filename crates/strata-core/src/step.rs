//! Step sequencing for the guided form.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

use crate::i18n::TextKey;

/// The four steps, strictly linear.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Step {
    #[default]
    Diagnosis,
    ChallengeFormulation,
    PromptGeneration,
    Results,
}

impl Step {
    /// One-based position, as shown to the user.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub fn count() -> usize {
        Step::iter().count()
    }

    pub fn following(self) -> Option<Step> {
        Step::iter().nth(self as usize + 1)
    }

    pub fn preceding(self) -> Option<Step> {
        (self as usize).checked_sub(1).and_then(|i| Step::iter().nth(i))
    }

    pub fn header_key(self) -> TextKey {
        match self {
            Step::Diagnosis => TextKey::HeaderDiagnosis,
            Step::ChallengeFormulation => TextKey::HeaderChallengeFormulation,
            Step::PromptGeneration => TextKey::HeaderSmartPrompts,
            Step::Results => TextKey::HeaderResults,
        }
    }

    pub fn description_key(self) -> TextKey {
        match self {
            Step::Diagnosis => TextKey::DescriptionDiagnosis,
            Step::ChallengeFormulation => TextKey::DescriptionChallengeFormulation,
            Step::PromptGeneration => TextKey::DescriptionSmartPrompts,
            Step::Results => TextKey::DescriptionResults,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("Cannot jump from {current} to {target}: step not reached yet")]
    StepNotReached { current: Step, target: Step },
}

impl NavigationError {
    pub fn text_key(&self) -> TextKey {
        match self {
            NavigationError::StepNotReached { .. } => TextKey::ErrorStepNotReached,
        }
    }
}

/// An error waiting to be shown on the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingError {
    pub key: TextKey,
    /// Logged detail, not localized.
    pub detail: Option<String>,
}

/// Owns the current step and the pending error.
///
/// Entering any step through `next`, `back` or `jump_to` clears the pending
/// error. The orchestrator does not know about in-flight model calls; callers
/// block navigation while one is outstanding.
#[derive(Debug, Clone, Default)]
pub struct StepOrchestrator {
    current: Step,
    pending_error: Option<PendingError>,
}

impl StepOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Advances one step; stays put at `Results`.
    pub fn next(&mut self) -> Step {
        let target = self.current.following().unwrap_or(self.current);
        self.enter(target)
    }

    /// Retreats one step; stays put at `Diagnosis`.
    pub fn back(&mut self) -> Step {
        let target = self.current.preceding().unwrap_or(self.current);
        self.enter(target)
    }

    /// Jumps to `target`, which may be any step up to and including the current one.
    pub fn jump_to(&mut self, target: Step) -> Result<Step, NavigationError> {
        if target > self.current {
            return Err(NavigationError::StepNotReached {
                current: self.current,
                target,
            });
        }
        Ok(self.enter(target))
    }

    /// Returns to the first step, as when a session is loaded.
    pub fn reset(&mut self) {
        self.enter(Step::Diagnosis);
    }

    pub fn pending_error(&self) -> Option<&PendingError> {
        self.pending_error.as_ref()
    }

    pub fn set_error(&mut self, key: TextKey, detail: Option<String>) {
        self.pending_error = Some(PendingError { key, detail });
    }

    pub fn clear_error(&mut self) {
        self.pending_error = None;
    }

    fn enter(&mut self, step: Step) -> Step {
        tracing::debug!("Entering step {} (from {})", step, self.current);
        self.current = step;
        self.pending_error = None;
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_back_saturate() {
        let mut steps = StepOrchestrator::new();
        assert_eq!(steps.back(), Step::Diagnosis);

        assert_eq!(steps.next(), Step::ChallengeFormulation);
        assert_eq!(steps.next(), Step::PromptGeneration);
        assert_eq!(steps.next(), Step::Results);
        assert_eq!(steps.next(), Step::Results);

        assert_eq!(steps.back(), Step::PromptGeneration);
    }

    #[test]
    fn test_jump_never_goes_ahead() {
        let mut steps = StepOrchestrator::new();
        steps.next();

        let err = steps.jump_to(Step::Results).unwrap_err();
        assert_eq!(
            err,
            NavigationError::StepNotReached {
                current: Step::ChallengeFormulation,
                target: Step::Results
            }
        );
        assert_eq!(steps.current(), Step::ChallengeFormulation);

        assert_eq!(steps.jump_to(Step::ChallengeFormulation).unwrap(), Step::ChallengeFormulation);
        assert_eq!(steps.jump_to(Step::Diagnosis).unwrap(), Step::Diagnosis);
    }

    #[test]
    fn test_jump_back_several_steps() {
        let mut steps = StepOrchestrator::new();
        steps.next();
        steps.next();
        steps.next();
        assert_eq!(steps.current(), Step::Results);

        assert_eq!(steps.jump_to(Step::ChallengeFormulation).unwrap(), Step::ChallengeFormulation);
    }

    #[test]
    fn test_entering_a_step_clears_pending_error() {
        let mut steps = StepOrchestrator::new();
        steps.set_error(TextKey::ErrorGeneric, Some("timeout".to_string()));
        assert!(steps.pending_error().is_some());

        steps.next();
        assert!(steps.pending_error().is_none());

        steps.set_error(TextKey::ErrorGeneric, None);
        steps.jump_to(Step::ChallengeFormulation).unwrap();
        assert!(steps.pending_error().is_none());
    }

    #[test]
    fn test_reset_returns_to_first_step() {
        let mut steps = StepOrchestrator::new();
        steps.next();
        steps.next();
        steps.reset();
        assert_eq!(steps.current(), Step::Diagnosis);
    }

    #[test]
    fn test_step_numbering() {
        assert_eq!(Step::Diagnosis.number(), 1);
        assert_eq!(Step::Results.number(), 4);
        assert_eq!(Step::count(), 4);
        assert_eq!(Step::Results.following(), None);
        assert_eq!(Step::Diagnosis.preceding(), None);
        assert_eq!("prompt_generation".parse::<Step>().unwrap(), Step::PromptGeneration);
    }
}
