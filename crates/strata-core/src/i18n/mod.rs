//! Localized UI text.
//!
//! The catalog is a pure lookup from `(Language, TextKey)` to a string with
//! `{placeholder}` substitution. It carries no state and is passed by value
//! to whatever needs localized output.

mod en;
mod es;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// UI and model-output language.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Language {
    #[serde(rename = "EN")]
    #[strum(serialize = "EN")]
    En,
    #[default]
    #[serde(rename = "ES")]
    #[strum(serialize = "ES")]
    Es,
}

impl Language {
    /// Native name of the language, as used in model instructions.
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "español",
        }
    }
}

/// Identifier of a localized string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum TextKey {
    AppName,
    AppSubtitle,
    FooterStep,

    // History and session lifecycle
    HistoryTitle,
    HistoryEmpty,
    LabelLastModified,
    ConfirmDelete,
    NewSessionConfirm,
    SessionCreated,
    SessionLoaded,
    SessionDeleted,

    // Help
    HelpModalTitle,
    HelpModalIntro,
    HelpTopicsHeader,
    HelpOverviewQ,
    HelpOverviewA,
    HelpDiagnosisQ,
    HelpDiagnosisA,
    HelpChallengeFormulationQ,
    HelpChallengeFormulationA,
    HelpSmartPromptsQ,
    HelpSmartPromptsA,
    HelpExportQ,
    HelpExportA,
    HelpAiGenerationQ,
    HelpAiGenerationA,
    HelpNavigationQ,
    HelpNavigationA,

    // Step headers
    HeaderDiagnosis,
    HeaderChallengeFormulation,
    HeaderSmartPrompts,
    HeaderResults,
    HeaderProjectSetup,
    HeaderBusinessMarketContext,
    HeaderProblemConsumerContext,
    HeaderCulturalTension,
    HeaderMarketOpportunity,
    HeaderConsumerInsight,
    HeaderRumeltDiagnosis,
    HeaderRumeltGuidingPolicy,
    HeaderBehavioralJustification,
    HeaderKeyAssumptions,
    HeaderRelevantMentalModels,
    HeaderGeneratedIdeationPrompts,
    HeaderInformationSources,
    HeaderDiagnosisSnapshot,
    HeaderStrategicChallengeCore,
    HeaderStrategicAlternatives,

    DescriptionDiagnosis,
    DescriptionChallengeFormulation,
    DescriptionSmartPrompts,
    DescriptionResults,

    // Field labels
    LabelClientName,
    LabelOpportunityType,
    LabelMediaRole,
    LabelDigitalMaturity,
    LabelUploadBriefing,
    LabelManualBriefing,
    LabelUploadImages,
    LabelCustomerType,
    LabelMarketCategory,
    LabelSectorIndustry,
    LabelProductService,
    LabelBusinessChallenge,
    LabelCustomerChallenge,
    LabelConsumerInvolvement,
    LabelFunnelStage,
    LabelConsumerBarriers,
    LabelCurrentStrategy,
    LabelOptionA,
    LabelOptionB,
    LabelOptionC,

    FileSelected,
    FileParsing,

    // Progress messages
    MessageAnalyzingBriefing,
    MessageFormulatingChallenge,
    MessageGeneratingPrompts,

    // Errors
    ErrorGeneric,
    ErrorChallengeNotFormulated,
    ErrorDiagnosisNotComplete,
    ErrorMissingClientName,
    ErrorMissingBriefingSource,
    ErrorDiagnosisFieldsMissing,
    ErrorStepNotReached,
    ErrorActionInProgress,

    // Notices
    NoticeImageCapacity,
    NoticeNotAnImage,
    NoticeExtractionUnsupported,
    NoticeExtractionFailed,
    NoticeAutosaveFailed,
    NoticeAutosaveSkipped,

    TextNotSet,
    TextNotGenerated,
    TextNoPromptsGenerated,
}

/// A help topic: a question and its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpTopic {
    pub id: &'static str,
    pub question: TextKey,
    pub answer: TextKey,
}

const HELP_TOPICS: [HelpTopic; 7] = [
    HelpTopic {
        id: "overview",
        question: TextKey::HelpOverviewQ,
        answer: TextKey::HelpOverviewA,
    },
    HelpTopic {
        id: "diagnosis",
        question: TextKey::HelpDiagnosisQ,
        answer: TextKey::HelpDiagnosisA,
    },
    HelpTopic {
        id: "challenge",
        question: TextKey::HelpChallengeFormulationQ,
        answer: TextKey::HelpChallengeFormulationA,
    },
    HelpTopic {
        id: "prompts",
        question: TextKey::HelpSmartPromptsQ,
        answer: TextKey::HelpSmartPromptsA,
    },
    HelpTopic {
        id: "export",
        question: TextKey::HelpExportQ,
        answer: TextKey::HelpExportA,
    },
    HelpTopic {
        id: "ai",
        question: TextKey::HelpAiGenerationQ,
        answer: TextKey::HelpAiGenerationA,
    },
    HelpTopic {
        id: "navigation",
        question: TextKey::HelpNavigationQ,
        answer: TextKey::HelpNavigationA,
    },
];

/// Lookup table for localized strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCatalog;

impl TextCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Returns the text for `key` in `lang`.
    ///
    /// Falls back to English, then to `"Missing translation for <key>"`.
    pub fn get(&self, lang: Language, key: TextKey) -> String {
        resolve(lookup(lang, key), en::text(key), key)
    }

    /// Returns the text for `key` with each `{name}` placeholder replaced.
    ///
    /// # Arguments
    ///
    /// * `lang` - Requested language
    /// * `key` - Text to look up
    /// * `replacements` - `(placeholder, value)` pairs, placeholder without braces
    pub fn format(&self, lang: Language, key: TextKey, replacements: &[(&str, &str)]) -> String {
        let mut text = self.get(lang, key);
        for (placeholder, value) in replacements {
            text = text.replace(&format!("{{{}}}", placeholder), value);
        }
        text
    }

    /// Ordered list of help topics.
    pub fn help_topics(&self) -> &'static [HelpTopic] {
        &HELP_TOPICS
    }
}

fn lookup(lang: Language, key: TextKey) -> Option<&'static str> {
    match lang {
        Language::En => en::text(key),
        Language::Es => es::text(key),
    }
}

fn resolve(primary: Option<&str>, fallback: Option<&str>, key: TextKey) -> String {
    match primary.or(fallback) {
        Some(text) => text.to_string(),
        None => {
            let name: &'static str = key.into();
            format!("Missing translation for {}", name)
        }
    }
}
