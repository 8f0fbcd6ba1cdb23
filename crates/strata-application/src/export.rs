//! Markdown export of a finished session.

use chrono::NaiveDateTime;
use std::fmt::Write;

use strata_core::i18n::{Language, TextCatalog, TextKey};
use strata_core::session::{Alternative, Session};

/// Renders the Results projection of `session` as Markdown.
pub fn render_markdown(session: &Session, lang: Language, catalog: &TextCatalog) -> String {
    let text = |key: TextKey| catalog.get(lang, key);
    let or_not_set = |value: &str| {
        if value.is_empty() {
            text(TextKey::TextNotSet)
        } else {
            value.to_string()
        }
    };
    let or_not_generated = |value: &str| {
        if value.is_empty() {
            text(TextKey::TextNotGenerated)
        } else {
            value.to_string()
        }
    };

    let diagnosis = &session.diagnosis;
    let challenge = &session.challenge;
    let mut out = String::new();

    // `write!` into a String cannot fail.
    let _ = write!(
        out,
        "# {} - {}\n\n",
        text(TextKey::AppName),
        text(TextKey::HeaderResults)
    );

    let _ = write!(out, "## 1. {}\n\n", text(TextKey::HeaderDiagnosis));
    let mut field = |key: TextKey, value: String| {
        let _ = writeln!(out, "**{}:** {}", text(key), value);
    };
    field(TextKey::LabelClientName, or_not_set(&diagnosis.client_name));
    field(TextKey::LabelOpportunityType, or_not_set(diagnosis.opportunity_type.as_ref()));
    field(TextKey::LabelMediaRole, or_not_set(diagnosis.media_role.as_ref()));
    field(TextKey::LabelDigitalMaturity, or_not_set(diagnosis.digital_maturity.as_ref()));
    if let Some(file_name) = diagnosis.briefing_file_name.as_deref().filter(|n| !n.is_empty()) {
        field(TextKey::LabelUploadBriefing, file_name.to_string());
    }
    field(TextKey::LabelCustomerType, or_not_set(&diagnosis.customer_type));
    field(TextKey::LabelMarketCategory, or_not_set(&diagnosis.market));
    field(TextKey::LabelSectorIndustry, or_not_set(&diagnosis.sector));
    field(TextKey::LabelProductService, or_not_set(&diagnosis.product_or_service));
    field(TextKey::LabelBusinessChallenge, or_not_set(&diagnosis.business_challenge));
    field(TextKey::LabelCustomerChallenge, or_not_set(&diagnosis.customer_challenge));
    field(
        TextKey::LabelConsumerInvolvement,
        or_not_set(diagnosis.consumer_context.involvement.as_ref()),
    );
    field(
        TextKey::LabelFunnelStage,
        or_not_set(diagnosis.consumer_context.funnel_stage.as_ref()),
    );
    field(TextKey::LabelConsumerBarriers, or_not_set(&diagnosis.consumer_context.barriers));
    field(TextKey::LabelCurrentStrategy, or_not_set(&diagnosis.current_strategy_attempt));
    out.push('\n');

    let _ = write!(out, "## 2. {}\n\n", text(TextKey::HeaderChallengeFormulation));
    let options = [
        (Alternative::A, TextKey::LabelOptionA),
        (Alternative::B, TextKey::LabelOptionB),
        (Alternative::C, TextKey::LabelOptionC),
    ];
    for (alternative, label) in options {
        let body = challenge.alternative(alternative).unwrap_or_default();
        if body.is_empty() {
            continue;
        }
        let marker = if challenge.selected_alternative == alternative {
            " [SELECTED]"
        } else {
            ""
        };
        let _ = write!(out, "### {}{}:\n{}\n\n", text(label), marker, body);
    }

    let always = [
        (TextKey::HeaderRumeltDiagnosis, &challenge.rumelt_diagnosis),
        (TextKey::HeaderRumeltGuidingPolicy, &challenge.rumelt_guiding_policy),
        (TextKey::HeaderBehavioralJustification, &challenge.behavioral_justification),
        (TextKey::HeaderCulturalTension, &challenge.cultural_tension),
        (TextKey::HeaderMarketOpportunity, &challenge.market_opportunity),
        (TextKey::HeaderConsumerInsight, &challenge.consumer_insight),
    ];
    for (key, value) in always {
        let _ = write!(out, "### {}:\n{}\n\n", text(key), or_not_generated(value));
    }

    let optional = [
        (TextKey::HeaderKeyAssumptions, &challenge.key_assumptions),
        (TextKey::HeaderRelevantMentalModels, &challenge.relevant_mental_models),
    ];
    for (key, value) in optional {
        if !value.is_empty() {
            let _ = write!(out, "### {}:\n{}\n\n", text(key), value);
        }
    }

    let _ = write!(out, "## 3. {}\n\n", text(TextKey::HeaderSmartPrompts));
    if session.generated_prompts.is_empty() {
        let _ = writeln!(out, "_{}_", text(TextKey::TextNoPromptsGenerated));
    } else {
        for prompt in &session.generated_prompts {
            let _ = writeln!(out, "* {}", prompt);
        }
    }
    let _ = write!(out, "\n---\n_Generated by {}_", text(TextKey::AppName));

    out
}

/// `<CLIENT>_RetoEstrategico_<YYYYMMDD_HHMM>.md`
///
/// Every character outside ASCII letters and digits becomes `_`; an empty
/// client name becomes `Client`.
pub fn export_file_name(client_name: &str, at: NaiveDateTime) -> String {
    let client = if client_name.is_empty() {
        "Client"
    } else {
        client_name
    };
    let safe: String = client
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_RetoEstrategico_{}.md", safe, at.format("%Y%m%d_%H%M"))
}
