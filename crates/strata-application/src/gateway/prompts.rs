//! Instruction sets for the four gateway tasks.
//!
//! System instructions are static persona text plus a language instruction.
//! User content is rendered from minijinja templates over the session data.

use minijinja::{Environment, context};
use serde::Serialize;

use strata_core::i18n::Language;
use strata_core::session::{DiagnosisInput, FormulatedChallenge};

/// Extracted briefing text beyond this many characters is cut.
pub const MAX_BRIEFING_CHARS: usize = 30_000;

/// Headings of the text contract used when search grounding is on, paired
/// with the challenge field each one fills.
pub const CHALLENGE_HEADINGS: &[(&str, &str)] = &[
    ("strategicAlternativeA", "Strategic Alternative A"),
    ("strategicAlternativeB", "Strategic Alternative B"),
    ("strategicAlternativeC", "Strategic Alternative C"),
    ("culturalTension", "Cultural Tension"),
    ("marketOpportunity", "Market Opportunity"),
    ("consumerInsight", "Consumer Insight"),
    ("rumeltDiagnosis", "Diagnosis"),
    ("rumeltGuidingPolicy", "Guiding Policy"),
    ("behavioralJustification", "Behavioral Justification"),
    ("keyAssumptions", "Key Assumptions"),
    ("relevantMentalModels", "Relevant Mental Models"),
];

/// Top-level shape the model is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    JsonObject,
    JsonStringArray,
    /// Markdown sections; the language rule is the same as for objects.
    Sections,
}

/// The instruction appended to every system prompt so the answer comes back
/// in the UI language whatever the input language was.
pub fn language_instruction(lang: Language, shape: OutputShape) -> &'static str {
    match (lang, shape) {
        (Language::En, OutputShape::JsonObject) => {
            "IMPORTANT: Your entire response, including all keys and string values in the JSON output, MUST be in English."
        }
        (Language::En, OutputShape::JsonStringArray) => {
            "IMPORTANT: Your entire response, which is a JSON array of strings, MUST be in English. Each string in the array must be in English."
        }
        (Language::En, OutputShape::Sections) => {
            "IMPORTANT: Your entire response MUST be in English. Keep the section headings exactly as given."
        }
        (Language::Es, OutputShape::JsonObject) => {
            "IMPORTANTE: Tu respuesta COMPLETA, incluyendo todas las claves y valores de cadena en la salida JSON, DEBE estar en español."
        }
        (Language::Es, OutputShape::JsonStringArray) => {
            "IMPORTANTE: Tu respuesta COMPLETA, que es un array JSON de cadenas de texto, DEBE estar en español. Cada cadena de texto en el array debe estar en español."
        }
        (Language::Es, OutputShape::Sections) => {
            "IMPORTANTE: Tu respuesta COMPLETA DEBE estar en español. Mantén los encabezados de sección exactamente como se indican."
        }
    }
}

const CSO_PERSONA: &str = r#"You are a Chief Strategy Officer specialized in digital media, data and advertising technology. You strictly follow the principles of Richard Rumelt's "Good Strategy / Bad Strategy" and you are an expert in consumer psychology and behavioral economics.

Avoid Bad Strategy Traps: no fluff, no vague statements, no goals masquerading as strategy. Be concise and profound."#;

const BRIEFING_ROLE: &str = r#"Your task is to read a client engagement briefing and deduce its strategic context for a media team. Work from whatever mixture of guided context, free text, document text and screenshots is available.

When the inputs are sparse, do not leave fields empty: give your best guess of what is typical for this sector and client situation, and phrase it as a working hypothesis."#;

const CHALLENGE_ROLE: &str = r#"Your task is to formulate the strategic challenge for a media engagement, building it strictly in this order of dependency:

1. Three mutually exclusive strategic alternatives, each a short narrative:
   - Alternative A: bold and disruptive.
   - Alternative B: safe and consultative.
   - Alternative C: a balanced synthesis of both. This is the recommended alternative.
2. Three context blocks that inform the recommended alternative:
   - culturalTension: a cultural shift or paradox that informs or exacerbates the challenge.
   - marketOpportunity: a specific, possibly underserved opportunity the policy can exploit.
   - consumerInsight: a deep, non-obvious truth about the consumer's motivations or pain.
3. The strategic kernel, derived from the recommended alternative:
   - rumeltDiagnosis: the single critical challenge. Simplify the situation into its linchpin. This is NOT a goal ("increase sales by 20%"); it explains the obstacle.
   - rumeltGuidingPolicy: the overall approach to overcome that diagnosis. A direction that guides action, not a list of steps.
4. Supporting rationale:
   - behavioralJustification: a principle of psychology or behavioral economics (mere-exposure effect, social proof, loss aversion, choice architecture...) explaining WHY the policy should work.
   - keyAssumptions: the 2-3 critical assumptions that would invalidate the strategy if false.
   - relevantMentalModels: 1-2 strategic frameworks, prioritizing Rumelt's sources of power (leverage, focus, chain-link systems), and how they apply.

Do NOT include tactics, channels, media plans, budgets or executional ideas. This is the strategic challenge, not the plan."#;

const AVENUES_ROLE: &str = r#"Your task is to turn a formulated strategic kernel into avenues of strategic investigation for the team: questions and directions to research and validate before any creative or tactical work.

Each avenue must:
- address the diagnosis directly or operationalize the guiding policy;
- be open-ended yet focused, phrased as a direction to investigate ("Investigate whether...", "Map how...", "Test the assumption that...");
- where useful, test a key assumption or apply a named mental model.

Avenues are NOT creative ideas, campaign concepts or tactics. Return between 5 and 7 distinct avenues."#;

const BRIEFING_TEMPLATE: &str = r#"Analyze this client engagement and deduce its strategic context.

Client: {{ client_name }}
{% for fact in guided %}{{ fact.label }}: {{ fact.value }}
{% endfor %}
{%- if manual_briefing %}
Manual briefing notes:
"""
{{ manual_briefing }}
"""
{% endif %}
{%- if file_name %}
Briefing document: {{ file_name }}
{%- if file_content %}
Extracted document text:
"""
{{ file_content }}
"""
{%- else %}
(The document text could not be extracted. Use its name and the other inputs.)
{%- endif %}
{% endif %}
{%- if image_count %}
{{ image_count }} screenshot(s) of the client's materials are attached.
{% endif %}
Deduce: sector, market, productOrService, customerType, businessChallenge, customerChallenge, currentStrategyAttempt and consumerContext (involvement, funnelStage, barriers)."#;

const CHALLENGE_TEMPLATE: &str = r#"Here is the diagnosis of the engagement:

{% for fact in facts %}- {{ fact.label }}: {{ fact.value }}
{% endfor %}
{%- if file_name %}
- Briefing document: {{ file_name }}
{% endif %}
{%- if file_content %}
Extracted document text:
"""
{{ file_content }}
"""
{% endif %}
{%- if image_count %}
{{ image_count }} screenshot(s) of the client's materials are attached as additional context.
{% endif %}
Formulate the strategic challenge following Rumelt's principles.
{%- if headings %}

Answer in Markdown using exactly these level-2 headings, in this order, with the content below each heading:
{% for heading in headings %}## {{ heading }}
{% endfor %}
{%- endif %}"#;

const AVENUES_TEMPLATE: &str = r#"Client: {{ client_name }}
{%- if sector %} | Sector: {{ sector }}{% endif %}
{%- if market %} | Market: {{ market }}{% endif %}

Strategic kernel:
- Diagnosis: {{ challenge.rumeltDiagnosis }}
- Guiding policy: {{ challenge.rumeltGuidingPolicy }}
{% if challenge.behavioralJustification %}- Behavioral justification: {{ challenge.behavioralJustification }}
{% endif %}
{%- if challenge.keyAssumptions %}- Key assumptions: {{ challenge.keyAssumptions }}
{% endif %}
{%- if challenge.relevantMentalModels %}- Relevant mental models: {{ challenge.relevantMentalModels }}
{% endif %}
Generate the avenues of strategic investigation as a JSON array of strings."#;

const SUGGESTION_TEMPLATE: &str = r#"Given the current context: {{ context }}, and the user is trying to define "{{ field }}" and has typed "{{ draft }}", suggest 3-5 improved or alternative phrases. Focus on clarity and strategic relevance according to Rumelt's principles (e.g., for a diagnosis, ensure it's a specific challenge, not a goal). Output as a JSON array of strings."#;

#[derive(Serialize)]
struct Fact {
    label: &'static str,
    value: String,
}

fn facts(pairs: Vec<(&'static str, String)>) -> Vec<Fact> {
    pairs
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| Fact { label, value })
        .collect()
}

/// Extracted briefing text worth sending, cut to `MAX_BRIEFING_CHARS`.
fn briefing_text(diagnosis: &DiagnosisInput) -> Option<String> {
    diagnosis
        .briefing_file_content
        .as_deref()
        .filter(|content| !content.trim().is_empty())
        .map(|content| truncate_chars(content, MAX_BRIEFING_CHARS))
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Which gateway task a system instruction is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    BriefingAnalysis,
    ChallengeFormulation,
    Avenues,
}

/// Renders prompts for the gateway.
#[derive(Debug)]
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        Self { env }
    }

    /// Persona, task role and language rule joined into one instruction.
    pub fn system_instruction(&self, task: Task, lang: Language, shape: OutputShape) -> String {
        let role = match task {
            Task::BriefingAnalysis => BRIEFING_ROLE,
            Task::ChallengeFormulation => CHALLENGE_ROLE,
            Task::Avenues => AVENUES_ROLE,
        };
        format!(
            "{}\n\n{}\n\n{}",
            CSO_PERSONA,
            role,
            language_instruction(lang, shape)
        )
    }

    pub fn briefing_analysis(&self, diagnosis: &DiagnosisInput) -> Result<String, minijinja::Error> {
        let guided = facts(vec![
            ("Opportunity type", diagnosis.opportunity_type.as_ref().to_string()),
            ("Role of media", diagnosis.media_role.as_ref().to_string()),
            ("Digital maturity", diagnosis.digital_maturity.as_ref().to_string()),
        ]);
        self.env.render_str(
            BRIEFING_TEMPLATE,
            context! {
                client_name => diagnosis.client_name.trim(),
                guided => guided,
                manual_briefing => diagnosis.manual_briefing_text.trim(),
                file_name => diagnosis.briefing_file_name.as_deref().unwrap_or_default(),
                file_content => briefing_text(diagnosis),
                image_count => diagnosis.screenshots.len(),
            },
        )
    }

    /// User content for formulation. `text_contract` adds the heading list
    /// used when the answer cannot be schema-constrained.
    pub fn challenge_formulation(
        &self,
        diagnosis: &DiagnosisInput,
        text_contract: bool,
    ) -> Result<String, minijinja::Error> {
        let consumer = &diagnosis.consumer_context;
        let facts = facts(vec![
            ("Client", diagnosis.client_name.clone()),
            ("Opportunity type", diagnosis.opportunity_type.as_ref().to_string()),
            ("Role of media", diagnosis.media_role.as_ref().to_string()),
            ("Digital maturity", diagnosis.digital_maturity.as_ref().to_string()),
            ("Customer type", diagnosis.customer_type.clone()),
            ("Market", diagnosis.market.clone()),
            ("Sector", diagnosis.sector.clone()),
            ("Product or service", diagnosis.product_or_service.clone()),
            ("Business challenge", diagnosis.business_challenge.clone()),
            ("Customer challenge", diagnosis.customer_challenge.clone()),
            ("Consumer involvement", consumer.involvement.as_ref().to_string()),
            ("Funnel stage", consumer.funnel_stage.as_ref().to_string()),
            ("Consumer barriers", consumer.barriers.clone()),
            ("Current strategy attempt", diagnosis.current_strategy_attempt.clone()),
            ("Manual briefing notes", diagnosis.manual_briefing_text.clone()),
        ]);
        let headings: Vec<&str> = if text_contract {
            CHALLENGE_HEADINGS.iter().map(|(_, heading)| *heading).collect()
        } else {
            Vec::new()
        };

        self.env.render_str(
            CHALLENGE_TEMPLATE,
            context! {
                facts => facts,
                file_name => diagnosis.briefing_file_name.as_deref().unwrap_or_default(),
                file_content => briefing_text(diagnosis),
                image_count => diagnosis.screenshots.len(),
                headings => headings,
            },
        )
    }

    pub fn avenues(
        &self,
        challenge: &FormulatedChallenge,
        diagnosis: &DiagnosisInput,
    ) -> Result<String, minijinja::Error> {
        self.env.render_str(
            AVENUES_TEMPLATE,
            context! {
                client_name => diagnosis.client_name.trim(),
                sector => diagnosis.sector.trim(),
                market => diagnosis.market.trim(),
                challenge => challenge,
            },
        )
    }

    /// Complete prompt for a field suggestion, language rule included.
    pub fn field_suggestion(
        &self,
        field_label: &str,
        draft: &str,
        context_snapshot: &serde_json::Value,
        lang: Language,
    ) -> Result<String, minijinja::Error> {
        let body = self.env.render_str(
            SUGGESTION_TEMPLATE,
            context! {
                context => context_snapshot.to_string(),
                field => field_label,
                draft => draft,
            },
        )?;
        Ok(format!(
            "{}\n\n{}",
            body,
            language_instruction(lang, OutputShape::JsonStringArray)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::session::{FunnelStage, MediaRole};

    fn diagnosis() -> DiagnosisInput {
        DiagnosisInput {
            client_name: "Acme".to_string(),
            media_role: MediaRole::Performance,
            manual_briefing_text: "Sales are flat in the north region.".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_language_instruction_wording() {
        assert!(
            language_instruction(Language::Es, OutputShape::JsonObject)
                .contains("DEBE estar en español")
        );
        assert!(
            language_instruction(Language::En, OutputShape::JsonStringArray)
                .contains("Each string in the array must be in English")
        );
    }

    #[test]
    fn test_system_instruction_has_persona_and_language() {
        let prompts = PromptBuilder::new();
        let instruction =
            prompts.system_instruction(Task::Avenues, Language::En, OutputShape::JsonStringArray);
        assert!(instruction.starts_with("You are a Chief Strategy Officer"));
        assert!(instruction.contains("between 5 and 7"));
        assert!(instruction.ends_with("Each string in the array must be in English."));
    }

    #[test]
    fn test_briefing_prompt_includes_available_inputs_only() {
        let mut input = diagnosis();
        input.briefing_file_name = Some("brief.pptx".to_string());

        let prompt = PromptBuilder::new().briefing_analysis(&input).unwrap();
        assert!(prompt.contains("Client: Acme"));
        assert!(prompt.contains("Role of media: Performance"));
        assert!(!prompt.contains("Opportunity type"));
        assert!(prompt.contains("Sales are flat in the north region."));
        assert!(prompt.contains("Briefing document: brief.pptx"));
        assert!(prompt.contains("could not be extracted"));
        assert!(!prompt.contains("screenshot"));
    }

    #[test]
    fn test_briefing_text_is_truncated() {
        let mut input = diagnosis();
        input.briefing_file_name = Some("long.txt".to_string());
        input.briefing_file_content = Some("é".repeat(MAX_BRIEFING_CHARS + 100));

        let prompt = PromptBuilder::new().briefing_analysis(&input).unwrap();
        assert_eq!(prompt.matches('é').count(), MAX_BRIEFING_CHARS);
    }

    #[test]
    fn test_challenge_prompt_text_contract() {
        let mut input = diagnosis();
        input.consumer_context.funnel_stage = FunnelStage::Decision;

        let prompts = PromptBuilder::new();
        let schema_prompt = prompts.challenge_formulation(&input, false).unwrap();
        assert!(schema_prompt.contains("- Funnel stage: Decision"));
        assert!(!schema_prompt.contains("## Diagnosis"));

        let text_prompt = prompts.challenge_formulation(&input, true).unwrap();
        assert!(text_prompt.contains("## Strategic Alternative A\n"));
        assert!(text_prompt.contains("## Relevant Mental Models"));
    }

    #[test]
    fn test_challenge_prompt_carries_briefing_document() {
        let mut input = diagnosis();
        input.briefing_file_name = Some("brief.pdf".to_string());
        input.briefing_file_content = Some(format!(
            "Loyalty members churn after onboarding.{}",
            "~".repeat(MAX_BRIEFING_CHARS)
        ));

        let prompt = PromptBuilder::new().challenge_formulation(&input, false).unwrap();
        assert!(prompt.contains("- Briefing document: brief.pdf"));
        assert!(prompt.contains("Extracted document text:\n\"\"\"\nLoyalty members churn after onboarding."));
        assert_eq!(
            prompt.matches('~').count(),
            MAX_BRIEFING_CHARS - "Loyalty members churn after onboarding.".chars().count()
        );
    }

    #[test]
    fn test_avenues_prompt_embeds_kernel() {
        let challenge = FormulatedChallenge {
            rumelt_diagnosis: "Fragmented service".to_string(),
            rumelt_guiding_policy: "Integrate offers".to_string(),
            key_assumptions: "Clients value integration".to_string(),
            ..Default::default()
        };
        let prompt = PromptBuilder::new()
            .avenues(&challenge, &diagnosis())
            .unwrap();
        assert!(prompt.contains("- Diagnosis: Fragmented service"));
        assert!(prompt.contains("- Guiding policy: Integrate offers"));
        assert!(prompt.contains("- Key assumptions: Clients value integration"));
        assert!(!prompt.contains("Behavioral justification"));
    }

    #[test]
    fn test_suggestion_prompt() {
        let prompt = PromptBuilder::new()
            .field_suggestion(
                "Business Challenge",
                "sell more",
                &serde_json::json!({"clientName": "Acme"}),
                Language::Es,
            )
            .unwrap();
        assert!(prompt.contains(r#"{"clientName":"Acme"}"#));
        assert!(prompt.contains(r#"define "Business Challenge" and has typed "sell more""#));
        assert!(prompt.ends_with("debe estar en español."));
    }
}
