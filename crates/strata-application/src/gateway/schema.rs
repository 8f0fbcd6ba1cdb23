//! Response schemas for schema-constrained generation.
//!
//! Expressed in the OpenAPI subset the Gemini API accepts
//! (`OBJECT`/`ARRAY`/`STRING`, `enum`, `required`, `propertyOrdering`).

use serde_json::{Map, Value, json};
use strum::IntoEnumIterator;

use strata_core::session::{FunnelStage, InvolvementLevel};

/// Keys of the briefing analysis object, in generation order.
pub const BRIEFING_FIELDS: &[&str] = &[
    "sector",
    "market",
    "productOrService",
    "customerType",
    "businessChallenge",
    "customerChallenge",
    "currentStrategyAttempt",
];

/// Keys of the formulated challenge object, in dependency order.
pub const CHALLENGE_FIELDS: &[&str] = &[
    "strategicAlternativeA",
    "strategicAlternativeB",
    "strategicAlternativeC",
    "culturalTension",
    "marketOpportunity",
    "consumerInsight",
    "rumeltDiagnosis",
    "rumeltGuidingPolicy",
    "behavioralJustification",
    "keyAssumptions",
    "relevantMentalModels",
];

fn string_property(description: &str) -> Value {
    json!({ "type": "STRING", "description": description })
}

fn enum_property<E: IntoEnumIterator + AsRef<str>>(description: &str) -> Value {
    let values: Vec<String> = E::iter()
        .map(|variant| variant.as_ref().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    json!({ "type": "STRING", "description": description, "enum": values })
}

fn object_schema(properties: Map<String, Value>, ordering: &[&str]) -> Value {
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ordering,
        "propertyOrdering": ordering,
    })
}

/// Schema for `analyzeBriefing`: the deducible diagnosis fields only.
pub fn briefing_analysis_schema() -> Value {
    let mut properties = Map::new();
    for field in BRIEFING_FIELDS {
        properties.insert(
            field.to_string(),
            string_property(&format!("Deduced {}", field)),
        );
    }

    let mut consumer = Map::new();
    consumer.insert(
        "involvement".to_string(),
        enum_property::<InvolvementLevel>("Consumer involvement in the purchase decision"),
    );
    consumer.insert(
        "funnelStage".to_string(),
        enum_property::<FunnelStage>("Funnel stage where the key interaction happens"),
    );
    consumer.insert(
        "barriers".to_string(),
        string_property("Main barriers stopping the consumer"),
    );
    properties.insert(
        "consumerContext".to_string(),
        object_schema(consumer, &["involvement", "funnelStage", "barriers"]),
    );

    let mut ordering: Vec<&str> = BRIEFING_FIELDS.to_vec();
    ordering.push("consumerContext");
    object_schema(properties, &ordering)
}

/// Schema for `formulateChallenge`: every field a string, all required.
pub fn challenge_schema() -> Value {
    let properties = CHALLENGE_FIELDS
        .iter()
        .map(|field| (field.to_string(), json!({ "type": "STRING" })))
        .collect();
    object_schema(properties, CHALLENGE_FIELDS)
}

/// Schema for avenue generation and field suggestions.
pub fn string_array_schema() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_briefing_schema_enums() {
        let schema = briefing_analysis_schema();
        let consumer = &schema["properties"]["consumerContext"];
        assert_eq!(
            consumer["properties"]["involvement"]["enum"],
            json!(["High Involvement", "Medium Involvement", "Low Involvement"])
        );
        assert_eq!(
            consumer["properties"]["funnelStage"]["enum"][0],
            "Awareness"
        );
        assert!(schema["properties"].get("clientName").is_none());
        assert_eq!(schema["required"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_challenge_schema_requires_every_field() {
        let schema = challenge_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 11);
        assert_eq!(schema["propertyOrdering"][0], "strategicAlternativeA");
        assert!(schema["properties"].get("selectedAlternative").is_none());
    }
}
