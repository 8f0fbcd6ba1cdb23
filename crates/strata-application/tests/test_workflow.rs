use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use strata_application::{
    AiGateway, Autosave, GatewayError, GatewaySettings, IntakeNotice, PreconditionError,
    StrategyWorkbench, Upload, WorkbenchError,
};
use strata_core::extractor::{DocumentExtractor, ExtractionError};
use strata_core::i18n::{Language, TextKey};
use strata_core::kv::KeyValueStore;
use strata_core::provider::{ModelProvider, ModelRequest, ModelResponse, ProviderError};
use strata_core::session::{Alternative, MAX_SCREENSHOTS, SessionRepository};
use strata_infrastructure::{BuiltinDocumentExtractor, KvSessionRepository, MemoryKeyValueStore};

/// Counts calls and replays queued responses.
#[derive(Default)]
struct StubProvider {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
}

impl StubProvider {
    fn with_responses(responses: Vec<Result<ModelResponse, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(responses.into()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    async fn generate(&self, _request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

struct Fixture {
    bench: StrategyWorkbench,
    provider: Arc<StubProvider>,
}

fn fixture(responses: Vec<Result<ModelResponse, ProviderError>>) -> Fixture {
    let provider = StubProvider::with_responses(responses);
    let repository = KvSessionRepository::new(Arc::new(MemoryKeyValueStore::new()));
    let bench = StrategyWorkbench::new(
        Arc::new(repository),
        AiGateway::new(provider.clone(), GatewaySettings::default()),
        Arc::new(BuiltinDocumentExtractor::new()),
        Language::En,
    );
    Fixture { bench, provider }
}

async fn fill_mandatory_diagnosis(bench: &StrategyWorkbench) {
    for (field, value) in [
        ("clientName", "Acme"),
        ("businessChallenge", "Losing share to discounters"),
        ("customerChallenge", "Price fatigue"),
        ("customerType", "Young families"),
        ("market", "Spain"),
        ("sector", "Grocery retail"),
    ] {
        bench.set_field(field, value).await.unwrap();
    }
}

#[tokio::test]
async fn test_formulation_applies_model_fields_and_selects_synthesis() {
    let blob = json!({
        "strategicAlternativeA": "Attack the discounters head on",
        "strategicAlternativeB": "Defend the loyal core",
        "strategicAlternativeC": "Own the weekday family meal",
        "culturalTension": "Families want to eat well on a budget",
        "marketOpportunity": "Retail media on the loyalty app",
        "consumerInsight": "Planning is the real pain",
        "rumeltDiagnosis": "Value perception collapsed on weekdays",
        "rumeltGuidingPolicy": "Be the easiest weekday choice",
        "behavioralJustification": "Default effect",
        "keyAssumptions": "1. App reach holds",
        "relevantMentalModels": "Focus"
    });
    let Fixture { bench, provider } =
        fixture(vec![Ok(ModelResponse::text(blob.to_string()))]);

    fill_mandatory_diagnosis(&bench).await;
    assert_eq!(bench.formulate_challenge().await.unwrap(), Autosave::Saved);

    let challenge = serde_json::to_value(bench.session().await.challenge).unwrap();
    for (key, value) in blob.as_object().unwrap() {
        assert_eq!(&challenge[key], value, "field {}", key);
    }
    assert_eq!(challenge["selectedAlternative"], "C");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_avenues_rejected_before_provider_without_kernel() {
    let Fixture { bench, provider } =
        fixture(vec![Ok(ModelResponse::text(r#"["should not be used"]"#))]);
    fill_mandatory_diagnosis(&bench).await;
    bench.set_field("rumeltDiagnosis", "").await.unwrap();
    bench.set_field("rumeltGuidingPolicy", "Be the easiest choice").await.unwrap();

    let err = bench.generate_avenues().await.unwrap_err();
    assert!(matches!(
        err,
        WorkbenchError::Gateway(GatewayError::Precondition(
            PreconditionError::ChallengeNotFormulated
        ))
    ));
    assert_eq!(err.text_key(), TextKey::ErrorChallengeNotFormulated);
    assert_eq!(provider.calls(), 0);
    assert!(bench.session().await.generated_prompts.is_empty());
}

#[tokio::test]
async fn test_sixth_image_is_refused_with_capacity_notice() {
    let Fixture { bench, .. } = fixture(vec![]);
    let uploads = (1..=6)
        .map(|i| Upload::new(format!("screen{}.png", i), vec![i as u8; 16]))
        .collect();

    let outcome = bench.add_images(uploads).await.unwrap();

    let screenshots = bench.session().await.diagnosis.screenshots;
    assert_eq!(screenshots.len(), MAX_SCREENSHOTS);
    let names: Vec<_> = screenshots.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["screen1.png", "screen2.png", "screen3.png", "screen4.png", "screen5.png"]
    );
    assert_eq!(
        outcome.notices,
        vec![IntakeNotice::ImageCapacity {
            name: "screen6.png".to_string()
        }]
    );
}

#[tokio::test]
async fn test_history_skips_corrupt_record() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let repository = KvSessionRepository::new(store.clone());

    let mut session = strata_core::session::Session::new("s1", 1_700_000_000_000);
    session.diagnosis.client_name = "Acme".to_string();
    repository.save(&session).await.unwrap();

    store
        .set(&KvSessionRepository::session_key("s2"), "{\"id\": \"s2\", \"diagnosis\": ")
        .await
        .unwrap();
    store
        .set(&KvSessionRepository::session_key("s3"), "[1, 2, 3]")
        .await
        .unwrap();

    let listed = repository.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "s1");
    assert_eq!(listed[0].last_modified, 1_700_000_000_000);
}

#[tokio::test]
async fn test_persisted_session_round_trips_through_history() {
    let Fixture { bench, .. } = fixture(vec![]);
    bench.set_field("clientName", "Acme").await.unwrap();
    let session = bench.session().await;

    let history = bench.history().await.unwrap();
    let record = history.iter().find(|r| r.id == session.id).unwrap();
    assert_eq!(record.last_modified, session.last_modified);
    assert_eq!(record.client_name, "Acme");

    bench.delete_session(&session.id).await.unwrap();
    let history = bench.history().await.unwrap();
    assert!(history.iter().all(|r| r.id != session.id));
}

#[tokio::test]
async fn test_history_sorted_most_recent_first() {
    let Fixture { bench, .. } = fixture(vec![]);
    let mut ids = Vec::new();
    for client in ["First", "Second", "Third"] {
        let session = bench.new_session().await.unwrap();
        bench.set_field("clientName", client).await.unwrap();
        ids.push(session.id);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    // Touch the oldest again so it moves to the top.
    bench.load_session(&ids[0]).await.unwrap();
    bench.set_field("market", "Spain").await.unwrap();

    let history = bench.history().await.unwrap();
    let order: Vec<_> = history.iter().map(|r| r.client_name.as_str()).collect();
    assert_eq!(order, vec!["First", "Third", "Second"]);
    assert!(history.windows(2).all(|w| w[0].last_modified >= w[1].last_modified));
}

#[tokio::test]
async fn test_edits_keep_untouched_fields_and_advance_timestamp() {
    let Fixture { bench, .. } = fixture(vec![]);
    fill_mandatory_diagnosis(&bench).await;
    bench.select_alternative(Alternative::B).await.unwrap();
    let before = bench.session().await;

    bench.set_field("barriers", "Too many choices").await.unwrap();
    let after = bench.session().await;

    assert!(after.last_modified > before.last_modified);
    assert_eq!(after.diagnosis.consumer_context.barriers, "Too many choices");
    assert_eq!(after.diagnosis.market, before.diagnosis.market);
    assert_eq!(after.diagnosis.consumer_context.involvement, before.diagnosis.consumer_context.involvement);
    assert_eq!(after.challenge, before.challenge);
    assert_eq!(after.generated_prompts, before.generated_prompts);
}

#[tokio::test]
async fn test_briefing_analysis_merges_into_editable_fields() {
    let analysis = json!({
        "sector": "Grocery retail",
        "market": "Spain",
        "productOrService": "Supermarket chain",
        "customerType": "Young families",
        "businessChallenge": "Share loss",
        "customerChallenge": "Price fatigue",
        "currentStrategyAttempt": "Price cuts",
        "consumerContext": {"involvement": "Medium Involvement", "funnelStage": "Consideration", "barriers": "Habit"}
    });
    let Fixture { bench, provider } =
        fixture(vec![Ok(ModelResponse::text(format!("```json\n{}\n```", analysis)))]);

    bench.set_field("clientName", "Acme").await.unwrap();
    bench
        .attach_briefing(Upload::new("brief.md", b"# Brief\nAcme is losing share.".to_vec()))
        .await
        .unwrap();
    bench.analyze_briefing().await.unwrap();
    assert_eq!(provider.calls(), 1);

    // The user can still override what the model deduced.
    bench.set_field("market", "Portugal").await.unwrap();

    let diagnosis = bench.session().await.diagnosis;
    assert_eq!(diagnosis.client_name, "Acme");
    assert_eq!(diagnosis.sector, "Grocery retail");
    assert_eq!(diagnosis.market, "Portugal");
    assert_eq!(diagnosis.consumer_context.barriers, "Habit");
    assert_eq!(
        diagnosis.briefing_file_content.as_deref(),
        Some("# Brief\nAcme is losing share.")
    );
}

#[tokio::test]
async fn test_transport_failure_leaves_session_unchanged() {
    let Fixture { bench, .. } =
        fixture(vec![Err(ProviderError::transport(Some(500), "internal"))]);
    fill_mandatory_diagnosis(&bench).await;
    let before = bench.session().await;

    let err = bench.formulate_challenge().await.unwrap_err();
    assert!(matches!(err, WorkbenchError::Gateway(GatewayError::Transport(_))));
    assert_eq!(err.text_key(), TextKey::ErrorGeneric);
    assert_eq!(bench.session().await, before);
}

struct BrokenExtractor;

#[async_trait]
impl DocumentExtractor for BrokenExtractor {
    async fn extract(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<String, ExtractionError> {
        Err(ExtractionError::Failed {
            reason: "truncated file".to_string(),
        })
    }
}

#[tokio::test]
async fn test_failed_extraction_still_allows_analysis() {
    let provider = StubProvider::with_responses(vec![Ok(ModelResponse::text("{}"))]);
    let repository = KvSessionRepository::new(Arc::new(MemoryKeyValueStore::new()));
    let bench = StrategyWorkbench::new(
        Arc::new(repository),
        AiGateway::new(provider.clone(), GatewaySettings::default()),
        Arc::new(BrokenExtractor),
        Language::Es,
    );

    bench.set_field("clientName", "Acme").await.unwrap();
    let outcome = bench
        .attach_briefing(Upload::new("brief.pdf", vec![0; 4]))
        .await
        .unwrap();
    assert_eq!(outcome.notices.len(), 1);

    bench.analyze_briefing().await.unwrap();
    assert_eq!(provider.calls(), 1);
    assert_eq!(
        bench.session().await.diagnosis.briefing_file_name.as_deref(),
        Some("brief.pdf")
    );
}

#[tokio::test]
async fn test_file_backed_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let open = || {
        let store = strata_infrastructure::FileKeyValueStore::new(dir.path());
        let repository = KvSessionRepository::new(Arc::new(store));
        StrategyWorkbench::new(
            Arc::new(repository),
            AiGateway::new(StubProvider::with_responses(vec![]), GatewaySettings::default()),
            Arc::new(BuiltinDocumentExtractor::new()),
            Language::En,
        )
    };

    let first = open();
    first.set_field("clientName", "Acme").await.unwrap();
    let id = first.session().await.id;
    drop(first);

    let second = open();
    let resumed = second.resume().await.unwrap();
    assert_eq!(resumed.id, id);
    assert_eq!(resumed.diagnosis.client_name, "Acme");
}
