use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use meal_photo_analyzer::models::{MealImage, DEFAULT_CALORIES};
use meal_photo_analyzer::services::{
    AnalysisOrchestrator, AnalysisProvider, CloudVisionService, DeviceSidecarService,
    ProviderError, ReadinessProbe, SidecarHealthProbe,
};

fn test_image() -> MealImage {
    MealImage {
        path: Some("/tmp/meal.jpg".to_string()),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0x03],
    }
}

fn chat_completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "content": content } }
        ]
    })
}

async fn mock_sidecar_health(server: &MockServer, model_loaded: bool) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_loaded": model_loaded,
            "uptime_secs": 12
        })))
        .mount(server)
        .await;
}

fn sidecar_service(server: &MockServer) -> DeviceSidecarService {
    let probe = Arc::new(SidecarHealthProbe::new(server.uri()));
    DeviceSidecarService::with_timeout(server.uri(), probe, Duration::from_secs(5))
}

// Chatty cloud reply end-to-end: out-of-range numbers clamped, everything
// else defaulted.
#[tokio::test]
async fn cloud_reply_is_extracted_clamped_and_defaulted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(
            "Sure! {\"name\":\"Rice Bowl\",\"score\":130,\"carbs\":-5}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let cloud = Arc::new(
        CloudVisionService::new(Some("test-key".to_string()), "test-model".to_string())
            .with_endpoint(format!("{}/chat/completions", server.uri())),
    );
    let device_server = MockServer::start().await;
    mock_sidecar_health(&device_server, false).await;
    let device = Arc::new(sidecar_service(&device_server));

    let orchestrator = AnalysisOrchestrator::new(cloud, device);
    let analysis = orchestrator.analyze(&test_image(), "auto").await;

    assert_eq!(analysis.name, "Rice Bowl");
    assert_eq!(analysis.score, 100);
    assert_eq!(analysis.carbs, 0.0);
    assert_eq!(analysis.calories, DEFAULT_CALORIES);
    assert!(analysis.ingredients.is_empty());
}

#[tokio::test]
async fn cloud_prose_without_json_fails_over_to_device() {
    let cloud_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion(
            "Looks like a tasty bowl of rice with vegetables!",
        )))
        .expect(1)
        .mount(&cloud_server)
        .await;

    let device_server = MockServer::start().await;
    mock_sidecar_health(&device_server, true).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Vegetable Rice",
            "score": 68,
            "calories": 520
        })))
        .expect(1)
        .mount(&device_server)
        .await;

    let cloud = Arc::new(
        CloudVisionService::new(Some("test-key".to_string()), "test-model".to_string())
            .with_endpoint(format!("{}/chat/completions", cloud_server.uri())),
    );
    let device = Arc::new(sidecar_service(&device_server));

    let orchestrator = AnalysisOrchestrator::new(cloud, device);
    let analysis = orchestrator.analyze(&test_image(), "cloud").await;

    assert_eq!(analysis.name, "Vegetable Rice");
    assert_eq!(analysis.score, 68);
    assert_eq!(analysis.calories, 520);
}

// Readiness gate: with no model loaded, /analyze must never be hit.
// The expect(0) is verified when the mock server drops.
#[tokio::test]
async fn unready_sidecar_is_never_sent_the_analysis_post() {
    let server = MockServer::start().await;
    mock_sidecar_health(&server, false).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let service = sidecar_service(&server);
    let err = service.attempt(&test_image()).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotReady));
}

#[tokio::test]
async fn sidecar_declared_fallback_is_a_failure() {
    let server = MockServer::start().await;
    mock_sidecar_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "model ran out of memory",
            "fallback": true
        })))
        .mount(&server)
        .await;

    let service = sidecar_service(&server);
    let err = service.attempt(&test_image()).await.unwrap_err();
    assert!(matches!(err, ProviderError::UnparseableResponse(_)));
}

// Documents the intentionally loose device success bar: a numeric score
// alone is enough, a name alone is enough, neither is a failure.
#[tokio::test]
async fn sidecar_success_bar_requires_name_or_numeric_score() {
    let server = MockServer::start().await;
    mock_sidecar_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"score": 71})))
        .mount(&server)
        .await;

    let service = sidecar_service(&server);
    let payload = service.attempt(&test_image()).await.unwrap();
    assert_eq!(payload["score"], 71);

    let server = MockServer::start().await;
    mock_sidecar_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Stew"})))
        .mount(&server)
        .await;

    let payload = sidecar_service(&server).attempt(&test_image()).await.unwrap();
    assert_eq!(payload["name"], "Stew");

    // A 200 with neither field is still a failure, score-as-string included.
    let server = MockServer::start().await;
    mock_sidecar_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "score": "71"})),
        )
        .mount(&server)
        .await;

    let err = sidecar_service(&server).attempt(&test_image()).await.unwrap_err();
    assert!(matches!(err, ProviderError::UnparseableResponse(_)));
}

#[tokio::test]
async fn health_probe_requires_explicit_model_loaded() {
    // 200 with model_loaded: true
    let server = MockServer::start().await;
    mock_sidecar_health(&server, true).await;
    assert!(SidecarHealthProbe::new(server.uri()).is_ready().await);

    // 200 with model_loaded: false
    let server = MockServer::start().await;
    mock_sidecar_health(&server, false).await;
    assert!(!SidecarHealthProbe::new(server.uri()).is_ready().await);

    // 200 without the flag at all
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "starting"})))
        .mount(&server)
        .await;
    assert!(!SidecarHealthProbe::new(server.uri()).is_ready().await);

    // Server error
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    assert!(!SidecarHealthProbe::new(server.uri()).is_ready().await);

    // Nothing listening at all
    assert!(
        !SidecarHealthProbe::new("http://127.0.0.1:1".to_string())
            .is_ready()
            .await
    );
}

// Total provider failure with the real adapters: missing credential on the
// cloud side, unready sidecar on the device side. The caller still gets a
// full record, quickly.
#[tokio::test]
async fn total_failure_yields_synthetic_analysis_in_bounded_time() {
    let device_server = MockServer::start().await;
    mock_sidecar_health(&device_server, false).await;

    let cloud = Arc::new(CloudVisionService::new(None, "test-model".to_string()));
    let device = Arc::new(sidecar_service(&device_server));

    let orchestrator = AnalysisOrchestrator::new(cloud, device);
    let started = Instant::now();
    let analysis = orchestrator.analyze(&test_image(), "device").await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!analysis.name.is_empty());
    assert!((0..=100).contains(&analysis.score));
    assert!((0..=100).contains(&analysis.hydration));
    assert!(analysis.calories >= 0);
    assert!(analysis.carbs >= 0.0 && analysis.protein >= 0.0 && analysis.fats >= 0.0);
    assert!(!analysis.advice.is_empty());
}
