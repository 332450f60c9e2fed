//! End-to-end tests for the JSON HTTP API, served on a free port with a
//! fake generation client.

use anyhow::Result;
use async_trait::async_trait;
use flashlearn::config::{parse_config, Config};
use flashlearn::generation::GenerationClient;
use flashlearn::server::run_server_with_client;
use flashlearn_core::{
    DetailedExplanation, Difficulty, Flashcard, Generated, GenerationKind, PlainFlashcard,
    ShortSummary,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Semaphore;

// ─── Fake client ────────────────────────────────────────────────────

/// Answers every kind with canned output. Topics starting with `fail` fail.
/// When gated, each call waits for a permit first.
struct FakeClient {
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl FakeClient {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Some(gate),
        }
    }
}

#[async_trait]
impl GenerationClient for FakeClient {
    fn provider_name(&self) -> &str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-1"
    }

    async fn generate(&self, kind: GenerationKind, topic: &str) -> Result<Generated> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }
        if topic.starts_with("fail") {
            anyhow::bail!("provider rejected {}", topic);
        }
        Ok(match kind {
            GenerationKind::FlashcardWithSearch => Generated::Flashcard(Flashcard {
                topic_name: topic.to_string(),
                summary: format!("**{topic}** explained."),
                key_concepts: vec!["One".into(), "Two".into(), "Three".into()],
                example: "An example.".into(),
                tip: "A tip.".into(),
                difficulty: Difficulty::Beginner,
            }),
            GenerationKind::FlashcardPlain => Generated::PlainFlashcard(PlainFlashcard {
                topic: topic.to_string(),
                summary: "Plain.".into(),
                key_concepts: vec!["One".into()],
                example: "Example.".into(),
                tip: "Tip.".into(),
            }),
            GenerationKind::ShortSummary => Generated::ShortSummary(ShortSummary {
                summary: format!("{topic} is one thing. It does another."),
            }),
            GenerationKind::DetailedExplanation => {
                Generated::DetailedExplanation(DetailedExplanation {
                    explanation: format!("## {topic}\n\nDetails."),
                })
            }
        })
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

fn test_config(tmp: &TempDir) -> Config {
    let toml = format!(
        r#"
[generation]
provider = "ollama"

[session]
store_path = "{store}"

[export]
dir = "{exports}"

[server]
bind = "127.0.0.1:0"
"#,
        store = tmp.path().join("data/flashlearn.json").display(),
        exports = tmp.path().join("exports").display(),
    );
    parse_config(&toml).unwrap()
}

/// Start a server in the background and return its base URL.
async fn start(cfg: Config, client: Arc<dyn GenerationClient>) -> String {
    let port = find_free_port();
    let mut cfg = cfg;
    cfg.server.bind = format!("127.0.0.1:{}", port);
    tokio::spawn(async move {
        run_server_with_client(&cfg, client).await.unwrap();
    });
    wait_for_server(port).await;
    format!("http://127.0.0.1:{}", port)
}

async fn post(url: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

async fn get_json(url: &str) -> Value {
    reqwest::get(url).await.unwrap().json().await.unwrap()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;

    let body = get_json(&format!("{}/health", base)).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_generate_every_kind() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;

    let (status, body) = post(
        &format!("{}/api/generate/short-summary", base),
        json!({"topic": "Rust"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["summary"], "Rust is one thing. It does another.");

    let (_, body) = post(
        &format!("{}/api/generate/flashcard", base),
        json!({"topic": "Rust"}),
    )
    .await;
    assert_eq!(body["data"]["topicName"], "Rust");
    assert_eq!(body["data"]["difficulty"], "Beginner");

    let (_, body) = post(
        &format!("{}/api/generate/flashcard-plain", base),
        json!({"topic": "Rust"}),
    )
    .await;
    assert_eq!(body["data"]["topic"], "Rust");
    assert!(body["data"].get("difficulty").is_none());

    let (_, body) = post(
        &format!("{}/api/generate/detailed-explanation", base),
        json!({"topic": "Rust"}),
    )
    .await;
    assert_eq!(body["data"]["explanation"], "## Rust\n\nDetails.");

    // Stateless actions leave the session alone.
    let snapshot = get_json(&format!("{}/api/session", base)).await;
    assert_eq!(snapshot["historyLength"], 0);
    assert_eq!(snapshot["recentTopics"], json!([]));
}

#[tokio::test]
async fn test_generate_failures_are_results() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(FakeClient::new());
    let base = start(test_config(&tmp), client.clone()).await;

    let (status, body) = post(
        &format!("{}/api/generate/flashcard", base),
        json!({"topic": "   "}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"success": false, "error": "Topic cannot be empty."}));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);

    let (status, body) = post(
        &format!("{}/api/generate/short-summary", base),
        json!({"topic": "fail please"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to generate summary. Please try again.");
    assert!(!body["error"].as_str().unwrap().contains("provider rejected"));
}

#[tokio::test]
async fn test_unknown_kind_is_bad_request() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;

    let (status, body) = post(
        &format!("{}/api/generate/poem", base),
        json!({"topic": "Rust"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_session_flow() {
    let tmp = TempDir::new().unwrap();
    let cfg = test_config(&tmp);
    let store_path = cfg.session.store_path.clone();
    let base = start(cfg, Arc::new(FakeClient::new())).await;

    for topic in ["Kubernetes", "Docker", "Kubernetes", "Rust"] {
        let (status, body) = post(
            &format!("{}/api/session/submit", base),
            json!({"topic": topic}),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["topicName"], topic);
    }

    let snapshot = get_json(&format!("{}/api/session", base)).await;
    assert_eq!(snapshot["phase"], "idle");
    assert_eq!(snapshot["historyLength"], 3);
    assert_eq!(snapshot["cursor"], 0);
    assert_eq!(snapshot["currentCard"]["topicName"], "Rust");
    assert_eq!(snapshot["isNew"], true);
    assert_eq!(snapshot["recentTopics"], json!(["Rust", "Kubernetes", "Docker"]));

    // Persisted under the recentTopics key.
    let file: Value = serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    let stored: Vec<String> = serde_json::from_str(file["recentTopics"].as_str().unwrap()).unwrap();
    assert_eq!(stored, vec!["Rust", "Kubernetes", "Docker"]);

    let (_, snapshot) = post(
        &format!("{}/api/session/navigate", base),
        json!({"direction": "older"}),
    )
    .await;
    assert_eq!(snapshot["cursor"], 1);
    assert_eq!(snapshot["currentCard"]["topicName"], "Kubernetes");
    assert_eq!(snapshot["isNew"], false);

    let (_, snapshot) = post(
        &format!("{}/api/session/navigate", base),
        json!({"direction": "newer"}),
    )
    .await;
    let (_, snapshot_again) = post(
        &format!("{}/api/session/navigate", base),
        json!({"direction": "newer"}),
    )
    .await;
    assert_eq!(snapshot["cursor"], 0);
    assert_eq!(snapshot_again["cursor"], 0);
}

#[tokio::test]
async fn test_session_failure_leaves_state() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;

    post(&format!("{}/api/session/submit", base), json!({"topic": "Rust"})).await;
    let (status, body) = post(
        &format!("{}/api/session/submit", base),
        json!({"topic": "fail hard"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(
        body["error"],
        "Failed to generate flashcard. The topic may be too broad or unsupported. Please try again with a more specific topic."
    );
    let snapshot = get_json(&format!("{}/api/session", base)).await;
    assert_eq!(snapshot["historyLength"], 1);
    assert_eq!(snapshot["recentTopics"], json!(["Rust"]));
}

#[tokio::test]
async fn test_recent_topic_regenerates() {
    let tmp = TempDir::new().unwrap();
    let client = Arc::new(FakeClient::new());
    let base = start(test_config(&tmp), client.clone()).await;

    post(&format!("{}/api/session/submit", base), json!({"topic": "Rust"})).await;
    post(&format!("{}/api/session/submit", base), json!({"topic": "Go"})).await;

    let (status, body) = post(
        &format!("{}/api/session/recent", base),
        json!({"topic": "Rust"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["topicName"], "Rust");
    assert_eq!(client.calls.load(Ordering::SeqCst), 3);

    let snapshot = get_json(&format!("{}/api/session", base)).await;
    assert_eq!(snapshot["recentTopics"], json!(["Rust", "Go"]));

    let (status, body) = post(
        &format!("{}/api/session/recent", base),
        json!({"topic": "Zig"}),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_overlapping_submit_is_busy() {
    let tmp = TempDir::new().unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let base = start(test_config(&tmp), Arc::new(FakeClient::gated(gate.clone()))).await;

    let first_url = format!("{}/api/session/submit", base);
    let first = tokio::spawn(async move { post(&first_url, json!({"topic": "Rust"})).await });

    let mut loading = false;
    for _ in 0..50 {
        let snapshot = get_json(&format!("{}/api/session", base)).await;
        if snapshot["phase"] == "loading" {
            loading = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(loading, "first submit never entered the loading phase");

    let (status, body) = post(
        &format!("{}/api/session/submit", base),
        json!({"topic": "Go"}),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "busy");

    gate.add_permits(1);
    let (status, body) = first.await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let snapshot = get_json(&format!("{}/api/session", base)).await;
    assert_eq!(snapshot["phase"], "idle");
    assert_eq!(snapshot["recentTopics"], json!(["Rust"]));
}

#[tokio::test]
async fn test_card_exports() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;

    let resp = reqwest::get(format!("{}/api/session/card/text", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    post(
        &format!("{}/api/session/submit", base),
        json!({"topic": "Machine Learning"}),
    )
    .await;

    let text = reqwest::get(format!("{}/api/session/card/text", base))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(text.starts_with("Topic: Machine Learning\nDifficulty: Beginner\n"));
    assert!(text.contains("Machine Learning explained."));
    assert!(!text.contains("**"));

    let resp = reqwest::get(format!("{}/api/session/card/pdf", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"Machine_Learning_flashcard.pdf\""
    );
    let bytes = resp.bytes().await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_pdf_download_name_is_sanitized() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;
    post(
        &format!("{}/api/session/submit", base),
        json!({"topic": "CI/CD\u{7}Pipelines"}),
    )
    .await;

    let resp = reqwest::get(format!("{}/api/session/card/pdf", base))
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=\"CI_CD_Pipelines_flashcard.pdf\""
    );
    assert!(resp.bytes().await.unwrap().starts_with(b"%PDF"));

    let snapshot = get_json(&format!("{}/api/session", base)).await;
    assert_eq!(snapshot["historyLength"], 1);
    assert_eq!(snapshot["phase"], "idle");
}

#[tokio::test]
async fn test_recent_topics_survive_restart() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(&tmp), Arc::new(FakeClient::new())).await;
    post(&format!("{}/api/session/submit", base), json!({"topic": "Rust"})).await;
    post(&format!("{}/api/session/submit", base), json!({"topic": "Docker"})).await;

    let restarted = start(test_config(&tmp), Arc::new(FakeClient::new())).await;
    let snapshot = get_json(&format!("{}/api/session", restarted)).await;
    assert_eq!(snapshot["recentTopics"], json!(["Docker", "Rust"]));
    assert_eq!(snapshot["historyLength"], 0);
    assert_eq!(snapshot["currentCard"], Value::Null);
}
