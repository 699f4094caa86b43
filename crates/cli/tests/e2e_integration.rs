//! End-to-end tests: harness session, solver, basket service and scoring.
//!
//! The harness and store are served by wiremock (or kept in memory where the
//! test needs a stateful basket); the model is a scripted provider.

use serde_json::json;
use shopbot_agent::{LlmSolver, SearchSolver};
use shopbot_core::error::{ProviderError, ServiceError};
use shopbot_core::message::{Message, MessageToolCall};
use shopbot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use shopbot_core::store::{Product, StoreApi};
use shopbot_core::task::*;
use shopbot_runner::{RunOptions, TaskRunner};
use shopbot_store::{CouponRule, HttpBenchmark, InMemoryStore};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Scripted provider ───────────────────────────────────────────────────

struct ScriptedProvider {
    responses: Vec<ProviderResponse>,
    calls: Mutex<usize>,
}

impl ScriptedProvider {
    fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        let response = self.responses.get(*calls).cloned();
        *calls += 1;
        response.ok_or_else(|| ProviderError::Network("script exhausted".into()))
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 100,
        completion_tokens: 20,
        total_tokens: 120,
    })
}

fn text(answer: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(answer),
        usage: usage(),
        model: "mock".into(),
    }
}

fn calls(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant("").with_tool_calls(tool_calls),
        usage: usage(),
        model: "mock".into(),
    }
}

fn call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}

fn meta() -> SessionMeta {
    SessionMeta {
        benchmark: "store".into(),
        workspace: "my".into(),
        name: "Shopbot (mock)".into(),
        architecture: "agent strategy with e2e_mock".into(),
        flags: vec!["compete_accuracy".into()],
    }
}

// ── Wiremock harness ────────────────────────────────────────────────────

async fn harness(tasks: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/core/start_session"))
        .and(body_partial_json(json!({ "benchmark": "store", "flags": ["compete_accuracy"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "session_id": "ses-e2e" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/session_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session_id": "ses-e2e",
            "status": "new",
            "tasks": tasks
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/start_task"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/log_llm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    server
}

fn soda_task(id: &str) -> serde_json::Value {
    json!({ "task_id": id, "spec_id": "soda_pack", "task_text": "Buy 24 cans of soda as cheaply as possible" })
}

#[tokio::test]
async fn e2e_agent_buys_and_session_is_submitted() {
    let server = harness(json!([soda_task("tsk-1")])).await;

    Mock::given(method("POST"))
        .and(path("/store/tsk-1/list_products"))
        .and(body_json(json!({ "offset": 0, "limit": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Products": [
                { "SKU": "soda-6pk", "Name": "Soda 6-pack", "Price": 12.0, "PackSize": 6 },
                { "SKU": "soda-24pk", "Name": "Soda 24-pack", "Price": 35.0, "PackSize": 24 }
            ],
            "NextOffset": -1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/tsk-1/add_product_to_basket"))
        .and(body_json(json!({ "sku": "soda-24pk", "quantity": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "SKU": "soda-24pk", "Quantity": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/tsk-1/checkout_basket"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "OrderId": "ord-77", "Total": 35.0 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/complete_task"))
        .and(body_json(json!({ "task_id": "tsk-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eval": { "score": 1.0, "logs": "optimal basket" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/submit_session"))
        .and(body_json(json!({ "session_id": "ses-e2e" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new(vec![
        calls(vec![call("c1", "list_products", json!({}))]),
        calls(vec![call("c2", "add_product_to_basket", json!({ "sku": "soda-24pk", "quantity": 1 }))]),
        calls(vec![call("c3", "checkout_basket", json!({}))]),
        text("Bought one 24-pack for $35."),
    ]));
    let benchmark = Arc::new(HttpBenchmark::new(server.uri(), Some("erc3-key".into())));
    let runner = TaskRunner::new(benchmark, Arc::new(LlmSolver::new(provider.clone(), "mock")));

    let session = runner.open_session(&meta()).await.unwrap();
    assert_eq!(session.id, "ses-e2e");
    assert_eq!(session.tasks.len(), 1);

    let summary = runner.run(&session, &RunOptions::default()).await.unwrap();
    assert!(summary.submitted);
    assert_eq!(summary.total_score(), 1.0);
    assert_eq!(summary.outcomes[0].logs, "optimal basket");
    assert!(summary.outcomes[0].error.is_none());
    assert_eq!(provider.calls(), 4);
}

#[tokio::test]
async fn e2e_store_errors_reach_the_model_and_range_runs_stay_open() {
    let server = harness(json!([soda_task("tsk-1"), soda_task("tsk-2")])).await;

    Mock::given(method("POST"))
        .and(path("/store/tsk-2/apply_coupon"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "coupon not found: FREE" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/store/tsk-2/checkout_basket"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "basket is empty" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/complete_task"))
        .and(body_json(json!({ "task_id": "tsk-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eval": { "score": 0.0, "logs": "no order placed" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/core/submit_session"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new(vec![
        calls(vec![call("c1", "apply_coupon", json!({ "coupon": "FREE" }))]),
        text("The coupon does not exist, so I could not finish the order."),
    ]));
    let benchmark = Arc::new(HttpBenchmark::new(server.uri(), Some("erc3-key".into())));
    let runner = TaskRunner::new(benchmark, Arc::new(LlmSolver::new(provider, "mock")));

    let session = runner.open_session(&meta()).await.unwrap();
    let options = RunOptions {
        task: Some("2".into()),
        stop_on_fail: true,
    };
    let summary = runner.run(&session, &options).await.unwrap();

    assert!(!summary.submitted);
    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.outcomes[0].number, 2);
    assert!(summary.outcomes[0].failed());
    assert!(summary.to_string().contains("Session NOT submitted (ran 1/2 tasks)"));
}

// ── In-memory harness for the search strategy ───────────────────────────

/// A harness that hands every task the same in-memory store and scores
/// a task 1.0 when an order was placed at the expected total.
struct LocalBenchmark {
    store: Arc<InMemoryStore>,
    tasks: Vec<TaskInfo>,
    expected_total: f64,
    submitted: Mutex<bool>,
}

#[async_trait::async_trait]
impl Benchmark for LocalBenchmark {
    async fn start_session(&self, _meta: &SessionMeta) -> Result<SessionStarted, ServiceError> {
        Ok(SessionStarted { session_id: "ses-local".into() })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ServiceError> {
        Ok(SessionStatus {
            session_id: session_id.into(),
            status: None,
            tasks: self.tasks.clone(),
        })
    }

    async fn start_task(&self, _task: &TaskInfo) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn complete_task(&self, _task: &TaskInfo) -> Result<TaskCompletion, ServiceError> {
        let orders = self.store.orders();
        let score = match orders.last().and_then(|o| o.total) {
            Some(total) if (total - self.expected_total).abs() < 0.005 => 1.0,
            _ => 0.0,
        };
        Ok(TaskCompletion {
            eval: Some(TaskEval { score, logs: format!("{} order(s)", orders.len()) }),
        })
    }

    async fn submit_session(&self, _session_id: &str) -> Result<(), ServiceError> {
        *self.submitted.lock().unwrap() = true;
        Ok(())
    }

    async fn log_llm(&self, _log: &LlmLog) -> Result<(), ServiceError> {
        Ok(())
    }

    fn store(&self, _task: &TaskInfo) -> Arc<dyn StoreApi> {
        self.store.clone()
    }
}

fn pack(sku: &str, price: f64, size: u32) -> Product {
    Product {
        sku: sku.into(),
        name: format!("Soda {size}-pack"),
        price,
        pack_size: Some(size),
    }
}

#[tokio::test]
async fn e2e_search_strategy_finds_the_coupon_optimum() {
    // List price favours 6-packs; the coupon needs a 12-pack in the basket.
    let store = Arc::new(
        InMemoryStore::new(vec![pack("soda-6pk", 10.0, 6), pack("soda-12pk", 22.0, 12)])
            .with_coupon(CouponRule::percent("TWELVE20", 20.0).requiring_sku("soda-12pk")),
    );
    let benchmark = Arc::new(LocalBenchmark {
        store: store.clone(),
        tasks: vec![TaskInfo {
            task_id: "tsk-1".into(),
            spec_id: "coupon_flip".into(),
            task_text: "Buy 24 sodas. Coupon TWELVE20 might help.".into(),
            status: None,
        }],
        expected_total: 33.6,
        submitted: Mutex::new(false),
    });

    let provider = Arc::new(ScriptedProvider::new(vec![text(
        r#"{"units": 24, "skus": ["soda-6pk", "soda-12pk"], "coupons": ["TWELVE20"]}"#,
    )]));
    let runner = TaskRunner::new(benchmark.clone(), Arc::new(SearchSolver::new(provider.clone(), "mock")));

    let session = runner.open_session(&meta()).await.unwrap();
    let summary = runner.run(&session, &RunOptions::default()).await.unwrap();

    assert_eq!(summary.total_score(), 1.0, "{summary}");
    assert!(summary.submitted);
    assert!(*benchmark.submitted.lock().unwrap());
    assert_eq!(provider.calls(), 1);

    let orders = store.orders();
    assert_eq!(orders.len(), 1);
    assert!((orders[0].total.unwrap() - 33.6).abs() < 1e-9);
}
