//! Shared test helpers: a scripted provider and a small soda store.

use shopbot_core::error::ProviderError;
use shopbot_core::message::{Message, MessageToolCall};
use shopbot_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use shopbot_core::store::Product;
use shopbot_store::{CouponRule, InMemoryStore};
use std::sync::Mutex;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue; once the
/// script runs out it fails with a network error, or repeats its last entry
/// when built with [`ScriptedProvider::repeating`].
pub struct ScriptedProvider {
    responses: Vec<ProviderResponse>,
    repeat_last: bool,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            repeat_last: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![response])
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };

        let response = match self.responses.get(index) {
            Some(r) => Some(r),
            None if self.repeat_last => self.responses.last(),
            None => None,
        };
        response
            .cloned()
            .ok_or_else(|| ProviderError::Network("script exhausted".into()))
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response that only requests tool calls.
pub fn tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant("").with_tool_calls(tool_calls),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn tool_call(id: &str, name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

pub fn pack(sku: &str, price: f64, size: u32) -> Product {
    Product {
        sku: sku.into(),
        name: format!("Soda {size}-pack"),
        price,
        pack_size: Some(size),
    }
}

/// 6-pack $12, 12-pack $20, 24-pack $35; SAVE10 is 10% off, BULK5 takes $5
/// off baskets holding a 24-pack.
pub fn soda_store() -> InMemoryStore {
    InMemoryStore::new(vec![
        pack("soda-6pk", 12.0, 6),
        pack("soda-12pk", 20.0, 12),
        pack("soda-24pk", 35.0, 24),
    ])
    .with_coupon(CouponRule::percent("SAVE10", 10.0))
    .with_coupon(CouponRule::fixed("BULK5", 5.0).requiring_sku("soda-24pk"))
}
