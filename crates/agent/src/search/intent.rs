//! One-shot task interpretation: how many units, which SKUs, which coupons.

use serde::Deserialize;
use shopbot_core::message::Message;
use shopbot_core::provider::{Provider, ProviderRequest, Usage};
use shopbot_core::store::Product;
use shopbot_core::Error;
use tracing::{debug, warn};
use crate::prompt;

/// What the customer asked for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Intent {
    pub units: u32,
    #[serde(default)]
    pub skus: Vec<String>,
    #[serde(default)]
    pub coupons: Vec<String>,
}

impl Intent {
    /// Catalog products named by the intent, in catalog order.
    ///
    /// Unknown SKUs are dropped. When none of the named SKUs exist the whole
    /// catalog is returned.
    pub fn candidates<'a>(&self, catalog: &'a [Product]) -> Vec<&'a Product> {
        let named: Vec<&Product> = catalog
            .iter()
            .filter(|p| self.skus.iter().any(|s| s == &p.sku))
            .collect();
        if named.is_empty() {
            if !self.skus.is_empty() {
                warn!(skus = ?self.skus, "No named SKU is in the catalog, using all products");
            }
            return catalog.iter().collect();
        }
        named
    }

    /// Coupon codes with blanks and duplicates removed, order kept.
    pub fn coupon_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        for code in &self.coupons {
            let code = code.trim();
            if !code.is_empty() && !codes.iter().any(|c| c == code) {
                codes.push(code.to_string());
            }
        }
        codes
    }
}

/// Parse the model's answer, tolerating code fences and surrounding prose.
pub fn parse_intent(text: &str) -> Result<Intent, Error> {
    let start = text.find('{');
    let end = text.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => {
            return Err(Error::Internal(format!(
                "task interpretation is not a JSON object: {text}"
            )));
        }
    };
    serde_json::from_str(json)
        .map_err(|e| Error::Internal(format!("task interpretation is malformed: {e}")))
}

/// Render the catalog as one line per product for the prompt.
pub fn catalog_listing(catalog: &[Product]) -> String {
    catalog
        .iter()
        .map(|p| {
            format!(
                "{} | {} | price {} | pack of {}",
                p.sku,
                p.name,
                p.price,
                p.units()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask the model to interpret `task_text` against `catalog`.
pub async fn interpret(
    provider: &dyn Provider,
    model: &str,
    task_text: &str,
    catalog: &[Product],
) -> Result<(Intent, Usage, String), Error> {
    let request = ProviderRequest {
        model: model.to_string(),
        messages: vec![
            Message::system(prompt::INTENT_PROMPT),
            Message::user(prompt::intent_message(task_text, &catalog_listing(catalog))),
        ],
        temperature: 0.0,
        max_tokens: Some(512),
        tools: Vec::new(),
    };

    let response = provider.complete(request).await?;
    debug!(answer = %response.message.content, "Task interpretation");
    let intent = parse_intent(&response.message.content)?;
    Ok((intent, response.usage.unwrap_or_default(), response.model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn plain_json() {
        let intent = parse_intent(r#"{"units": 24, "skus": ["soda-6pk"], "coupons": ["SAVE10"]}"#).unwrap();
        assert_eq!(intent.units, 24);
        assert_eq!(intent.skus, vec!["soda-6pk"]);
        assert_eq!(intent.coupons, vec!["SAVE10"]);
    }

    #[test]
    fn fenced_json_with_prose() {
        let text = "Here you go:\n```json\n{\"units\": 12}\n```\n";
        let intent = parse_intent(text).unwrap();
        assert_eq!(intent.units, 12);
        assert!(intent.skus.is_empty());
        assert!(intent.coupons.is_empty());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_intent("I cannot help with that").is_err());
        assert!(parse_intent(r#"{"skus": []}"#).is_err());
    }

    #[test]
    fn candidates_fall_back_to_catalog() {
        let catalog = vec![pack("soda-6pk", 12.0, 6), pack("soda-12pk", 20.0, 12)];
        let intent = Intent {
            units: 12,
            skus: vec!["soda-12pk".into(), "cola".into()],
            coupons: vec![],
        };
        let picked: Vec<&str> = intent.candidates(&catalog).iter().map(|p| p.sku.as_str()).collect();
        assert_eq!(picked, vec!["soda-12pk"]);

        let unknown = Intent { skus: vec!["cola".into()], ..intent };
        assert_eq!(unknown.candidates(&catalog).len(), 2);
    }

    #[test]
    fn coupon_codes_deduplicated() {
        let intent = Intent {
            units: 1,
            skus: vec![],
            coupons: vec![" SAVE10".into(), "SAVE10".into(), "".into(), "BULK5".into()],
        };
        assert_eq!(intent.coupon_codes(), vec!["SAVE10", "BULK5"]);
    }

    #[tokio::test]
    async fn interpret_sends_catalog_and_task() {
        let provider = ScriptedProvider::new(vec![text_response(
            r#"{"units": 24, "skus": ["soda-6pk", "soda-24pk"], "coupons": ["BULK5"]}"#,
        )]);
        let catalog = vec![pack("soda-6pk", 12.0, 6), pack("soda-24pk", 35.0, 24)];

        let (intent, usage, model) = interpret(&provider, "m", "Buy 24 sodas, coupon BULK5", &catalog)
            .await
            .unwrap();
        assert_eq!(intent.units, 24);
        assert_eq!(usage.total_tokens, 15);
        assert_eq!(model, "mock-model");

        let request = &provider.requests()[0];
        assert!(request.tools.is_empty());
        assert!(request.messages[1].content.contains("soda-24pk | Soda 24-pack | price 35 | pack of 24"));
    }
}
