//! HTTP client for the remote basket service of one task.
//!
//! Every operation is `POST {base}/store/{task_id}/{operation}` with a JSON
//! body; errors come back as non-2xx responses carrying `detail`.

use async_trait::async_trait;
use serde_json::json;
use shopbot_core::error::ServiceError;
use shopbot_core::store::*;
use crate::client::ServiceClient;

pub struct HttpStoreClient {
    client: ServiceClient,
    task_id: String,
}

impl HttpStoreClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, task_id: impl Into<String>) -> Self {
        Self::from_client(ServiceClient::new(base_url, api_key), task_id)
    }

    pub(crate) fn from_client(client: ServiceClient, task_id: impl Into<String>) -> Self {
        Self {
            client,
            task_id: task_id.into(),
        }
    }

    fn path(&self, operation: &str) -> String {
        format!("store/{}/{operation}", self.task_id)
    }
}

#[async_trait]
impl StoreApi for HttpStoreClient {
    async fn list_products(&self, offset: u32, limit: u32) -> Result<ProductPage, ServiceError> {
        self.client
            .post(&self.path("list_products"), &json!({ "offset": offset, "limit": limit }))
            .await
    }

    async fn view_basket(&self) -> Result<Basket, ServiceError> {
        self.client.post(&self.path("view_basket"), &json!({})).await
    }

    async fn add_product(&self, sku: &str, quantity: u32) -> Result<Confirmation, ServiceError> {
        self.client
            .post(&self.path("add_product_to_basket"), &json!({ "sku": sku, "quantity": quantity }))
            .await
    }

    async fn remove_item(&self, sku: &str, quantity: u32) -> Result<Confirmation, ServiceError> {
        self.client
            .post(&self.path("remove_item_from_basket"), &json!({ "sku": sku, "quantity": quantity }))
            .await
    }

    async fn apply_coupon(&self, coupon: &str) -> Result<CouponApplied, ServiceError> {
        self.client
            .post(&self.path("apply_coupon"), &json!({ "coupon": coupon }))
            .await
    }

    async fn remove_coupon(&self) -> Result<Confirmation, ServiceError> {
        self.client.post(&self.path("remove_coupon"), &json!({})).await
    }

    async fn checkout(&self) -> Result<Order, ServiceError> {
        self.client.post(&self.path("checkout_basket"), &json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopbot_core::ErrorKind;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_products_posts_paging_arguments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/store/task-1/list_products"))
            .and(header("Authorization", "Bearer key"))
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

        let store = HttpStoreClient::new(server.uri(), Some("key".into()), "task-1");
        let page = store.list_products(0, 10).await.unwrap();
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.products[1].units(), 24);
        assert_eq!(page.next(), None);
    }

    #[tokio::test]
    async fn domain_error_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/store/task-1/checkout_basket"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "detail": "basket is empty" })),
            )
            .mount(&server)
            .await;

        let store = HttpStoreClient::new(server.uri(), None, "task-1");
        let err = store.checkout().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(err.to_string(), "basket is empty");
    }

    #[tokio::test]
    async fn empty_ack_body_is_an_empty_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/store/task-1/remove_coupon"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let store = HttpStoreClient::new(server.uri(), None, "task-1");
        assert!(store.remove_coupon().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbage_body_is_internal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/store/task-1/view_basket"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let store = HttpStoreClient::new(server.uri(), None, "task-1");
        let err = store.view_basket().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn unreachable_service_is_internal() {
        let store = HttpStoreClient::new("http://127.0.0.1:9", None, "task-1");
        let err = store.view_basket().await.unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)));
    }
}
