//! Fixtures shared by the tool tests.

use async_trait::async_trait;
use shopbot_core::error::ServiceError;
use shopbot_core::store::*;
use shopbot_store::{CouponRule, InMemoryStore};

pub(crate) fn soda_store() -> InMemoryStore {
    let pack = |sku: &str, price: f64, size: u32| Product {
        sku: sku.into(),
        name: format!("Soda {size}-pack"),
        price,
        pack_size: Some(size),
    };
    InMemoryStore::new(vec![
        pack("soda-6pk", 12.0, 6),
        pack("soda-12pk", 20.0, 12),
        pack("soda-24pk", 35.0, 24),
    ])
    .with_coupon(CouponRule::percent("SAVE10", 10.0))
    .with_coupon(CouponRule::fixed("BULK5", 5.0).requiring_sku("soda-24pk"))
}

/// A store whose every call fails at the transport level.
pub(crate) struct FailingStore;

fn refused<T>() -> Result<T, ServiceError> {
    Err(ServiceError::Network("connection refused".into()))
}

#[async_trait]
impl StoreApi for FailingStore {
    async fn list_products(&self, _offset: u32, _limit: u32) -> Result<ProductPage, ServiceError> {
        refused()
    }

    async fn view_basket(&self) -> Result<Basket, ServiceError> {
        refused()
    }

    async fn add_product(&self, _sku: &str, _quantity: u32) -> Result<Confirmation, ServiceError> {
        refused()
    }

    async fn remove_item(&self, _sku: &str, _quantity: u32) -> Result<Confirmation, ServiceError> {
        refused()
    }

    async fn apply_coupon(&self, _coupon: &str) -> Result<CouponApplied, ServiceError> {
        refused()
    }

    async fn remove_coupon(&self) -> Result<Confirmation, ServiceError> {
        refused()
    }

    async fn checkout(&self) -> Result<Order, ServiceError> {
        refused()
    }
}
