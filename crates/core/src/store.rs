//! Store domain: catalog, basket and checkout records plus the `StoreApi` trait.
//!
//! These are pass-through records: the basket service owns all state, this
//! crate only names the shapes. Field names match the service's wire casing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ServiceError;

/// `NextOffset` value meaning the catalog has no further pages.
pub const END_OF_CATALOG: i64 = -1;

/// Largest page the service accepts.
pub const MAX_PAGE_SIZE: u32 = 50;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(rename = "SKU")]
    pub sku: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub price: f64,

    /// Units per package. Absent means the product is sold singly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_size: Option<u32>,
}

impl Product {
    pub fn units(&self) -> u32 {
        self.pack_size.unwrap_or(1).max(1)
    }
}

/// One page of `list_products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default = "end_of_catalog")]
    pub next_offset: i64,
}

fn end_of_catalog() -> i64 {
    END_OF_CATALOG
}

impl ProductPage {
    /// Offset of the next page, or `None` when this was the last one.
    pub fn next(&self) -> Option<u32> {
        u32::try_from(self.next_offset).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BasketItem {
    #[serde(rename = "SKU")]
    pub sku: String,

    pub quantity: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Basket contents as reported by `view_basket`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Basket {
    #[serde(default)]
    pub items: Vec<BasketItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,

    #[serde(default)]
    pub discount: f64,

    #[serde(default)]
    pub total: f64,
}

impl Basket {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, sku: &str) -> u32 {
        self.items
            .iter()
            .filter(|i| i.sku == sku)
            .map(|i| i.quantity)
            .sum()
    }
}

/// Response to `apply_coupon`. A zero discount means the coupon does not
/// apply to the current basket, not that the code is invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CouponApplied {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,

    #[serde(default)]
    pub discount: f64,
}

/// Response to a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    pub order_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// Acknowledgement body for basket edits; passed through untouched.
pub type Confirmation = serde_json::Map<String, serde_json::Value>;

/// The basket service of one task.
#[async_trait]
pub trait StoreApi: Send + Sync {
    async fn list_products(&self, offset: u32, limit: u32) -> Result<ProductPage, ServiceError>;

    async fn view_basket(&self) -> Result<Basket, ServiceError>;

    async fn add_product(&self, sku: &str, quantity: u32) -> Result<Confirmation, ServiceError>;

    async fn remove_item(&self, sku: &str, quantity: u32) -> Result<Confirmation, ServiceError>;

    async fn apply_coupon(&self, coupon: &str) -> Result<CouponApplied, ServiceError>;

    async fn remove_coupon(&self) -> Result<Confirmation, ServiceError>;

    async fn checkout(&self) -> Result<Order, ServiceError>;
}

/// Round a money amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_uses_store_casing() {
        let product = Product {
            sku: "soda-6pk".into(),
            name: "Soda 6-pack".into(),
            price: 12.0,
            pack_size: Some(6),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["SKU"], "soda-6pk");
        assert_eq!(json["PackSize"], 6);
        assert_eq!(json["Price"], 12.0);
    }

    #[test]
    fn missing_pack_size_means_single_unit() {
        let product: Product = serde_json::from_str(r#"{"SKU":"gum","Price":1.5}"#).unwrap();
        assert_eq!(product.units(), 1);
        assert!(product.name.is_empty());
        let json = serde_json::to_string(&product).unwrap();
        assert!(!json.contains("PackSize"));
        assert!(!json.contains("Name"));
    }

    #[test]
    fn page_end_marker() {
        let page: ProductPage =
            serde_json::from_str(r#"{"Products":[],"NextOffset":-1}"#).unwrap();
        assert_eq!(page.next(), None);

        let page: ProductPage =
            serde_json::from_str(r#"{"Products":[],"NextOffset":10}"#).unwrap();
        assert_eq!(page.next(), Some(10));

        let page: ProductPage = serde_json::from_str(r#"{"Products":[]}"#).unwrap();
        assert_eq!(page.next(), None);
    }

    #[test]
    fn basket_omits_absent_coupon() {
        let basket = Basket {
            items: vec![BasketItem { sku: "soda-6pk".into(), quantity: 3, price: None }],
            coupon: None,
            subtotal: None,
            discount: 0.0,
            total: 36.0,
        };
        let json = serde_json::to_string(&basket).unwrap();
        assert_eq!(
            json,
            r#"{"Items":[{"SKU":"soda-6pk","Quantity":3}],"Discount":0.0,"Total":36.0}"#
        );
        assert_eq!(basket.quantity_of("soda-6pk"), 3);
        assert_eq!(basket.quantity_of("soda-12pk"), 0);
    }

    #[test]
    fn cents_rounding() {
        assert_eq!(round_cents(1.0 / 3.0), 0.33);
        assert_eq!(round_cents(2.0 / 3.0), 0.67);
        assert_eq!(round_cents(35.0), 35.0);
    }
}
