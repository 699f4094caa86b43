//! Store tools for the Shopbot agent.
//!
//! Seven tools wrap the basket service: list the catalog, view and edit the
//! basket, apply or remove a coupon, and check out. Every tool reports
//! service failures as `{"error": message}` on the model side while keeping
//! the error kind for the Rust side.

pub mod basket;
pub mod catalog;
pub mod checkout;
pub mod coupon;
pub mod outcome;

#[cfg(test)]
mod testing;

use shopbot_core::store::StoreApi;
use shopbot_core::tool::ToolRegistry;
use std::sync::Arc;

pub use checkout::CHECKOUT_TOOL;

/// Create a registry with every store tool bound to `store`.
pub fn store_registry(store: Arc<dyn StoreApi>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(catalog::ListProductsTool::new(store.clone())));
    registry.register(Box::new(basket::ViewBasketTool::new(store.clone())));
    registry.register(Box::new(basket::AddProductTool::new(store.clone())));
    registry.register(Box::new(basket::RemoveItemTool::new(store.clone())));
    registry.register(Box::new(coupon::ApplyCouponTool::new(store.clone())));
    registry.register(Box::new(coupon::RemoveCouponTool::new(store.clone())));
    registry.register(Box::new(checkout::CheckoutTool::new(store)));
    registry
}
