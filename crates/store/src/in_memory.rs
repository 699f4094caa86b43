//! In-memory basket service.
//!
//! Behaves like the remote store closely enough for tests and offline runs:
//! paginated catalog, a basket keyed by SKU, at most one active coupon whose
//! discount is recomputed on every change, and checkout that clears the basket.

use async_trait::async_trait;
use serde_json::json;
use shopbot_core::error::ServiceError;
use shopbot_core::store::*;
use std::sync::{Mutex, MutexGuard};

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Discount {
    /// Percentage of the subtotal, `0..=100`.
    Percent(f64),
    /// Flat amount, capped at the subtotal.
    Fixed(f64),
}

/// A coupon the simulated store accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponRule {
    pub code: String,
    pub discount: Discount,
    /// Coupon only applies when this SKU is in the basket.
    pub requires_sku: Option<String>,
    pub min_subtotal: f64,
}

impl CouponRule {
    pub fn percent(code: impl Into<String>, percent: f64) -> Self {
        Self {
            code: code.into(),
            discount: Discount::Percent(percent),
            requires_sku: None,
            min_subtotal: 0.0,
        }
    }

    pub fn fixed(code: impl Into<String>, amount: f64) -> Self {
        Self {
            code: code.into(),
            discount: Discount::Fixed(amount),
            requires_sku: None,
            min_subtotal: 0.0,
        }
    }

    pub fn requiring_sku(mut self, sku: impl Into<String>) -> Self {
        self.requires_sku = Some(sku.into());
        self
    }

    pub fn with_min_subtotal(mut self, amount: f64) -> Self {
        self.min_subtotal = amount;
        self
    }

    fn discount_for(&self, items: &[(String, u32)], subtotal: f64) -> f64 {
        if subtotal < self.min_subtotal {
            return 0.0;
        }
        if let Some(sku) = &self.requires_sku {
            if !items.iter().any(|(s, _)| s == sku) {
                return 0.0;
            }
        }
        let amount = match self.discount {
            Discount::Percent(p) => subtotal * p.clamp(0.0, 100.0) / 100.0,
            Discount::Fixed(a) => a.min(subtotal),
        };
        round_cents(amount.max(0.0))
    }
}

#[derive(Default)]
struct State {
    /// Basket lines in insertion order.
    items: Vec<(String, u32)>,
    coupon: Option<String>,
    orders: Vec<Order>,
    calls: Vec<String>,
}

pub struct InMemoryStore {
    catalog: Vec<Product>,
    coupons: Vec<CouponRule>,
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new(catalog: Vec<Product>) -> Self {
        Self {
            catalog,
            coupons: Vec::new(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_coupon(mut self, rule: CouponRule) -> Self {
        self.coupons.push(rule);
        self
    }

    /// Names of the store operations called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Orders placed so far.
    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self, operation: &str) -> MutexGuard<'_, State> {
        let mut state = self.lock();
        state.calls.push(operation.to_string());
        state
    }

    fn product(&self, sku: &str) -> Result<&Product, ServiceError> {
        self.catalog
            .iter()
            .find(|p| p.sku == sku)
            .ok_or_else(|| ServiceError::api(404, format!("product not found: {sku}")))
    }

    fn coupon(&self, code: &str) -> Option<&CouponRule> {
        self.coupons.iter().find(|c| c.code.eq_ignore_ascii_case(code))
    }

    fn price_of(&self, sku: &str) -> f64 {
        self.catalog
            .iter()
            .find(|p| p.sku == sku)
            .map(|p| p.price)
            .unwrap_or_default()
    }

    fn subtotal(&self, state: &State) -> f64 {
        round_cents(
            state
                .items
                .iter()
                .map(|(sku, qty)| self.price_of(sku) * f64::from(*qty))
                .sum(),
        )
    }

    fn discount(&self, state: &State, subtotal: f64) -> f64 {
        state
            .coupon
            .as_deref()
            .and_then(|code| self.coupon(code))
            .map(|rule| rule.discount_for(&state.items, subtotal))
            .unwrap_or_default()
    }

    fn basket(&self, state: &State) -> Basket {
        let subtotal = self.subtotal(state);
        let discount = self.discount(state, subtotal);
        Basket {
            items: state
                .items
                .iter()
                .map(|(sku, quantity)| BasketItem {
                    sku: sku.clone(),
                    quantity: *quantity,
                    price: Some(self.price_of(sku)),
                })
                .collect(),
            coupon: state.coupon.clone(),
            subtotal: Some(subtotal),
            discount,
            total: round_cents(subtotal - discount),
        }
    }
}

fn check_quantity(quantity: u32) -> Result<(), ServiceError> {
    if quantity == 0 {
        return Err(ServiceError::api(400, "quantity must be positive"));
    }
    Ok(())
}

fn confirmation(sku: &str, quantity: u32) -> Confirmation {
    let mut ack = Confirmation::new();
    ack.insert("SKU".into(), json!(sku));
    ack.insert("Quantity".into(), json!(quantity));
    ack
}

#[async_trait]
impl StoreApi for InMemoryStore {
    async fn list_products(&self, offset: u32, limit: u32) -> Result<ProductPage, ServiceError> {
        let _state = self.begin("list_products");
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(ServiceError::api(
                400,
                format!("limit must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        let start = (offset as usize).min(self.catalog.len());
        let end = (start + limit as usize).min(self.catalog.len());
        let next_offset = if end < self.catalog.len() {
            end as i64
        } else {
            END_OF_CATALOG
        };

        Ok(ProductPage {
            products: self.catalog[start..end].to_vec(),
            next_offset,
        })
    }

    async fn view_basket(&self) -> Result<Basket, ServiceError> {
        let state = self.begin("view_basket");
        Ok(self.basket(&state))
    }

    async fn add_product(&self, sku: &str, quantity: u32) -> Result<Confirmation, ServiceError> {
        let mut state = self.begin("add_product_to_basket");
        check_quantity(quantity)?;
        self.product(sku)?;

        let total = match state.items.iter_mut().find(|(s, _)| s == sku) {
            Some((_, qty)) => {
                *qty = qty.checked_add(quantity).ok_or_else(|| {
                    ServiceError::api(400, format!("quantity of {sku} would exceed {}", u32::MAX))
                })?;
                *qty
            }
            None => {
                state.items.push((sku.to_string(), quantity));
                quantity
            }
        };
        Ok(confirmation(sku, total))
    }

    async fn remove_item(&self, sku: &str, quantity: u32) -> Result<Confirmation, ServiceError> {
        let mut state = self.begin("remove_item_from_basket");
        check_quantity(quantity)?;

        let index = state
            .items
            .iter()
            .position(|(s, _)| s == sku)
            .ok_or_else(|| ServiceError::api(404, format!("item not in basket: {sku}")))?;

        let present = state.items[index].1;
        if quantity > present {
            return Err(ServiceError::api(
                400,
                format!("cannot remove {quantity} of {sku}: only {present} in basket"),
            ));
        }

        let left = present - quantity;
        if left == 0 {
            state.items.remove(index);
        } else {
            state.items[index].1 = left;
        }
        Ok(confirmation(sku, left))
    }

    async fn apply_coupon(&self, coupon: &str) -> Result<CouponApplied, ServiceError> {
        let mut state = self.begin("apply_coupon");
        let rule = self
            .coupon(coupon)
            .ok_or_else(|| ServiceError::api(404, format!("coupon not found: {coupon}")))?;

        state.coupon = Some(rule.code.clone());
        let subtotal = self.subtotal(&state);
        Ok(CouponApplied {
            coupon: Some(rule.code.clone()),
            discount: rule.discount_for(&state.items, subtotal),
        })
    }

    async fn remove_coupon(&self) -> Result<Confirmation, ServiceError> {
        let mut state = self.begin("remove_coupon");
        match state.coupon.take() {
            Some(code) => {
                let mut ack = Confirmation::new();
                ack.insert("Removed".into(), json!(code));
                Ok(ack)
            }
            None => Err(ServiceError::api(400, "no coupon applied")),
        }
    }

    async fn checkout(&self) -> Result<Order, ServiceError> {
        let mut state = self.begin("checkout_basket");
        if state.items.is_empty() {
            return Err(ServiceError::api(400, "basket is empty"));
        }

        let total = self.basket(&state).total;
        let order = Order {
            order_id: format!("ord-{}", state.orders.len() + 1),
            total: Some(total),
        };
        state.items.clear();
        state.coupon = None;
        state.orders.push(order.clone());
        Ok(order)
    }
}
