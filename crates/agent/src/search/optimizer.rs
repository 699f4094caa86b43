//! Trials against the live basket: clear, fill, apply, observe.

use shopbot_core::error::{ErrorKind, ServiceError};
use shopbot_core::store::{Basket, Order, Product, StoreApi};
use tracing::{debug, info, warn};
use super::combos::Combination;

/// The observed price of one (combination, coupon) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub combination: Combination,
    pub coupon: Option<String>,
    pub discount: f64,
    pub total: f64,
}

/// Page through the whole catalog.
///
/// Stops at `NextOffset = -1`, on an empty page, or after `max_pages` pages.
pub async fn fetch_catalog(
    store: &dyn StoreApi,
    page_size: u32,
    max_pages: u32,
) -> Result<Vec<Product>, ServiceError> {
    let mut products = Vec::new();
    let mut offset = 0;

    for page_no in 1..=max_pages {
        let page = store.list_products(offset, page_size).await?;
        let fetched = page.products.len();
        products.extend(page.products);
        debug!(page = page_no, fetched, next_offset = page.next_offset, "Catalog page");

        match u32::try_from(page.next_offset) {
            Ok(next) if fetched > 0 => offset = next,
            _ => return Ok(products),
        }
    }

    warn!(max_pages, products = products.len(), "Catalog page limit reached");
    Ok(products)
}

/// Empty the basket: remove every line at its exact quantity, then drop the coupon.
pub async fn clear_basket(store: &dyn StoreApi) -> Result<(), ServiceError> {
    let basket = store.view_basket().await?;
    for item in &basket.items {
        store.remove_item(&item.sku, item.quantity).await?;
    }
    if basket.coupon.is_some() {
        store.remove_coupon().await?;
    }
    Ok(())
}

/// Put exactly `combination` (and `coupon`, if any) in the basket and return the result.
pub async fn stage(
    store: &dyn StoreApi,
    combination: &Combination,
    coupon: Option<&str>,
) -> Result<Basket, ServiceError> {
    clear_basket(store).await?;
    for line in &combination.lines {
        store.add_product(&line.sku, line.quantity).await?;
    }
    if let Some(code) = coupon {
        store.apply_coupon(code).await?;
    }
    store.view_basket().await
}

/// Price every combination with every coupon and with no coupon.
///
/// A domain error discards only that trial; anything else aborts.
pub async fn run_trials(
    store: &dyn StoreApi,
    combinations: &[Combination],
    coupons: &[String],
) -> Result<Vec<Trial>, ServiceError> {
    let options: Vec<Option<&str>> = std::iter::once(None)
        .chain(coupons.iter().map(|c| Some(c.as_str())))
        .collect();

    let mut trials = Vec::new();
    for combination in combinations {
        for coupon in &options {
            match stage(store, combination, *coupon).await {
                Ok(basket) => {
                    debug!(
                        combination = %combination,
                        coupon = coupon.unwrap_or("-"),
                        discount = basket.discount,
                        total = basket.total,
                        "Trial"
                    );
                    trials.push(Trial {
                        combination: combination.clone(),
                        coupon: coupon.map(str::to_string),
                        discount: basket.discount,
                        total: basket.total,
                    });
                }
                Err(e) if e.kind() == ErrorKind::Domain => {
                    warn!(
                        combination = %combination,
                        coupon = coupon.unwrap_or("-"),
                        error = %e,
                        "Trial rejected"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(trials)
}

/// The cheapest trial; ties keep the earliest.
pub fn cheapest(trials: &[Trial]) -> Option<&Trial> {
    trials
        .iter()
        .reduce(|best, t| if t.total < best.total { t } else { best })
}

/// Re-create the winning basket and check out.
pub async fn execute(store: &dyn StoreApi, best: &Trial) -> Result<Order, ServiceError> {
    let basket = stage(store, &best.combination, best.coupon.as_deref()).await?;
    if (basket.total - best.total).abs() > 0.005 {
        warn!(expected = best.total, actual = basket.total, "Basket total changed since trial");
    }
    let order = store.checkout().await?;
    info!(order_id = %order.order_id, total = ?order.total, "Checked out");
    Ok(order)
}
