//! Pack combinations that add up to an exact unit count.

use shopbot_core::store::{Product, round_cents};
use std::fmt;
use tracing::warn;

/// One basket line of a combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub sku: String,
    pub quantity: u32,
}

/// A multiset of packs whose units sum to the target.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub lines: Vec<Line>,
    /// Price before any coupon
    pub list_price: f64,
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .lines
            .iter()
            .map(|l| format!("{}x {}", l.quantity, l.sku))
            .collect();
        f.write_str(&parts.join(" + "))
    }
}

/// Cells of the cheapest-completion table allowed before enumeration is refused.
const MAX_TABLE_CELLS: usize = 4_000_000;

/// Search nodes expanded before enumeration is cut short.
const MAX_NODES: usize = 1_000_000;

/// Slack for comparing float prices against the current cut-off.
const EPSILON: f64 = 1e-6;

/// The `limit` cheapest combinations of `products` totalling exactly
/// `target` units, cheapest list price first.
///
/// Branch and bound over a table of the cheapest way each suffix of
/// `products` can make each unit count: a branch is dropped when it can no
/// longer reach `target`, or when even its cheapest completion costs more
/// than the worst combination kept so far.
pub fn enumerate(products: &[Product], target: u32, limit: usize) -> Vec<Combination> {
    if target == 0 || limit == 0 || products.is_empty() {
        return Vec::new();
    }

    let width = (target as usize).saturating_add(1);
    let cells = (products.len() + 1).saturating_mul(width);
    if cells > MAX_TABLE_CELLS {
        warn!(products = products.len(), target, "Search space too large, no combinations tried");
        return Vec::new();
    }

    let mut search = Search {
        products,
        width,
        cheapest: cheapest_completions(products, width),
        limit,
        counts: vec![0; products.len()],
        found: Vec::new(),
        nodes: 0,
    };
    search.visit(0, target, 0.0);

    if search.nodes >= MAX_NODES {
        warn!(
            products = products.len(),
            target,
            kept = search.found.len(),
            "Combination search cut short"
        );
    }
    search.found
}

/// `table[i * width + r]` is the cheapest list price at which
/// `products[i..]` make exactly `r` units, or infinity when they cannot.
fn cheapest_completions(products: &[Product], width: usize) -> Vec<f64> {
    let n = products.len();
    let mut table = vec![f64::INFINITY; (n + 1) * width];
    table[n * width] = 0.0;

    for i in (0..n).rev() {
        let units = products[i].units() as usize;
        let price = products[i].price;
        for r in 0..width {
            let mut best = table[(i + 1) * width + r];
            if r >= units {
                best = best.min(table[i * width + r - units] + price);
            }
            table[i * width + r] = best;
        }
    }
    table
}

struct Search<'a> {
    products: &'a [Product],
    width: usize,
    cheapest: Vec<f64>,
    limit: usize,
    counts: Vec<u32>,
    /// Kept sorted by list price, at most `limit` long
    found: Vec<Combination>,
    nodes: usize,
}

impl Search<'_> {
    fn lower_bound(&self, index: usize, remaining: u32, cost: f64) -> f64 {
        cost + self.cheapest[index * self.width + remaining as usize]
    }

    /// Whether a combination costing `price` would still be kept.
    fn admits(&self, price: f64) -> bool {
        if !price.is_finite() {
            return false;
        }
        match self.found.last() {
            Some(worst) if self.found.len() >= self.limit => price < worst.list_price - EPSILON,
            _ => true,
        }
    }

    fn visit(&mut self, index: usize, remaining: u32, cost: f64) {
        if remaining == 0 {
            self.keep(build(self.products, &self.counts));
            return;
        }
        if index == self.products.len() || self.nodes >= MAX_NODES {
            return;
        }
        if !self.admits(self.lower_bound(index, remaining, cost)) {
            return;
        }
        self.nodes += 1;

        let units = self.products[index].units();
        let price = self.products[index].price;

        // Most promising quantity first, so the cut-off tightens early
        let mut options: Vec<(u32, f64)> = (0..=remaining / units)
            .rev()
            .map(|n| {
                let spent = cost + price * f64::from(n);
                (n, self.lower_bound(index + 1, remaining - n * units, spent))
            })
            .filter(|(_, bound)| bound.is_finite())
            .collect();
        options.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (n, bound) in options {
            if !self.admits(bound) {
                break;
            }
            self.counts[index] = n;
            self.visit(index + 1, remaining - n * units, cost + price * f64::from(n));
        }
        self.counts[index] = 0;
    }

    fn keep(&mut self, combination: Combination) {
        if !self.admits(combination.list_price) {
            return;
        }
        let at = self
            .found
            .partition_point(|c| c.list_price <= combination.list_price);
        self.found.insert(at, combination);
        self.found.truncate(self.limit);
    }
}

fn build(products: &[Product], counts: &[u32]) -> Combination {
    let lines: Vec<Line> = products
        .iter()
        .zip(counts)
        .filter(|(_, n)| **n > 0)
        .map(|(p, n)| Line {
            sku: p.sku.clone(),
            quantity: *n,
        })
        .collect();
    let list_price = products
        .iter()
        .zip(counts)
        .map(|(p, n)| p.price * f64::from(*n))
        .sum();
    Combination {
        lines,
        list_price: round_cents(list_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::pack;

    fn sodas() -> Vec<Product> {
        vec![
            pack("soda-6pk", 12.0, 6),
            pack("soda-12pk", 20.0, 12),
            pack("soda-24pk", 35.0, 24),
        ]
    }

    #[test]
    fn all_ways_to_make_24() {
        let combos = enumerate(&sodas(), 24, 100);
        let rendered: Vec<String> = combos.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "1x soda-24pk",
                "2x soda-12pk",
                "2x soda-6pk + 1x soda-12pk",
                "4x soda-6pk",
            ]
        );
        assert_eq!(combos[0].list_price, 35.0);
        assert_eq!(combos[3].list_price, 48.0);
    }

    #[test]
    fn unreachable_target_yields_nothing() {
        assert!(enumerate(&sodas(), 10, 100).is_empty());
        assert!(enumerate(&sodas(), 0, 100).is_empty());
        assert!(enumerate(&[], 24, 100).is_empty());
    }

    #[test]
    fn limit_bounds_enumeration() {
        let singles = vec![pack("a", 1.0, 1), pack("b", 1.0, 1), pack("c", 1.0, 1)];
        // 3 kinds of singles make 10 units in 66 ways
        assert_eq!(enumerate(&singles, 10, 1000).len(), 66);
        assert_eq!(enumerate(&singles, 10, 7).len(), 7);
    }

    #[test]
    fn limit_keeps_the_cheapest() {
        let products = vec![pack("dear", 10.0, 1), pack("cheap", 1.0, 1)];
        let combos = enumerate(&products, 10, 1);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].to_string(), "10x cheap");
        assert_eq!(combos[0].list_price, 10.0);
    }

    #[test]
    fn capped_list_is_the_head_of_the_full_list() {
        let products = vec![
            pack("one", 1.5, 1),
            pack("two", 2.9, 2),
            pack("three", 4.0, 3),
            pack("five", 6.1, 5),
        ];
        let full = enumerate(&products, 12, 10_000);
        let capped = enumerate(&products, 12, 5);
        assert!(full.len() > 5);

        let prices = |combos: &[Combination]| combos.iter().map(|c| c.list_price).collect::<Vec<_>>();
        assert_eq!(prices(&capped), prices(&full[..5]));
        assert!(full.windows(2).all(|w| w[0].list_price <= w[1].list_price));
    }

    #[test]
    fn unreachable_target_on_wide_catalog_returns_at_once() {
        let pairs: Vec<Product> = (0..30)
            .map(|i| pack(&format!("p{i:02}"), 1.0 + f64::from(i) / 10.0, 2))
            .collect();
        assert!(enumerate(&pairs, 41, 256).is_empty());

        let combos = enumerate(&pairs, 40, 256);
        assert_eq!(combos.len(), 256);
        assert_eq!(combos[0].to_string(), "20x p00");
        assert_eq!(combos[0].list_price, 20.0);
    }

    #[test]
    fn oversized_target_is_refused() {
        assert!(enumerate(&[pack("a", 1.0, 1)], u32::MAX, 1).is_empty());
    }

    #[test]
    fn products_without_pack_size_count_as_one() {
        let mut loose = pack("gum", 0.5, 1);
        loose.pack_size = None;
        let combos = enumerate(&[loose], 3, 10);
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].lines[0].quantity, 3);
        assert_eq!(combos[0].list_price, 1.5);
    }
}
