use std::cmp::Ordering;

use time::OffsetDateTime;

use super::entities::{CalculatedItem, CalculatedMaterial, PriceSnapshot, Recipe, SkillCatalog};

/// Prices one recipe against `prices`.
///
/// Sell price uses the instant-sell (`high`) quote and materials use the
/// instant-buy (`low`) quote. Anything missing from the snapshot is priced at
/// zero so one unpriced material never blocks the rest of the ranking.
pub fn compute_metrics(
    recipe: &Recipe,
    prices: &PriceSnapshot,
    computed_at: OffsetDateTime,
) -> CalculatedItem {
    let sell_price = if recipe.resale_eligible {
        prices.sell_price(recipe.item_id)
    } else {
        0.0
    };

    let mut material_cost = 0.0;
    let materials = recipe
        .materials
        .iter()
        .map(|material| {
            let unit_cost = prices.buy_price(material.item_id);
            let total_cost = unit_cost * f64::from(material.quantity);
            material_cost += total_cost;
            CalculatedMaterial {
                item_id: material.item_id,
                name: material.name.clone(),
                quantity: material.quantity,
                unit_cost,
                total_cost,
            }
        })
        .collect();

    let net_profit = sell_price - material_cost;

    CalculatedItem {
        item_id: recipe.item_id,
        name: recipe.name.clone(),
        level: recipe.level,
        xp_gained: recipe.xp_gained,
        resale_eligible: recipe.resale_eligible,
        materials,
        sell_price,
        material_cost,
        net_profit,
        price_per_xp: price_per_xp(recipe, sell_price, material_cost),
        is_profit: net_profit > 0.0,
        last_updated: computed_at,
    }
}

fn price_per_xp(recipe: &Recipe, sell_price: f64, material_cost: f64) -> f64 {
    if recipe.xp_gained <= 0.0 {
        return 0.0;
    }

    if recipe.resale_eligible {
        // Same as -net_profit / xp without producing -0.0 on break-even.
        (material_cost - sell_price) / recipe.xp_gained
    } else {
        material_cost / recipe.xp_gained
    }
}

/// Sorts cheapest-per-XP first. Equal ratios keep catalog order.
pub fn rank_items(items: &mut [CalculatedItem]) {
    items.sort_by(|a, b| {
        a.price_per_xp
            .partial_cmp(&b.price_per_xp)
            .unwrap_or(Ordering::Equal)
    });
}

/// Prices and ranks every recipe in `catalog`.
pub fn evaluate_catalog(
    catalog: &SkillCatalog,
    prices: &PriceSnapshot,
    computed_at: OffsetDateTime,
) -> Vec<CalculatedItem> {
    let mut items: Vec<CalculatedItem> = catalog
        .items
        .iter()
        .map(|recipe| compute_metrics(recipe, prices, computed_at))
        .collect();
    rank_items(&mut items);
    items
}
