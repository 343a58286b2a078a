use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Grand Exchange item identifier.
pub type ItemId = u32;

/// Latest instant-buy / instant-sell reference prices for one item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Instant-sell reference price.
    #[serde(default)]
    pub high: Option<f64>,
    /// Instant-buy reference price.
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_time: Option<i64>,
}

/// One complete fetch of every tracked item price, keyed by item id as a string.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSnapshot {
    quotes: HashMap<String, PriceQuote>,
}

impl PriceSnapshot {
    pub fn new(quotes: HashMap<String, PriceQuote>) -> Self {
        Self { quotes }
    }

    pub fn quote(&self, item_id: ItemId) -> Option<&PriceQuote> {
        self.quotes.get(&item_id.to_string())
    }

    /// Instant-sell price for `item_id`, zero when unpriced.
    pub fn sell_price(&self, item_id: ItemId) -> f64 {
        self.quote(item_id).and_then(|q| q.high).unwrap_or(0.0)
    }

    /// Instant-buy price for `item_id`, zero when unpriced.
    pub fn buy_price(&self, item_id: ItemId) -> f64 {
        self.quote(item_id).and_then(|q| q.low).unwrap_or(0.0)
    }

    /// Copy of this snapshot restricted to `item_ids`. Unknown ids are omitted.
    pub fn retain_items(&self, item_ids: &[ItemId]) -> PriceSnapshot {
        let quotes = item_ids
            .iter()
            .filter_map(|id| {
                let key = id.to_string();
                self.quotes.get(&key).map(|quote| (key, *quote))
            })
            .collect();
        Self { quotes }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceQuote)> {
        self.quotes.iter().map(|(id, quote)| (id.as_str(), quote))
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl FromIterator<(ItemId, PriceQuote)> for PriceSnapshot {
    fn from_iter<I: IntoIterator<Item = (ItemId, PriceQuote)>>(iter: I) -> Self {
        Self {
            quotes: iter
                .into_iter()
                .map(|(id, quote)| (id.to_string(), quote))
                .collect(),
        }
    }
}

/// Item descriptor from the upstream mapping endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub examine: Option<String>,
    #[serde(default)]
    pub members: Option<bool>,
    /// Grand Exchange buy limit per four hours.
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub value: Option<u64>,
    #[serde(default)]
    pub lowalch: Option<u64>,
    #[serde(default)]
    pub highalch: Option<u64>,
    #[serde(default)]
    pub icon: Option<String>,
}

pub type ItemMapping = Vec<ItemDescriptor>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
}

/// A single trainable action: buy the materials, make the item, gain the XP.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub item_id: ItemId,
    pub name: String,
    pub level: u32,
    pub xp_gained: f64,
    pub materials: Vec<Material>,
    /// False when the produced item is consumed rather than sold.
    pub resale_eligible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCatalog {
    pub skill: String,
    pub items: Vec<Recipe>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedMaterial {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub unit_cost: f64,
    pub total_cost: f64,
}

/// A recipe priced against one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedItem {
    pub item_id: ItemId,
    pub name: String,
    pub level: u32,
    pub xp_gained: f64,
    pub resale_eligible: bool,
    pub materials: Vec<CalculatedMaterial>,
    pub sell_price: f64,
    pub material_cost: f64,
    /// `sell_price - material_cost`; negative means a loss.
    pub net_profit: f64,
    /// Negative values mean the player profits while training.
    pub price_per_xp: f64,
    pub is_profit: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}
