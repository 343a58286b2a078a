//! Price data, recipes and the gp/xp calculation.

pub mod entities;
pub mod evaluation;

pub use entities::{
    CalculatedItem, CalculatedMaterial, ItemDescriptor, ItemId, ItemMapping, Material,
    PriceQuote, PriceSnapshot, Recipe, SkillCatalog,
};
pub use evaluation::{compute_metrics, evaluate_catalog, rank_items};
