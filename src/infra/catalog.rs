//! Static per-skill recipe definitions.
//!
//! The shipped dataset lives in `data/skills/<skill>.json` and is embedded
//! into the binary. Each file looks like:
//!
//! ```json
//! { "resaleEligible": true,
//!   "items": [ { "itemId": 379, "name": "Lobster", "level": 40, "xpGained": 120,
//!                "materials": [ { "itemId": 377, "name": "Raw lobster", "quantity": 1 } ] } ] }
//! ```
//!
//! `resaleEligible` defaults to `true` and may be overridden per item.

use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::domain::{ItemId, Material, Recipe, SkillCatalog};
use crate::error::{BuyablesError, Result};

/// Supported skills, in display order.
pub const AVAILABLE_SKILLS: [&str; 5] = ["herblore", "prayer", "cooking", "crafting", "smithing"];

#[derive(RustEmbed)]
#[folder = "data/skills"]
struct SkillFiles;

/// Read-only source of skill recipe lists.
pub trait RecipeCatalog: Send + Sync {
    /// Every skill this catalog can load, lower-case.
    fn skills(&self) -> Vec<String>;

    /// Case-insensitive lookup of one skill's recipes.
    fn load_skill(&self, name: &str) -> Result<SkillCatalog>;
}

pub fn normalize_skill(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The dataset compiled into the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedCatalog;

impl RecipeCatalog for EmbeddedCatalog {
    fn skills(&self) -> Vec<String> {
        AVAILABLE_SKILLS.iter().map(|s| s.to_string()).collect()
    }

    fn load_skill(&self, name: &str) -> Result<SkillCatalog> {
        let skill = normalize_skill(name);
        if !AVAILABLE_SKILLS.contains(&skill.as_str()) {
            return Err(BuyablesError::SkillNotFound(skill));
        }
        let file = SkillFiles::get(&format!("{skill}.json"))
            .ok_or_else(|| BuyablesError::SkillNotFound(skill.clone()))?;
        parse_skill(&skill, &file.data)
    }
}

/// Catalog held entirely in memory, for custom datasets.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    skills: Vec<SkillCatalog>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a skill parsed from the JSON file format.
    pub fn with_skill_json(mut self, skill: &str, json: &str) -> Result<Self> {
        let catalog = parse_skill(&normalize_skill(skill), json.as_bytes())?;
        self.insert(catalog);
        Ok(self)
    }

    pub fn insert(&mut self, catalog: SkillCatalog) {
        match self.skills.iter_mut().find(|c| c.skill == catalog.skill) {
            Some(existing) => *existing = catalog,
            None => self.skills.push(catalog),
        }
    }
}

impl RecipeCatalog for MemoryCatalog {
    fn skills(&self) -> Vec<String> {
        self.skills.iter().map(|c| c.skill.clone()).collect()
    }

    fn load_skill(&self, name: &str) -> Result<SkillCatalog> {
        let skill = normalize_skill(name);
        self.skills
            .iter()
            .find(|c| c.skill == skill)
            .cloned()
            .ok_or(BuyablesError::SkillNotFound(skill))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkillFileDto {
    #[serde(default = "resale_by_default")]
    resale_eligible: bool,
    items: Vec<RecipeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDto {
    item_id: ItemId,
    name: String,
    #[serde(default)]
    level: u32,
    xp_gained: f64,
    #[serde(default)]
    materials: Vec<MaterialDto>,
    #[serde(default)]
    resale_eligible: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDto {
    item_id: ItemId,
    #[serde(default)]
    name: String,
    quantity: u32,
}

fn resale_by_default() -> bool {
    true
}

impl From<MaterialDto> for Material {
    fn from(dto: MaterialDto) -> Self {
        Self {
            item_id: dto.item_id,
            name: dto.name,
            quantity: dto.quantity,
        }
    }
}

/// Parses one skill file and checks the recipe invariants.
pub fn parse_skill(skill: &str, raw: &[u8]) -> Result<SkillCatalog> {
    let corrupt = |reason: String| BuyablesError::DataCorrupt {
        skill: skill.to_string(),
        reason,
    };

    let file: SkillFileDto = serde_json::from_slice(raw).map_err(|e| corrupt(e.to_string()))?;
    let mut items = Vec::with_capacity(file.items.len());

    for dto in file.items {
        if !dto.xp_gained.is_finite() || dto.xp_gained < 0.0 {
            return Err(corrupt(format!(
                "{} ({}) has invalid xpGained {}",
                dto.name, dto.item_id, dto.xp_gained
            )));
        }
        if let Some(material) = dto.materials.iter().find(|m| m.quantity == 0) {
            return Err(corrupt(format!(
                "{} ({}) lists material {} with zero quantity",
                dto.name, dto.item_id, material.item_id
            )));
        }

        items.push(Recipe {
            item_id: dto.item_id,
            name: dto.name,
            level: dto.level,
            xp_gained: dto.xp_gained,
            materials: dto.materials.into_iter().map(Material::from).collect(),
            resale_eligible: dto.resale_eligible.unwrap_or(file.resale_eligible),
        });
    }

    Ok(SkillCatalog {
        skill: skill.to_string(),
        items,
    })
}
