//! Gold-per-XP rankings for Old School RuneScape skills.
//!
//! Static recipe data is combined with the latest Grand Exchange prices from
//! the OSRS Wiki to work out what each training method costs (or earns) per
//! experience point.
//!
//! ```no_run
//! use buyables::{Buyables, Settings};
//!
//! # async fn run() -> buyables::Result<()> {
//! let settings = Settings::load()?;
//! let service = Buyables::from_settings(&settings)?;
//! let report = service.buyables_for_skill("herblore").await?;
//! for item in &report.items {
//!     println!("{}: {:.2} gp/xp", item.name, item.price_per_xp);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod util;

pub use app::{Buyables, BuyablesReport};
pub use config::Settings;
pub use error::{BuyablesError, Result};
pub use infra::cache::{CacheStatus, CachedPayload, PriceCache};
pub use infra::catalog::{EmbeddedCatalog, MemoryCatalog, RecipeCatalog};
pub use infra::feed::PriceFeed;
pub use infra::wiki::{PriceSource, WikiClient, WikiClientError};
