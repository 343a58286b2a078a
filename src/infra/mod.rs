//! Upstream access, caching and the static recipe dataset.

pub mod cache;
pub mod catalog;
pub mod feed;
pub mod wiki;
