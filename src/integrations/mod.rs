// src/integrations/mod.rs
//
// External service access. Everything behind trait seams so the engine
// can run against mocks in tests.

pub mod catalog;

pub use catalog::{fetch_all, CatalogClient, HttpCatalogClient, Page, DEFAULT_PAGE_SIZE};
