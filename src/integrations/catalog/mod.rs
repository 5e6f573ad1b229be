pub mod client;
pub mod pagination;

pub use client::{CatalogClient, HttpCatalogClient, Page};
pub use pagination::{fetch_all, DEFAULT_PAGE_SIZE};

#[cfg(test)]
pub use client::MockCatalogClient;
