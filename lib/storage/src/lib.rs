pub mod loader;
pub mod manager;

pub use loader::{load_catalog, parse_catalog, price_from_value, RawItem};
pub use manager::CatalogManager;
