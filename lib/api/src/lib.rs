pub mod rest;

pub use rest::{RestApi, NO_RECOMMENDATIONS_MESSAGE};
