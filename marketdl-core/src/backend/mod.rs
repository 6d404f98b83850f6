//! Reference backend collaborators: catalog providers and the local job
//! engine. Everything here sits behind the `provider` traits, so the core
//! never depends on a concrete backend.

pub mod catalog;
pub mod engine;
pub mod http;

pub use catalog::StaticCatalog;
pub use engine::LocalJobEngine;
pub use http::HttpCatalog;
