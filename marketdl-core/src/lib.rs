//! MarketDL Core — catalog, search, selection, and download-job orchestration.
//!
//! This crate contains the heart of the download subsystem:
//! - Domain types (instruments, sources, markets, data types, jobs)
//! - Catalog index with market filtering and fixed-size pagination
//! - Debounced, tiered search ranking
//! - Timeframe availability resolution across sources
//! - Insertion-ordered selection set
//! - Job coordinator with subscribe-before-submit progress streaming
//! - Browse → configure → progress workflow state machine

pub mod availability;
pub mod backend;
pub mod catalog;
pub mod coordinator;
pub mod domain;
pub mod provider;
pub mod request;
pub mod search;
pub mod selection;
pub mod workflow;
