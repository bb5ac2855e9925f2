//! REST operations authenticated by API key.
//!
//! Installations differ in which paths and encodings they accept, so every
//! operation is an ordered [`StrategyPipeline`](mispctl_fetch::StrategyPipeline):
//! the first candidate that qualifies wins and transport faults abort.
//!
//! - [`list`] - feed listing and single-feed lookup
//! - [`enable`] - the five-stage enable ladder
//! - [`bulk`] - fetch-all and cache-all triggers

pub mod bulk;
pub mod enable;
pub mod list;
