//! `stocktake-recon`: RFID stocktake reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables and scanner readings,
//! returns the missing items, exception reports and summary counters.
//! No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod model;
pub mod reconcile;
pub mod report;

pub use config::ReconConfig;
pub use engine::run;
pub use error::ReconError;
pub use matcher::TagGrammar;
pub use model::{Cell, ReconInput, ReconReport, Table, TableSet, TagId};
