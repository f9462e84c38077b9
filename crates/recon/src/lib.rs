//! `pricecomp-recon` - product matching and price aggregation across wholesalers.
//!
//! Pure engine crate: receives pre-loaded sources, returns one canonical
//! product per distinct code with per-source prices, best price and spread.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod matcher;
pub mod model;
pub mod similarity;

pub use aggregate::aggregate;
pub use config::{CandidateStrategy, ColumnMapping, FuzzyPolicy, MatchConfig, ReconConfig, ReusePolicy};
pub use engine::{reconcile, run, validate_sources};
pub use error::ReconError;
pub use model::{CanonicalProduct, ComparisonRow, ReconResult, SlotMatch, Source, SourceRecord};
