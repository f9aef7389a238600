//! Data layer: passenger types, loading, and aggregate statistics.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RawRecord rows
//!   └──────────┘
//!        │  validate every row
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<PassengerRecord>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  stats    │  overview, group-bys, histograms, correlation
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod stats;
pub mod synthetic;
