//! Titanic survival dashboard.
//!
//! Loads a cleaned passenger table and a fitted binary classifier once at
//! start-up, then serves four egui pages: an overview, dataset exploration,
//! an interactive survival prediction and model evaluation.

pub mod app;
pub mod artifacts;
pub mod classifier;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;
pub mod ui;
