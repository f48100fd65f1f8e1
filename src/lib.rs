//! Credit-risk dashboard: loads a table of precomputed default probabilities
//! and turns it into KPIs, risk-band charts and a customer preview.

pub mod app;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod state;
pub mod ui;
