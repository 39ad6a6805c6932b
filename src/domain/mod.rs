//! Core domain types and simulation logic.

pub mod series;
pub mod growth;
pub mod stocks;
pub mod house;
pub mod portfolio;
pub mod scenario;
pub mod simulation;
pub mod config_validation;
pub mod error;
