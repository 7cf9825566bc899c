//! Household finance simulation library
//!
//! This crate simulates the year-by-year finances of a multi-person
//! household over a multi-decade horizon. It supports:
//! - Multiple account types (Bank, Pre-Tax, Roth, HSA, Brokerage)
//! - Revolving and amortized debt with minimum-payment rules
//! - Priority-ordered payment resolution with per-draw tax side effects
//! - Progressive federal brackets, flat state tax, payroll tax, penalties
//! - Required Minimum Distribution (RMD) enforcement
//! - An external action seam for decision agents
//!
//! # Builder DSL
//!
//! Use the fluent builder API for ergonomic scenario setup:
//!
//! ```ignore
//! use lifesim_core::config::{AccountBuilder, JobBuilder, PersonBuilder, ScenarioBuilder};
//! use lifesim_core::simulation::simulate;
//!
//! let config = ScenarioBuilder::new()
//!     .start_year(2025)
//!     .years(40)
//!     .person(
//!         PersonBuilder::new("Avery", 40)
//!             .retirement_age(65.0)
//!             .account(AccountBuilder::bank("Checking").balance(25_000.0))
//!             .account(AccountBuilder::pretax_401k("Work 401k")
//!                 .balance(150_000.0)
//!                 .growth(0.06))
//!             .job(JobBuilder::new("Engineer")
//!                 .salary(120_000.0)
//!                 .raises(0.03)
//!                 .retirement("Work 401k", 0.10, 0.0, 0.5))
//!             .spending(45_000.0, 0.02),
//!     )
//!     .build()?;
//!
//! let result = simulate(&config, 42)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod actions;
pub mod context;
pub mod error;
pub mod payment;
pub mod simulation;
pub mod simulation_state;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{
    AccountBuilder, DebtBuilder, JobBuilder, PersonBuilder, PolicyBuilder, ScenarioBuilder,
    ScenarioConfig, ShortfallPolicy,
};
pub use simulation::{Engine, batch_simulate, simulate};
