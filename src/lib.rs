//! Actuarial calculation substrate for a life-insurance illustration
//! engine.
//!
//! This library provides:
//! - A multi-dimensional product database keyed by (gender, class,
//!   smoking, issue age, underwriting basis, state, duration)
//! - A rate-table engine with gender/smoking blending and lookup-method
//!   resolution
//! - An interest-rate transformer converting gross declared rates into
//!   monthly net crediting rates across guaranteed/current/midpoint bases
//! - A load/charge engine producing premium, asset, specified-amount, and
//!   policy-fee loads on those same bases
//! - A facade composing all of the above per illustration cell

pub mod basic_values;
pub mod database;
pub mod enums;
pub mod error;
pub mod input;
pub mod interest;
pub mod loads;
pub mod rounding;
pub mod tables;

pub use basic_values::BasicValues;
pub use database::{DatabaseEntity, DatabaseKey, ProductDatabase};
pub use error::{CoreError, CoreResult};
pub use interest::{build_interest_rates, InterestRateBundle, InterestRateInputs};
pub use loads::{build_loads, LoadBundle, LoadInputs};
pub use rounding::RoundingRule;
pub use tables::{blended_table, ActuarialTable, BlendableTables, BlendPolicies, LookupMethod};
