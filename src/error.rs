//! Error taxonomy for the actuarial calculation substrate.
//!
//! Every fallible operation in this crate returns one of the five kinds
//! below. None of them are retried internally; a caller decides whether a
//! failed cell aborts the run or is skipped.

use thiserror::Error;

use crate::database::DatabaseKey;

/// The single error type returned by every core component.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing entity, uninitialized rounding rule, scalar query of a vector
    /// entity, honeymoon on an earned-rate product, midpoint sep-acct
    /// requested, duration index out of range.
    #[error("config error: {0}")]
    Config(String),

    /// An axis index component fell outside its valid range, or a numeric
    /// result was non-finite.
    #[error("domain error: {0}")]
    Domain(String),

    /// A value could not be represented exactly in the requested type.
    #[error("numeric error: cannot represent {value} exactly as the requested type")]
    Numeric { value: f64 },

    /// A rate table was missing, corrupt, or incompatible with the cell.
    #[error("data error: {0}")]
    Data(String),

    /// A feature is declared by the spec but intentionally unimplemented.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl CoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn missing_key(key: DatabaseKey) -> Self {
        Self::Config(format!("no entity bound for key {key:?}"))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
