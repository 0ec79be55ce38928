//! Closed enumerations shared across the database, rate-table, interest, and
//! load components.

use serde::{Deserialize, Serialize};

use crate::database::FromF64Exact;
use crate::error::CoreError;

/// Insured's gender, as bound into a product-database lookup index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Unisex,
}

/// Smoking classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SmokingClass {
    Smoker,
    Nonsmoker,
    Unismoke,
}

/// Underwriting class (rate class), distinct from underwriting basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnderwritingClass {
    Preferred,
    Standard,
    Rated,
    Ultrapreferred,
}

/// How the insured was underwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnderwritingBasis {
    Medical,
    Paramedical,
    Nonmedical,
    Simplified,
    Guaranteed,
}

/// Jurisdiction of issue; ordinal 0..53 including reserved placeholders,
/// matching the source's 53-state axis (the 50 states, DC, Puerto Rico, and
/// one placeholder for unassigned codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State(pub u8);

impl State {
    pub const MAX_CARDINALITY: usize = 53;

    pub fn new(ordinal: u8) -> Result<Self, CoreError> {
        if (ordinal as usize) < Self::MAX_CARDINALITY {
            Ok(Self(ordinal))
        } else {
            Err(CoreError::domain(format!(
                "state ordinal {ordinal} out of range [0, {})",
                Self::MAX_CARDINALITY
            )))
        }
    }
}

/// Assumption basis under which a rate or load is projected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    Guaranteed,
    Current,
    Midpoint,
}

impl Basis {
    pub const ALL: [Basis; 3] = [Basis::Guaranteed, Basis::Current, Basis::Midpoint];
}

/// Separate-account illustrative basis: full declared rate, half, or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SepAcctBasis {
    Full,
    Zero,
    Half,
}

impl SepAcctBasis {
    pub const ALL: [SepAcctBasis; 3] = [SepAcctBasis::Full, SepAcctBasis::Zero, SepAcctBasis::Half];
}

/// Whether a rate vector is expressed per year or per month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatePeriod {
    Annual,
    Monthly,
}

/// How a gross rate is converted to a net rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadMethod {
    EffectiveAnnual,
    NominalDaily,
}

/// How a rounding rule maps a raw double onto a representable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundingStyle {
    NotAtAll,
    ToNearest,
    Upward,
    Downward,
}

/// Policy governing whether a rate table may be blended across gender or
/// smoking axes using input fractions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendPolicy {
    CannotBlend,
    CanBlend,
    MustBlend,
}

/// Whether extra separate-account compensation is routed into the net
/// interest spread (C5) or into the monthly separate-account load (C6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetChargeType {
    Spread,
    Load,
}

/// Whether the declared general-account rate is a credited rate (spreads
/// are zero) or an earned rate (spreads come from `CurrIntSpread`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenAcctRateType {
    Credited,
    Earned,
}

/// Whether the declared separate-account rate is gross or net of charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SepAcctRateType {
    Gross,
    Net,
}

/// Database-coded enumerations are stored as an integer ordinal (mirroring
/// the source's `mc_enum`), so `query_scalar` can read them exactly like
/// any other scalar entity.
macro_rules! impl_from_f64_exact_enum {
    ($t:ty { $($variant:ident = $ord:expr),* $(,)? }) => {
        impl FromF64Exact for $t {
            fn from_f64_exact(value: f64) -> Result<Self, CoreError> {
                let ordinal = u8::from_f64_exact(value)?;
                match ordinal {
                    $($ord => Ok(<$t>::$variant),)*
                    other => Err(CoreError::Domain(format!(
                        "{other} is not a valid ordinal for {}",
                        stringify!($t)
                    ))),
                }
            }
        }
    };
}

impl_from_f64_exact_enum!(SpreadMethod { EffectiveAnnual = 0, NominalDaily = 1 });
impl_from_f64_exact_enum!(AssetChargeType { Spread = 0, Load = 1 });
impl_from_f64_exact_enum!(GenAcctRateType { Credited = 0, Earned = 1 });
impl_from_f64_exact_enum!(SepAcctRateType { Gross = 0, Net = 1 });

/// A bound 7-axis lookup index: (gender, class, smoking, issue_age,
/// uw_basis, state, duration). `duration` is optional because many
/// operations resolve only the first six axes and let duration vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisTuple {
    pub gender: Gender,
    pub class: UnderwritingClass,
    pub smoking: SmokingClass,
    pub issue_age: u8,
    pub uw_basis: UnderwritingBasis,
    pub state: State,
    pub duration: Option<u16>,
}

impl AxisTuple {
    pub const MAX_ISSUE_AGE: u8 = 100;
    pub const METHUSELAH_LIMIT: u16 = 969;

    pub fn new(
        gender: Gender,
        class: UnderwritingClass,
        smoking: SmokingClass,
        issue_age: u8,
        uw_basis: UnderwritingBasis,
        state: State,
    ) -> Result<Self, CoreError> {
        if issue_age as u16 >= Self::MAX_ISSUE_AGE as u16 {
            return Err(CoreError::domain(format!(
                "issue age {issue_age} out of range [0, {})",
                Self::MAX_ISSUE_AGE
            )));
        }
        Ok(Self {
            gender,
            class,
            smoking,
            issue_age,
            uw_basis,
            state,
            duration: None,
        })
    }

    /// Return a copy bound to a specific duration, validated against the
    /// Methuselah limit.
    pub fn with_duration(&self, duration: u16) -> Result<Self, CoreError> {
        if duration >= Self::METHUSELAH_LIMIT {
            return Err(CoreError::domain(format!(
                "duration {duration} exceeds Methuselah limit {}",
                Self::METHUSELAH_LIMIT
            )));
        }
        let mut copy = *self;
        copy.duration = Some(duration);
        Ok(copy)
    }

    /// Return a copy with a different issue age, leaving the other axes
    /// untouched. Used by `ProductDatabase::with_issue_age`.
    pub fn with_issue_age(&self, issue_age: u8) -> Result<Self, CoreError> {
        if issue_age as u16 >= Self::MAX_ISSUE_AGE as u16 {
            return Err(CoreError::domain(format!(
                "issue age {issue_age} out of range [0, {})",
                Self::MAX_ISSUE_AGE
            )));
        }
        let mut copy = *self;
        copy.issue_age = issue_age;
        copy.duration = None;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_rejects_out_of_range() {
        assert!(State::new(52).is_ok());
        assert!(State::new(53).is_err());
    }

    #[test]
    fn axis_tuple_rejects_issue_age_at_limit() {
        let state = State::new(0).unwrap();
        assert!(AxisTuple::new(
            Gender::Male,
            UnderwritingClass::Standard,
            SmokingClass::Nonsmoker,
            100,
            UnderwritingBasis::Medical,
            state,
        )
        .is_err());
        assert!(AxisTuple::new(
            Gender::Male,
            UnderwritingClass::Standard,
            SmokingClass::Nonsmoker,
            99,
            UnderwritingBasis::Medical,
            state,
        )
        .is_ok());
    }

    #[test]
    fn axis_tuple_rejects_duration_beyond_methuselah() {
        let state = State::new(0).unwrap();
        let axes = AxisTuple::new(
            Gender::Male,
            UnderwritingClass::Standard,
            SmokingClass::Nonsmoker,
            35,
            UnderwritingBasis::Medical,
            state,
        )
        .unwrap();
        assert!(axes.with_duration(968).is_ok());
        assert!(axes.with_duration(969).is_err());
    }
}
