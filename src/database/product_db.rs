//! Product database (C3): a keyed collection of database entities bound to
//! a lookup index, queried by the facade and by C5/C6.
//!
//! Grounded on `product_database` in the original source: construction
//! binds a six-axis index (gender, class, smoking, issue_age, uw_basis,
//! state) derived from the input record, and `length_`/`maturity_age_`
//! are the only fields that may change after construction (the policy
//! length override named in spec §4.3).

use std::collections::HashMap;

use crate::database::entity::DatabaseEntity;
use crate::database::keys::DatabaseKey;
use crate::enums::AxisTuple;
use crate::error::CoreError;

/// Exact-preservation numeric cast used by `query_scalar`, mirroring the
/// source's `bourn_cast`: the conversion must round-trip without loss.
pub trait FromF64Exact: Sized {
    fn from_f64_exact(value: f64) -> Result<Self, CoreError>;
}

macro_rules! impl_from_f64_exact_int {
    ($($t:ty),*) => {
        $(
            impl FromF64Exact for $t {
                fn from_f64_exact(value: f64) -> Result<Self, CoreError> {
                    if !value.is_finite() {
                        return Err(CoreError::Numeric { value });
                    }
                    let rounded = value.round();
                    if (rounded - value).abs() > 0.0 {
                        return Err(CoreError::Numeric { value });
                    }
                    if rounded < <$t>::MIN as f64 || rounded > <$t>::MAX as f64 {
                        return Err(CoreError::Numeric { value });
                    }
                    Ok(rounded as $t)
                }
            }
        )*
    };
}

impl_from_f64_exact_int!(i32, i64, u32, u64, u8, u16, usize);

impl FromF64Exact for f64 {
    fn from_f64_exact(value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() {
            return Err(CoreError::Numeric { value });
        }
        Ok(value)
    }
}

impl FromF64Exact for bool {
    fn from_f64_exact(value: f64) -> Result<Self, CoreError> {
        if value == 0.0 {
            Ok(false)
        } else if value == 1.0 {
            Ok(true)
        } else {
            Err(CoreError::Numeric { value })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductDatabase {
    entities: HashMap<DatabaseKey, DatabaseEntity>,
    index: AxisTuple,
    policy_length: usize,
    policy_length_overridden: bool,
}

impl ProductDatabase {
    /// Bind a loaded entity set to a lookup index and the product's default
    /// maturity-derived policy length.
    pub fn new(
        entities: HashMap<DatabaseKey, DatabaseEntity>,
        index: AxisTuple,
    ) -> Result<Self, CoreError> {
        let mut db = Self {
            entities,
            index,
            policy_length: 0,
            policy_length_overridden: false,
        };
        let maturity_age: u32 = db.query_scalar(DatabaseKey::DB_MaturityAge)?;
        db.policy_length = maturity_age.saturating_sub(index.issue_age as u32) as usize;
        Ok(db)
    }

    pub fn length(&self) -> usize {
        self.policy_length
    }

    pub fn index(&self) -> &AxisTuple {
        &self.index
    }

    pub fn entity_from_key(&self, key: DatabaseKey) -> Result<&DatabaseEntity, CoreError> {
        self.entities.get(&key).ok_or_else(|| CoreError::missing_key(key))
    }

    /// Query a scalar value, requiring the entity's duration axis to have
    /// length 1, and coerce it to `T` with exact value preservation.
    pub fn query_scalar<T: FromF64Exact>(&self, key: DatabaseKey) -> Result<T, CoreError> {
        let entity = self.entity_from_key(key)?;
        if entity.axis_length(6) != 1 {
            return Err(CoreError::domain(format!(
                "key {key} is duration-varying; query_vector is required"
            )));
        }
        let raw = entity.lookup(&self.index)?;
        T::from_f64_exact(raw)
    }

    pub fn query_into<T: FromF64Exact>(&self, key: DatabaseKey, dst: &mut T) -> Result<(), CoreError>
    where
        T: Copy,
    {
        *dst = self.query_scalar(key)?;
        Ok(())
    }

    /// Query a duration-varying vector of length `policy_length`, resolving
    /// the non-duration axes from `alt_index` if given, else the bound
    /// index.
    pub fn query_vector(
        &self,
        key: DatabaseKey,
        alt_index: Option<&AxisTuple>,
    ) -> Result<Vec<f64>, CoreError> {
        let entity = self.entity_from_key(key)?;
        let index = alt_index.unwrap_or(&self.index);
        entity.lookup_vector(index, self.policy_length)
    }

    pub fn query_into_vector(&self, key: DatabaseKey, dst: &mut Vec<f64>) -> Result<(), CoreError> {
        *dst = self.query_vector(key, None)?;
        Ok(())
    }

    pub fn are_equivalent(&self, a: DatabaseKey, b: DatabaseKey) -> Result<bool, CoreError> {
        let ea = self.entity_from_key(a)?;
        let eb = self.entity_from_key(b)?;
        Ok(DatabaseEntity::equivalent(ea, eb))
    }

    pub fn varies_by_state(&self, key: DatabaseKey) -> Result<bool, CoreError> {
        Ok(self.entity_from_key(key)?.varies_by_state())
    }

    /// Rebind the lookup index to a different issue age, recomputing
    /// `policy_length` as `maturity_age - issue_age`. Returns a new
    /// `ProductDatabase`; does not mutate `self`.
    pub fn with_issue_age(&self, issue_age: u8) -> Result<Self, CoreError> {
        let new_index = self.index.with_issue_age(issue_age)?;
        let mut db = self.clone();
        db.index = new_index;
        let maturity_age: u32 = db.query_scalar(DatabaseKey::DB_MaturityAge)?;
        db.policy_length = maturity_age.saturating_sub(issue_age as u32) as usize;
        db.policy_length_overridden = false;
        Ok(db)
    }

    /// Override `policy_length` once (e.g. a product that matures earlier
    /// than the database's `DB_MaturityAge` implies). A second call is a
    /// config error, matching the "may be reset once" invariant in the
    /// data model.
    pub fn override_policy_length(&mut self, length: usize) -> Result<(), CoreError> {
        if self.policy_length_overridden {
            return Err(CoreError::config("policy_length already overridden once"));
        }
        self.policy_length = length;
        self.policy_length_overridden = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entity::DatabaseEntity;
    use crate::enums::{Gender, SmokingClass, State, UnderwritingBasis, UnderwritingClass};

    fn sample_index() -> AxisTuple {
        AxisTuple::new(
            Gender::Male,
            UnderwritingClass::Standard,
            SmokingClass::Nonsmoker,
            35,
            UnderwritingBasis::Medical,
            State::new(0).unwrap(),
        )
        .unwrap()
    }

    fn sample_db() -> ProductDatabase {
        let mut entities = HashMap::new();
        entities.insert(
            DatabaseKey::DB_MaturityAge,
            DatabaseEntity::scalar(DatabaseKey::DB_MaturityAge, 100.0),
        );
        entities.insert(
            DatabaseKey::DB_GuarInt,
            DatabaseEntity::scalar(DatabaseKey::DB_GuarInt, 0.03),
        );
        let vec_values: Vec<f64> = (0..10).map(|i| 0.01 * i as f64).collect();
        entities.insert(
            DatabaseKey::DB_GuarMonthlyPolFee,
            DatabaseEntity::duration_vector(DatabaseKey::DB_GuarMonthlyPolFee, vec_values).unwrap(),
        );
        ProductDatabase::new(entities, sample_index()).unwrap()
    }

    #[test]
    fn policy_length_derived_from_maturity_age() {
        let db = sample_db();
        assert_eq!(db.length(), 65);
    }

    #[test]
    fn query_scalar_exact_preservation() {
        let db = sample_db();
        let v: f64 = db.query_scalar(DatabaseKey::DB_GuarInt).unwrap();
        assert!((v - 0.03).abs() < 1e-12);
    }

    #[test]
    fn query_scalar_on_vector_entity_is_domain_error() {
        let db = sample_db();
        let result: Result<f64, CoreError> = db.query_scalar(DatabaseKey::DB_GuarMonthlyPolFee);
        assert!(matches!(result, Err(CoreError::Domain(_))));
    }

    #[test]
    fn query_vector_has_policy_length() {
        let db = sample_db();
        let v = db.query_vector(DatabaseKey::DB_GuarMonthlyPolFee, None).unwrap();
        assert_eq!(v.len(), db.length());
    }

    #[test]
    fn missing_key_is_config_error() {
        let db = sample_db();
        let result = db.entity_from_key(DatabaseKey::DB_CurrIntSpread);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn with_issue_age_recomputes_policy_length() {
        let db = sample_db();
        let rebound = db.with_issue_age(50).unwrap();
        assert_eq!(rebound.length(), 50);
    }

    #[test]
    fn policy_length_overrides_only_once() {
        let mut db = sample_db();
        assert!(db.override_policy_length(40).is_ok());
        assert_eq!(db.length(), 40);
        assert!(db.override_policy_length(30).is_err());
    }
}
