//! Basic-values facade (C7).
//!
//! Grounded on `BasicValues` in the original source: composes the product
//! database (C3), rounding rules (C1), and the interest-rate and load
//! bundles (C5, C6) into a single per-cell object, guarded by an
//! `Uninitialized` → `Initialized` state machine.

use std::path::Path;

use crate::database::{DatabaseKey, ProductDatabase};
use crate::enums::{AxisTuple, BlendPolicy, Gender, SmokingClass, State, UnderwritingBasis, UnderwritingClass};
use crate::error::{CoreError, CoreResult};
use crate::interest::{build_interest_rates, InterestRateBundle, InterestRateInputs};
use crate::loads::{build_loads, LoadBundle, LoadInputs};
use crate::rounding::RoundingRule;
use crate::tables::{blended_table, BlendPolicies, BlendableTables, LookupMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State7702 {
    Uninitialized,
    Initialized,
}

/// Composes the product database plus the interest-rate and load bundles
/// for a single illustration cell.
pub struct BasicValues {
    database: ProductDatabase,
    interest_rounding: RoundingRule,
    minutiae_rounding: RoundingRule,
    interest_rates: Option<InterestRateBundle>,
    loads: Option<LoadBundle>,
    state: State7702,
}

impl BasicValues {
    /// Load a product-definition file and bind the six lookup axes.
    pub fn new(
        product_file: &Path,
        gender: Gender,
        class: UnderwritingClass,
        smoking: SmokingClass,
        issue_age: u8,
        uw_basis: UnderwritingBasis,
        state: State,
        interest_rounding: RoundingRule,
        minutiae_rounding: RoundingRule,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let entities = crate::database::loader::load_product(product_file)?;
        let index = AxisTuple::new(gender, class, smoking, issue_age, uw_basis, state)?;
        let database = ProductDatabase::new(entities, index)?;
        Ok(Self {
            database,
            interest_rounding,
            minutiae_rounding,
            interest_rates: None,
            loads: None,
            state: State7702::Uninitialized,
        })
    }

    pub fn get_length(&self) -> usize {
        self.database.length()
    }

    pub fn database(&self) -> &ProductDatabase {
        &self.database
    }

    fn require_initialized(&self) -> CoreResult<()> {
        if self.state != State7702::Initialized {
            return Err(CoreError::config("BasicValues queried before Init()"));
        }
        Ok(())
    }

    pub fn interest_rates(&self) -> CoreResult<&InterestRateBundle> {
        self.require_initialized()?;
        Ok(self.interest_rates.as_ref().expect("initialized state guarantees bundle is present"))
    }

    pub fn loads(&self) -> CoreResult<&LoadBundle> {
        self.require_initialized()?;
        Ok(self.loads.as_ref().expect("initialized state guarantees bundle is present"))
    }

    /// Run C5 then C6 against the bound database, transitioning
    /// `Uninitialized` → `Initialized`. Calling this twice is a config
    /// error, matching the state machine's one-way transition.
    pub fn init(&mut self, interest_inputs: InterestRateInputs, load_inputs: LoadInputs) -> CoreResult<()> {
        if self.state == State7702::Initialized {
            return Err(CoreError::config("BasicValues already initialized"));
        }
        let interest_rates = build_interest_rates(&interest_inputs)?;
        let loads = build_loads(&load_inputs)?;
        self.interest_rates = Some(interest_rates);
        self.loads = Some(loads);
        self.state = State7702::Initialized;
        Ok(())
    }

    /// Convenience wrapper over C4: look up `file_key`'s table file and
    /// `table_id_key`'s table id in the database, apply blending policy,
    /// and return the per-duration vector.
    pub fn get_actuarial_table(
        &self,
        file_key: DatabaseKey,
        table_id_key: DatabaseKey,
        table_dir: &Path,
        gender_policy: BlendPolicy,
        smoking_policy: BlendPolicy,
        male_fraction: f64,
        nonsmoker_fraction: f64,
        method: LookupMethod,
    ) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
        self.require_initialized()?;

        let file_id: u32 = self.database.query_scalar(file_key)?;
        let table_id: u32 = self.database.query_scalar(table_id_key)?;
        let file_path = table_dir.join(format!("{file_id}.csv"));
        let tables = crate::tables::loader::load_tables(&file_path)?;

        let index = self.database.index();
        let is_unisex_cell = index.gender == Gender::Unisex;
        let is_unismoke_cell = index.smoking == SmokingClass::Unismoke;

        let cell_specific = tables
            .get(&table_id)
            .cloned()
            .ok_or_else(|| CoreError::data(format!("table id {table_id} not found in file {file_id}")))?;

        let tables = BlendableTables {
            cell_specific,
            male: tables.get(&(table_id + 1)).cloned(),
            female: tables.get(&(table_id + 2)).cloned(),
            smoker: tables.get(&(table_id + 3)).cloned(),
            nonsmoker: tables.get(&(table_id + 4)).cloned(),
            male_smoker: tables.get(&(table_id + 5)).cloned(),
            male_nonsmoker: tables.get(&(table_id + 6)).cloned(),
            female_smoker: tables.get(&(table_id + 7)).cloned(),
            female_nonsmoker: tables.get(&(table_id + 8)).cloned(),
        };
        let policies = BlendPolicies {
            gender: gender_policy,
            smoking: smoking_policy,
        };

        let vector = blended_table(
            &tables,
            policies,
            is_unisex_cell,
            is_unismoke_cell,
            male_fraction,
            nonsmoker_fraction,
            method,
            index.issue_age,
            self.database.length(),
        )?;
        Ok(vector)
    }

    pub fn interest_rounding(&self) -> RoundingRule {
        self.interest_rounding
    }

    pub fn minutiae_rounding(&self) -> RoundingRule {
        self.minutiae_rounding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseEntity;
    use crate::enums::{AssetChargeType, GenAcctRateType, RoundingStyle, SepAcctRateType, SpreadMethod};
    use std::collections::HashMap;

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

    fn sample_database() -> ProductDatabase {
        let mut entities = HashMap::new();
        entities.insert(
            DatabaseKey::DB_MaturityAge,
            DatabaseEntity::scalar(DatabaseKey::DB_MaturityAge, 100.0),
        );
        ProductDatabase::new(entities, sample_index()).unwrap()
    }

    fn sample_values() -> BasicValues {
        BasicValues {
            database: sample_database(),
            interest_rounding: RoundingRule::new(10, RoundingStyle::ToNearest),
            minutiae_rounding: RoundingRule::new(2, RoundingStyle::ToNearest),
            interest_rates: None,
            loads: None,
            state: State7702::Uninitialized,
        }
    }

    fn zeros(n: usize) -> Vec<f64> {
        vec![0.0; n]
    }

    fn sample_interest_inputs(n: usize) -> InterestRateInputs {
        InterestRateInputs {
            policy_length: n,
            guar_int: vec![0.03; n],
            general_account_rate: vec![0.05; n],
            gen_acct_int_bonus: zeros(n),
            curr_int_spread: zeros(n),
            max_gen_acct_rate: vec![1.0; n],
            gen_acct_rate_type: GenAcctRateType::Credited,
            separate_account_rate: vec![0.08; n],
            guar_mande: vec![0.0012; n],
            curr_mande: vec![0.0012; n],
            max_sep_acct_rate: vec![1.0; n],
            sep_acct_spread_method: SpreadMethod::EffectiveAnnual,
            investment_management_fee: zeros(n),
            extra_sep_acct_comp: zeros(n),
            amortized_load: zeros(n),
            sep_acct_rate_type: SepAcctRateType::Gross,
            asset_charge_type: AssetChargeType::Spread,
            fixed_loan_rate: vec![0.06; n],
            variable_loan_rate: None,
            pref_loan_rate_decr: zeros(n),
            guar_reg_loan_spread: zeros(n),
            curr_reg_loan_spread: zeros(n),
            guar_pref_loan_spread: zeros(n),
            curr_pref_loan_spread: zeros(n),
            honeymoon_value_spread: zeros(n),
            post_honeymoon_spread: zeros(n),
            need_midpoint_rates: false,
            need_sep_acct_rates: false,
            need_pref_loan_rates: false,
            need_honeymoon_rates: false,
            interest_rounding: RoundingRule::new(10, RoundingStyle::ToNearest),
        }
    }

    fn sample_load_inputs(n: usize) -> LoadInputs {
        LoadInputs {
            policy_length: n,
            guar_monthly_policy_fee: vec![5.0; n],
            curr_monthly_policy_fee: vec![3.25; n],
            guar_annual_policy_fee: zeros(n),
            curr_annual_policy_fee: zeros(n),
            guar_spec_amt_load: zeros(n),
            curr_spec_amt_load: zeros(n),
            tabular_guar_spec_amt_load: zeros(n),
            tabular_curr_spec_amt_load: zeros(n),
            guar_acct_val_load: zeros(n),
            curr_acct_val_load: zeros(n),
            guar_prem_load_tgt: zeros(n),
            curr_prem_load_tgt: zeros(n),
            guar_prem_load_exc: zeros(n),
            curr_prem_load_exc: zeros(n),
            guar_sales_load_tgt: zeros(n),
            curr_sales_load_tgt: zeros(n),
            guar_sales_load_exc: zeros(n),
            curr_sales_load_exc: zeros(n),
            dac_tax_load: zeros(n),
            extra_pol_fee: zeros(n),
            extra_comp_load: zeros(n),
            extra_asset_comp: zeros(n),
            premium_tax_rate: 0.02,
            premium_tax_min_rate: 0.0,
            premium_tax_max_rate: 0.035,
            asset_charge_type: AssetChargeType::Spread,
            need_midpoint: false,
            interest_rounding: RoundingRule::new(10, RoundingStyle::ToNearest),
            minutiae_rounding: RoundingRule::new(2, RoundingStyle::ToNearest),
        }
    }

    #[test]
    fn queries_before_init_are_config_errors() {
        let values = sample_values();
        assert!(values.interest_rates().is_err());
        assert!(values.loads().is_err());
    }

    #[test]
    fn init_transitions_to_initialized() {
        let mut values = sample_values();
        let n = values.get_length();
        values.init(sample_interest_inputs(n), sample_load_inputs(n)).unwrap();
        assert!(values.interest_rates().is_ok());
        assert!(values.loads().is_ok());
    }

    #[test]
    fn double_init_is_config_error() {
        let mut values = sample_values();
        let n = values.get_length();
        values.init(sample_interest_inputs(n), sample_load_inputs(n)).unwrap();
        let result = values.init(sample_interest_inputs(n), sample_load_inputs(n));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
