//! Per-cell input and the database-to-engine-inputs bridge.
//!
//! Grounded on `BasicValues`'s construction sequence in the original
//! source: a cell binds its lookup axes and a handful of override flags,
//! then `Init()` pulls every raw vector this crate's engines need out of
//! the product database. This module is the glue between C3 (database
//! queries) and C5/C6 (which take already-resolved vectors); it carries
//! no actuarial logic of its own.

use crate::database::{DatabaseKey, ProductDatabase};
use crate::enums::{AssetChargeType, GenAcctRateType, Gender, SepAcctRateType, SmokingClass, SpreadMethod, State, UnderwritingBasis, UnderwritingClass};
use crate::error::CoreResult;
use crate::interest::InterestRateInputs;
use crate::loads::LoadInputs;
use crate::rounding::RoundingRule;

/// A single illustration cell's input record: the axes that bind a
/// `ProductDatabase` lookup index, plus overrides that are not themselves
/// database-driven.
#[derive(Debug, Clone)]
pub struct CellInput {
    pub gender: Gender,
    pub underwriting_class: UnderwritingClass,
    pub smoking: SmokingClass,
    pub issue_age: u8,
    pub underwriting_basis: UnderwritingBasis,
    pub state: State,

    /// If set, use the declared current rate as-is rather than the
    /// database's general-account current rate; mirrors the source's
    /// `UseCurrentDeclaredRate` override.
    pub use_current_declared_rate: bool,
    /// If set, amortize the premium-tax load rather than expense it;
    /// always rejected downstream since amortization is not implemented.
    pub amortize_premium_load: bool,

    /// The insured's declared separate-account rate, per duration; mirrors
    /// the source's `yare_input_.SeparateAccountRate`. Distinct from the
    /// database's `MaxSepAcctRate` cap — this is the user's actual input,
    /// not a product ceiling.
    pub declared_separate_account_rate: Vec<f64>,
}

/// Pull every raw vector `InterestRateInputs` needs out of `db`, at
/// `db.length()` duration, leaving flags the database cannot express
/// (need_midpoint_rates etc.) to the caller.
pub fn interest_inputs_from_database(
    db: &ProductDatabase,
    declared_separate_account_rate: &[f64],
    interest_rounding: RoundingRule,
    need_midpoint_rates: bool,
    need_sep_acct_rates: bool,
    need_pref_loan_rates: bool,
    need_honeymoon_rates: bool,
) -> CoreResult<InterestRateInputs> {
    let n = db.length();
    let general_account_rate = db.query_vector(DatabaseKey::DB_GuarInt, None)?;

    Ok(InterestRateInputs {
        policy_length: n,
        guar_int: db.query_vector(DatabaseKey::DB_GuarInt, None)?,
        general_account_rate,
        gen_acct_int_bonus: db.query_vector(DatabaseKey::DB_GenAcctIntBonus, None)?,
        curr_int_spread: db.query_vector(DatabaseKey::DB_CurrIntSpread, None)?,
        max_gen_acct_rate: db.query_vector(DatabaseKey::DB_MaxGenAcctRate, None)?,
        gen_acct_rate_type: db.query_scalar(DatabaseKey::DB_GenAcctRateType)?,

        separate_account_rate: declared_separate_account_rate.to_vec(),
        guar_mande: db.query_vector(DatabaseKey::DB_GuarMandE, None)?,
        curr_mande: db.query_vector(DatabaseKey::DB_CurrMandE, None)?,
        max_sep_acct_rate: db.query_vector(DatabaseKey::DB_MaxSepAcctRate, None)?,
        sep_acct_spread_method: db.query_scalar(DatabaseKey::DB_SepAcctSpreadMethod)?,
        investment_management_fee: db.query_vector(DatabaseKey::DB_InvestmentManagementFee, None)?,
        extra_sep_acct_comp: db.query_vector(DatabaseKey::DB_ExtraSepAcctCharge, None)?,
        amortized_load: db.query_vector(DatabaseKey::DB_AmortizedLoad, None)?,
        sep_acct_rate_type: db.query_scalar(DatabaseKey::DB_SepAcctRateType)?,
        asset_charge_type: AssetChargeType::Spread,

        fixed_loan_rate: db.query_vector(DatabaseKey::DB_FixedLoanRate, None)?,
        variable_loan_rate: None,
        pref_loan_rate_decr: db.query_vector(DatabaseKey::DB_PrefLoanRateDecr, None)?,
        guar_reg_loan_spread: db.query_vector(DatabaseKey::DB_GuarRegLoanSpread, None)?,
        curr_reg_loan_spread: db.query_vector(DatabaseKey::DB_CurrRegLoanSpread, None)?,
        guar_pref_loan_spread: db.query_vector(DatabaseKey::DB_GuarPrefLoanSpread, None)?,
        curr_pref_loan_spread: db.query_vector(DatabaseKey::DB_CurrPrefLoanSpread, None)?,

        honeymoon_value_spread: db.query_vector(DatabaseKey::DB_HoneymoonValueSpread, None)?,
        post_honeymoon_spread: db.query_vector(DatabaseKey::DB_PostHoneymoonSpread, None)?,

        need_midpoint_rates,
        need_sep_acct_rates,
        need_pref_loan_rates,
        need_honeymoon_rates,

        interest_rounding,
    })
}

/// Pull every raw vector `LoadInputs` needs out of `db`, at
/// `db.length()` duration.
pub fn load_inputs_from_database(
    db: &ProductDatabase,
    interest_rounding: RoundingRule,
    minutiae_rounding: RoundingRule,
    need_midpoint: bool,
) -> CoreResult<LoadInputs> {
    let n = db.length();

    Ok(LoadInputs {
        policy_length: n,
        guar_monthly_policy_fee: db.query_vector(DatabaseKey::DB_GuarMonthlyPolFee, None)?,
        curr_monthly_policy_fee: db.query_vector(DatabaseKey::DB_CurrMonthlyPolFee, None)?,
        guar_annual_policy_fee: db.query_vector(DatabaseKey::DB_GuarAnnualPolFee, None)?,
        curr_annual_policy_fee: db.query_vector(DatabaseKey::DB_CurrAnnualPolFee, None)?,

        guar_spec_amt_load: db.query_vector(DatabaseKey::DB_GuarSpecAmtLoad, None)?,
        curr_spec_amt_load: db.query_vector(DatabaseKey::DB_CurrSpecAmtLoad, None)?,
        tabular_guar_spec_amt_load: db.query_vector(DatabaseKey::DB_TabularGuarSpecAmtLoad, None)?,
        tabular_curr_spec_amt_load: db.query_vector(DatabaseKey::DB_TabularCurrSpecAmtLoad, None)?,

        guar_acct_val_load: db.query_vector(DatabaseKey::DB_GuarAcctValLoad, None)?,
        curr_acct_val_load: db.query_vector(DatabaseKey::DB_CurrAcctValLoad, None)?,

        guar_prem_load_tgt: db.query_vector(DatabaseKey::DB_GuarPremLoadTgt, None)?,
        curr_prem_load_tgt: db.query_vector(DatabaseKey::DB_CurrPremLoadTgt, None)?,
        guar_prem_load_exc: db.query_vector(DatabaseKey::DB_GuarPremLoadExc, None)?,
        curr_prem_load_exc: db.query_vector(DatabaseKey::DB_CurrPremLoadExc, None)?,

        guar_sales_load_tgt: db.query_vector(DatabaseKey::DB_GuarSalesLoadTgt, None)?,
        curr_sales_load_tgt: db.query_vector(DatabaseKey::DB_CurrSalesLoadTgt, None)?,
        guar_sales_load_exc: db.query_vector(DatabaseKey::DB_GuarSalesLoadExc, None)?,
        curr_sales_load_exc: db.query_vector(DatabaseKey::DB_CurrSalesLoadExc, None)?,

        dac_tax_load: db.query_vector(DatabaseKey::DB_DacTaxPremLoad, None)?,
        extra_pol_fee: db.query_vector(DatabaseKey::DB_VectorExtraPolFee, None)?,
        extra_comp_load: db.query_vector(DatabaseKey::DB_VectorExtraCompLoad, None)?,
        extra_asset_comp: db.query_vector(DatabaseKey::DB_ExtraSepAcctCharge, None)?,

        premium_tax_rate: db.query_scalar(DatabaseKey::DB_PremTaxLoadRate)?,
        premium_tax_min_rate: db.query_scalar(DatabaseKey::DB_PremTaxLoadMinRate)?,
        premium_tax_max_rate: db.query_scalar(DatabaseKey::DB_PremTaxLoadMaxRate)?,

        asset_charge_type: AssetChargeType::Spread,
        need_midpoint,

        interest_rounding,
        minutiae_rounding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseEntity;
    use crate::enums::AxisTuple;
    use std::collections::HashMap;

    fn scalar_db() -> ProductDatabase {
        let mut entities = HashMap::new();
        let mut insert_scalar = |key, value| {
            entities.insert(key, DatabaseEntity::scalar(key, value));
        };
        insert_scalar(DatabaseKey::DB_MaturityAge, 40.0);
        insert_scalar(DatabaseKey::DB_GuarInt, 0.03);
        insert_scalar(DatabaseKey::DB_GenAcctIntBonus, 0.0);
        insert_scalar(DatabaseKey::DB_CurrIntSpread, 0.01);
        insert_scalar(DatabaseKey::DB_MaxGenAcctRate, 1.0);
        insert_scalar(DatabaseKey::DB_GenAcctRateType, GenAcctRateType::Credited as i32 as f64);
        insert_scalar(DatabaseKey::DB_GuarMandE, 0.0012);
        insert_scalar(DatabaseKey::DB_CurrMandE, 0.0012);
        insert_scalar(DatabaseKey::DB_MaxSepAcctRate, 1.0);
        insert_scalar(DatabaseKey::DB_SepAcctSpreadMethod, SpreadMethod::EffectiveAnnual as i32 as f64);
        insert_scalar(DatabaseKey::DB_InvestmentManagementFee, 0.0);
        insert_scalar(DatabaseKey::DB_ExtraSepAcctCharge, 0.0);
        insert_scalar(DatabaseKey::DB_AmortizedLoad, 0.0);
        insert_scalar(DatabaseKey::DB_SepAcctRateType, SepAcctRateType::Gross as i32 as f64);
        insert_scalar(DatabaseKey::DB_FixedLoanRate, 0.06);
        insert_scalar(DatabaseKey::DB_PrefLoanRateDecr, 0.0);
        insert_scalar(DatabaseKey::DB_GuarRegLoanSpread, 0.0);
        insert_scalar(DatabaseKey::DB_CurrRegLoanSpread, 0.0);
        insert_scalar(DatabaseKey::DB_GuarPrefLoanSpread, 0.0);
        insert_scalar(DatabaseKey::DB_CurrPrefLoanSpread, 0.0);
        insert_scalar(DatabaseKey::DB_HoneymoonValueSpread, 0.0);
        insert_scalar(DatabaseKey::DB_PostHoneymoonSpread, 0.0);

        let index = AxisTuple::new(
            Gender::Male,
            UnderwritingClass::Standard,
            SmokingClass::Nonsmoker,
            30,
            UnderwritingBasis::Medical,
            State::new(0).unwrap(),
        )
        .unwrap();
        ProductDatabase::new(entities, index).unwrap()
    }

    #[test]
    fn interest_inputs_pulled_from_database_have_policy_length() {
        let db = scalar_db();
        let rounding = RoundingRule::new(10, crate::enums::RoundingStyle::ToNearest);
        let declared_rate = vec![0.08; db.length()];
        let inputs =
            interest_inputs_from_database(&db, &declared_rate, rounding, false, false, false, false).unwrap();
        assert_eq!(inputs.policy_length, db.length());
        assert_eq!(inputs.guar_int.len(), db.length());
    }
}
