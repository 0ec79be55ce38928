//! Load/charge engine (C6).
//!
//! Grounded on `Loads` in the original source: produces premium, asset,
//! specified-amount, and policy-fee load vectors per basis, including
//! midpoint averaging and premium-tax handling, following the source's
//! `Allocate` → `Initialize` → `Calculate` sequencing.

use std::collections::HashMap;

use crate::enums::{AssetChargeType, Basis};
use crate::error::CoreError;
use crate::rounding::RoundingRule;

pub type BasisVector = HashMap<Basis, Vec<f64>>;

#[derive(Debug, Clone)]
pub struct LoadBundle {
    pub monthly_policy_fee: BasisVector,
    pub annual_policy_fee: BasisVector,
    pub specified_amount_load: BasisVector,
    pub separate_account_load: BasisVector,
    pub target_premium_load: BasisVector,
    pub excess_premium_load: BasisVector,
    pub target_sales_load: BasisVector,
    pub excess_sales_load: BasisVector,
    pub target_total_load: BasisVector,
    pub excess_total_load: BasisVector,

    pub premium_tax_load: Vec<f64>,
    pub dac_tax_load: Vec<f64>,
    pub refundable_sales_load_proportion: Vec<f64>,
    pub amortized_premium_tax_load: Vec<f64>,

    pub target_premium_load_excluding_premium_tax: Vec<f64>,
    pub target_premium_load_maximum_premium_tax: Vec<f64>,
    pub target_premium_load_minimum_premium_tax: Vec<f64>,
    pub excess_premium_load_excluding_premium_tax: Vec<f64>,
    pub excess_premium_load_maximum_premium_tax: Vec<f64>,
    pub excess_premium_load_minimum_premium_tax: Vec<f64>,
}

/// Raw per-basis vectors pulled from the database, before any engine steps
/// are applied.
pub struct LoadInputs {
    pub policy_length: usize,

    pub guar_monthly_policy_fee: Vec<f64>,
    pub curr_monthly_policy_fee: Vec<f64>,
    pub guar_annual_policy_fee: Vec<f64>,
    pub curr_annual_policy_fee: Vec<f64>,

    pub guar_spec_amt_load: Vec<f64>,
    pub curr_spec_amt_load: Vec<f64>,
    pub tabular_guar_spec_amt_load: Vec<f64>,
    pub tabular_curr_spec_amt_load: Vec<f64>,

    pub guar_acct_val_load: Vec<f64>,
    pub curr_acct_val_load: Vec<f64>,

    pub guar_prem_load_tgt: Vec<f64>,
    pub curr_prem_load_tgt: Vec<f64>,
    pub guar_prem_load_exc: Vec<f64>,
    pub curr_prem_load_exc: Vec<f64>,

    pub guar_sales_load_tgt: Vec<f64>,
    pub curr_sales_load_tgt: Vec<f64>,
    pub guar_sales_load_exc: Vec<f64>,
    pub curr_sales_load_exc: Vec<f64>,

    pub dac_tax_load: Vec<f64>,
    pub extra_pol_fee: Vec<f64>,
    pub extra_comp_load: Vec<f64>,
    pub extra_asset_comp: Vec<f64>,

    pub premium_tax_rate: f64,
    pub premium_tax_min_rate: f64,
    pub premium_tax_max_rate: f64,

    pub asset_charge_type: AssetChargeType,
    pub need_midpoint: bool,

    pub interest_rounding: RoundingRule,
    pub minutiae_rounding: RoundingRule,
}

/// Compound annual-to-monthly conversion, `(1+a)^(1/12) - 1`, evaluated via
/// `expm1`/`ln_1p` to avoid cancellation for small `a` (same form C5 uses).
fn annual_to_monthly(annual: &[f64]) -> Vec<f64> {
    annual.iter().map(|a| ((1.0 / 12.0) * a.ln_1p()).exp_m1()).collect()
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

fn add_scalar(a: &[f64], s: f64) -> Vec<f64> {
    a.iter().map(|x| x + s).collect()
}

fn midpoint(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| (x + y) / 2.0).collect()
}

/// Build the full load bundle for a cell, following the source's eight-step
/// sequence (§4.6).
pub fn build_loads(inputs: &LoadInputs) -> Result<LoadBundle, CoreError> {
    let n = inputs.policy_length;

    // 1. Initialize per-basis vectors from raw DB values.
    let mut monthly_policy_fee = BasisVector::new();
    monthly_policy_fee.insert(Basis::Guaranteed, inputs.guar_monthly_policy_fee.clone());
    monthly_policy_fee.insert(Basis::Current, inputs.curr_monthly_policy_fee.clone());

    let mut annual_policy_fee = BasisVector::new();
    annual_policy_fee.insert(Basis::Guaranteed, inputs.guar_annual_policy_fee.clone());
    annual_policy_fee.insert(Basis::Current, inputs.curr_annual_policy_fee.clone());

    let mut specified_amount_load = BasisVector::new();
    specified_amount_load.insert(Basis::Guaranteed, inputs.guar_spec_amt_load.clone());
    specified_amount_load.insert(Basis::Current, inputs.curr_spec_amt_load.clone());

    let mut separate_account_load_raw = BasisVector::new();
    separate_account_load_raw.insert(Basis::Guaranteed, inputs.guar_acct_val_load.clone());
    separate_account_load_raw.insert(Basis::Current, inputs.curr_acct_val_load.clone());

    let mut target_premium_load = BasisVector::new();
    target_premium_load.insert(Basis::Guaranteed, inputs.guar_prem_load_tgt.clone());
    target_premium_load.insert(Basis::Current, inputs.curr_prem_load_tgt.clone());

    let mut excess_premium_load = BasisVector::new();
    excess_premium_load.insert(Basis::Guaranteed, inputs.guar_prem_load_exc.clone());
    excess_premium_load.insert(Basis::Current, inputs.curr_prem_load_exc.clone());

    let mut target_sales_load = BasisVector::new();
    target_sales_load.insert(Basis::Guaranteed, inputs.guar_sales_load_tgt.clone());
    target_sales_load.insert(Basis::Current, inputs.curr_sales_load_tgt.clone());

    let mut excess_sales_load = BasisVector::new();
    excess_sales_load.insert(Basis::Guaranteed, inputs.guar_sales_load_exc.clone());
    excess_sales_load.insert(Basis::Current, inputs.curr_sales_load_exc.clone());

    let dac_tax_load = inputs.dac_tax_load.clone();
    let premium_tax_load = vec![inputs.premium_tax_rate; n];

    // 2. Separate-account load conversion: annual raw -> monthly.
    let mut separate_account_load = BasisVector::new();
    for &basis in &[Basis::Guaranteed, Basis::Current] {
        let raw = separate_account_load_raw.get(&basis).unwrap();
        separate_account_load.insert(basis, annual_to_monthly(raw));
    }

    // 3. Extra asset comp routing.
    if inputs.asset_charge_type == AssetChargeType::Load {
        let extra_monthly = annual_to_monthly(&inputs.extra_asset_comp);
        for &basis in &[Basis::Guaranteed, Basis::Current] {
            let updated = add(separate_account_load.get(&basis).unwrap(), &extra_monthly);
            let rounded = inputs.interest_rounding.round_each(&updated)?;
            separate_account_load.insert(basis, rounded);
        }
    }

    // 4. Tabular spec-amt loads.
    {
        let updated_guar = add(
            specified_amount_load.get(&Basis::Guaranteed).unwrap(),
            &inputs.tabular_guar_spec_amt_load,
        );
        specified_amount_load.insert(Basis::Guaranteed, updated_guar);
        let updated_curr = add(
            specified_amount_load.get(&Basis::Current).unwrap(),
            &inputs.tabular_curr_spec_amt_load,
        );
        specified_amount_load.insert(Basis::Current, updated_curr);
    }

    // 5. Total loads (non-midpoint bases).
    let mut target_total_load = BasisVector::new();
    let mut excess_total_load = BasisVector::new();

    for &basis in &[Basis::Guaranteed, Basis::Current] {
        let target_updated = add(target_sales_load.get(&basis).unwrap(), &inputs.extra_comp_load);
        target_sales_load.insert(basis, target_updated);
        let excess_updated = add(excess_sales_load.get(&basis).unwrap(), &inputs.extra_comp_load);
        excess_sales_load.insert(basis, excess_updated);
    }

    let mut target_premium_load_excluding_premium_tax = vec![0.0; n];
    let mut target_premium_load_maximum_premium_tax = vec![0.0; n];
    let mut target_premium_load_minimum_premium_tax = vec![0.0; n];
    let mut excess_premium_load_excluding_premium_tax = vec![0.0; n];
    let mut excess_premium_load_maximum_premium_tax = vec![0.0; n];
    let mut excess_premium_load_minimum_premium_tax = vec![0.0; n];

    for &basis in &[Basis::Guaranteed, Basis::Current] {
        let target_before_tax = add(
            add(target_sales_load.get(&basis).unwrap(), target_premium_load.get(&basis).unwrap()).as_slice(),
            &dac_tax_load,
        );
        let excess_before_tax = add(
            add(excess_sales_load.get(&basis).unwrap(), excess_premium_load.get(&basis).unwrap()).as_slice(),
            &dac_tax_load,
        );

        if basis == Basis::Current {
            target_premium_load_excluding_premium_tax = target_before_tax.clone();
            target_premium_load_maximum_premium_tax = add_scalar(&target_before_tax, inputs.premium_tax_max_rate);
            target_premium_load_minimum_premium_tax = add_scalar(&target_before_tax, inputs.premium_tax_min_rate);

            excess_premium_load_excluding_premium_tax = excess_before_tax.clone();
            excess_premium_load_maximum_premium_tax = add_scalar(&excess_before_tax, inputs.premium_tax_max_rate);
            excess_premium_load_minimum_premium_tax = add_scalar(&excess_before_tax, inputs.premium_tax_min_rate);
        }

        let target_total = add(&target_before_tax, &premium_tax_load);
        let excess_total = add(&excess_before_tax, &premium_tax_load);
        target_total_load.insert(basis, target_total);
        excess_total_load.insert(basis, excess_total);
    }

    // 6. Custodial fee: extra policy fee applies only to current basis.
    {
        let updated = add(monthly_policy_fee.get(&Basis::Current).unwrap(), &inputs.extra_pol_fee);
        monthly_policy_fee.insert(Basis::Current, updated);
    }
    {
        let curr = monthly_policy_fee.get(&Basis::Current).unwrap();
        let guar = monthly_policy_fee.get(&Basis::Guaranteed).unwrap();
        for j in 0..n {
            if curr[j] > guar[j] {
                return Err(CoreError::config(format!(
                    "monthly policy fee invariant violated at duration {j}: current {} exceeds guaranteed {}",
                    curr[j], guar[j]
                )));
            }
        }
    }

    // 7. Midpoint averaging.
    if inputs.need_midpoint {
        macro_rules! mid_basis_vector {
            ($v:expr) => {{
                let g = $v.get(&Basis::Guaranteed).unwrap().clone();
                let c = $v.get(&Basis::Current).unwrap().clone();
                $v.insert(Basis::Midpoint, midpoint(&g, &c));
            }};
        }
        mid_basis_vector!(monthly_policy_fee);
        mid_basis_vector!(annual_policy_fee);
        mid_basis_vector!(specified_amount_load);
        mid_basis_vector!(separate_account_load);
        mid_basis_vector!(target_premium_load);
        mid_basis_vector!(excess_premium_load);
        mid_basis_vector!(target_sales_load);
        mid_basis_vector!(excess_sales_load);
        mid_basis_vector!(target_total_load);
        mid_basis_vector!(excess_total_load);
    }

    // 8. Round policy fees with minutiae rule, all bases.
    for &basis in &Basis::ALL {
        if let Some(v) = monthly_policy_fee.get(&basis) {
            let rounded = inputs.minutiae_rounding.round_each(v)?;
            monthly_policy_fee.insert(basis, rounded);
        }
        if let Some(v) = annual_policy_fee.get(&basis) {
            let rounded = inputs.minutiae_rounding.round_each(v)?;
            annual_policy_fee.insert(basis, rounded);
        }
    }

    Ok(LoadBundle {
        monthly_policy_fee,
        annual_policy_fee,
        specified_amount_load,
        separate_account_load,
        target_premium_load,
        excess_premium_load,
        target_sales_load,
        excess_sales_load,
        target_total_load,
        excess_total_load,
        premium_tax_load,
        dac_tax_load,
        refundable_sales_load_proportion: vec![0.0; n],
        amortized_premium_tax_load: vec![0.0; n],
        target_premium_load_excluding_premium_tax,
        target_premium_load_maximum_premium_tax,
        target_premium_load_minimum_premium_tax,
        excess_premium_load_excluding_premium_tax,
        excess_premium_load_maximum_premium_tax,
        excess_premium_load_minimum_premium_tax,
    })
}

/// Premium-tax amortization is declared in the source but never
/// implemented; calling this always raises `CoreError::NotImplemented`.
pub fn amortize_premium_tax() -> Result<Vec<f64>, CoreError> {
    Err(CoreError::NotImplemented("premium-tax amortization"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::RoundingStyle;

    fn rounding(digits: i32) -> RoundingRule {
        RoundingRule::new(digits, RoundingStyle::ToNearest)
    }

    fn sample_inputs(n: usize) -> LoadInputs {
        LoadInputs {
            policy_length: n,
            guar_monthly_policy_fee: vec![5.00; n],
            curr_monthly_policy_fee: vec![3.25; n],
            guar_annual_policy_fee: vec![0.0; n],
            curr_annual_policy_fee: vec![0.0; n],
            guar_spec_amt_load: vec![0.0; n],
            curr_spec_amt_load: vec![0.0; n],
            tabular_guar_spec_amt_load: vec![0.0; n],
            tabular_curr_spec_amt_load: vec![0.0; n],
            guar_acct_val_load: vec![0.0012; n],
            curr_acct_val_load: vec![0.0012; n],
            guar_prem_load_tgt: vec![0.05; n],
            curr_prem_load_tgt: vec![0.04; n],
            guar_prem_load_exc: vec![0.02; n],
            curr_prem_load_exc: vec![0.01; n],
            guar_sales_load_tgt: vec![0.0; n],
            curr_sales_load_tgt: vec![0.0; n],
            guar_sales_load_exc: vec![0.0; n],
            curr_sales_load_exc: vec![0.0; n],
            dac_tax_load: vec![0.005; n],
            extra_pol_fee: vec![0.0; n],
            extra_comp_load: vec![0.0; n],
            extra_asset_comp: vec![0.0019; n],
            premium_tax_rate: 0.02,
            premium_tax_min_rate: 0.0,
            premium_tax_max_rate: 0.035,
            asset_charge_type: AssetChargeType::Load,
            need_midpoint: true,
            interest_rounding: rounding(10),
            minutiae_rounding: rounding(2),
        }
    }

    #[test]
    fn scenario_s6_midpoint_policy_fee_rounds_to_cent() {
        let inputs = sample_inputs(3);
        let bundle = build_loads(&inputs).unwrap();
        let mid = bundle.monthly_policy_fee.get(&Basis::Midpoint).unwrap();
        for &v in mid {
            assert!((v - 4.13).abs() < 1e-9, "got {v}");
        }
    }

    #[test]
    fn policy_fee_invariant_holds() {
        let inputs = sample_inputs(3);
        let bundle = build_loads(&inputs).unwrap();
        let guar = bundle.monthly_policy_fee.get(&Basis::Guaranteed).unwrap();
        let curr = bundle.monthly_policy_fee.get(&Basis::Current).unwrap();
        for j in 0..3 {
            assert!(curr[j] <= guar[j]);
        }
    }

    #[test]
    fn policy_fee_invariant_violation_is_config_error() {
        let mut inputs = sample_inputs(3);
        inputs.curr_monthly_policy_fee = vec![10.0; 3];
        let result = build_loads(&inputs);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn load_composition_matches_testable_property_5() {
        let inputs = sample_inputs(3);
        let bundle = build_loads(&inputs).unwrap();
        let total = bundle.target_total_load.get(&Basis::Current).unwrap();
        let sales = bundle.target_sales_load.get(&Basis::Current).unwrap();
        let prem = bundle.target_premium_load.get(&Basis::Current).unwrap();
        let dac = &bundle.dac_tax_load;
        let tax = &bundle.premium_tax_load;
        for j in 0..3 {
            let expected = sales[j] + prem[j] + dac[j] + tax[j];
            assert!((total[j] - expected).abs() < 1e-9);
        }

        for j in 0..3 {
            let delta = bundle.target_premium_load_maximum_premium_tax[j]
                - bundle.target_premium_load_excluding_premium_tax[j];
            assert!((delta - inputs.premium_tax_max_rate).abs() < 1e-9);
        }
    }

    #[test]
    fn scenario_s7_separate_account_load_uses_compound_monthly_conversion() {
        let inputs = sample_inputs(3);
        let bundle = build_loads(&inputs).unwrap();
        let guar = bundle.separate_account_load.get(&Basis::Guaranteed).unwrap();
        for &v in guar {
            assert!((v - 0.0002581402795930).abs() < 1e-7, "got {v}");
        }
    }

    #[test]
    fn amortize_premium_tax_is_not_implemented() {
        assert!(matches!(amortize_premium_tax(), Err(CoreError::NotImplemented(_))));
    }
}
