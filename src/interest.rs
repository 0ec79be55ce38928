//! Interest-rate transformer (C5).
//!
//! Grounded on `InterestRates` in the original source: converts annual
//! gross declared rates into monthly net crediting rates across three
//! bases (guaranteed, current, midpoint), for the general account,
//! separate account, policy-loan, and honeymoon sub-bases.

use std::collections::HashMap;

use crate::enums::{AssetChargeType, Basis, GenAcctRateType, RatePeriod, SepAcctBasis, SepAcctRateType, SpreadMethod};
use crate::error::CoreError;
use crate::rounding::RoundingRule;

/// Per-basis vector, one entry per duration.
pub type BasisVector = HashMap<Basis, Vec<f64>>;
/// Per-(period, sep-basis) vector.
pub type SepAcctVector = HashMap<(RatePeriod, SepAcctBasis), Vec<f64>>;
/// Per-(period, basis, sep-basis) vector, for net separate-account rates
/// which additionally depend on the illustrative basis.
pub type SepAcctNetVector = HashMap<(RatePeriod, Basis, SepAcctBasis), Vec<f64>>;
/// Per-(period, basis) vector, e.g. for loan rates.
pub type PeriodBasisVector = HashMap<(RatePeriod, Basis), Vec<f64>>;

#[derive(Debug, Clone)]
pub struct InterestRateBundle {
    pub gen_acct_gross: BasisVector,
    pub gen_acct_net_annual: BasisVector,
    pub gen_acct_net_monthly: BasisVector,

    pub sep_acct_gross: SepAcctVector,
    pub sep_acct_net: SepAcctNetVector,

    pub reg_loan_due: PeriodBasisVector,
    pub reg_loan_cred: PeriodBasisVector,
    pub pref_loan_due: PeriodBasisVector,
    pub pref_loan_cred: PeriodBasisVector,

    pub honeymoon_value: PeriodBasisVector,
    pub post_honeymoon: PeriodBasisVector,
}

/// Inputs the transformer consumes, already resolved to per-duration
/// vectors of length `policy_length` by the caller (typically C3 via C7).
pub struct InterestRateInputs {
    pub policy_length: usize,

    pub guar_int: Vec<f64>,
    pub general_account_rate: Vec<f64>,
    pub gen_acct_int_bonus: Vec<f64>,
    pub curr_int_spread: Vec<f64>,
    pub max_gen_acct_rate: Vec<f64>,
    pub gen_acct_rate_type: GenAcctRateType,

    pub separate_account_rate: Vec<f64>,
    pub guar_mande: Vec<f64>,
    pub curr_mande: Vec<f64>,
    pub max_sep_acct_rate: Vec<f64>,
    pub sep_acct_spread_method: SpreadMethod,
    pub investment_management_fee: Vec<f64>,
    pub extra_sep_acct_comp: Vec<f64>,
    pub amortized_load: Vec<f64>,
    pub sep_acct_rate_type: SepAcctRateType,
    pub asset_charge_type: AssetChargeType,

    pub fixed_loan_rate: Vec<f64>,
    pub variable_loan_rate: Option<Vec<f64>>,
    pub pref_loan_rate_decr: Vec<f64>,
    pub guar_reg_loan_spread: Vec<f64>,
    pub curr_reg_loan_spread: Vec<f64>,
    pub guar_pref_loan_spread: Vec<f64>,
    pub curr_pref_loan_spread: Vec<f64>,

    pub honeymoon_value_spread: Vec<f64>,
    pub post_honeymoon_spread: Vec<f64>,

    pub need_midpoint_rates: bool,
    pub need_sep_acct_rates: bool,
    pub need_pref_loan_rates: bool,
    pub need_honeymoon_rates: bool,

    pub interest_rounding: RoundingRule,
}

/// Convert an annual gross rate to net-annual/net-monthly, applying the
/// spread, floor, and fee contract in one duration-by-duration pass, with
/// the vectorized-replication optimization: when `(g, s, f)` repeats the
/// previous duration's tuple, the previous result is reused rather than
/// recomputed.
fn convert_vector(
    gross: &[f64],
    spread: &[f64],
    floor: &[f64],
    fee: &[f64],
    method: SpreadMethod,
    rounding: &RoundingRule,
) -> Result<(Vec<f64>, Vec<f64>), CoreError> {
    let n = gross.len();
    let mut net_annual = Vec::with_capacity(n);
    let mut net_monthly = Vec::with_capacity(n);
    let mut prev: Option<(f64, f64, f64, f64, f64)> = None;

    for j in 0..n {
        let g = gross[j];
        let s = spread[j];
        let f = floor[j];
        let phi = fee[j];

        if let Some((pg, ps, pf, pphi, _)) = prev {
            if pg == g && ps == s && pf == f && pphi == phi {
                net_annual.push(net_annual[j - 1]);
                net_monthly.push(net_monthly[j - 1]);
                continue;
            }
        }

        let raw_annual = if s == 0.0 && phi == 0.0 {
            g
        } else {
            match method {
                SpreadMethod::EffectiveAnnual => g - s - phi,
                SpreadMethod::NominalDaily => {
                    let daily = (g - s - phi) / 365.0;
                    (365.0 * daily.ln_1p()).exp_m1()
                }
            }
        };
        let floored_annual = raw_annual.max(f);
        let rounded_annual = rounding.round(floored_annual)?;

        let raw_monthly = ((1.0 / 12.0) * rounded_annual.ln_1p()).exp_m1();
        let rounded_monthly = rounding.round(raw_monthly)?;

        net_annual.push(rounded_annual);
        net_monthly.push(rounded_monthly);
        prev = Some((g, s, f, phi, rounded_annual));
    }

    Ok((net_annual, net_monthly))
}

fn zeros(n: usize) -> Vec<f64> {
    vec![0.0; n]
}

fn midpoint(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b.iter()).map(|(x, y)| (x + y) / 2.0).collect()
}

/// Build the full interest-rate bundle for a cell, following the source's
/// general-account → separate-account → loan → honeymoon ordering.
pub fn build_interest_rates(inputs: &InterestRateInputs) -> Result<InterestRateBundle, CoreError> {
    let n = inputs.policy_length;

    // 3. General-account basis.
    let curr_gross: Vec<f64> = inputs
        .general_account_rate
        .iter()
        .zip(inputs.gen_acct_int_bonus.iter())
        .map(|(g, b)| g + b)
        .collect();
    let guar_gross = inputs.guar_int.clone();

    let (curr_spread, guar_spread, mdpt_spread) = match inputs.gen_acct_rate_type {
        GenAcctRateType::Credited => (zeros(n), zeros(n), zeros(n)),
        GenAcctRateType::Earned => {
            let mut curr_spread = inputs.curr_int_spread.clone();
            if let Some(first) = curr_spread.first().copied() {
                for v in curr_spread.iter_mut() {
                    *v -= first;
                }
            }
            // Guaranteed-basis spread is declared in the source
            // (`DB_GuarIntSpread`) but never populated; midpoint is
            // therefore approximated as half the current spread rather
            // than the full (current + guaranteed) / 2. See DESIGN.md.
            let guar_spread = zeros(n);
            let mdpt_spread: Vec<f64> = curr_spread.iter().map(|s| s / 2.0).collect();
            (curr_spread, guar_spread, mdpt_spread)
        }
    };

    let floor = zeros(n);
    let fee = zeros(n);

    let (guar_net_annual, guar_net_monthly) =
        convert_vector(&guar_gross, &guar_spread, &floor, &fee, SpreadMethod::EffectiveAnnual, &inputs.interest_rounding)?;
    let (curr_net_annual, curr_net_monthly) =
        convert_vector(&curr_gross, &curr_spread, &floor, &fee, SpreadMethod::EffectiveAnnual, &inputs.interest_rounding)?;

    let (mdpt_gross, mdpt_net_annual, mdpt_net_monthly) = if inputs.need_midpoint_rates {
        let gross = midpoint(&guar_gross, &curr_gross);
        convert_vector(&gross, &mdpt_spread, &floor, &fee, SpreadMethod::EffectiveAnnual, &inputs.interest_rounding)
            .map(|(a, m)| (gross, a, m))?
    } else {
        (zeros(n), zeros(n), zeros(n))
    };

    let mut gen_acct_gross = BasisVector::new();
    gen_acct_gross.insert(Basis::Guaranteed, guar_gross);
    gen_acct_gross.insert(Basis::Current, curr_gross);
    gen_acct_gross.insert(Basis::Midpoint, mdpt_gross);

    let mut gen_acct_net_annual = BasisVector::new();
    gen_acct_net_annual.insert(Basis::Guaranteed, guar_net_annual);
    gen_acct_net_annual.insert(Basis::Current, curr_net_annual);
    gen_acct_net_annual.insert(Basis::Midpoint, mdpt_net_annual);

    let mut gen_acct_net_monthly = BasisVector::new();
    gen_acct_net_monthly.insert(Basis::Guaranteed, guar_net_monthly);
    gen_acct_net_monthly.insert(Basis::Current, curr_net_monthly);
    gen_acct_net_monthly.insert(Basis::Midpoint, mdpt_net_monthly);

    // 4. Separate-account basis.
    let mut sep_acct_gross = SepAcctVector::new();
    let mut sep_acct_net = SepAcctNetVector::new();
    if inputs.need_sep_acct_rates {
        let full = inputs.separate_account_rate.clone();
        let half: Vec<f64> = full.iter().map(|x| x / 2.0).collect();
        let zero = zeros(n);
        sep_acct_gross.insert((RatePeriod::Annual, SepAcctBasis::Full), full.clone());
        sep_acct_gross.insert((RatePeriod::Annual, SepAcctBasis::Half), half.clone());
        sep_acct_gross.insert((RatePeriod::Annual, SepAcctBasis::Zero), zero.clone());

        let sep_floor = vec![-1.0; n];
        for &sep_basis in &[SepAcctBasis::Full, SepAcctBasis::Half, SepAcctBasis::Zero] {
            let gross = sep_acct_gross.get(&(RatePeriod::Annual, sep_basis)).unwrap().clone();
            for &basis in &[Basis::Guaranteed, Basis::Current] {
                if basis == Basis::Midpoint {
                    continue;
                }
                let mande = match basis {
                    Basis::Guaranteed => &inputs.guar_mande,
                    Basis::Current => &inputs.curr_mande,
                    Basis::Midpoint => unreachable!(),
                };
                let mut total_charges: Vec<f64> = mande
                    .iter()
                    .zip(inputs.amortized_load.iter())
                    .zip(inputs.extra_sep_acct_comp.iter())
                    .map(|((m, a), e)| {
                        if inputs.asset_charge_type == AssetChargeType::Spread {
                            m + a + e
                        } else {
                            m + a
                        }
                    })
                    .collect();

                let mut imf = inputs.investment_management_fee.clone();
                if inputs.sep_acct_rate_type == SepAcctRateType::Net {
                    if let Some(first_charge) = total_charges.first().copied() {
                        for c in total_charges.iter_mut() {
                            *c -= first_charge;
                        }
                    }
                    imf = zeros(n);
                }
                let fee: Vec<f64> = total_charges.iter().zip(imf.iter()).map(|(c, f)| c + f).collect();

                let (_annual, monthly) =
                    convert_vector(&gross, &zero, &sep_floor, &fee, inputs.sep_acct_spread_method, &inputs.interest_rounding)?;
                sep_acct_net.insert((RatePeriod::Monthly, basis, sep_basis), monthly);
            }
            // Midpoint basis is explicitly zeroed, not derived.
            sep_acct_net.insert((RatePeriod::Monthly, Basis::Midpoint, sep_basis), zeros(n));
        }
    }

    // 5. Loan basis.
    let published_rate = inputs.variable_loan_rate.clone().unwrap_or_else(|| inputs.fixed_loan_rate.clone());

    let mut reg_loan_due = PeriodBasisVector::new();
    let mut reg_loan_cred = PeriodBasisVector::new();
    let mut pref_loan_due = PeriodBasisVector::new();
    let mut pref_loan_cred = PeriodBasisVector::new();

    for &basis in &[Basis::Guaranteed, Basis::Current] {
        reg_loan_due.insert((RatePeriod::Annual, basis), published_rate.clone());

        let spread = match basis {
            Basis::Guaranteed => &inputs.guar_reg_loan_spread,
            Basis::Current => &inputs.curr_reg_loan_spread,
            Basis::Midpoint => unreachable!(),
        };
        let (annual, _monthly) =
            convert_vector(&published_rate, spread, &floor, &fee, SpreadMethod::EffectiveAnnual, &inputs.interest_rounding)?;
        reg_loan_cred.insert((RatePeriod::Annual, basis), annual);

        if inputs.need_pref_loan_rates {
            let decr = &inputs.pref_loan_rate_decr;
            let pref_due: Vec<f64> = published_rate.iter().zip(decr.iter()).map(|(r, d)| r - d).collect();
            pref_loan_due.insert((RatePeriod::Annual, basis), pref_due.clone());

            let pref_spread = match basis {
                Basis::Guaranteed => &inputs.guar_pref_loan_spread,
                Basis::Current => &inputs.curr_pref_loan_spread,
                Basis::Midpoint => unreachable!(),
            };
            let (pref_annual, _pref_monthly) =
                convert_vector(&pref_due, pref_spread, &floor, &fee, SpreadMethod::EffectiveAnnual, &inputs.interest_rounding)?;
            pref_loan_cred.insert((RatePeriod::Annual, basis), pref_annual);
        }
    }

    if inputs.need_midpoint_rates {
        let guar_due = reg_loan_due.get(&(RatePeriod::Annual, Basis::Guaranteed)).unwrap().clone();
        let curr_due = reg_loan_due.get(&(RatePeriod::Annual, Basis::Current)).unwrap().clone();
        reg_loan_due.insert((RatePeriod::Annual, Basis::Midpoint), midpoint(&guar_due, &curr_due));

        let guar_cred = reg_loan_cred.get(&(RatePeriod::Annual, Basis::Guaranteed)).unwrap().clone();
        let curr_cred = reg_loan_cred.get(&(RatePeriod::Annual, Basis::Current)).unwrap().clone();
        reg_loan_cred.insert((RatePeriod::Annual, Basis::Midpoint), midpoint(&guar_cred, &curr_cred));

        if inputs.need_pref_loan_rates {
            let guar_due = pref_loan_due.get(&(RatePeriod::Annual, Basis::Guaranteed)).unwrap().clone();
            let curr_due = pref_loan_due.get(&(RatePeriod::Annual, Basis::Current)).unwrap().clone();
            pref_loan_due.insert((RatePeriod::Annual, Basis::Midpoint), midpoint(&guar_due, &curr_due));

            let guar_cred = pref_loan_cred.get(&(RatePeriod::Annual, Basis::Guaranteed)).unwrap().clone();
            let curr_cred = pref_loan_cred.get(&(RatePeriod::Annual, Basis::Current)).unwrap().clone();
            pref_loan_cred.insert((RatePeriod::Annual, Basis::Midpoint), midpoint(&guar_cred, &curr_cred));
        }
    }

    // 6. Honeymoon basis.
    let mut honeymoon_value = PeriodBasisVector::new();
    let mut post_honeymoon = PeriodBasisVector::new();
    if inputs.need_honeymoon_rates {
        if inputs.gen_acct_rate_type != GenAcctRateType::Credited {
            return Err(CoreError::config(
                "honeymoon rates require a credited-rate general account product",
            ));
        }
        let zero_floor = zeros(n);
        for &basis in &Basis::ALL {
            let gen_net = gen_acct_net_annual.get(&basis).unwrap();
            let guar_gross_ref = gen_acct_gross.get(&Basis::Guaranteed).unwrap();

            let (hv_annual, _) = convert_vector(
                gen_net,
                &inputs.honeymoon_value_spread,
                &zero_floor,
                &fee,
                SpreadMethod::EffectiveAnnual,
                &inputs.interest_rounding,
            )?;
            honeymoon_value.insert((RatePeriod::Annual, basis), hv_annual);

            let (ph_annual, _) = convert_vector(
                gen_net,
                &inputs.post_honeymoon_spread,
                guar_gross_ref,
                &fee,
                SpreadMethod::EffectiveAnnual,
                &inputs.interest_rounding,
            )?;
            post_honeymoon.insert((RatePeriod::Annual, basis), ph_annual);
        }
    }

    Ok(InterestRateBundle {
        gen_acct_gross,
        gen_acct_net_annual,
        gen_acct_net_monthly,
        sep_acct_gross,
        sep_acct_net,
        reg_loan_due,
        reg_loan_cred,
        pref_loan_due,
        pref_loan_cred,
        honeymoon_value,
        post_honeymoon,
    })
}

/// Dynamic sep-acct recompute (§4.5 item 7): recompute sep-acct net for a
/// single (basis, sep_basis, duration) by adding caller-supplied
/// delta-charges to the baseline gross rate and rerunning conversion.
/// Fatal for midpoint basis or net sep-acct rate-type, matching the
/// source's rejection of both.
pub fn recompute_sep_acct_net(
    bundle: &mut InterestRateBundle,
    basis: Basis,
    sep_basis: SepAcctBasis,
    duration: usize,
    gross: f64,
    base_charges: f64,
    delta_charges: f64,
    rate_type: SepAcctRateType,
    rounding: &RoundingRule,
) -> Result<(), CoreError> {
    if basis == Basis::Midpoint {
        return Err(CoreError::config("dynamic sep-acct recompute does not support midpoint basis"));
    }
    if rate_type == SepAcctRateType::Net {
        return Err(CoreError::config("dynamic sep-acct recompute does not support net sep-acct rate-type"));
    }

    let fee = base_charges + delta_charges;
    let (_annual, monthly) = convert_vector(&[gross], &[0.0], &[-1.0], &[fee], SpreadMethod::EffectiveAnnual, rounding)?;

    let vector = bundle
        .sep_acct_net
        .get_mut(&(RatePeriod::Monthly, basis, sep_basis))
        .ok_or_else(|| CoreError::config("sep-acct net vector not initialized for this coordinate"))?;
    if duration >= vector.len() {
        return Err(CoreError::domain(format!(
            "duration {duration} out of range for sep-acct net vector of length {}",
            vector.len()
        )));
    }
    vector[duration] = monthly[0];
    Ok(())
}
