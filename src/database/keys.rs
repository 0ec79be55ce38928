//! Database dictionary keys (`e_database_key` in the source).
//!
//! The source enumerates roughly 400 keys covering every product
//! parameter. This substrate implements the subset actually consumed by
//! the interest-rate transformer (C5), the load/charge engine (C6), and
//! product-structure queries named elsewhere in this crate — see
//! DESIGN.md for why the remainder is out of scope.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum DatabaseKey {
    // Product structure.
    DB_MaturityAge,

    // General-account interest (C5 §3).
    DB_GuarInt,
    DB_GenAcctIntBonus,
    DB_CurrIntSpread,
    DB_GuarIntSpread,
    DB_MaxGenAcctRate,
    DB_GenAcctRateType,

    // Separate-account interest (C5 §4).
    DB_GuarMandE,
    DB_CurrMandE,
    DB_MaxSepAcctRate,
    DB_SepAcctSpreadMethod,
    DB_SepAcctRateType,
    DB_AllowSepAcct,
    DB_InvestmentManagementFee,
    DB_ExtraSepAcctCharge,
    DB_AmortizedLoad,

    // Loan basis (C5 §5).
    DB_AllowPrefLoan,
    DB_FixedLoanRate,
    DB_PrefLoanRateDecr,
    DB_GuarRegLoanSpread,
    DB_CurrRegLoanSpread,
    DB_GuarPrefLoanSpread,
    DB_CurrPrefLoanSpread,

    // Honeymoon basis (C5 §6).
    DB_AllowHoneymoon,
    DB_HoneymoonValueSpread,
    DB_PostHoneymoonSpread,

    // Load/charge engine (C6).
    DB_GuarMonthlyPolFee,
    DB_CurrMonthlyPolFee,
    DB_GuarAnnualPolFee,
    DB_CurrAnnualPolFee,
    DB_GuarSpecAmtLoad,
    DB_CurrSpecAmtLoad,
    DB_TabularGuarSpecAmtLoad,
    DB_TabularCurrSpecAmtLoad,
    DB_GuarAcctValLoad,
    DB_CurrAcctValLoad,
    DB_GuarPremLoadTgt,
    DB_CurrPremLoadTgt,
    DB_GuarPremLoadExc,
    DB_CurrPremLoadExc,
    DB_GuarSalesLoadTgt,
    DB_CurrSalesLoadTgt,
    DB_GuarSalesLoadExc,
    DB_CurrSalesLoadExc,
    DB_DacTaxPremLoad,
    DB_VectorExtraCompLoad,
    DB_VectorExtraPolFee,
    DB_AssetChargeType,
    DB_PremTaxLoadRate,
    DB_PremTaxLoadMinRate,
    DB_PremTaxLoadMaxRate,
    DB_PremTaxAmortIntRate,
    DB_PremTaxAmortPeriod,
    DB_AmortizePremiumLoad,
}

impl fmt::Display for DatabaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
