//! Rate-table loader (C4): reads external actuarial tables by
//! (file, table-id) and projects them into durational form.

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::enums::BlendPolicy;
use crate::error::CoreError;

/// How a raw table (indexed by attained age) is projected into a
/// per-duration vector starting at `issue_age`.
///
/// The three `Reenter*` variants describe rate-reset timing that this
/// interface has no way to carry (no event-timing parameter is passed to
/// `load_table`); they are implemented as aliases of `SelectUltimate`
/// rather than invented behavior. See DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupMethod {
    AttainedAge,
    SelectUltimate,
    Frasierized,
    ReenterUponRateReset,
    ReenterNever,
    ReenterAlways,
}

/// A rate table as loaded from file: one row per attained age, optionally
/// with a select period before the attained-age rates take over.
#[derive(Debug, Clone)]
pub struct ActuarialTable {
    /// Rates indexed by attained age, 0-based from age 0.
    attained_age_rates: Vec<f64>,
    /// If `Some`, the table is select-and-ultimate: `select_rates[k]` gives
    /// the rate at the k-th select-period duration for an insured issued at
    /// `select_rates`'s own issue age; for this substrate, a single select
    /// column per issue age is carried, as loaded from file.
    select_rates: Option<Vec<f64>>,
}

impl ActuarialTable {
    pub fn attained_age(rates: Vec<f64>) -> Self {
        Self {
            attained_age_rates: rates,
            select_rates: None,
        }
    }

    pub fn select_and_ultimate(select_rates: Vec<f64>, ultimate_rates: Vec<f64>) -> Self {
        Self {
            attained_age_rates: ultimate_rates,
            select_rates: Some(select_rates),
        }
    }

    /// Project this table into a per-duration vector of length `length`,
    /// starting at `issue_age`, per `method`.
    pub fn project(
        &self,
        method: LookupMethod,
        issue_age: u8,
        length: usize,
    ) -> Result<Vec<f64>, CoreError> {
        if issue_age as usize >= self.attained_age_rates.len() {
            return Err(CoreError::data(format!(
                "issue age {issue_age} exceeds table range of {} ages",
                self.attained_age_rates.len()
            )));
        }

        let resolved = match method {
            LookupMethod::AttainedAge => method,
            LookupMethod::SelectUltimate
            | LookupMethod::Frasierized
            | LookupMethod::ReenterUponRateReset
            | LookupMethod::ReenterNever
            | LookupMethod::ReenterAlways => LookupMethod::SelectUltimate,
        };

        let mut out = Vec::with_capacity(length);
        match resolved {
            LookupMethod::AttainedAge => {
                for j in 0..length {
                    let age = issue_age as usize + j;
                    let idx = age.min(self.attained_age_rates.len() - 1);
                    out.push(self.attained_age_rates[idx]);
                }
            }
            LookupMethod::SelectUltimate => {
                let select = self.select_rates.as_ref();
                for j in 0..length {
                    let age = issue_age as usize + j;
                    let value = if j == 0 {
                        select
                            .and_then(|s| s.get(issue_age as usize))
                            .copied()
                            .unwrap_or_else(|| self.attained_age_rates[age.min(self.attained_age_rates.len() - 1)])
                    } else {
                        let idx = age.min(self.attained_age_rates.len() - 1);
                        self.attained_age_rates[idx]
                    };
                    out.push(value);
                }
            }
            _ => unreachable!("resolved method is always AttainedAge or SelectUltimate"),
        }
        Ok(out)
    }
}

/// Policies controlling whether/how `blended_table` mixes constituent
/// tables.
#[derive(Debug, Clone, Copy)]
pub struct BlendPolicies {
    pub gender: BlendPolicy,
    pub smoking: BlendPolicy,
}

/// A set of constituent tables available for blending: at minimum the
/// demographic-specific table for the current cell, plus whichever of
/// male/female and smoker/nonsmoker tables are available to blend with.
#[derive(Debug, Clone)]
pub struct BlendableTables {
    pub cell_specific: ActuarialTable,
    pub male: Option<ActuarialTable>,
    pub female: Option<ActuarialTable>,
    pub smoker: Option<ActuarialTable>,
    pub nonsmoker: Option<ActuarialTable>,

    /// The four gender/smoking cross-product tables, needed only when both
    /// axes blend at once: reading `male`/`female` alone in that case would
    /// mean never consulting the smoking axis, and vice versa.
    pub male_smoker: Option<ActuarialTable>,
    pub male_nonsmoker: Option<ActuarialTable>,
    pub female_smoker: Option<ActuarialTable>,
    pub female_nonsmoker: Option<ActuarialTable>,
}

/// Produce a per-duration rate vector, blending constituent tables when
/// the blend policy and the cell's demographics call for it.
///
/// - `must_blend` on either axis: the cell-specific table is assumed to
///   already be unisex/unismoke; fractions are ignored (see DESIGN.md
///   Open Questions for why this is preserved as-is).
/// - `can_blend` with a unisex or unismoke cell: blend the constituent
///   tables using `male_fraction`/`nonsmoker_fraction`.
/// - Otherwise: use the cell-specific table directly.
pub fn blended_table(
    tables: &BlendableTables,
    policies: BlendPolicies,
    is_unisex_cell: bool,
    is_unismoke_cell: bool,
    male_fraction: f64,
    nonsmoker_fraction: f64,
    method: LookupMethod,
    issue_age: u8,
    length: usize,
) -> Result<Vec<f64>, CoreError> {
    if policies.gender == BlendPolicy::MustBlend || policies.smoking == BlendPolicy::MustBlend {
        return tables.cell_specific.project(method, issue_age, length);
    }

    let want_gender_blend = policies.gender == BlendPolicy::CanBlend && is_unisex_cell;
    let want_smoking_blend = policies.smoking == BlendPolicy::CanBlend && is_unismoke_cell;

    if !want_gender_blend && !want_smoking_blend {
        return tables.cell_specific.project(method, issue_age, length);
    }

    let mut accumulated = vec![0.0; length];
    let mut weight_sum = 0.0;

    // Both axes blending at once requires the four cross-product tables:
    // `male`/`female` alone cannot carry a smoking weight, and `smoker`/
    // `nonsmoker` alone cannot carry a gender weight.
    let weighted_tables: Vec<(f64, Option<&ActuarialTable>)> = if want_gender_blend && want_smoking_blend {
        vec![
            (male_fraction * (1.0 - nonsmoker_fraction), tables.male_smoker.as_ref()),
            (male_fraction * nonsmoker_fraction, tables.male_nonsmoker.as_ref()),
            ((1.0 - male_fraction) * (1.0 - nonsmoker_fraction), tables.female_smoker.as_ref()),
            ((1.0 - male_fraction) * nonsmoker_fraction, tables.female_nonsmoker.as_ref()),
        ]
    } else if want_gender_blend {
        vec![
            (male_fraction, tables.male.as_ref()),
            (1.0 - male_fraction, tables.female.as_ref()),
        ]
    } else {
        vec![
            (1.0 - nonsmoker_fraction, tables.smoker.as_ref()),
            (nonsmoker_fraction, tables.nonsmoker.as_ref()),
        ]
    };

    for (weight, table) in &weighted_tables {
        let table = table.ok_or_else(|| CoreError::data("missing constituent table for blend"))?;
        let projected = table.project(method, issue_age, length)?;
        for (acc, value) in accumulated.iter_mut().zip(projected.iter()) {
            *acc += weight * value;
        }
        weight_sum += weight;
    }

    if (weight_sum - 1.0).abs() > 1e-9 {
        for value in accumulated.iter_mut() {
            *value /= weight_sum;
        }
    }

    Ok(accumulated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attained_age_projection_extends_last_rate() {
        let table = ActuarialTable::attained_age(vec![0.01, 0.02, 0.03]);
        let v = table.project(LookupMethod::AttainedAge, 1, 5).unwrap();
        assert_eq!(v, vec![0.02, 0.03, 0.03, 0.03, 0.03]);
    }

    #[test]
    fn must_blend_ignores_fractions() {
        let tables = BlendableTables {
            cell_specific: ActuarialTable::attained_age(vec![0.05; 10]),
            male: None,
            female: None,
            smoker: None,
            nonsmoker: None,
            male_smoker: None,
            male_nonsmoker: None,
            female_smoker: None,
            female_nonsmoker: None,
        };
        let policies = BlendPolicies {
            gender: BlendPolicy::MustBlend,
            smoking: BlendPolicy::CannotBlend,
        };
        let v = blended_table(&tables, policies, true, false, 0.9, 0.9, LookupMethod::AttainedAge, 0, 3).unwrap();
        assert_eq!(v, vec![0.05, 0.05, 0.05]);
    }

    #[test]
    fn blend_identity_matches_single_table_path() {
        // Testable Property 9: blended_table(..., must_blend, 0, 0) ==
        // load_table(file, id) when the cell-specific table is the single
        // source of truth.
        let cell_specific = ActuarialTable::attained_age(vec![0.07; 4]);
        let direct = cell_specific.project(LookupMethod::AttainedAge, 0, 4).unwrap();

        let tables = BlendableTables {
            cell_specific,
            male: None,
            female: None,
            smoker: None,
            nonsmoker: None,
            male_smoker: None,
            male_nonsmoker: None,
            female_smoker: None,
            female_nonsmoker: None,
        };
        let policies = BlendPolicies {
            gender: BlendPolicy::MustBlend,
            smoking: BlendPolicy::MustBlend,
        };
        let blended = blended_table(&tables, policies, false, false, 0.0, 0.0, LookupMethod::AttainedAge, 0, 4).unwrap();
        assert_eq!(blended, direct);
    }

    #[test]
    fn can_blend_mixes_gender_tables() {
        let tables = BlendableTables {
            cell_specific: ActuarialTable::attained_age(vec![0.0; 3]),
            male: Some(ActuarialTable::attained_age(vec![0.10; 3])),
            female: Some(ActuarialTable::attained_age(vec![0.02; 3])),
            smoker: None,
            nonsmoker: None,
            male_smoker: None,
            male_nonsmoker: None,
            female_smoker: None,
            female_nonsmoker: None,
        };
        let policies = BlendPolicies {
            gender: BlendPolicy::CanBlend,
            smoking: BlendPolicy::CannotBlend,
        };
        let v = blended_table(&tables, policies, true, false, 0.25, 0.0, LookupMethod::AttainedAge, 0, 3).unwrap();
        // 0.25 * 0.10 + 0.75 * 0.02 = 0.04
        for x in v {
            assert!((x - 0.04).abs() < 1e-9);
        }
    }

    #[test]
    fn can_blend_mixes_gender_and_smoking_tables_via_cross_product() {
        let tables = BlendableTables {
            cell_specific: ActuarialTable::attained_age(vec![0.0; 3]),
            male: None,
            female: None,
            smoker: None,
            nonsmoker: None,
            male_smoker: Some(ActuarialTable::attained_age(vec![0.20; 3])),
            male_nonsmoker: Some(ActuarialTable::attained_age(vec![0.10; 3])),
            female_smoker: Some(ActuarialTable::attained_age(vec![0.08; 3])),
            female_nonsmoker: Some(ActuarialTable::attained_age(vec![0.02; 3])),
        };
        let policies = BlendPolicies {
            gender: BlendPolicy::CanBlend,
            smoking: BlendPolicy::CanBlend,
        };
        let male_fraction = 0.25;
        let nonsmoker_fraction = 0.6;
        let v = blended_table(
            &tables,
            policies,
            true,
            true,
            male_fraction,
            nonsmoker_fraction,
            LookupMethod::AttainedAge,
            0,
            3,
        )
        .unwrap();
        // 0.25*0.4*0.20 + 0.25*0.6*0.10 + 0.75*0.4*0.08 + 0.75*0.6*0.02
        let expected = 0.25 * 0.4 * 0.20 + 0.25 * 0.6 * 0.10 + 0.75 * 0.4 * 0.08 + 0.75 * 0.6 * 0.02;
        for x in v {
            assert!((x - expected).abs() < 1e-9, "got {x}, expected {expected}");
        }
    }

    #[test]
    fn reenter_variants_alias_select_ultimate() {
        let table = ActuarialTable::select_and_ultimate(vec![0.0; 100], vec![0.01; 100]);
        let a = table.project(LookupMethod::SelectUltimate, 40, 5).unwrap();
        let b = table.project(LookupMethod::ReenterNever, 40, 5).unwrap();
        assert_eq!(a, b);
    }
}
