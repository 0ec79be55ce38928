//! Run the actuarial substrate for every issue age in a range, in
//! parallel. Composites across cells are external orchestration, not a
//! core responsibility — this binary is one such orchestrator.

use std::path::PathBuf;

use clap::Parser;
use rayon::prelude::*;

use actuarial_substrate::database::loader::load_product;
use actuarial_substrate::enums::{AxisTuple, Gender, RoundingStyle, SmokingClass, State, UnderwritingBasis, UnderwritingClass};
use actuarial_substrate::input::{interest_inputs_from_database, load_inputs_from_database};
use actuarial_substrate::rounding::RoundingRule;
use actuarial_substrate::{build_interest_rates, build_loads, ProductDatabase};

#[derive(Parser, Debug)]
#[command(name = "batch_cells", about = "Run the actuarial substrate across a range of issue ages")]
struct Args {
    #[arg(long)]
    product_file: PathBuf,

    #[arg(long, default_value_t = 20)]
    min_issue_age: u8,

    #[arg(long, default_value_t = 70)]
    max_issue_age: u8,
}

fn run_cell(product_file: &PathBuf, issue_age: u8) -> Result<(u8, usize, f64), String> {
    let entities = load_product(product_file).map_err(|e| e.to_string())?;
    let index = AxisTuple::new(
        Gender::Male,
        UnderwritingClass::Standard,
        SmokingClass::Nonsmoker,
        issue_age,
        UnderwritingBasis::Medical,
        State::new(0).map_err(|e| e.to_string())?,
    )
    .map_err(|e| e.to_string())?;
    let db = ProductDatabase::new(entities, index).map_err(|e| e.to_string())?;

    let interest_rounding = RoundingRule::new(10, RoundingStyle::ToNearest);
    let minutiae_rounding = RoundingRule::new(2, RoundingStyle::ToNearest);

    let declared_separate_account_rate = vec![0.0; db.length()];
    let interest_inputs =
        interest_inputs_from_database(&db, &declared_separate_account_rate, interest_rounding, false, false, false, false)
            .map_err(|e| e.to_string())?;
    let load_inputs =
        load_inputs_from_database(&db, interest_rounding, minutiae_rounding, false).map_err(|e| e.to_string())?;

    let interest_rates = build_interest_rates(&interest_inputs).map_err(|e| e.to_string())?;
    let loads = build_loads(&load_inputs).map_err(|e| e.to_string())?;

    let first_year_net = interest_rates
        .gen_acct_net_monthly
        .get(&actuarial_substrate::enums::Basis::Current)
        .and_then(|v| v.first())
        .copied()
        .unwrap_or(0.0);
    let _ = &loads;

    Ok((issue_age, db.length(), first_year_net))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let ages: Vec<u8> = (args.min_issue_age..=args.max_issue_age).collect();
    let results: Vec<_> = ages
        .par_iter()
        .map(|&age| run_cell(&args.product_file, age))
        .collect();

    for result in results {
        match result {
            Ok((age, length, rate)) => {
                println!("issue_age={age} policy_length={length} first_year_net_monthly={rate:.10}");
            }
            Err(e) => log::error!("cell failed: {e}"),

        }
    }

    Ok(())
}
