//! Actuarial substrate CLI
//!
//! Thin demonstration binary: loads a product-definition file, binds a
//! single cell's lookup axes, and prints the resulting interest-rate and
//! load bundles. Not a ledger-production tool.

use std::path::PathBuf;

use clap::Parser;

use actuarial_substrate::database::loader::load_product;
use actuarial_substrate::enums::{AxisTuple, Gender, RoundingStyle, SmokingClass, State, UnderwritingBasis, UnderwritingClass};
use actuarial_substrate::input::{interest_inputs_from_database, load_inputs_from_database};
use actuarial_substrate::rounding::RoundingRule;
use actuarial_substrate::{build_interest_rates, build_loads, ProductDatabase};

#[derive(Parser, Debug)]
#[command(name = "run_cell", about = "Run the actuarial substrate for one illustration cell")]
struct Args {
    /// Path to a product-definition CSV (see src/database/loader.rs).
    #[arg(long)]
    product_file: PathBuf,

    #[arg(long, value_enum, default_value = "male")]
    gender: CliGender,

    #[arg(long, default_value_t = 45)]
    issue_age: u8,

    #[arg(long, default_value_t = 0)]
    state: u8,

    /// The insured's declared separate-account rate (annual gross), held
    /// constant across durations. Distinct from the product's MaxSepAcctRate
    /// cap in the database.
    #[arg(long, default_value_t = 0.0)]
    separate_account_rate: f64,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum CliGender {
    Male,
    Female,
    Unisex,
}

impl From<CliGender> for Gender {
    fn from(g: CliGender) -> Self {
        match g {
            CliGender::Male => Gender::Male,
            CliGender::Female => Gender::Female,
            CliGender::Unisex => Gender::Unisex,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let entities = load_product(&args.product_file)?;
    let index = AxisTuple::new(
        args.gender.into(),
        UnderwritingClass::Standard,
        SmokingClass::Nonsmoker,
        args.issue_age,
        UnderwritingBasis::Medical,
        State::new(args.state)?,
    )?;
    let db = ProductDatabase::new(entities, index)?;

    let interest_rounding = RoundingRule::new(10, RoundingStyle::ToNearest);
    let minutiae_rounding = RoundingRule::new(2, RoundingStyle::ToNearest);

    let declared_separate_account_rate = vec![args.separate_account_rate; db.length()];
    let interest_inputs = interest_inputs_from_database(
        &db,
        &declared_separate_account_rate,
        interest_rounding,
        true,
        false,
        false,
        false,
    )?;
    let load_inputs = load_inputs_from_database(&db, interest_rounding, minutiae_rounding, true)?;

    let interest_rates = build_interest_rates(&interest_inputs)?;
    let loads = build_loads(&load_inputs)?;

    println!("Actuarial substrate — cell at issue age {}", args.issue_age);
    println!("Policy length: {} years", db.length());
    println!("{:#?}", interest_rates.gen_acct_net_monthly);
    println!("{:#?}", loads.monthly_policy_fee);

    Ok(())
}
