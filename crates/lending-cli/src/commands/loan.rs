use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde_json::Value;

use lending_core::lending::affordability::{self, AffordabilityInput};
use lending_core::lending::amortization::{self, LoanInput, LoanRequest};
use lending_core::lending::schedule::{self, ScheduleInput};
use lending_core::Currency;

use crate::input;

/// Loan fields shared by the amortize and schedule commands
#[derive(Args)]
pub struct LoanFlags {
    /// Appraised value of the collateral property
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Principal requested
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Annual interest rate in percent (13 = 13%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in whole years
    #[arg(long, allow_hyphen_values = true)]
    pub term_years: Option<i32>,
}

impl LoanFlags {
    fn into_loan(self) -> Result<LoanInput, Box<dyn std::error::Error>> {
        Ok(LoanInput {
            property_value: self
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            loan_amount: self
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            annual_rate_percent: self
                .rate
                .ok_or("--rate is required (or provide --input)")?,
            term_years: self
                .term_years
                .ok_or("--term-years is required (or provide --input)")?,
        })
    }
}

/// Arguments for the loan amortization calculation
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Currency used for the formatted figures
    #[arg(long, default_value = "TZS")]
    pub currency: Currency,
}

/// Arguments for the month-by-month schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanFlags,

    /// Due date of the first instalment (YYYY-MM-DD)
    #[arg(long)]
    pub first_payment_date: Option<NaiveDate>,
}

/// Arguments for the affordability calculation
#[derive(Args)]
pub struct AffordabilityArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Appraised value of the collateral property
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Amount the borrower can pay each month
    #[arg(long)]
    pub monthly_budget: Option<Decimal>,

    /// Annual interest rate in percent (13 = 13%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in whole years
    #[arg(long, allow_hyphen_values = true)]
    pub term_years: Option<i32>,

    /// Loan-to-value ceiling in percent
    #[arg(long, default_value_t = dec!(70))]
    pub max_ltv: Decimal,
}

/// Load a typed input from `--input`, then piped stdin.
fn read_structured<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(input::file::read_input(path)?));
    }
    input::stdin::read_stdin()
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest = match read_structured(args.input.as_deref())? {
        Some(request) => request,
        None => LoanRequest {
            loan: args.loan.into_loan()?,
            currency: args.currency,
        },
    };
    let result = amortization::analyze_loan(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match read_structured(args.input.as_deref())? {
        Some(input) => input,
        None => ScheduleInput {
            loan: args.loan.into_loan()?,
            first_payment_date: args.first_payment_date,
        },
    };
    let result = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_affordability(args: AffordabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = match read_structured(args.input.as_deref())? {
        Some(input) => input,
        None => AffordabilityInput {
            property_value: args
                .property_value
                .ok_or("--property-value is required (or provide --input)")?,
            monthly_budget: args
                .monthly_budget
                .ok_or("--monthly-budget is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args
                .term_years
                .ok_or("--term-years is required (or provide --input)")?,
            max_ltv_percent: args.max_ltv,
        },
    };
    let result = affordability::calculate_affordability(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flag_is_named() {
        let flags = LoanFlags {
            property_value: Some(dec!(10_000_000)),
            loan_amount: Some(dec!(7_000_000)),
            rate: None,
            term_years: Some(3),
        };
        let err = flags.into_loan().unwrap_err();
        assert!(err.to_string().contains("--rate"));
    }

    #[test]
    fn test_flags_build_loan() {
        let flags = LoanFlags {
            property_value: Some(dec!(10_000_000)),
            loan_amount: Some(dec!(7_000_000)),
            rate: Some(dec!(13)),
            term_years: Some(3),
        };
        let loan = flags.into_loan().unwrap();
        assert_eq!(loan.annual_rate_percent, dec!(13));
        assert!(amortization::calculate(&loan).is_some());
    }
}
