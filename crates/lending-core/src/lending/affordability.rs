//! Largest loan a monthly budget supports against a property.
//!
//! Two ceilings apply: the principal whose level payment equals the budget,
//! and the loan-to-value cap on the collateral. The lower one binds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::amortization::{loan_to_value, LoanTerms, LTV_GUIDANCE_PERCENT};
use crate::error::LendingError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LendingResult;

fn default_max_ltv() -> Percent {
    LTV_GUIDANCE_PERCENT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub property_value: Money,
    /// Amount the borrower can pay each month.
    pub monthly_budget: Money,
    /// Nominal annual interest rate in percent (13 = 13%).
    pub annual_rate_percent: Percent,
    pub term_years: i32,
    /// Loan-to-value ceiling in percent. Defaults to the 70% guidance.
    #[serde(default = "default_max_ltv")]
    pub max_ltv_percent: Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingConstraint {
    Budget,
    LoanToValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    /// Principal fully repaid by the budget over the term.
    pub budget_supported_loan: Money,
    /// Principal allowed by the loan-to-value ceiling.
    pub ltv_cap_loan: Money,
    pub max_loan_amount: Money,
    pub binding_constraint: BindingConstraint,
    /// Level payment on `max_loan_amount`.
    pub monthly_payment: Money,
    pub loan_to_value_ratio: Percent,
}

pub fn calculate_affordability(
    input: &AffordabilityInput,
) -> LendingResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    validate(input)?;
    let terms = LoanTerms::new(input.annual_rate_percent, input.term_years)?;

    let mut warnings: Vec<String> = Vec::new();
    if input.max_ltv_percent > LTV_GUIDANCE_PERCENT {
        warnings.push(format!(
            "LTV ceiling of {}% is above the {}% guidance",
            input.max_ltv_percent, LTV_GUIDANCE_PERCENT
        ));
    }

    let budget_supported_loan = time_value::pv(
        terms.monthly_rate,
        terms.term_months,
        -input.monthly_budget,
        Decimal::ZERO,
    )?;
    let ltv_cap_loan = input
        .property_value
        .checked_mul(input.max_ltv_percent / dec!(100))
        .ok_or_else(|| LendingError::overflow("LTV cap"))?;

    let (max_loan_amount, binding_constraint) = if budget_supported_loan <= ltv_cap_loan {
        (budget_supported_loan, BindingConstraint::Budget)
    } else {
        (ltv_cap_loan, BindingConstraint::LoanToValue)
    };

    let monthly_payment = terms.level_payment(max_loan_amount)?;
    let loan_to_value_ratio = loan_to_value(max_loan_amount, input.property_value)?;

    debug!(
        max_loan = %max_loan_amount,
        binding = ?binding_constraint,
        "affordability computed"
    );

    let output = AffordabilityOutput {
        budget_supported_loan,
        ltv_cap_loan,
        max_loan_amount,
        binding_constraint,
        monthly_payment,
        loan_to_value_ratio,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Budget and Loan-to-Value Affordability",
        input,
        warnings,
        elapsed,
        output,
    )
}

fn validate(input: &AffordabilityInput) -> LendingResult<()> {
    if input.property_value <= Decimal::ZERO {
        return Err(LendingError::invalid(
            "property_value",
            "Property value must be positive",
        ));
    }
    if input.monthly_budget <= Decimal::ZERO {
        return Err(LendingError::invalid(
            "monthly_budget",
            "Monthly budget must be positive",
        ));
    }
    if input.max_ltv_percent <= Decimal::ZERO || input.max_ltv_percent > dec!(100) {
        return Err(LendingError::invalid(
            "max_ltv_percent",
            "LTV ceiling must be within (0, 100]",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_input() -> AffordabilityInput {
        AffordabilityInput {
            property_value: dec!(10_000_000),
            monthly_budget: dec!(150_000),
            annual_rate_percent: dec!(13),
            term_years: 3,
            max_ltv_percent: dec!(70),
        }
    }

    #[test]
    fn test_budget_binds_for_small_budget() {
        let out = calculate_affordability(&base_input()).unwrap().result;

        assert_eq!(out.binding_constraint, BindingConstraint::Budget);
        assert_eq!(out.max_loan_amount, out.budget_supported_loan);
        assert_eq!(out.ltv_cap_loan, dec!(7_000_000));
        assert!(out.loan_to_value_ratio < dec!(70));
    }

    #[test]
    fn test_budget_payment_round_trip() {
        let out = calculate_affordability(&base_input()).unwrap().result;
        assert!((out.monthly_payment - dec!(150_000)).abs() < dec!(0.01));
    }

    #[test]
    fn test_ltv_binds_for_large_budget() {
        let mut input = base_input();
        input.monthly_budget = dec!(500_000);
        let out = calculate_affordability(&input).unwrap().result;

        assert_eq!(out.binding_constraint, BindingConstraint::LoanToValue);
        assert_eq!(out.max_loan_amount, dec!(7_000_000));
        assert_eq!(out.loan_to_value_ratio, dec!(70));
        assert!((out.monthly_payment - dec!(235857.66)).abs() < dec!(0.01));
    }

    #[test]
    fn test_zero_rate_budget_is_budget_times_months() {
        let mut input = base_input();
        input.annual_rate_percent = Decimal::ZERO;
        let out = calculate_affordability(&input).unwrap().result;

        assert_eq!(out.budget_supported_loan, dec!(5_400_000));
    }

    #[test]
    fn test_max_ltv_defaults_to_guidance() {
        let json = r#"{"property_value": 1000, "monthly_budget": 10, "annual_rate_percent": 5, "term_years": 1}"#;
        let input: AffordabilityInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.max_ltv_percent, dec!(70));
    }

    #[test]
    fn test_generous_ceiling_warns() {
        let mut input = base_input();
        input.max_ltv_percent = dec!(90);
        let out = calculate_affordability(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_extreme_rate_overflow_is_an_error() {
        let mut input = base_input();
        input.annual_rate_percent = dec!(380);
        input.term_years = 20;
        assert!(matches!(
            calculate_affordability(&input),
            Err(LendingError::Overflow { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut input = base_input();
        input.monthly_budget = Decimal::ZERO;
        assert!(calculate_affordability(&input).is_err());

        let mut input = base_input();
        input.max_ltv_percent = dec!(120);
        assert!(calculate_affordability(&input).is_err());

        let mut input = base_input();
        input.term_years = -1;
        assert!(calculate_affordability(&input).is_err());
    }
}
