//! Fixed-rate, fixed-term loan amortization against a collateral asset.
//!
//! `calculate` is the pure form-level entry point: it yields no result when
//! the inputs are not usable. `analyze_loan` runs the same calculation for
//! programmatic callers and reports why inputs were rejected. All math in
//! `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::display::{format_money, format_percent};
use crate::error::LendingError;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Percent, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Loans above this share of the property value fall outside lending guidance.
pub const LTV_GUIDANCE_PERCENT: Percent = dec!(70);

/// Terms beyond this many years are flagged in analysis warnings.
const LONG_TERM_WARNING_YEARS: i32 = 30;

const MONTHS_PER_YEAR: i32 = 12;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Loan request as entered on the calculator form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Appraised value of the collateral.
    pub property_value: Money,
    /// Principal requested.
    pub loan_amount: Money,
    /// Nominal annual interest rate in percent (13 = 13%).
    pub annual_rate_percent: Percent,
    /// Loan duration in whole years.
    pub term_years: i32,
}

/// Loan input plus the currency the figures should be displayed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    #[serde(flatten)]
    pub loan: LoanInput,
    #[serde(default)]
    pub currency: Currency,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Derived loan figures. Recomputed from scratch on every input change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResult {
    /// Fixed payment due each month.
    pub monthly_payment: Money,
    /// Interest paid over the full term.
    pub total_interest: Money,
    /// Sum of all monthly payments.
    pub total_amount: Money,
    /// Loan amount as a percentage of property value.
    pub loan_to_value_ratio: Percent,
}

/// Formatted figures for display alongside the raw result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDisplay {
    pub monthly_payment: String,
    pub total_interest: String,
    pub total_amount: String,
    pub loan_to_value_ratio: String,
}

/// Full analysis output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanAnalysis {
    #[serde(flatten)]
    pub result: LoanResult,
    pub term_months: u32,
    /// Periodic rate as a decimal (0.0108 = 1.08% a month).
    pub monthly_rate: Rate,
    pub within_ltv_guidance: bool,
    pub display: LoanDisplay,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the amortized loan figures, or nothing when the inputs are not
/// usable (non-positive property value, loan amount or term, or a negative
/// rate).
pub fn calculate(input: &LoanInput) -> Option<LoanResult> {
    match compute_loan(input) {
        Ok(result) => Some(result),
        Err(e) => {
            debug!(error = %e, "loan inputs rejected, no result");
            None
        }
    }
}

/// Analyse a loan request, reporting invalid inputs as errors.
pub fn analyze_loan(request: &LoanRequest) -> LendingResult<ComputationOutput<LoanAnalysis>> {
    let start = Instant::now();
    let input = &request.loan;

    let terms = LoanTerms::from_input(input)?;
    let result = compute_loan(input)?;

    let mut warnings: Vec<String> = Vec::new();
    let within_ltv_guidance = result.loan_to_value_ratio <= LTV_GUIDANCE_PERCENT;
    if !within_ltv_guidance {
        warn!(
            ltv = %result.loan_to_value_ratio,
            "loan-to-value above lending guidance"
        );
        warnings.push(format!(
            "Loan-to-value of {} exceeds the {}% guidance",
            format_percent(result.loan_to_value_ratio, 2),
            LTV_GUIDANCE_PERCENT
        ));
    }
    if input.term_years > LONG_TERM_WARNING_YEARS {
        warnings.push(format!(
            "Term of {} years is unusually long for a collateral-backed loan",
            input.term_years
        ));
    }
    if terms.monthly_rate.is_zero() {
        warnings.push("Zero interest rate: principal is repaid straight-line".into());
    }

    let display = LoanDisplay {
        monthly_payment: format_money(result.monthly_payment, &request.currency),
        total_interest: format_money(result.total_interest, &request.currency),
        total_amount: format_money(result.total_amount, &request.currency),
        loan_to_value_ratio: format_percent(result.loan_to_value_ratio, 2),
    };

    debug!(
        term_months = terms.term_months,
        monthly_payment = %result.monthly_payment,
        "loan analysed"
    );

    let output = LoanAnalysis {
        result,
        term_months: terms.term_months,
        monthly_rate: terms.monthly_rate,
        within_ltv_guidance,
        display,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Fixed-Rate Level-Payment Amortization",
        request,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Rate and term of a loan, converted to monthly periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoanTerms {
    pub monthly_rate: Rate,
    pub term_months: u32,
}

impl LoanTerms {
    pub(crate) fn new(annual_rate_percent: Percent, term_years: i32) -> LendingResult<Self> {
        if term_years <= 0 {
            return Err(LendingError::invalid(
                "term_years",
                "Term must be at least one year",
            ));
        }
        if annual_rate_percent < Decimal::ZERO {
            return Err(LendingError::invalid(
                "annual_rate_percent",
                "Interest rate cannot be negative",
            ));
        }
        let term_months = term_years
            .checked_mul(MONTHS_PER_YEAR)
            .and_then(|months| u32::try_from(months).ok())
            .ok_or_else(|| LendingError::overflow("term in months"))?;

        Ok(Self {
            monthly_rate: annual_rate_percent / dec!(100) / Decimal::from(MONTHS_PER_YEAR),
            term_months,
        })
    }

    fn from_input(input: &LoanInput) -> LendingResult<Self> {
        if input.property_value <= Decimal::ZERO {
            return Err(LendingError::invalid(
                "property_value",
                "Property value must be positive",
            ));
        }
        if input.loan_amount <= Decimal::ZERO {
            return Err(LendingError::invalid(
                "loan_amount",
                "Loan amount must be positive",
            ));
        }
        Self::new(input.annual_rate_percent, input.term_years)
    }

    /// Level monthly payment that retires `principal` over the term.
    pub(crate) fn level_payment(&self, principal: Money) -> LendingResult<Money> {
        time_value::pmt(self.monthly_rate, self.term_months, principal, Decimal::ZERO)
            .map(|payment| -payment)
    }
}

/// Loan amount as a percentage of the property value.
pub(crate) fn loan_to_value(loan_amount: Money, property_value: Money) -> LendingResult<Percent> {
    loan_amount
        .checked_div(property_value)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| LendingError::overflow("loan-to-value ratio"))
}

fn compute_loan(input: &LoanInput) -> LendingResult<LoanResult> {
    let terms = LoanTerms::from_input(input)?;

    let monthly_payment = terms.level_payment(input.loan_amount)?;
    let total_amount = monthly_payment
        .checked_mul(Decimal::from(terms.term_months))
        .ok_or_else(|| LendingError::overflow("total repayment"))?;
    let total_interest = total_amount - input.loan_amount;

    Ok(LoanResult {
        monthly_payment,
        total_interest,
        total_amount,
        loan_to_value_ratio: loan_to_value(input.loan_amount, input.property_value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn property_loan() -> LoanInput {
        LoanInput {
            property_value: dec!(10_000_000),
            loan_amount: dec!(7_000_000),
            annual_rate_percent: dec!(13),
            term_years: 3,
        }
    }

    fn request(loan: LoanInput) -> LoanRequest {
        LoanRequest {
            loan,
            currency: Currency::TZS,
        }
    }

    #[test]
    fn test_three_year_property_loan() {
        let out = calculate(&property_loan()).unwrap();

        // Closed form: 235,857.66 a month; quoted figures are within 0.1%.
        assert_close(out.monthly_payment, dec!(235857.66), dec!(0.01), "payment");
        assert_close(out.monthly_payment, dec!(235892), dec!(236), "quoted payment");
        assert_close(out.total_amount, dec!(8492112), dec!(8492), "quoted total");
        assert_close(out.total_interest, dec!(1492112), dec!(1492), "quoted interest");
        assert_eq!(out.loan_to_value_ratio, dec!(70));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let mut input = property_loan();
        input.annual_rate_percent = Decimal::ZERO;
        let out = calculate(&input).unwrap();

        assert_eq!(out.monthly_payment, dec!(7_000_000) / dec!(36));
        assert_close(out.total_interest, Decimal::ZERO, dec!(0.000001), "interest");
    }

    #[test]
    fn test_amortization_identities() {
        let input = LoanInput {
            property_value: dec!(450_000),
            loan_amount: dec!(100_000),
            annual_rate_percent: dec!(6),
            term_years: 30,
        };
        let out = calculate(&input).unwrap();

        assert_close(out.monthly_payment, dec!(599.55), dec!(0.01), "payment");
        assert_eq!(out.total_amount, out.monthly_payment * dec!(360));
        assert_eq!(out.total_interest, out.total_amount - input.loan_amount);
        assert_eq!(
            out.loan_to_value_ratio,
            input.loan_amount / input.property_value * dec!(100)
        );
    }

    #[test]
    fn test_non_positive_inputs_produce_no_result() {
        let mut input = property_loan();
        input.property_value = Decimal::ZERO;
        assert_eq!(calculate(&input), None);

        let mut input = property_loan();
        input.loan_amount = dec!(-1);
        assert_eq!(calculate(&input), None);

        let mut input = property_loan();
        input.term_years = 0;
        assert_eq!(calculate(&input), None);

        let mut input = property_loan();
        input.term_years = -5;
        assert_eq!(calculate(&input), None);
    }

    #[test]
    fn test_negative_rate_produces_no_result() {
        let mut input = property_loan();
        input.annual_rate_percent = dec!(-2);
        assert_eq!(calculate(&input), None);
    }

    #[test]
    fn test_overflowing_term_produces_no_result() {
        let mut input = property_loan();
        input.term_years = i32::MAX;
        assert_eq!(calculate(&input), None);
    }

    #[test]
    fn test_extreme_rate_produces_no_result() {
        let mut input = property_loan();
        input.annual_rate_percent = dec!(380);
        input.term_years = 20;
        assert_eq!(calculate(&input), None);

        for rate in 376..=383 {
            input.annual_rate_percent = Decimal::from(rate);
            assert_eq!(calculate(&input), None, "rate {rate}%");
        }
    }

    #[test]
    fn test_analyze_reports_extreme_rate_overflow() {
        let mut input = property_loan();
        input.annual_rate_percent = dec!(380);
        input.term_years = 20;
        assert!(matches!(
            analyze_loan(&request(input)),
            Err(LendingError::Overflow { .. })
        ));
    }

    #[test]
    fn test_longer_term_lowers_payment_raises_interest() {
        let short = calculate(&property_loan()).unwrap();
        let mut input = property_loan();
        input.term_years = 4;
        let long = calculate(&input).unwrap();

        assert!(long.monthly_payment < short.monthly_payment);
        assert!(long.total_interest > short.total_interest);
    }

    #[test]
    fn test_analyze_reports_failed_precondition() {
        let mut input = property_loan();
        input.loan_amount = Decimal::ZERO;
        match analyze_loan(&request(input)) {
            Err(LendingError::InvalidInput { field, .. }) => assert_eq!(field, "loan_amount"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }

        let mut input = property_loan();
        input.term_years = 0;
        match analyze_loan(&request(input)) {
            Err(LendingError::InvalidInput { field, .. }) => assert_eq!(field, "term_years"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_analyze_within_guidance() {
        let out = analyze_loan(&request(property_loan())).unwrap();

        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
        assert!(out.result.within_ltv_guidance);
        assert_eq!(out.result.term_months, 36);
        assert_eq!(out.result.display.monthly_payment, "TZS 235,858");
        assert_eq!(out.result.display.loan_to_value_ratio, "70.00%");
        assert_eq!(
            out.result.result,
            calculate(&property_loan()).unwrap()
        );
    }

    #[test]
    fn test_analyze_warns_above_ltv_guidance() {
        let mut input = property_loan();
        input.loan_amount = dec!(8_000_000);
        let out = analyze_loan(&request(input)).unwrap();

        assert!(!out.result.within_ltv_guidance);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("80.00%"));
    }

    #[test]
    fn test_analyze_warns_on_long_term_and_zero_rate() {
        let mut input = property_loan();
        input.term_years = 35;
        input.annual_rate_percent = Decimal::ZERO;
        let out = analyze_loan(&request(input)).unwrap();

        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_request_json_shape() {
        let json = r#"{
            "property_value": "10000000",
            "loan_amount": 7000000,
            "annual_rate_percent": 13,
            "term_years": 3,
            "currency": "USD"
        }"#;
        let req: LoanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.loan, property_loan());
        assert_eq!(req.currency, Currency::USD);

        let out = analyze_loan(&req).unwrap();
        assert_eq!(out.result.display.monthly_payment, "$235,857.66");
    }

    #[test]
    fn test_request_currency_defaults_to_shilling() {
        let json = r#"{"property_value": 1, "loan_amount": 1, "annual_rate_percent": 1, "term_years": 1}"#;
        let req: LoanRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.currency, Currency::TZS);
    }
}
