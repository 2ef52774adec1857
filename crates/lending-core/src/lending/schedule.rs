//! Month-by-month amortization schedule for a level-payment loan.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::amortization::{LoanInput, LoanTerms};
use crate::error::LendingError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LendingResult;

/// Longest schedule that will be materialised (100 years of monthly rows).
pub const MAX_SCHEDULE_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(flatten)]
    pub loan: LoanInput,
    /// Due date of the first instalment; later instalments fall on the
    /// same day of each following month, clamped to month end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    /// Outstanding balance after this payment.
    pub balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    pub term_months: u32,
    /// Sum of the interest portions.
    pub total_interest: Money,
    /// Sum of all payments, including the final balancing payment.
    pub total_amount: Money,
    pub rows: Vec<ScheduleRow>,
}

/// Build the full repayment schedule. The last instalment retires whatever
/// balance remains, so the schedule always closes at exactly zero.
pub fn build_schedule(
    input: &ScheduleInput,
) -> LendingResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let loan = &input.loan;

    if loan.property_value <= Decimal::ZERO {
        return Err(LendingError::invalid(
            "property_value",
            "Property value must be positive",
        ));
    }
    if loan.loan_amount <= Decimal::ZERO {
        return Err(LendingError::invalid(
            "loan_amount",
            "Loan amount must be positive",
        ));
    }
    let terms = LoanTerms::new(loan.annual_rate_percent, loan.term_years)?;
    if terms.term_months > MAX_SCHEDULE_MONTHS {
        return Err(LendingError::invalid(
            "term_years",
            "Schedules are limited to 100 years",
        ));
    }

    let monthly_payment = terms.level_payment(loan.loan_amount)?;

    let mut rows = Vec::with_capacity(terms.term_months as usize);
    let mut balance = loan.loan_amount;
    let mut total_interest = Decimal::ZERO;
    let mut total_amount = Decimal::ZERO;

    for month in 1..=terms.term_months {
        let interest = balance * terms.monthly_rate;
        let (payment, principal) = if month == terms.term_months {
            (balance + interest, balance)
        } else {
            (monthly_payment, monthly_payment - interest)
        };

        balance -= principal;
        total_interest += interest;
        total_amount += payment;

        rows.push(ScheduleRow {
            month,
            payment_date: payment_date(input.first_payment_date, month)?,
            payment,
            interest,
            principal,
            balance,
        });
    }

    debug!(
        rows = rows.len(),
        total_interest = %total_interest,
        "amortization schedule built"
    );

    let output = AmortizationSchedule {
        monthly_payment,
        term_months: terms.term_months,
        total_interest,
        total_amount,
        rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Level-Payment Amortization Schedule",
        input,
        Vec::new(),
        elapsed,
        output,
    )
}

fn payment_date(first: Option<NaiveDate>, month: u32) -> LendingResult<Option<NaiveDate>> {
    match first {
        None => Ok(None),
        Some(date) => date
            .checked_add_months(Months::new(month - 1))
            .map(Some)
            .ok_or_else(|| {
                LendingError::DateError(format!(
                    "payment {month} falls outside the supported calendar"
                ))
            }),
    }
}
