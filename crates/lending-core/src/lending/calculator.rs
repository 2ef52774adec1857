//! Form session for the loan calculator.
//!
//! Keeps the raw field text as typed and the figures currently on display.
//! Editing a field never recomputes; only `calculate` does, and an attempt
//! with unusable input leaves the displayed figures untouched.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::amortization::{self, LoanInput, LoanResult};

const DEFAULT_RATE_FIELD: &str = "13";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanCalculator {
    property_value: String,
    loan_amount: String,
    interest_rate: String,
    term_years: String,
    result: Option<LoanResult>,
}

impl Default for LoanCalculator {
    fn default() -> Self {
        Self {
            property_value: String::new(),
            loan_amount: String::new(),
            interest_rate: DEFAULT_RATE_FIELD.to_string(),
            term_years: String::new(),
            result: None,
        }
    }
}

impl LoanCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_property_value(&mut self, raw: impl Into<String>) {
        self.property_value = raw.into();
    }

    pub fn set_loan_amount(&mut self, raw: impl Into<String>) {
        self.loan_amount = raw.into();
    }

    /// Annual rate in percent, as typed.
    pub fn set_interest_rate(&mut self, raw: impl Into<String>) {
        self.interest_rate = raw.into();
    }

    pub fn set_term_years(&mut self, raw: impl Into<String>) {
        self.term_years = raw.into();
    }

    pub fn property_value(&self) -> &str {
        &self.property_value
    }

    pub fn loan_amount(&self) -> &str {
        &self.loan_amount
    }

    pub fn interest_rate(&self) -> &str {
        &self.interest_rate
    }

    pub fn term_years(&self) -> &str {
        &self.term_years
    }

    /// Figures currently on display.
    pub fn result(&self) -> Option<&LoanResult> {
        self.result.as_ref()
    }

    /// The typed fields as a loan input, if every field parses.
    pub fn parsed_input(&self) -> Option<LoanInput> {
        Some(LoanInput {
            property_value: parse_amount(&self.property_value)?,
            loan_amount: parse_amount(&self.loan_amount)?,
            annual_rate_percent: parse_amount(&self.interest_rate)?,
            term_years: strip_grouping(&self.term_years).parse().ok()?,
        })
    }

    /// Recompute from the current fields. Returns the new figures, or `None`
    /// when the fields are unusable, in which case the previous figures stay
    /// on display.
    pub fn calculate(&mut self) -> Option<LoanResult> {
        let fresh = self.parsed_input().as_ref().and_then(amortization::calculate);
        match fresh {
            Some(result) => self.result = Some(result),
            None => debug!("calculator inputs incomplete, keeping previous figures"),
        }
        fresh
    }

    /// Clear every field and the displayed figures.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn strip_grouping(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != ',').collect()
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&strip_grouping(raw)).ok()
}
