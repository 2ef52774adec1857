use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LendingError;
use crate::types::{Money, Rate};
use crate::LendingResult;

/// Compound growth factor (1 + rate)^nper, checked against decimal overflow.
pub fn growth_factor(rate: Rate, nper: u32) -> LendingResult<Decimal> {
    if rate <= -Decimal::ONE {
        return Err(LendingError::invalid(
            "rate",
            "Periodic rate must be greater than -100%",
        ));
    }
    (Decimal::ONE + rate)
        .checked_powu(u64::from(nper))
        .ok_or_else(|| LendingError::overflow("growth factor"))
}

/// Present Value
pub fn pv(rate: Rate, nper: u32, pmt: Money, fv: Money) -> LendingResult<Money> {
    let factor = growth_factor(rate, nper)?;
    if rate.is_zero() || factor == Decimal::ONE {
        return pmt
            .checked_mul(Decimal::from(nper))
            .and_then(|total| total.checked_add(fv))
            .map(|total| -total)
            .ok_or_else(|| LendingError::overflow("PV"));
    }

    let annuity_factor = (Decimal::ONE - Decimal::ONE / factor)
        .checked_div(rate)
        .ok_or_else(|| LendingError::overflow("PV annuity factor"))?;
    pmt.checked_mul(annuity_factor)
        .and_then(|annuity| annuity.checked_add(fv / factor))
        .map(|total| -total)
        .ok_or_else(|| LendingError::overflow("PV"))
}

/// Payment (PMT), spreadsheet sign convention: a positive present value
/// yields a negative payment.
pub fn pmt(rate: Rate, nper: u32, present_value: Money, future_value: Money) -> LendingResult<Money> {
    if nper == 0 {
        return Err(LendingError::invalid(
            "nper",
            "Number of periods must be > 0",
        ));
    }

    let factor = growth_factor(rate, nper)?;

    // A rate too small to move the factor at 28 digits amortises straight-line.
    if rate.is_zero() || factor == Decimal::ONE {
        return present_value
            .checked_add(future_value)
            .map(|total| -total / Decimal::from(nper))
            .ok_or_else(|| LendingError::overflow("PMT"));
    }

    let annuity_factor = (factor - Decimal::ONE)
        .checked_div(rate)
        .ok_or_else(|| LendingError::overflow("PMT annuity factor"))?;

    present_value
        .checked_mul(factor)
        .and_then(|grown| grown.checked_add(future_value))
        .and_then(|total| total.checked_div(annuity_factor))
        .map(|payment| -payment)
        .ok_or_else(|| LendingError::overflow("PMT"))
}
