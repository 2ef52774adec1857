//! Rendering of money and percentages for user-facing boundaries.
//!
//! Calculations never round; these helpers are only applied when a figure
//! is about to be shown.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Currency, Money};

/// Format an amount with the currency's symbol, display precision and
/// thousands grouping, e.g. `TZS 8,490,876` or `-$1,234.50`.
pub fn format_money(amount: Money, currency: &Currency) -> String {
    let places = currency.display_places();
    let rounded = amount.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!(
        "{sign}{}{}",
        currency.symbol(),
        group_digits(&format!("{:.*}", places as usize, rounded.abs()))
    )
}

/// Format a percentage figure (70 means 70%) with a fixed number of places.
pub fn format_percent(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}%", places as usize, rounded)
}

fn group_digits(plain: &str) -> String {
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
