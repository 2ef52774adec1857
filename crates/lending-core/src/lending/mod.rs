//! Collateral-backed loan calculations: fixed-payment amortization, the
//! month-by-month schedule, budget affordability and the form session
//! that drives them.

pub mod affordability;
pub mod amortization;
pub mod calculator;
pub mod schedule;
