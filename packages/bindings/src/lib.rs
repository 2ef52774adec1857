use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Loan amortization
// ---------------------------------------------------------------------------

/// Form-level calculation: `null` when the inputs are not usable, so the
/// page can keep showing its previous figures.
#[napi]
pub fn calculate_loan(input_json: String) -> NapiResult<Option<String>> {
    let input: lending_core::lending::amortization::LoanInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    lending_core::lending::amortization::calculate(&input)
        .map(|result| serde_json::to_string(&result).map_err(to_napi_error))
        .transpose()
}

#[napi]
pub fn analyze_loan(input_json: String) -> NapiResult<String> {
    let input: lending_core::lending::amortization::LoanRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        lending_core::lending::amortization::analyze_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: lending_core::lending::schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        lending_core::lending::schedule::build_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_affordability(input_json: String) -> NapiResult<String> {
    let input: lending_core::lending::affordability::AffordabilityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lending_core::lending::affordability::calculate_affordability(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Format an amount (decimal string) in the given currency code.
#[napi]
pub fn format_money(amount: String, currency: String) -> NapiResult<String> {
    let amount: rust_decimal::Decimal = amount.trim().parse().map_err(to_napi_error)?;
    let currency: lending_core::Currency = currency.parse().map_err(to_napi_error)?;
    Ok(lending_core::display::format_money(amount, &currency))
}
