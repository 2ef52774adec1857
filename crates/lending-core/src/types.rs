use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::LendingResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%).
pub type Rate = Decimal;

/// Rates and ratios expressed as percentages (13 = 13%). Loan forms are
/// filled in percent, so inputs and the LTV ratio keep that convention.
pub type Percent = Decimal;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    TZS,
    USD,
    EUR,
    GBP,
    KES,
    UGX,
    JPY,
    Other(String),
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &str {
        match self {
            Currency::TZS => "TZS",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::KES => "KES",
            Currency::UGX => "UGX",
            Currency::JPY => "JPY",
            Currency::Other(code) => code,
        }
    }

    /// Prefix used when rendering amounts.
    pub fn symbol(&self) -> String {
        match self {
            Currency::USD => "$".into(),
            Currency::EUR => "€".into(),
            Currency::GBP => "£".into(),
            Currency::JPY => "¥".into(),
            Currency::KES => "KSh ".into(),
            other => format!("{} ", other.code()),
        }
    }

    /// Decimal places shown for amounts. Shilling-denominated figures
    /// are displayed whole.
    pub fn display_places(&self) -> u32 {
        match self {
            Currency::TZS | Currency::UGX | Currency::JPY => 0,
            _ => 2,
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        match code.as_str() {
            "TZS" => Ok(Currency::TZS),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "KES" => Ok(Currency::KES),
            "UGX" => Ok(Currency::UGX),
            "JPY" => Ok(Currency::JPY),
            c if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
                Ok(Currency::Other(c.to_string()))
            }
            _ => Err(format!("'{s}' is not a three-letter currency code")),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata. Fails if the
/// assumptions cannot be represented as JSON.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> LendingResult<ComputationOutput<T>> {
    Ok(ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions)?,
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_known_and_other() {
        assert_eq!("tzs".parse::<Currency>().unwrap(), Currency::TZS);
        assert_eq!(" usd ".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(
            "RWF".parse::<Currency>().unwrap(),
            Currency::Other("RWF".into())
        );
        assert!("shilling".parse::<Currency>().is_err());
    }

    #[test]
    fn test_metadata_carries_assumptions() {
        let out = with_metadata("Test", &Currency::USD, vec![], 7, 1u32).unwrap();
        assert_eq!(out.assumptions, serde_json::json!("USD"));
        assert_eq!(out.metadata.computation_time_us, 7);
    }

    #[test]
    fn test_unrepresentable_assumptions_are_a_serialization_error() {
        // JSON object keys must be strings.
        let mut assumptions = std::collections::BTreeMap::new();
        assumptions.insert((1u8, 2u8), "pair key");
        assert!(matches!(
            with_metadata("Test", &assumptions, vec![], 0, ()),
            Err(crate::LendingError::SerializationError(_))
        ));
    }

    #[test]
    fn test_default_currency_is_shilling() {
        assert_eq!(Currency::default(), Currency::TZS);
        assert_eq!(Currency::default().display_places(), 0);
    }
}
