use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 20;
const NSE_SUFFIX: &str = ".NS";

/// Normalized exchange ticker, always uppercase.
///
/// Provider-specific spellings (`RELIANCE.NS` for the history feed,
/// `reliance` for the live quote feed) are derived from this value by the
/// adapters and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a symbol to uppercase.
    ///
    /// A trailing `.NS` is dropped so `RELIANCE.NS` and `RELIANCE` name the
    /// same ticker. Any other `.` is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let upper = input.trim().to_ascii_uppercase();
        let normalized = upper
            .strip_suffix(NSE_SUFFIX)
            .unwrap_or(&upper)
            .trim_end()
            .to_owned();
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch: first });
            }
        }

        // NSE tickers such as M&M and BAJAJ-AUTO use '&' and '-'.
        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '-' || ch == '&';
            if !valid {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    /// Parse a comma-separated list such as `"reliance, tcs,INFY"`.
    ///
    /// Blank entries are skipped; the first invalid entry fails the whole list.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ValidationError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase spelling used by the live quote provider.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_symbol() {
        let parsed = Symbol::parse(" reliance ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "RELIANCE");
        assert_eq!(parsed.to_lowercase(), "reliance");
    }

    #[test]
    fn accepts_exchange_punctuation() {
        assert_eq!(Symbol::parse("m&m").expect("valid").as_str(), "M&M");
        assert_eq!(
            Symbol::parse("bajaj-auto").expect("valid").as_str(),
            "BAJAJ-AUTO"
        );
    }

    #[test]
    fn strips_nse_suffix_and_rejects_other_dots() {
        assert_eq!(
            Symbol::parse("reliance.ns").expect("valid").as_str(),
            "RELIANCE"
        );
        assert!(matches!(
            Symbol::parse(".NS"),
            Err(ValidationError::EmptySymbol)
        ));
        assert!(matches!(
            Symbol::parse("RELIANCE.BO"),
            Err(ValidationError::SymbolInvalidChar { ch: '.', index: 8 })
        ));
    }

    #[test]
    fn rejects_invalid_start() {
        let err = Symbol::parse("1TCS").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { .. }));
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Symbol::parse("TCS$").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidChar { .. }));
    }

    #[test]
    fn parses_comma_separated_lists() {
        let symbols = Symbol::parse_list("reliance, tcs,,INFY ").expect("valid list");
        let names = symbols.iter().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(names, vec!["RELIANCE", "TCS", "INFY"]);

        assert!(Symbol::parse_list("TCS,9X").is_err());
    }
}
