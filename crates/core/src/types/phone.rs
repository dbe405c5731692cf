//! Ukrainian mobile phone numbers.
//!
//! The shipping carrier only accepts national numbers, so every recipient
//! phone is normalised to the `+380XXXXXXXXX` form before it is stored.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input has no digits at all.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits and separators.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The digits don't form a `+380` number.
    #[error("phone number must look like +380XXXXXXXXX")]
    InvalidFormat,
}

/// A normalised `+380XXXXXXXXX` phone number.
///
/// ```
/// use brewmart_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("(067) 123-45-67").unwrap();
/// assert_eq!(phone.as_str(), "+380671234567");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of digits after the `380` country code.
    const SUBSCRIBER_DIGITS: usize = 9;

    /// Parse and normalise a phone number.
    ///
    /// Spaces, dashes, dots and parentheses are ignored. Accepts
    /// `+380XXXXXXXXX`, `380XXXXXXXXX` and the national `0XXXXXXXXX` form.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input can't be normalised.
    pub fn parse(input: &str) -> Result<Self, PhoneError> {
        let mut digits = String::with_capacity(input.len());
        for (i, c) in input.trim().chars().enumerate() {
            match c {
                '0'..='9' => digits.push(c),
                '+' if i == 0 => {}
                ' ' | '-' | '(' | ')' | '.' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        if digits.is_empty() {
            return Err(PhoneError::Empty);
        }

        let subscriber = if let Some(rest) = digits.strip_prefix("380") {
            rest
        } else if let Some(rest) = digits.strip_prefix('0') {
            rest
        } else {
            return Err(PhoneError::InvalidFormat);
        };

        if subscriber.len() != Self::SUBSCRIBER_DIGITS {
            return Err(PhoneError::InvalidFormat);
        }

        Ok(Self(format!("+380{subscriber}")))
    }

    /// Returns the normalised number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalises_all_accepted_forms() {
        for input in [
            "+380671234567",
            "380671234567",
            "0671234567",
            "+38 (067) 123-45-67",
            "067.123.45.67",
        ] {
            let phone = PhoneNumber::parse(input).expect(input);
            assert_eq!(phone.as_str(), "+380671234567", "input: {input}");
        }
    }

    #[test]
    fn test_rejects_invalid_numbers() {
        assert_eq!(PhoneNumber::parse(""), Err(PhoneError::Empty));
        assert_eq!(PhoneNumber::parse("()"), Err(PhoneError::Empty));
        assert_eq!(
            PhoneNumber::parse("067-12a-45-67"),
            Err(PhoneError::InvalidCharacter('a'))
        );
        assert_eq!(
            PhoneNumber::parse("+1 555 123 4567"),
            Err(PhoneError::InvalidFormat)
        );
        assert_eq!(
            PhoneNumber::parse("06712345"),
            Err(PhoneError::InvalidFormat)
        );
    }

    #[test]
    fn test_plus_only_allowed_first() {
        assert_eq!(
            PhoneNumber::parse("0+671234567"),
            Err(PhoneError::InvalidCharacter('+'))
        );
    }
}
