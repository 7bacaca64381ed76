//! Value types shared by clients, jobs, tasks and expenses.
//!
//! Constructors check their input once; records holding these types never
//! re-validate.

use std::fmt::{Display, Formatter};
use std::ops::Deref;

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when constructing a constrained value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed a domain-specific check.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Negative or non-finite money amount.
    #[error("invalid amount")]
    InvalidAmount,
}

/// Row id assigned by SQLite; always positive.
macro_rules! row_id {
    ($($name:ident),+ $(,)?) => {$(
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(i32);

        impl $name {
            /// Wraps a row id, rejecting zero and negative values.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                (value > 0)
                    .then_some(Self(value))
                    .ok_or(TypeConstraintError::NonPositiveId)
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    )+};
}

row_id!(ClientId, JobId, JobLineItemId, TaskId, ItemId, ExpenseId);

/// Text that must contain something besides whitespace; stored trimmed.
macro_rules! required_text {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {$(
        $(#[$meta])*
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Trims whitespace and rejects empty input.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(TypeConstraintError::EmptyString);
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    )+};
}

required_text!(
    /// Headline shown on job lists and invoices.
    JobTitle,
    TaskTitle,
    ExpenseTitle,
    /// Name of a priced line on a job.
    LineItemName,
);

/// Email address, trimmed and lower-cased.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let email = email.into().trim().to_lowercase();
        if !email.validate_email() {
            return Err(TypeConstraintError::InvalidEmail);
        }
        Ok(Self(email))
    }

    /// Blank input means no email; anything else must be valid.
    pub fn parse_optional(value: &str) -> Result<Option<Self>, TypeConstraintError> {
        match value.trim() {
            "" => Ok(None),
            email => Self::new(email).map(Some),
        }
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for EmailAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Free-form note text with markup stripped down to a safe subset.
///
/// Unlike the other string wrappers this one may be empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NoteText(String);

impl NoteText {
    /// Sanitizes and trims the provided text.
    pub fn new<S: Into<String>>(value: S) -> Self {
        let sanitized = ammonia::clean(&value.into());
        Self(sanitized.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NoteText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a phone number string to E.164 format.
///
/// Numbers the parser cannot place (local numbers typed without a country
/// code) are kept as entered, trimmed. Blank input yields `None`.
pub fn normalize_phone(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse(None, trimmed) {
        Ok(parsed) => Some(parsed.format().mode(Mode::E164).to_string()),
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Trims optional free text, mapping blank input to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Monetary amount that is finite and not negative.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Money(f64);

impl Money {
    pub const ZERO: Money = Money(0.0);

    /// Accepts finite, non-negative amounts.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidAmount)
        }
    }

    /// Parses user input such as `"12.50"` or `"$1,200"`.
    pub fn parse(text: &str) -> Result<Self, TypeConstraintError> {
        let cleaned: String = text
            .trim()
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | ' '))
            .collect();
        let value = cleaned
            .parse::<f64>()
            .map_err(|_| TypeConstraintError::InvalidAmount)?;
        Self::new(value)
    }

    /// Returns the raw amount.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
