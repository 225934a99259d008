//! Primitive ledger types and their descriptors.
//!
//! `Int`, `Decimal`, `Time`, `Party` and `Date` travel as JSON strings and
//! are kept as strings so no precision is lost. Their default decoders
//! only check "is a string"; see [`crate::grammar`] for the textual
//! grammars each of them documents.

use std::collections::BTreeMap;
use std::fmt;

use ledger_decode::{boolean, empty_object, string, Decoder};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::descriptor::Serializable;
use crate::grammar::GrammarError;

/// The ledger's `()` type. Encoded as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unit;

impl Serializable for Unit {
    fn decoder() -> Decoder<Self> {
        empty_object().map(|()| Unit)
    }
}

pub type Bool = bool;

impl Serializable for bool {
    fn decoder() -> Decoder<Self> {
        boolean()
    }
}

pub type Text = String;

impl Serializable for String {
    fn decoder() -> Decoder<Self> {
        string()
    }
}

pub type List<T> = Vec<T>;
pub type Optional<T> = Option<T>;
pub type TextMap<T> = BTreeMap<String, T>;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(text: impl Into<String>) -> Self {
                $name(text.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(text: String) -> Self {
                $name(text)
            }
        }

        impl From<&str> for $name {
            fn from(text: &str) -> Self {
                $name(text.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serializable for $name {
            fn decoder() -> Decoder<Self> {
                string().map($name)
            }
        }
    };
}

string_newtype!(
    /// Arbitrary-precision integer, kept as its numeral string.
    Int
);

string_newtype!(
    /// Arbitrary-precision decimal, kept as a string matching
    /// `-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?`.
    Decimal
);

string_newtype!(
    /// Timestamp in the form `YYYY-MM-DDThh:mm:ss[.ssssss]Z`.
    Time
);

string_newtype!(
    /// Party identifier matching `[A-Za-z0-9:_\- ]+`.
    Party
);

string_newtype!(
    /// Calendar date in the form `YYYY-MM-DD`.
    Date
);

// ── Typed views ─────────────────────────────────────────────────────

impl Int {
    /// The value as an `i64`, if it is a numeral that fits.
    pub fn to_i64(&self) -> Result<i64, GrammarError> {
        self.0
            .parse::<i64>()
            .map_err(|e| GrammarError::new("Int", &self.0, e.to_string()))
    }
}

impl Decimal {
    /// The value as a `rust_decimal::Decimal`. Exponent notation is accepted.
    pub fn to_decimal(&self) -> Result<rust_decimal::Decimal, GrammarError> {
        let parsed = if self.0.contains(['e', 'E']) {
            rust_decimal::Decimal::from_scientific(&self.0)
        } else {
            self.0.parse::<rust_decimal::Decimal>()
        };
        parsed.map_err(|e| GrammarError::new("Decimal", &self.0, e.to_string()))
    }
}

impl Time {
    /// The value as a UTC `OffsetDateTime`. Only the `Z` designator is accepted.
    pub fn to_offset_date_time(&self) -> Result<OffsetDateTime, GrammarError> {
        if !self.0.ends_with('Z') {
            return Err(GrammarError::new("Time", &self.0, "missing 'Z' suffix"));
        }
        OffsetDateTime::parse(&self.0, &Rfc3339)
            .map_err(|e| GrammarError::new("Time", &self.0, e.to_string()))
    }
}

impl Date {
    pub fn to_date(&self) -> Result<time::Date, GrammarError> {
        time::Date::parse(&self.0, format_description!("[year]-[month]-[day]"))
            .map_err(|e| GrammarError::new("Date", &self.0, e.to_string()))
    }
}
