//! Textual grammars of the string-encoded primitives, and the policy that
//! decides whether decoders enforce them.
//!
//! The default descriptors accept any string for `Int`, `Decimal`, `Time`,
//! `Party` and `Date`: the grammar is a contract on whoever produces the
//! JSON. [`GrammarPolicy::Enforced`] (or [`checked`]) turns it into a
//! decode-time check.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::descriptor::{Descriptor, Serializable};
use crate::primitives::{Date, Decimal, Int, Party, Time};

/// Environment variable read by [`GrammarPolicy::from_env`].
pub const GRAMMAR_ENV: &str = "LEDGER_JSON_GRAMMAR";

/// A string that does not follow its type's textual grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{text}' is not a valid {grammar}: {reason}")]
pub struct GrammarError {
    grammar: &'static str,
    text: String,
    reason: String,
}

impl GrammarError {
    pub fn new(grammar: &'static str, text: &str, reason: impl Into<String>) -> Self {
        GrammarError {
            grammar,
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub fn grammar(&self) -> &'static str {
        self.grammar
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Whether string-encoded primitives are checked against their grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarPolicy {
    /// Only check that the value is a JSON string.
    #[default]
    Unchecked,
    /// Also check the type's textual grammar.
    Enforced,
}

impl GrammarPolicy {
    /// Read the policy from `LEDGER_JSON_GRAMMAR`. Unset or unrecognized
    /// values give the default.
    pub fn from_env() -> Self {
        match std::env::var(GRAMMAR_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(var = GRAMMAR_ENV, value = %raw, "{}; using default", e);
                GrammarPolicy::default()
            }),
            Err(_) => GrammarPolicy::default(),
        }
    }
}

impl FromStr for GrammarPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unchecked" => Ok(GrammarPolicy::Unchecked),
            "enforced" => Ok(GrammarPolicy::Enforced),
            other => Err(format!(
                "unknown grammar policy '{}' (expected 'unchecked' or 'enforced')",
                other
            )),
        }
    }
}

/// String-encoded primitives with a documented textual grammar.
pub trait Textual: Serializable {
    /// Name used in error messages.
    const GRAMMAR: &'static str;

    fn check(text: &str) -> Result<(), GrammarError>;

    fn text(&self) -> &str;
}

static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+$").expect("grammar regex is valid"));
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .expect("grammar regex is valid")
});
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]{1,6})?Z$")
        .expect("grammar regex is valid")
});
static PARTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9:_\- ]+$").expect("grammar regex is valid"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("grammar regex is valid"));

fn check_pattern(
    grammar: &'static str,
    re: &Regex,
    text: &str,
    expected: &str,
) -> Result<(), GrammarError> {
    if re.is_match(text) {
        Ok(())
    } else {
        Err(GrammarError::new(grammar, text, format!("expected {}", expected)))
    }
}

impl Textual for Int {
    const GRAMMAR: &'static str = "Int";

    fn check(text: &str) -> Result<(), GrammarError> {
        check_pattern(Self::GRAMMAR, &INT_RE, text, "an optionally signed numeral")
    }

    fn text(&self) -> &str {
        self.as_str()
    }
}

impl Textual for Decimal {
    const GRAMMAR: &'static str = "Decimal";

    fn check(text: &str) -> Result<(), GrammarError> {
        check_pattern(Self::GRAMMAR, &DECIMAL_RE, text, "a decimal numeral")
    }

    fn text(&self) -> &str {
        self.as_str()
    }
}

impl Textual for Time {
    const GRAMMAR: &'static str = "Time";

    fn check(text: &str) -> Result<(), GrammarError> {
        check_pattern(Self::GRAMMAR, &TIME_RE, text, "YYYY-MM-DDThh:mm:ss[.ssssss]Z")?;
        Time::from(text).to_offset_date_time().map(|_| ())
    }

    fn text(&self) -> &str {
        self.as_str()
    }
}

impl Textual for Party {
    const GRAMMAR: &'static str = "Party";

    fn check(text: &str) -> Result<(), GrammarError> {
        check_pattern(
            Self::GRAMMAR,
            &PARTY_RE,
            text,
            "letters, digits, spaces, ':', '_' or '-'",
        )
    }

    fn text(&self) -> &str {
        self.as_str()
    }
}

impl Textual for Date {
    const GRAMMAR: &'static str = "Date";

    fn check(text: &str) -> Result<(), GrammarError> {
        check_pattern(Self::GRAMMAR, &DATE_RE, text, "YYYY-MM-DD")?;
        Date::from(text).to_date().map(|_| ())
    }

    fn text(&self) -> &str {
        self.as_str()
    }
}

/// A descriptor that decodes `T` and then enforces its grammar.
pub fn checked<T: Textual>() -> Descriptor<T> {
    Descriptor::new(|| {
        T::decoder().and_then(|value: T| T::check(value.text()).map(|()| value))
    })
}

/// The descriptor of `T` under `policy`.
pub fn with_policy<T: Textual>(policy: GrammarPolicy) -> Descriptor<T> {
    match policy {
        GrammarPolicy::Unchecked => Descriptor::of(),
        GrammarPolicy::Enforced => checked(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::list;
    use serde_json::json;

    #[test]
    fn test_int_grammar() {
        assert!(Int::check("0").is_ok());
        assert!(Int::check("-123456789012345678901234567890").is_ok());
        assert!(Int::check("1.0").is_err());
        assert!(Int::check("").is_err());
        assert!(Int::check("+1").is_err());
    }

    #[test]
    fn test_decimal_grammar() {
        for ok in ["0", "-1", "3.14", "1e10", "-0.5E-3", "10.0"] {
            assert!(Decimal::check(ok).is_ok(), "{} should be valid", ok);
        }
        for bad in ["01", "1.", ".5", "1.2.3", "1e", "abc", ""] {
            assert!(Decimal::check(bad).is_err(), "{} should be invalid", bad);
        }
    }

    #[test]
    fn test_time_grammar() {
        assert!(Time::check("2019-12-31T23:59:59Z").is_ok());
        assert!(Time::check("2019-12-31T23:59:59.123456Z").is_ok());
        assert!(Time::check("2019-12-31T23:59:59.1234567Z").is_err());
        assert!(Time::check("2019-12-31T23:59:59").is_err());
        assert!(Time::check("2019-13-31T23:59:59Z").is_err());
    }

    #[test]
    fn test_party_grammar() {
        assert!(Party::check("Alice").is_ok());
        assert!(Party::check("party-1::abc_def Ghi").is_ok());
        let err = Party::check("Alice!").unwrap_err();
        assert_eq!(err.grammar(), "Party");
        assert_eq!(err.text(), "Alice!");
        assert!(Party::check("").is_err());
    }

    #[test]
    fn test_date_grammar() {
        assert!(Date::check("2020-02-29").is_ok());
        assert!(Date::check("2019-02-29").is_err());
        assert!(Date::check("2019-2-28").is_err());
    }

    #[test]
    fn test_checked_descriptor_reports_path() {
        let parties = list(&checked::<Party>());
        assert!(parties.decode(&json!(["Alice", "Bob"])).is_ok());
        let err = parties.decode(&json!(["Alice", "Bob!"])).unwrap_err();
        assert_eq!(err.path().to_string(), "$[1]");
        assert!(err.message().contains("'Bob!' is not a valid Party"));
    }

    #[test]
    fn test_checked_still_requires_string() {
        let err = checked::<Int>().decode(&json!(1)).unwrap_err();
        assert_eq!(err.message(), "expected a string, got a number");
    }

    #[test]
    fn test_policy_selects_descriptor() {
        let lenient = with_policy::<Decimal>(GrammarPolicy::Unchecked);
        let strict = with_policy::<Decimal>(GrammarPolicy::Enforced);
        assert!(lenient.decode(&json!("1.2.3")).is_ok());
        assert!(strict.decode(&json!("1.2.3")).is_err());
        assert!(strict.decode(&json!("1.23")).is_ok());
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("enforced".parse::<GrammarPolicy>(), Ok(GrammarPolicy::Enforced));
        assert_eq!(" Unchecked ".parse::<GrammarPolicy>(), Ok(GrammarPolicy::Unchecked));
        assert!("strict".parse::<GrammarPolicy>().is_err());
        assert_eq!(GrammarPolicy::default(), GrammarPolicy::Unchecked);
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: GrammarPolicy = serde_json::from_value(json!("enforced")).unwrap();
        assert_eq!(policy, GrammarPolicy::Enforced);
    }
}
