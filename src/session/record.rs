//! Session record data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default value for the `hello` field.
pub const DEFAULT_HELLO: &str = "World";
/// Default value for the `goodnight` field.
pub const DEFAULT_GOODNIGHT: &str = "Moon";
/// Default value for the `count` field.
pub const DEFAULT_COUNT: u64 = 0;

/// Known fields of a [`SessionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    Hello,
    Goodnight,
    Count,
}

impl SessionField {
    /// All known fields, in display order.
    pub const ALL: [SessionField; 3] = [Self::Hello, Self::Goodnight, Self::Count];

    /// The field's name as it appears in paths and response bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Goodnight => "goodnight",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`SessionField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl FromStr for SessionField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Per-client session state.
///
/// Every field is either absent or present. Defaults are only ever applied to
/// absent fields, so a stored `0` or empty string survives
/// [`ensure_defaults`](Self::ensure_defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hello: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goodnight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl SessionRecord {
    /// Fill in defaults for absent fields, leaving present ones untouched.
    pub fn ensure_defaults(&mut self) {
        self.hello.get_or_insert_with(|| DEFAULT_HELLO.to_string());
        self.goodnight
            .get_or_insert_with(|| DEFAULT_GOODNIGHT.to_string());
        self.count.get_or_insert(DEFAULT_COUNT);
    }

    /// Increment `count` by one and return the new value.
    ///
    /// An absent count starts from [`DEFAULT_COUNT`]. Saturates instead of
    /// wrapping so the counter never goes backwards.
    pub fn increment_count(&mut self) -> u64 {
        let count = self.count.get_or_insert(DEFAULT_COUNT);
        *count = count.saturating_add(1);
        *count
    }

    #[must_use]
    pub fn hello(&self) -> &str {
        self.hello.as_deref().unwrap_or(DEFAULT_HELLO)
    }

    #[must_use]
    pub fn goodnight(&self) -> &str {
        self.goodnight.as_deref().unwrap_or(DEFAULT_GOODNIGHT)
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count.unwrap_or(DEFAULT_COUNT)
    }

    /// Look up a field as a JSON value, or `None` if it is absent.
    #[must_use]
    pub fn get(&self, field: SessionField) -> Option<Value> {
        match field {
            SessionField::Hello => self.hello.clone().map(Value::String),
            SessionField::Goodnight => self.goodnight.clone().map(Value::String),
            SessionField::Count => self.count.map(Value::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_empty_record() {
        let mut record = SessionRecord::default();
        record.ensure_defaults();

        assert_eq!(record.hello.as_deref(), Some("World"));
        assert_eq!(record.goodnight.as_deref(), Some("Moon"));
        assert_eq!(record.count, Some(0));
    }

    #[test]
    fn test_defaults_keep_present_values() {
        let mut record = SessionRecord {
            hello: Some(String::new()),
            goodnight: Some("Sun".to_string()),
            count: Some(0),
        };
        record.ensure_defaults();

        // Empty and zero values are present, not absent.
        assert_eq!(record.hello.as_deref(), Some(""));
        assert_eq!(record.goodnight.as_deref(), Some("Sun"));
        assert_eq!(record.count, Some(0));
    }

    #[test]
    fn test_increment_count() {
        let mut record = SessionRecord::default();
        assert_eq!(record.increment_count(), 1);
        assert_eq!(record.increment_count(), 2);
        assert_eq!(record.count(), 2);

        record.count = Some(u64::MAX);
        assert_eq!(record.increment_count(), u64::MAX);
    }

    #[test]
    fn test_field_lookup() {
        let mut record = SessionRecord::default();
        assert_eq!(record.get(SessionField::Hello), None);

        record.ensure_defaults();
        assert_eq!(
            record.get(SessionField::Hello),
            Some(Value::String("World".into()))
        );
        assert_eq!(record.get(SessionField::Count), Some(Value::from(0u64)));
    }

    #[test]
    fn test_parse_field() {
        assert_eq!("goodnight".parse::<SessionField>(), Ok(SessionField::Goodnight));
        assert_eq!(
            "foo".parse::<SessionField>(),
            Err(UnknownField("foo".to_string()))
        );
        // Field names are case-sensitive.
        assert!("Hello".parse::<SessionField>().is_err());
    }
}
