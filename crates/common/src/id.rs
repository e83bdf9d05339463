//! Numeric record identifiers.
//!
//! Clients send ids as JSON numbers or as numeric strings (`5` and `"5"`
//! address the same row). Everything that keys on an id goes through
//! [`RecordId`] so both spellings collapse to one value before comparison.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(i64);

impl RecordId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parse a loosely formatted id: surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::invalid_id(raw))
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

struct RecordIdVisitor;

impl de::Visitor<'_> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
        Ok(RecordId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
        i64::try_from(v)
            .map(RecordId)
            .map_err(|_| E::custom(format!("record id {v} is out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
        RecordId::parse(v).map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use {super::*, rstest::rstest};

    #[rstest]
    #[case("5", 5)]
    #[case(" 42 ", 42)]
    #[case("-3", -3)]
    fn parses_numeric_strings(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(RecordId::parse(raw).unwrap().get(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("5a")]
    #[case("1.5")]
    fn rejects_non_numeric(#[case] raw: &str) {
        assert!(matches!(
            RecordId::parse(raw),
            Err(Error::InvalidId { .. })
        ));
    }

    #[test]
    fn number_and_string_deserialize_to_same_id() {
        let from_number: RecordId = serde_json::from_str("7").unwrap();
        let from_string: RecordId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn serializes_as_number() {
        assert_eq!(serde_json::to_string(&RecordId::new(9)).unwrap(), "9");
    }
}
