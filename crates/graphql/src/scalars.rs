//! Custom GraphQL scalars.

use {
    agora_common::RecordId,
    async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value},
};

/// A row id. Accepts an integer or a numeric string, always emits an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub RecordId);

impl Id {
    #[must_use]
    pub fn get(self) -> i64 {
        self.0.get()
    }
}

impl From<i64> for Id {
    fn from(raw: i64) -> Self {
        Self(RecordId::new(raw))
    }
}

impl From<RecordId> for Id {
    fn from(id: RecordId) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[Scalar(name = "Id")]
impl ScalarType for Id {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::Number(n) => n
                .as_i64()
                .map(Id::from)
                .ok_or_else(|| InputValueError::custom(format!("{n} is not an integer id"))),
            Value::String(s) => RecordId::parse(s)
                .map(Id)
                .map_err(InputValueError::custom),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn is_valid(value: &Value) -> bool {
        matches!(value, Value::Number(_) | Value::String(_))
    }

    fn to_value(&self) -> Value {
        Value::Number(self.get().into())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn number_and_numeric_string_parse_alike() {
        let number = Id::parse(Value::Number(5.into())).expect("number");
        let string = Id::parse(Value::String(" 5".into())).expect("string");
        assert_eq!(number, string);
        assert_eq!(number.to_value(), Value::Number(5.into()));
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(Id::parse(Value::String("five".into())).is_err());
        assert!(Id::parse(Value::Boolean(true)).is_err());
        let fraction = async_graphql::Number::from_f64(1.5).expect("finite");
        assert!(Id::parse(Value::Number(fraction)).is_err());
    }
}
