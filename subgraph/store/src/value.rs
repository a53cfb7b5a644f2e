use {
    crate::{Result, StoreError},
    async_graphql::Value as GraphqlValue,
    bigdecimal::{BigDecimal, num_bigint::BigInt},
    std::{
        cmp::Ordering,
        fmt::{self, Formatter},
        str::FromStr,
    },
    subgraph_schema::{EntityField, EntitySchema, FieldKind, ScalarKind},
};

/// The value of an entity attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    String(String),
    Int(i32),
    Int8(i64),
    Boolean(bool),
    BigInt(BigInt),
    BigDecimal(BigDecimal),
    Bytes(Vec<u8>),
    /// Microseconds since the UNIX epoch.
    Timestamp(i64),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Coerce a GraphQL input value into a scalar of the given kind.
    ///
    /// Big numbers, `Int8` and `Timestamp` accept both strings and numbers.
    /// `Bytes` must be `0x`-prefixed hex.
    pub fn coerce_scalar(kind: ScalarKind, value: &GraphqlValue, field: &str) -> Result<Self> {
        let invalid = |reason: String| StoreError::InvalidValue {
            field: field.to_string(),
            reason,
        };

        let mismatch = || invalid(format!("expected {kind}, found `{value}`"));

        if let GraphqlValue::Null = value {
            return Ok(Value::Null);
        }

        let coerced = match (kind, value) {
            (ScalarKind::Id | ScalarKind::String, GraphqlValue::String(s)) => {
                Value::String(s.clone())
            },
            (ScalarKind::Boolean, GraphqlValue::Boolean(b)) => Value::Boolean(*b),
            (ScalarKind::Int, GraphqlValue::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int)
                .ok_or_else(|| invalid(format!("`{n}` is not a 32-bit integer")))?,
            (ScalarKind::Int8, GraphqlValue::Number(n)) => {
                Value::Int8(n.as_i64().ok_or_else(mismatch)?)
            },
            (ScalarKind::Int8, GraphqlValue::String(s)) => {
                Value::Int8(s.parse().map_err(|_| mismatch())?)
            },
            (ScalarKind::Timestamp, GraphqlValue::Number(n)) => {
                Value::Timestamp(n.as_i64().ok_or_else(mismatch)?)
            },
            (ScalarKind::Timestamp, GraphqlValue::String(s)) => {
                Value::Timestamp(s.parse().map_err(|_| mismatch())?)
            },
            (ScalarKind::BigInt, GraphqlValue::Number(n)) => {
                Value::BigInt(BigInt::from_str(&n.to_string()).map_err(|_| mismatch())?)
            },
            (ScalarKind::BigInt, GraphqlValue::String(s)) => {
                Value::BigInt(BigInt::from_str(s).map_err(|_| mismatch())?)
            },
            (ScalarKind::BigDecimal, GraphqlValue::Number(n)) => {
                Value::BigDecimal(BigDecimal::from_str(&n.to_string()).map_err(|_| mismatch())?)
            },
            (ScalarKind::BigDecimal, GraphqlValue::String(s)) => {
                Value::BigDecimal(BigDecimal::from_str(s).map_err(|_| mismatch())?)
            },
            (ScalarKind::Bytes, GraphqlValue::String(s)) => {
                let Some(digits) = s.strip_prefix("0x") else {
                    return Err(invalid(format!("`{s}` is not 0x-prefixed hex")));
                };

                Value::Bytes(hex::decode(digits).map_err(|err| invalid(err.to_string()))?)
            },
            _ => return Err(mismatch()),
        };

        Ok(coerced)
    }

    /// Coerce a GraphQL input value into the declared type of an attribute.
    /// References are coerced into the id type of the referenced entity.
    pub fn coerce_field(
        field: &EntityField,
        value: &GraphqlValue,
        schema: &EntitySchema,
    ) -> Result<Self> {
        match value {
            GraphqlValue::Null => Ok(Value::Null),
            GraphqlValue::List(items) if field.ty.list => items
                .iter()
                .map(|item| Self::coerce_item(field, item, schema))
                .collect::<Result<_>>()
                .map(Value::List),
            _ if field.ty.list => Err(StoreError::InvalidValue {
                field: field.name.clone(),
                reason: format!("expected a list, found `{value}`"),
            }),
            _ => Self::coerce_item(field, value, schema),
        }
    }

    /// Coerce a single, non-list value of the attribute's base type.
    pub fn coerce_item(
        field: &EntityField,
        value: &GraphqlValue,
        schema: &EntitySchema,
    ) -> Result<Self> {
        match field.ty.kind {
            FieldKind::Scalar(kind) => Self::coerce_scalar(kind, value, &field.name),
            FieldKind::Entity => {
                Self::coerce_scalar(schema.reference_kind(&field.ty.name), value, &field.name)
            },
            FieldKind::Enum => {
                let name = match value {
                    GraphqlValue::Enum(name) => name.as_str(),
                    GraphqlValue::String(s) => s.as_str(),
                    GraphqlValue::Null => return Ok(Value::Null),
                    _ => {
                        return Err(StoreError::InvalidValue {
                            field: field.name.clone(),
                            reason: format!("expected {}, found `{value}`", field.ty.name),
                        });
                    },
                };

                let known = schema
                    .enum_type(&field.ty.name)
                    .is_some_and(|ty| ty.values.iter().any(|value| value == name));

                if !known {
                    return Err(StoreError::InvalidValue {
                        field: field.name.clone(),
                        reason: format!("`{name}` is not a value of {}", field.ty.name),
                    });
                }

                Ok(Value::String(name.to_string()))
            },
        }
    }

    /// The value as returned over GraphQL. Big numbers, `Int8` and
    /// `Timestamp` are strings; bytes are lowercase `0x` hex.
    pub fn to_graphql(&self) -> GraphqlValue {
        match self {
            Value::Null => GraphqlValue::Null,
            Value::String(s) => GraphqlValue::String(s.clone()),
            Value::Int(n) => GraphqlValue::from(*n),
            Value::Boolean(b) => GraphqlValue::Boolean(*b),
            Value::List(values) => GraphqlValue::List(values.iter().map(Value::to_graphql).collect()),
            Value::Int8(_)
            | Value::BigInt(_)
            | Value::BigDecimal(_)
            | Value::Bytes(_)
            | Value::Timestamp(_) => GraphqlValue::String(self.to_string()),
        }
    }

    /// Order two values of the same kind. Values of different kinds, and
    /// nulls, are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int8(a), Value::Int8(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::BigDecimal(a), Value::BigDecimal(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Int8(n) => write!(f, "{n}"),
            Value::Timestamp(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::BigInt(n) => write!(f, "{n}"),
            Value::BigDecimal(n) => write!(f, "{}", n.normalized()),
            Value::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Value::List(values) => {
                f.write_str("[")?;
                for (idx, value) in values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::BigInt(n)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, test_case::test_case};

    #[test_case(ScalarKind::BigInt, GraphqlValue::from("123456789012345678901234567890"), "123456789012345678901234567890"; "big int from string")]
    #[test_case(ScalarKind::BigInt, GraphqlValue::from(42), "42"; "big int from number")]
    #[test_case(ScalarKind::BigDecimal, GraphqlValue::from("1.500"), "1.5"; "big decimal is normalized")]
    #[test_case(ScalarKind::Int8, GraphqlValue::from("-9000000000"), "-9000000000"; "int8 from string")]
    #[test_case(ScalarKind::Timestamp, GraphqlValue::from(1_700_000_000_000_000_i64), "1700000000000000"; "timestamp from number")]
    #[test_case(ScalarKind::Bytes, GraphqlValue::from("0xDEADbeef"), "0xdeadbeef"; "bytes are printed lowercase")]
    fn coercing_scalars(kind: ScalarKind, input: GraphqlValue, expect: &str) {
        let value = Value::coerce_scalar(kind, &input, "field").unwrap();

        assert_eq!(value.to_graphql(), GraphqlValue::from(expect));
    }

    #[test_case(ScalarKind::Bytes, GraphqlValue::from("deadbeef"); "bytes without prefix")]
    #[test_case(ScalarKind::Int, GraphqlValue::from(5_000_000_000_i64); "int overflow")]
    #[test_case(ScalarKind::BigInt, GraphqlValue::from("12.5"); "fractional big int")]
    #[test_case(ScalarKind::Boolean, GraphqlValue::from("true"); "boolean from string")]
    fn rejecting_scalars(kind: ScalarKind, input: GraphqlValue) {
        assert!(Value::coerce_scalar(kind, &input, "field").is_err());
    }

    #[test]
    fn int_stays_a_number() {
        let value = Value::coerce_scalar(ScalarKind::Int, &GraphqlValue::from(7), "decimals").unwrap();

        assert_eq!(value, Value::Int(7));
        assert_eq!(value.to_graphql(), GraphqlValue::from(7));
    }

    #[test]
    fn comparing_values() {
        let small = Value::BigInt(BigInt::from(9));
        let large = Value::BigInt(BigInt::from(10));

        assert_eq!(small.compare(&large), Some(Ordering::Less));
        assert_eq!(
            Value::from("9").compare(&Value::from("10")),
            Some(Ordering::Greater)
        );
        assert_eq!(small.compare(&Value::Null), None);
        assert_eq!(small.compare(&Value::from("9")), None);
    }
}
