//! Scalar values stored in partition bounds and rows.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The type of a row column or partition key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    I64,
    U64,
    F64,
    String,
    /// Nanoseconds since the epoch.
    Timestamp,
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::I64 => f.write_str("i64"),
            Self::U64 => f.write_str("u64"),
            Self::F64 => f.write_str("f64"),
            Self::String => f.write_str("string"),
            Self::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// A single non-null value.
///
/// Nulls are never represented as a [`Datum`]; rows and list declarations use `Option<Datum>`
/// so that the "null" case cannot reach a comparator.
///
/// Equality on [`Datum`] is structural (floats compare by bit pattern). It deliberately ignores
/// the partitioning comparator, see [`crate::KeyComparator`] for ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Datum {
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    String(Arc<str>),
    Timestamp(i64),
}

impl Datum {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Bool(_) => DataType::Bool,
            Self::I64(_) => DataType::I64,
            Self::U64(_) => DataType::U64,
            Self::F64(_) => DataType::F64,
            Self::String(_) => DataType::String,
            Self::Timestamp(_) => DataType::Timestamp,
        }
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Datum {}

impl Hash for Datum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::I64(v) | Self::Timestamp(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::String(v) => v.hash(state),
        }
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I64(v) | Self::Timestamp(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}

impl From<u64> for Datum {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_is_bitwise() {
        assert_eq!(Datum::F64(f64::NAN), Datum::F64(f64::NAN));
        assert_ne!(Datum::F64(0.0), Datum::F64(-0.0));
    }

    #[test]
    fn different_types_are_never_equal() {
        assert_ne!(Datum::I64(1), Datum::Timestamp(1));
        assert_ne!(Datum::I64(1), Datum::U64(1));
    }

    #[test]
    fn serde_round_trip_keeps_strings() {
        let d = Datum::string("bananas");
        let json = serde_json::to_string(&d).unwrap();
        let back: Datum = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.data_type(), DataType::String);
    }
}
