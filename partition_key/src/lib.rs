//! Partition key definitions and the row values they are evaluated against.
//!
//! A [`PartitionKey`] is immutable once built: it captures, per key column, where the value comes
//! from (a plain column or an expression), its [`DataType`] and the [`KeyComparator`] that orders
//! its values. Everything that compares bounds or routes rows goes through these comparators.

use thiserror::Error;

pub mod compare;
pub mod datum;
pub mod key;
pub mod row;

pub use compare::{BuiltinComparator, Collation, KeyComparator};
pub use datum::{DataType, Datum};
pub use key::{
    KeyExpression, KeyPart, KeySource, PARTITION_MAX_KEYS, PartitionKey, PartitionStrategy,
};
pub use row::{ColumnDef, Row, RowShape, TupleConversionMap};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("partition key must have at least one column")]
    EmptyKey,

    #[error(
        "cannot use more than {} partition key columns, got {count}",
        PARTITION_MAX_KEYS
    )]
    TooManyKeyColumns { count: usize },

    #[error("list partition key must have exactly one column, got {count}")]
    ListKeyArity { count: usize },

    #[error("wrong number of partition key expressions: key has {expected}, got {actual}")]
    KeyExpressionCountMismatch { expected: usize, actual: usize },

    #[error("unexpected partition strategy: {0:?}")]
    UnknownStrategy(char),

    #[error(
        "partition key column position {position} is out of range for a row of {width} columns"
    )]
    KeyColumnOutOfRange { position: usize, width: usize },

    #[error(
        "partition key column at position {position} has type {actual}, key expects {expected}"
    )]
    KeyColumnTypeMismatch {
        position: usize,
        expected: DataType,
        actual: DataType,
    },

    #[error("column \"{0}\" specified more than once")]
    DuplicateColumn(String),

    #[error("could not convert row type: column \"{column}\" {reason}")]
    IncompatibleRowShape { column: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
