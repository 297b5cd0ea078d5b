//! The [`PartitionKey`] of a partitioned relation.

use crate::{
    BuiltinComparator, Collation, DataType, Datum, Error, KeyComparator, Result, Row, RowShape,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::Arc;

/// Upper limit on the number of columns in a partition key.
pub const PARTITION_MAX_KEYS: usize = 32;

/// How rows are divided among the partitions of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionStrategy {
    /// Each partition accepts an explicit set of discrete values.
    List,
    /// Each partition accepts a half-open interval `[lower, upper)` of key tuples.
    Range,
}

impl PartitionStrategy {
    /// The single character tag the catalog stores for this strategy.
    pub fn as_char(&self) -> char {
        match self {
            Self::List => 'l',
            Self::Range => 'r',
        }
    }
}

impl TryFrom<char> for PartitionStrategy {
    type Error = Error;

    fn try_from(tag: char) -> Result<Self> {
        match tag {
            'l' => Ok(Self::List),
            'r' => Ok(Self::Range),
            other => Err(Error::UnknownStrategy(other)),
        }
    }
}

impl Display for PartitionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Range => f.write_str("range"),
        }
    }
}

/// Computes the value of an expression key column from a row.
///
/// Evaluators must be pure: the router may evaluate the same row more than once.
pub trait KeyExpression: std::fmt::Debug + Send + Sync + 'static {
    /// Evaluate against `row`, which is laid out in the partitioned relation's own shape.
    /// Returns `None` for a null result.
    fn evaluate(&self, row: &Row) -> Option<Datum>;
}

/// Where the value of one key column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// The value of the column at this (0-based) position of the relation's row shape.
    Column(usize),
    /// The next unused evaluator in [`PartitionKey`]'s expression list.
    Expression,
}

/// One column of a [`PartitionKey`].
#[derive(Debug, Clone)]
pub struct KeyPart {
    source: KeySource,
    data_type: DataType,
    comparator: Arc<dyn KeyComparator>,
}

impl KeyPart {
    /// A key column reading the row column at `position`, ordered with the
    /// [`BuiltinComparator`] using [`Collation::Binary`].
    pub fn column(position: usize, data_type: DataType) -> Self {
        Self {
            source: KeySource::Column(position),
            data_type,
            comparator: Arc::new(BuiltinComparator::default()),
        }
    }

    /// A key column computed by an expression.
    pub fn expression(data_type: DataType) -> Self {
        Self {
            source: KeySource::Expression,
            data_type,
            comparator: Arc::new(BuiltinComparator::default()),
        }
    }

    pub fn with_collation(self, collation: Collation) -> Self {
        Self {
            comparator: Arc::new(BuiltinComparator::new(collation)),
            ..self
        }
    }

    pub fn with_comparator(self, comparator: Arc<dyn KeyComparator>) -> Self {
        Self { comparator, ..self }
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn comparator(&self) -> &Arc<dyn KeyComparator> {
        &self.comparator
    }
}

/// The partition key of a partitioned relation: its strategy and an ordered list of key
/// columns.
#[derive(Debug, Clone)]
pub struct PartitionKey {
    strategy: PartitionStrategy,
    parts: Vec<KeyPart>,
    expressions: Vec<Arc<dyn KeyExpression>>,
}

impl PartitionKey {
    /// Build a key from its parts and the evaluators for its expression parts (in the order the
    /// expression parts appear).
    pub fn new(
        strategy: PartitionStrategy,
        parts: Vec<KeyPart>,
        expressions: Vec<Arc<dyn KeyExpression>>,
    ) -> Result<Self> {
        if parts.is_empty() {
            return Err(Error::EmptyKey);
        }
        if parts.len() > PARTITION_MAX_KEYS {
            return Err(Error::TooManyKeyColumns { count: parts.len() });
        }
        if strategy == PartitionStrategy::List && parts.len() != 1 {
            return Err(Error::ListKeyArity { count: parts.len() });
        }

        let expected = parts
            .iter()
            .filter(|p| p.source == KeySource::Expression)
            .count();
        if expected != expressions.len() {
            return Err(Error::KeyExpressionCountMismatch {
                expected,
                actual: expressions.len(),
            });
        }

        Ok(Self {
            strategy,
            parts,
            expressions,
        })
    }

    /// Convenience constructor for a key made only of plain columns.
    pub fn columns(
        strategy: PartitionStrategy,
        columns: impl IntoIterator<Item = (usize, DataType)>,
    ) -> Result<Self> {
        let parts = columns
            .into_iter()
            .map(|(position, data_type)| KeyPart::column(position, data_type))
            .collect();
        Self::new(strategy, parts, vec![])
    }

    pub fn strategy(&self) -> PartitionStrategy {
        self.strategy
    }

    /// Number of key columns.
    pub fn num_columns(&self) -> usize {
        self.parts.len()
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    pub fn data_type(&self, column: usize) -> DataType {
        self.parts[column].data_type
    }

    /// Compare two values of key column `column` with that column's comparator.
    #[inline]
    pub fn compare_column(&self, column: usize, a: &Datum, b: &Datum) -> Ordering {
        self.parts[column].comparator.compare(a, b)
    }

    /// Check that the plain key columns exist in `shape` with the key's types.
    pub fn validate_against(&self, shape: &RowShape) -> Result<()> {
        for part in &self.parts {
            if let KeySource::Column(position) = part.source {
                let column = shape.column(position).ok_or(Error::KeyColumnOutOfRange {
                    position,
                    width: shape.len(),
                })?;
                if column.data_type() != part.data_type {
                    return Err(Error::KeyColumnTypeMismatch {
                        position,
                        expected: part.data_type,
                        actual: column.data_type(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Extract the key tuple of `row`: plain columns are read directly, expression columns are
    /// evaluated. `None` entries are nulls.
    pub fn form_key_datums(&self, row: &Row) -> Vec<Option<Datum>> {
        let mut expressions = self.expressions.iter();
        let datums = self
            .parts
            .iter()
            .map(|part| match part.source {
                KeySource::Column(position) => row.get(position).cloned(),
                KeySource::Expression => expressions
                    .next()
                    .expect("expression count validated at construction")
                    .evaluate(row),
            })
            .collect();
        debug_assert!(expressions.next().is_none());
        datums
    }
}
