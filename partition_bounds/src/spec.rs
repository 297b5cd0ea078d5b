//! Raw, per-partition bound declarations as stored by the catalog.

use crate::{Error, Result};
use partition_key::{Datum, PartitionKey, PartitionStrategy};
use serde::{Deserialize, Serialize};

/// One endpoint value of a declared range bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeDatumSpec {
    Value(Datum),
    /// Unbounded in the direction of the endpoint: negative infinity in a lower bound, positive
    /// infinity in an upper bound.
    Unbounded,
}

impl From<Datum> for RangeDatumSpec {
    fn from(value: Datum) -> Self {
        Self::Value(value)
    }
}

/// The bound a single partition was declared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionBoundSpec {
    /// `FOR VALUES IN (...)`. `None` is the null marker.
    List { values: Vec<Option<Datum>> },
    /// `FOR VALUES FROM (lower) TO (upper)`, lower inclusive, upper exclusive.
    Range {
        lower: Vec<RangeDatumSpec>,
        upper: Vec<RangeDatumSpec>,
    },
}

impl PartitionBoundSpec {
    pub fn list(values: impl IntoIterator<Item = Option<Datum>>) -> Self {
        Self::List {
            values: values.into_iter().collect(),
        }
    }

    pub fn range(
        lower: impl IntoIterator<Item = RangeDatumSpec>,
        upper: impl IntoIterator<Item = RangeDatumSpec>,
    ) -> Self {
        Self::Range {
            lower: lower.into_iter().collect(),
            upper: upper.into_iter().collect(),
        }
    }

    pub fn strategy(&self) -> PartitionStrategy {
        match self {
            Self::List { .. } => PartitionStrategy::List,
            Self::Range { .. } => PartitionStrategy::Range,
        }
    }

    /// Fail with [`Error::StrategyMismatch`] unless this bound was declared for `key`'s strategy.
    pub(crate) fn ensure_strategy(&self, key: &PartitionKey) -> Result<()> {
        if self.strategy() != key.strategy() {
            return Err(Error::StrategyMismatch {
                key: key.strategy(),
                bound: self.strategy(),
            });
        }
        Ok(())
    }
}

/// Check a finite bound value against the type of key column `column`.
pub(crate) fn check_datum(key: &PartitionKey, column: usize, value: &Datum) -> Result<()> {
    let expected = key.data_type(column);
    let actual = value.data_type();
    if expected != actual {
        return Err(Error::DatumTypeMismatch {
            column,
            value: value.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}
