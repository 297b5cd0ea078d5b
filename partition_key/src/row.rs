//! Rows, row shapes and conversion between the shapes of a parent and its partitions.
//!
//! A partition may lay out its columns differently from its parent (columns added in another
//! order, or dropped from the parent after the partition was created). Rows are therefore
//! re-indexed by column name whenever they cross from one relation's shape into another's.

use crate::{DataType, Datum, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;

/// One row, as an ordered list of nullable values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(Vec<Option<Datum>>);

impl Row {
    pub fn new(values: Vec<Option<Datum>>) -> Self {
        Self(values)
    }

    /// The value at `position`, or `None` if it is null or out of range.
    pub fn get(&self, position: usize) -> Option<&Datum> {
        self.0.get(position).and_then(Option::as_ref)
    }

    pub fn values(&self) -> &[Option<Datum>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Option<Datum>> for Row {
    fn from_iter<T: IntoIterator<Item = Option<Datum>>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renders as `(1, null, west)`.
impl Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match v {
                Some(v) => write!(f, "{v}")?,
                None => f.write_str("null")?,
            }
        }
        f.write_str(")")
    }
}

/// A named, typed column of a [`RowShape`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDef {
    name: Arc<str>,
    data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<Arc<str>>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// The physical column layout of a relation's rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowShape {
    columns: Vec<ColumnDef>,
}

impl RowShape {
    pub fn new<'a>(columns: impl IntoIterator<Item = (&'a str, DataType)>) -> Result<Self> {
        Self::from_columns(
            columns
                .into_iter()
                .map(|(name, data_type)| ColumnDef::new(name, data_type)),
        )
    }

    pub fn from_columns(columns: impl IntoIterator<Item = ColumnDef>) -> Result<Self> {
        let columns: Vec<ColumnDef> = columns.into_iter().collect();
        for (i, c) in columns.iter().enumerate() {
            if columns[..i].iter().any(|other| other.name == c.name) {
                return Err(Error::DuplicateColumn(c.name.to_string()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, position: usize) -> Option<&ColumnDef> {
        self.columns.get(position)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.as_ref() == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Re-indexes rows of one [`RowShape`] into another, matching columns by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleConversionMap {
    /// For each output column, the input column it is read from.
    attr_map: Vec<usize>,
}

impl TupleConversionMap {
    /// Build the map converting rows of shape `input` into rows of shape `output`.
    ///
    /// Returns `Ok(None)` when the two shapes are laid out identically and rows can be used
    /// without conversion. Every `output` column must exist in `input` with the same type;
    /// `input` columns missing from `output` are dropped.
    pub fn by_name(input: &RowShape, output: &RowShape) -> Result<Option<Self>> {
        let attr_map = output
            .columns
            .iter()
            .map(|out| {
                let position = input.position(out.name()).ok_or_else(|| {
                    Error::IncompatibleRowShape {
                        column: out.name().to_string(),
                        reason: "does not exist in the source row type".to_string(),
                    }
                })?;
                let found = input.columns[position].data_type;
                if found != out.data_type {
                    return Err(Error::IncompatibleRowShape {
                        column: out.name().to_string(),
                        reason: format!("has type {found} in the source but {}", out.data_type),
                    });
                }
                Ok(position)
            })
            .collect::<Result<Vec<_>>>()?;

        let identity = input.len() == output.len()
            && attr_map.iter().enumerate().all(|(i, &from)| i == from);

        Ok((!identity).then_some(Self { attr_map }))
    }

    pub fn convert(&self, row: &Row) -> Row {
        self.attr_map
            .iter()
            .map(|&from| row.0.get(from).cloned().flatten())
            .collect()
    }
}
