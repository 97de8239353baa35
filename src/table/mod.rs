//! Column-oriented data tables.
//!
//! A [`Table`] is the unit of data exchanged between every layer of a
//! workflow: raw training data, forged predictors and outcomes, and model
//! predictions are all tables. Columns are uniquely named and share one row
//! count.
//!
//! # Example
//!
//! ```rust
//! use ml_workflows::table::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::numeric("x", vec![1.0, 2.0, 3.0]),
//!     Column::text("group", ["a", "b", "a"]),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.n_rows(), 3);
//! assert_eq!(table.names(), vec!["x", "group"]);
//! ```

mod column;

pub use column::{Column, ColumnData, ColumnKind};

use crate::error::TableError;
use ndarray::Array2;

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns.
    ///
    /// # Errors
    /// - [`TableError::InconsistentRows`] if column lengths differ.
    /// - [`TableError::DuplicateColumn`] if two columns share a name.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Self::default();
        for column in columns {
            table.push(column)?;
        }
        Ok(table)
    }

    /// A table with `n_rows` rows and no columns yet.
    pub fn empty(n_rows: usize) -> Self {
        Self {
            columns: Vec::new(),
            n_rows,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Numeric values of a column, if it exists and is numeric.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.column(name).and_then(|c| c.data().as_numeric())
    }

    /// Text values of a column, if it exists and is text.
    pub fn text(&self, name: &str) -> Option<&[String]> {
        self.column(name).and_then(|c| c.data().as_text())
    }

    /// Append a column.
    ///
    /// A table without columns adopts the length of its first column unless
    /// it was created with [`Table::empty`] and a non-zero row count.
    pub fn push(&mut self, column: Column) -> Result<(), TableError> {
        if self.contains(column.name()) {
            return Err(TableError::DuplicateColumn(column.name().to_string()));
        }
        if self.columns.is_empty() && self.n_rows == 0 {
            self.n_rows = column.len();
        } else if column.len() != self.n_rows {
            return Err(TableError::InconsistentRows {
                name: column.name().to_string(),
                expected: self.n_rows,
                got: column.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Replace the values of an existing column in place.
    pub fn replace(&mut self, name: &str, data: ColumnData) -> Result<(), TableError> {
        if data.len() != self.n_rows {
            return Err(TableError::InconsistentRows {
                name: name.to_string(),
                expected: self.n_rows,
                got: data.len(),
            });
        }
        let slot = self
            .columns
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| TableError::MissingColumns(vec![name.to_string()]))?;
        *slot = Column::new(name, data);
        Ok(())
    }

    /// Names from `names` that are not columns of this table, in order.
    pub fn missing<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut missing = Vec::new();
        for name in names {
            let name: &str = name.as_ref();
            if !self.contains(name) {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// A new table holding the named columns, in the order given.
    ///
    /// # Errors
    /// [`TableError::MissingColumns`] listing every absent name.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let missing = self.missing(names);
        if !missing.is_empty() {
            return Err(TableError::MissingColumns(missing));
        }
        let mut out = Table::empty(self.n_rows);
        for name in names {
            if let Some(col) = self.column(name.as_ref()) {
                out.push(col.clone())?;
            }
        }
        Ok(out)
    }

    /// A new table without the named columns. Absent names are ignored.
    pub fn without<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let dropped: Vec<&str> = names.iter().map(|n| n.as_ref()).collect();
        let columns = self
            .columns
            .iter()
            .filter(|c| !dropped.contains(&c.name()))
            .cloned()
            .collect();
        Table {
            columns,
            n_rows: self.n_rows,
        }
    }

    /// Append every column of `other` after the columns of `self`.
    ///
    /// Rows are matched by position; both tables must have the same row count.
    ///
    /// # Errors
    /// - [`TableError::RowCountMismatch`] if the row counts differ.
    /// - [`TableError::DuplicateColumn`] if a name appears in both tables.
    pub fn bind_cols(mut self, other: Table) -> Result<Table, TableError> {
        if self.n_rows != other.n_rows {
            return Err(TableError::RowCountMismatch {
                left: self.n_rows,
                right: other.n_rows,
            });
        }
        for column in other.columns {
            self.push(column)?;
        }
        Ok(self)
    }

    /// Row-major `f64` matrix of every column.
    ///
    /// # Errors
    /// [`TableError::NotNumeric`] naming the first text column.
    pub fn to_matrix(&self) -> Result<Array2<f64>, TableError> {
        let cols = self
            .columns
            .iter()
            .map(|c| {
                c.data()
                    .as_numeric()
                    .ok_or_else(|| TableError::NotNumeric(c.name().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Array2::from_shape_fn((self.n_rows, cols.len()), |(i, j)| {
            cols[j][i]
        }))
    }
}
