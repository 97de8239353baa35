//! Column schemas captured at training time.

use crate::error::BlueprintError;
use crate::table::{ColumnKind, Table};
use serde::{Deserialize, Serialize};

/// Name, kind and (for text columns) the levels seen while molding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
    pub levels: Vec<String>,
}

/// The expected shape of a set of raw columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    /// Record the schema of the named columns of `data`.
    pub fn capture<S: AsRef<str>>(data: &Table, names: &[S]) -> Result<Self, BlueprintError> {
        let missing = data.missing(names);
        if !missing.is_empty() {
            return Err(BlueprintError::MissingColumns(missing));
        }
        let columns = names
            .iter()
            .filter_map(|name| data.column(name.as_ref()))
            .map(|col| ColumnSchema {
                name: col.name().to_string(),
                kind: col.kind(),
                levels: col.data().levels(),
            })
            .collect();
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Check that `data` has every column with the recorded kind and no
    /// text values outside the recorded levels.
    pub fn check(&self, data: &Table) -> Result<(), BlueprintError> {
        let missing = data.missing(&self.names());
        if !missing.is_empty() {
            return Err(BlueprintError::MissingColumns(missing));
        }
        for expected in &self.columns {
            let Some(column) = data.column(&expected.name) else {
                continue;
            };
            if column.kind() != expected.kind {
                return Err(BlueprintError::KindMismatch {
                    column: expected.name.clone(),
                    expected: expected.kind.as_str(),
                    got: column.kind().as_str(),
                });
            }
            if let Some(values) = column.data().as_text() {
                let mut novel: Vec<String> = values
                    .iter()
                    .filter(|v| expected.levels.binary_search(v).is_err())
                    .cloned()
                    .collect();
                if !novel.is_empty() {
                    novel.sort();
                    novel.dedup();
                    return Err(BlueprintError::NovelLevels {
                        column: expected.name.clone(),
                        levels: novel,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn training() -> Table {
        Table::new(vec![
            Column::numeric("x", vec![1.0, 2.0]),
            Column::text("g", ["b", "a"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_capture_records_levels() {
        let schema = Schema::capture(&training(), &["g", "x"]).unwrap();
        assert_eq!(schema.names(), vec!["g", "x"]);
        assert_eq!(schema.get("g").unwrap().levels, vec!["a", "b"]);
        assert!(schema.get("x").unwrap().levels.is_empty());
    }

    #[test]
    fn test_capture_missing() {
        let err = Schema::capture(&training(), &["x", "z"]).unwrap_err();
        assert_eq!(err, BlueprintError::MissingColumns(vec!["z".into()]));
    }

    #[test]
    fn test_check_kind_mismatch() {
        let schema = Schema::capture(&training(), &["x"]).unwrap();
        let new = Table::new(vec![Column::text("x", ["1"])]).unwrap();
        assert!(matches!(
            schema.check(&new),
            Err(BlueprintError::KindMismatch {
                expected: "numeric",
                got: "text",
                ..
            })
        ));
    }

    #[test]
    fn test_check_novel_levels_sorted_unique() {
        let schema = Schema::capture(&training(), &["g"]).unwrap();
        let new = Table::new(vec![Column::text("g", ["z", "a", "c", "z"])]).unwrap();
        assert_eq!(
            schema.check(&new),
            Err(BlueprintError::NovelLevels {
                column: "g".into(),
                levels: vec!["c".into(), "z".into()],
            })
        );
    }
}
