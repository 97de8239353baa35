//! Indicator (dummy) encoding of text columns.
//!
//! Each selected column is replaced, in place, by numeric indicator columns
//! named `{column}_{level}`. By default the first training level is dropped;
//! [`DummyStep::one_hot`] keeps every level.

use super::{PreparedStep, RecipeStep, Selector};
use crate::error::BlueprintError;
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};

const STEP: &str = "dummy";

#[derive(Clone, Debug, PartialEq)]
pub struct DummyStep {
    selector: Selector,
    one_hot: bool,
}

impl DummyStep {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            one_hot: false,
        }
    }

    /// Keep an indicator for every level.
    pub fn one_hot(mut self) -> Self {
        self.one_hot = true;
        self
    }
}

impl RecipeStep for DummyStep {
    fn name(&self) -> &'static str {
        STEP
    }

    fn prep(&self, data: &Table) -> Result<Box<dyn PreparedStep>, BlueprintError> {
        let mut columns = Vec::new();
        for name in self.selector.resolve(data)? {
            let column = data
                .column(&name)
                .ok_or_else(|| BlueprintError::MissingColumns(vec![name.clone()]))?;
            if column.data().as_text().is_none() {
                return Err(BlueprintError::Step {
                    step: STEP,
                    reason: format!("column `{}` is not text", name),
                });
            }
            let levels = column.data().levels();
            columns.push((name, levels));
        }
        Ok(Box::new(PreparedDummy {
            one_hot: self.one_hot,
            columns,
        }))
    }
}

/// Fitted [`DummyStep`]: training levels per encoded column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedDummy {
    one_hot: bool,
    columns: Vec<(String, Vec<String>)>,
}

impl PreparedDummy {
    fn encode(&self, column: &Column, levels: &[String]) -> Result<Vec<Column>, BlueprintError> {
        let values = column.data().as_text().ok_or_else(|| BlueprintError::Step {
            step: STEP,
            reason: format!("column `{}` is not text", column.name()),
        })?;
        let mut novel: Vec<String> = values
            .iter()
            .filter(|v| !levels.contains(v))
            .cloned()
            .collect();
        if !novel.is_empty() {
            novel.sort();
            novel.dedup();
            return Err(BlueprintError::NovelLevels {
                column: column.name().to_string(),
                levels: novel,
            });
        }
        let skip = if self.one_hot { 0 } else { 1 };
        Ok(levels
            .iter()
            .skip(skip)
            .map(|level| {
                let indicator = values
                    .iter()
                    .map(|v| if v == level { 1.0 } else { 0.0 })
                    .collect();
                Column::numeric(format!("{}_{}", column.name(), level), indicator)
            })
            .collect())
    }
}

impl PreparedStep for PreparedDummy {
    fn name(&self) -> &'static str {
        STEP
    }

    fn bake(&self, data: Table) -> Result<Table, BlueprintError> {
        let mut out = Table::empty(data.n_rows());
        for column in data.columns() {
            match self.columns.iter().find(|(name, _)| name == column.name()) {
                Some((_, levels)) => {
                    for encoded in self.encode(column, levels)? {
                        out.push(encoded)?;
                    }
                }
                None => out.push(column.clone())?,
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Table {
        Table::new(vec![
            Column::text("color", ["red", "blue", "green", "blue"]),
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_drops_first_level_in_place() {
        let step = DummyStep::new(Selector::AllTextPredictors);
        let baked = step.prep(&data()).unwrap().bake(data()).unwrap();
        assert_eq!(baked.names(), vec!["color_green", "color_red", "x"]);
        assert_eq!(
            baked.numeric("color_red"),
            Some(&[1.0, 0.0, 0.0, 0.0][..])
        );
    }

    #[test]
    fn test_one_hot_keeps_all_levels() {
        let step = DummyStep::new(Selector::columns(["color"])).one_hot();
        let baked = step.prep(&data()).unwrap().bake(data()).unwrap();
        assert_eq!(baked.n_cols(), 4);
        assert_eq!(
            baked.numeric("color_blue"),
            Some(&[0.0, 1.0, 0.0, 1.0][..])
        );
    }

    #[test]
    fn test_novel_level_rejected() {
        let prepared = DummyStep::new(Selector::AllTextPredictors)
            .prep(&data())
            .unwrap();
        let new = Table::new(vec![
            Column::text("color", ["purple"]),
            Column::numeric("x", vec![1.0]),
        ])
        .unwrap();
        assert!(matches!(
            prepared.bake(new),
            Err(BlueprintError::NovelLevels { .. })
        ));
    }

    #[test]
    fn test_numeric_column_rejected() {
        let step = DummyStep::new(Selector::columns(["x"]));
        assert!(matches!(step.prep(&data()), Err(BlueprintError::Step { .. })));
    }
}
