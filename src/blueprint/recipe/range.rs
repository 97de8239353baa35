//! Rescaling to a fixed range.
//!
//! ```text
//! x_scaled = (x - x_min) / (x_max - x_min) * (max - min) + min
//! ```
//!
//! Columns constant in the training data map to `min`. Values outside the
//! training range are not clipped.

use super::{numeric_column, observed, PreparedStep, RecipeStep, Selector};
use crate::error::BlueprintError;
use crate::table::{ColumnData, Table};
use serde::{Deserialize, Serialize};

const STEP: &str = "range";

/// Rescale numeric columns to `[min, max]`, `[0, 1]` by default.
#[derive(Clone, Debug, PartialEq)]
pub struct RangeStep {
    selector: Selector,
    min: f64,
    max: f64,
}

impl RangeStep {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            min: 0.0,
            max: 1.0,
        }
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

impl RecipeStep for RangeStep {
    fn name(&self) -> &'static str {
        STEP
    }

    fn prep(&self, data: &Table) -> Result<Box<dyn PreparedStep>, BlueprintError> {
        if !(self.max > self.min) {
            return Err(BlueprintError::Step {
                step: STEP,
                reason: format!("max ({}) must be greater than min ({})", self.max, self.min),
            });
        }
        let mut columns = Vec::new();
        for name in self.selector.resolve(data)? {
            let values = observed(numeric_column(data, &name, STEP)?);
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let (lo, hi) = if values.is_empty() { (0.0, 0.0) } else { (lo, hi) };
            columns.push((name, lo, hi));
        }
        Ok(Box::new(PreparedRange {
            min: self.min,
            max: self.max,
            columns,
        }))
    }
}

/// Fitted [`RangeStep`]: target range plus training `(name, min, max)` per column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedRange {
    min: f64,
    max: f64,
    columns: Vec<(String, f64, f64)>,
}

impl PreparedStep for PreparedRange {
    fn name(&self) -> &'static str {
        STEP
    }

    fn bake(&self, mut data: Table) -> Result<Table, BlueprintError> {
        let target = self.max - self.min;
        for (name, lo, hi) in &self.columns {
            let range = hi - lo;
            let scaled = numeric_column(&data, name, STEP)?
                .iter()
                .map(|v| {
                    if range > 0.0 {
                        (v - lo) / range * target + self.min
                    } else {
                        self.min
                    }
                })
                .collect();
            data.replace(name, ColumnData::Numeric(scaled))?;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn data() -> Table {
        Table::new(vec![
            Column::numeric("a", vec![2.0, 4.0, 6.0]),
            Column::numeric("k", vec![1.0; 3]),
        ])
        .unwrap()
    }

    #[test]
    fn test_unit_range() {
        let step = RangeStep::new(Selector::AllNumericPredictors);
        let baked = step.prep(&data()).unwrap().bake(data()).unwrap();
        assert_eq!(baked.numeric("a"), Some(&[0.0, 0.5, 1.0][..]));
        assert_eq!(baked.numeric("k"), Some(&[0.0; 3][..]));
    }

    #[test]
    fn test_custom_range_not_clipped() {
        let step = RangeStep::new(Selector::columns(["a"])).with_range(-1.0, 1.0);
        let prepared = step.prep(&data()).unwrap();
        let new = Table::new(vec![
            Column::numeric("a", vec![8.0]),
            Column::numeric("k", vec![1.0]),
        ])
        .unwrap();
        assert_eq!(prepared.bake(new).unwrap().numeric("a"), Some(&[2.0][..]));
    }

    #[test]
    fn test_invalid_range() {
        let step = RangeStep::new(Selector::AllNumericPredictors).with_range(1.0, 1.0);
        assert!(matches!(step.prep(&data()), Err(BlueprintError::Step { .. })));
    }
}
