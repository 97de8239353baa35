//! Missing value imputation.
//!
//! `NaN` marks a missing value. Fill values are computed from the observed
//! training values of each selected column.

use super::{numeric_column, observed, PreparedStep, RecipeStep, Selector};
use crate::error::BlueprintError;
use crate::table::{ColumnData, Table};
use serde::{Deserialize, Serialize};

const STEP: &str = "impute";

/// How fill values are computed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    #[default]
    Mean,
    Median,
    Constant(f64),
}

/// Replace missing numeric values.
#[derive(Clone, Debug, PartialEq)]
pub struct ImputeStep {
    selector: Selector,
    strategy: ImputeStrategy,
}

impl ImputeStep {
    pub fn new(selector: Selector, strategy: ImputeStrategy) -> Self {
        Self { selector, strategy }
    }

    pub fn mean(selector: Selector) -> Self {
        Self::new(selector, ImputeStrategy::Mean)
    }

    pub fn median(selector: Selector) -> Self {
        Self::new(selector, ImputeStrategy::Median)
    }

    pub fn constant(selector: Selector, value: f64) -> Self {
        Self::new(selector, ImputeStrategy::Constant(value))
    }
}

fn fill_value(values: &[f64], strategy: &ImputeStrategy) -> f64 {
    let mut values = observed(values);
    if values.is_empty() {
        // Nothing observed: fall back to zero.
        return match strategy {
            ImputeStrategy::Constant(v) => *v,
            _ => 0.0,
        };
    }
    match strategy {
        ImputeStrategy::Mean => values.iter().sum::<f64>() / values.len() as f64,
        ImputeStrategy::Median => {
            values.sort_by(f64::total_cmp);
            let n = values.len();
            if n % 2 == 0 {
                (values[n / 2 - 1] + values[n / 2]) / 2.0
            } else {
                values[n / 2]
            }
        }
        ImputeStrategy::Constant(v) => *v,
    }
}

impl RecipeStep for ImputeStep {
    fn name(&self) -> &'static str {
        STEP
    }

    fn prep(&self, data: &Table) -> Result<Box<dyn PreparedStep>, BlueprintError> {
        let mut fills = Vec::new();
        for name in self.selector.resolve(data)? {
            let values = numeric_column(data, &name, STEP)?;
            let fill = fill_value(values, &self.strategy);
            fills.push((name, fill));
        }
        Ok(Box::new(PreparedImpute { fills }))
    }
}

/// Fitted [`ImputeStep`]: one fill value per column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedImpute {
    fills: Vec<(String, f64)>,
}

impl PreparedImpute {
    pub fn fills(&self) -> &[(String, f64)] {
        &self.fills
    }
}

impl PreparedStep for PreparedImpute {
    fn name(&self) -> &'static str {
        STEP
    }

    fn bake(&self, mut data: Table) -> Result<Table, BlueprintError> {
        for (name, fill) in &self.fills {
            let filled = numeric_column(&data, name, STEP)?
                .iter()
                .map(|&v| if v.is_nan() { *fill } else { v })
                .collect();
            data.replace(name, ColumnData::Numeric(filled))?;
        }
        Ok(data)
    }
}
