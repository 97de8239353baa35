//! Centering and scaling.
//!
//! ```text
//! z = (x - mean) / std
//! ```
//!
//! Statistics ignore missing values. The standard deviation is the
//! population one; a constant column keeps a scale of one.

use super::{numeric_column, observed, PreparedStep, RecipeStep, Selector};
use crate::error::BlueprintError;
use crate::table::{ColumnData, Table};
use serde::{Deserialize, Serialize};

const STEP: &str = "normalize";

/// Center and/or scale numeric columns.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizeStep {
    selector: Selector,
    center: bool,
    scale: bool,
}

impl NormalizeStep {
    /// Center and scale the selected columns.
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            center: true,
            scale: true,
        }
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }
}

impl RecipeStep for NormalizeStep {
    fn name(&self) -> &'static str {
        STEP
    }

    fn prep(&self, data: &Table) -> Result<Box<dyn PreparedStep>, BlueprintError> {
        let mut columns = Vec::new();
        for name in self.selector.resolve(data)? {
            let values = observed(numeric_column(data, &name, STEP)?);
            let (mean, std) = if values.is_empty() {
                (0.0, 1.0)
            } else {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                (mean, if std > 0.0 { std } else { 1.0 })
            };
            columns.push(NormalizeParams {
                name,
                mean: if self.center { mean } else { 0.0 },
                std: if self.scale { std } else { 1.0 },
            });
        }
        Ok(Box::new(PreparedNormalize { columns }))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizeParams {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Fitted [`NormalizeStep`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreparedNormalize {
    columns: Vec<NormalizeParams>,
}

impl PreparedNormalize {
    pub fn columns(&self) -> &[NormalizeParams] {
        &self.columns
    }
}

impl PreparedStep for PreparedNormalize {
    fn name(&self) -> &'static str {
        STEP
    }

    fn bake(&self, mut data: Table) -> Result<Table, BlueprintError> {
        for p in &self.columns {
            let scaled = numeric_column(&data, &p.name, STEP)?
                .iter()
                .map(|v| (v - p.mean) / p.std)
                .collect();
            data.replace(&p.name, ColumnData::Numeric(scaled))?;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use approx::assert_abs_diff_eq;

    fn data() -> Table {
        Table::new(vec![
            Column::numeric("a", vec![1.0, 2.0, 3.0, 4.0]),
            Column::numeric("c", vec![5.0; 4]),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_mean_unit_variance() {
        let step = NormalizeStep::new(Selector::columns(["a"]));
        let baked = step.prep(&data()).unwrap().bake(data()).unwrap();
        let a = baked.numeric("a").unwrap();
        let mean = a.iter().sum::<f64>() / 4.0;
        let var = a.iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(var, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_only_centered() {
        let step = NormalizeStep::new(Selector::columns(["c"]));
        let baked = step.prep(&data()).unwrap().bake(data()).unwrap();
        assert_eq!(baked.numeric("c"), Some(&[0.0; 4][..]));
    }

    #[test]
    fn test_scale_only() {
        let step = NormalizeStep::new(Selector::columns(["a"])).with_center(false);
        let baked = step.prep(&data()).unwrap().bake(data()).unwrap();
        let std = 1.25f64.sqrt();
        assert_abs_diff_eq!(baked.numeric("a").unwrap()[0], 1.0 / std, epsilon = 1e-12);
    }
}
