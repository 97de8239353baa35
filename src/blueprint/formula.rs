//! Model formulas: `y ~ a + b + a:b`.
//!
//! Supported syntax on the right-hand side:
//!
//! - `name`: a column. Text columns become indicator columns named
//!   `{column}{level}`, one per training level except the first.
//! - `a:b`: interaction, the element-wise product of every column `a`
//!   expands to with every column `b` expands to, named `a:b`.
//! - `.`: every column that is not an outcome.
//! - `- term`: remove a term, e.g. `y ~ . - id`.
//! - `1` / `+ 1` adds an `(Intercept)` column; `0`, `+ 0` and `- 1` remove it.
//!
//! No intercept column is produced unless requested. When it is, linear
//! regression uses it as its intercept instead of adding another. The
//! left-hand side may list several outcomes joined by `+`.
//!
//! Column names may not contain `-`: a `-` between two name characters, as
//! in `my-col` or `x-1`, is rejected. Write `x - 1` to remove a term.

use super::{check_roles, forge_outcomes, require_rows, validate};
use super::{Forgeable, Forged, Molded, Preprocessor, Schema};
use crate::error::{BlueprintError, SerializationError};
use crate::serialization::Persistable;
use crate::table::{Column, ColumnKind, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the intercept column.
pub const INTERCEPT: &str = "(Intercept)";

/// One right-hand side term: a column or an interaction of columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term(Vec<String>);

impl Term {
    pub fn factors(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(":"))
    }
}

/// A parsed formula.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    text: String,
    outcomes: Vec<String>,
    terms: Vec<Term>,
    removed: Vec<Term>,
    /// Position in `terms` where `.` expands.
    dot_at: Option<usize>,
    intercept: bool,
}

impl Formula {
    pub fn parse(text: &str) -> Result<Self, BlueprintError> {
        let fail = |reason: String| BlueprintError::Formula {
            formula: text.to_string(),
            reason,
        };

        let (lhs, rhs) = text
            .split_once('~')
            .ok_or_else(|| fail("expected `~` between outcomes and predictors".to_string()))?;
        if rhs.contains('~') {
            return Err(fail("more than one `~`".to_string()));
        }

        let mut outcomes = Vec::new();
        for name in lhs.split('+').map(str::trim) {
            check_name(name).map_err(fail)?;
            outcomes.push(name.to_string());
        }

        let mut formula = Formula {
            text: text.trim().to_string(),
            outcomes,
            terms: Vec::new(),
            removed: Vec::new(),
            dot_at: None,
            intercept: false,
        };
        for (positive, item) in split_signed(rhs).map_err(fail)? {
            match (item.as_str(), positive) {
                ("1", sign) => formula.intercept = sign,
                ("0", true) => formula.intercept = false,
                ("0", false) => return Err(fail("`- 0` is not meaningful".to_string())),
                (".", true) => {
                    if formula.dot_at.is_some() {
                        return Err(fail("`.` used more than once".to_string()));
                    }
                    formula.dot_at = Some(formula.terms.len());
                }
                (".", false) => return Err(fail("`.` cannot be removed".to_string())),
                (term, sign) => {
                    let factors = term
                        .split(':')
                        .map(|f| {
                            let f = f.trim();
                            check_name(f).map(|_| f.to_string())
                        })
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(fail)?;
                    if sign {
                        formula.terms.push(Term(factors));
                    } else {
                        formula.removed.push(Term(factors));
                    }
                }
            }
        }
        Ok(formula)
    }

    /// Override the intercept setting given in the formula text.
    pub fn with_intercept(mut self, intercept: bool) -> Self {
        self.intercept = intercept;
        self
    }

    pub fn outcome_names(&self) -> &[String] {
        &self.outcomes
    }

    pub fn has_intercept(&self) -> bool {
        self.intercept
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Terms after resolving `.` against `data` and applying removals.
    fn expand(&self, data: &Table) -> Vec<Term> {
        let mut expanded: Vec<Term> = Vec::new();
        let mut push = |term: Term| {
            if !expanded.contains(&term) && !self.removed.contains(&term) {
                expanded.push(term);
            }
        };
        for (i, term) in self.terms.iter().enumerate() {
            if self.dot_at == Some(i) {
                self.dot_terms(data).into_iter().for_each(&mut push);
            }
            push(term.clone());
        }
        if self.dot_at == Some(self.terms.len()) {
            self.dot_terms(data).into_iter().for_each(&mut push);
        }
        expanded
    }

    fn dot_terms(&self, data: &Table) -> Vec<Term> {
        data.names()
            .into_iter()
            .filter(|name| !self.outcomes.iter().any(|o| o == name))
            .map(|name| Term(vec![name.to_string()]))
            .collect()
    }
}

impl FromStr for Formula {
    type Err = BlueprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty term".to_string());
    }
    if name.contains('*') {
        return Err("operator `*` is not supported; write `a + b + a:b`".to_string());
    }
    if name.contains(|c: char| c.is_whitespace() || "()^|".contains(c)) {
        return Err(format!("`{}` is not a column name", name));
    }
    Ok(())
}

/// Split on top-level `+` and `-`, keeping the sign of each item.
fn split_signed(rhs: &str) -> Result<Vec<(bool, String)>, String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut positive = true;
    let mut first = true;
    let chars: Vec<char> = rhs.chars().collect();
    let name_char = |i: Option<usize>| {
        i.and_then(|i| chars.get(i))
            .is_some_and(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
    };
    for (i, &c) in chars.iter().chain(std::iter::once(&'+')).enumerate() {
        if c == '-' && name_char(i.checked_sub(1)) && name_char(Some(i + 1)) {
            let rest: String = chars[i..]
                .iter()
                .take_while(|c| !c.is_whitespace() && **c != '+')
                .collect();
            return Err(format!(
                "`-` inside `{}{}`; column names cannot contain `-`, write ` - ` to remove a term",
                current.trim_start(),
                rest
            ));
        }
        if c == '+' || c == '-' {
            let item = current.trim();
            if item.is_empty() {
                // A leading sign, as in `y ~ -1 + x`.
                if !first {
                    return Err("empty term".to_string());
                }
            } else {
                items.push((positive, item.to_string()));
            }
            current.clear();
            positive = c == '+';
            first = false;
        } else {
            current.push(c);
        }
    }
    Ok(items)
}

impl Formula {
    /// Learn the concrete blueprint without building the training design.
    pub fn fit_blueprint(&self, data: &Table) -> Result<FormulaBlueprint, BlueprintError> {
        require_rows(data, "formula")?;
        let terms = self.expand(data);

        let mut variables: Vec<String> = Vec::new();
        for factor in terms.iter().flat_map(|t| t.factors()) {
            if !variables.contains(factor) {
                variables.push(factor.clone());
            }
        }
        check_roles(&self.outcomes, &variables)?;

        Ok(FormulaBlueprint {
            formula: self.text.clone(),
            intercept: self.intercept,
            terms,
            predictors: Schema::capture(data, &variables)?,
            outcomes: Schema::capture(data, &self.outcomes)?,
        })
    }
}

impl Preprocessor for Formula {
    fn kind(&self) -> &'static str {
        "formula"
    }

    fn mold(&self, data: &Table) -> Result<Molded, BlueprintError> {
        let blueprint = self.fit_blueprint(data)?;
        let predictors = blueprint.design(data)?;
        tracing::debug!(
            formula = %self.text,
            n_terms = blueprint.terms.len(),
            n_columns = predictors.n_cols(),
            "molded formula preprocessor"
        );
        Ok(Molded {
            predictors,
            outcomes: data.select(&self.outcomes)?,
            blueprint: Box::new(blueprint),
        })
    }
}

/// Fitted [`Formula`]: expanded terms plus the training schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormulaBlueprint {
    formula: String,
    intercept: bool,
    terms: Vec<Term>,
    predictors: Schema,
    outcomes: Schema,
}

impl FormulaBlueprint {
    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Build the design table. `data` must already have passed validation.
    fn design(&self, data: &Table) -> Result<Table, BlueprintError> {
        let n = data.n_rows();
        let mut out = Table::empty(n);
        if self.intercept {
            out.push(Column::numeric(INTERCEPT, vec![1.0; n]))?;
        }
        for term in &self.terms {
            let mut columns: Vec<(String, Vec<f64>)> = vec![(String::new(), vec![1.0; n])];
            for factor in term.factors() {
                let parts = self.factor_columns(factor, data)?;
                let mut next = Vec::with_capacity(columns.len() * parts.len());
                for (name, values) in &columns {
                    for (part_name, part_values) in &parts {
                        let name = if name.is_empty() {
                            part_name.clone()
                        } else {
                            format!("{}:{}", name, part_name)
                        };
                        let product: Vec<f64> = values.iter().zip(part_values).map(|(a, b)| a * b).collect();
                        next.push((name, product));
                    }
                }
                columns = next;
            }
            for (name, values) in columns {
                out.push(Column::numeric(name, values))?;
            }
        }
        Ok(out)
    }

    /// Columns a single variable expands to.
    fn factor_columns(
        &self,
        name: &str,
        data: &Table,
    ) -> Result<Vec<(String, Vec<f64>)>, BlueprintError> {
        let schema = self
            .predictors
            .get(name)
            .ok_or_else(|| BlueprintError::MissingColumns(vec![name.to_string()]))?;
        let column = data
            .column(name)
            .ok_or_else(|| BlueprintError::MissingColumns(vec![name.to_string()]))?;
        match schema.kind {
            ColumnKind::Numeric => {
                let values = column.data().as_numeric().unwrap_or_default();
                Ok(vec![(name.to_string(), values.to_vec())])
            }
            ColumnKind::Text => {
                let values = column.data().as_text().unwrap_or_default();
                Ok(schema
                    .levels
                    .iter()
                    .skip(1)
                    .map(|level| {
                        let indicator = values
                            .iter()
                            .map(|v| if v == level { 1.0 } else { 0.0 })
                            .collect();
                        (format!("{}{}", name, level), indicator)
                    })
                    .collect())
            }
        }
    }
}

impl Forgeable for FormulaBlueprint {
    fn kind(&self) -> &'static str {
        "formula"
    }

    fn predictors(&self) -> &Schema {
        &self.predictors
    }

    fn outcomes(&self) -> &Schema {
        &self.outcomes
    }

    fn forge(&self, new_data: &Table, outcomes: bool) -> Result<Forged, BlueprintError> {
        validate(new_data, &self.predictors, outcomes.then_some(&self.outcomes))?;
        Ok(Forged {
            predictors: self.design(new_data)?,
            outcomes: forge_outcomes(new_data, &self.outcomes, outcomes)?,
        })
    }
}

impl Persistable for FormulaBlueprint {
    type Params = FormulaBlueprint;

    fn extract_params(&self) -> Self::Params {
        self.clone()
    }

    fn from_params(params: Self::Params) -> Result<Self, SerializationError> {
        for factor in params.terms.iter().flat_map(|t| t.factors()) {
            if params.predictors.get(factor).is_none() {
                return Err(SerializationError::InvalidParams(format!(
                    "term uses `{}`, which is not in the predictor schema",
                    factor
                )));
            }
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Table {
        Table::new(vec![
            Column::numeric("y", vec![1.0, 2.0, 3.0, 4.0]),
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0]),
            Column::text("g", ["a", "b", "c", "b"]),
            Column::numeric("id", vec![10.0, 11.0, 12.0, 13.0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_terms_and_intercept() {
        let f = Formula::parse("y ~ x + g + x:g - 1").unwrap();
        assert_eq!(f.outcome_names(), &["y".to_string()]);
        assert!(!f.has_intercept());
        assert_eq!(f.terms.len(), 3);
        assert_eq!(f.terms[2].to_string(), "x:g");

        assert!(Formula::parse("y ~ 1 + x").unwrap().has_intercept());
        assert!(!Formula::parse("y ~ x + 0").unwrap().has_intercept());
        assert!(Formula::parse("y ~ -1 + x").unwrap().terms.len() == 1);
    }

    #[test]
    fn test_parse_errors() {
        for bad in [
            "y x",
            "y ~ x ~ z",
            "~ x",
            "y ~ x + + z",
            "y ~ x*z",
            "y ~ log(x)",
            "y ~ my-col",
            "y ~ x + a-b:c",
        ] {
            assert!(
                matches!(Formula::parse(bad), Err(BlueprintError::Formula { .. })),
                "{} should fail",
                bad
            );
        }
    }

    #[test]
    fn test_dummies_drop_first_level() {
        let molded = Formula::parse("y ~ x + g").unwrap().mold(&data()).unwrap();
        assert_eq!(molded.predictors.names(), vec!["x", "gb", "gc"]);
        assert_eq!(molded.predictors.numeric("gb"), Some(&[0.0, 1.0, 0.0, 1.0][..]));
        assert_eq!(molded.outcomes.names(), vec!["y"]);
    }

    #[test]
    fn test_interaction_columns() {
        let molded = Formula::parse("y ~ x:g").unwrap().mold(&data()).unwrap();
        assert_eq!(molded.predictors.names(), vec!["x:gb", "x:gc"]);
        assert_eq!(
            molded.predictors.numeric("x:gc"),
            Some(&[0.0, 0.0, 3.0, 0.0][..])
        );
    }

    #[test]
    fn test_dot_with_removal() {
        let molded = Formula::parse("y ~ . - id + 1").unwrap().mold(&data()).unwrap();
        assert_eq!(
            molded.predictors.names(),
            vec![INTERCEPT, "x", "gb", "gc"]
        );
        assert_eq!(molded.blueprint.predictors().names(), vec!["x", "g"]);
    }

    #[test]
    fn test_outcome_on_right_hand_side_rejected() {
        let result = Formula::parse("y ~ x + y").unwrap().mold(&data());
        assert!(matches!(result, Err(BlueprintError::Roles(_))));
    }

    #[test]
    fn test_forge_uses_training_levels() {
        let molded = Formula::parse("y ~ g").unwrap().mold(&data()).unwrap();
        let new = Table::new(vec![Column::text("g", ["c", "a"])]).unwrap();
        let forged = molded.blueprint.forge(&new, false).unwrap();
        assert_eq!(forged.predictors.names(), vec!["gb", "gc"]);
        assert_eq!(forged.predictors.numeric("gc"), Some(&[1.0, 0.0][..]));

        let novel = Table::new(vec![Column::text("g", ["d"])]).unwrap();
        assert!(matches!(
            molded.blueprint.forge(&novel, false),
            Err(BlueprintError::NovelLevels { .. })
        ));
    }

    #[test]
    fn test_spaced_minus_still_removes() {
        let f = Formula::parse("y ~ . - id -1").unwrap();
        assert!(!f.has_intercept());
        let molded = f.mold(&data()).unwrap();
        assert_eq!(molded.predictors.names(), vec!["x", "gb", "gc"]);
    }

    #[test]
    fn test_forge_passes_missing_numeric_values_through() {
        let molded = Formula::parse("y ~ x + g").unwrap().mold(&data()).unwrap();
        let new = Table::new(vec![
            Column::numeric("x", vec![f64::NAN, 2.5]),
            Column::text("g", ["b", "c"]),
        ])
        .unwrap();
        let forged = molded.blueprint.forge(&new, false).unwrap();
        let x = forged.predictors.numeric("x").unwrap();
        assert!(x[0].is_nan());
        assert_eq!(x[1], 2.5);
        assert_eq!(forged.predictors.numeric("gb"), Some(&[1.0, 0.0][..]));
    }

    #[test]
    fn test_from_params_rejects_unknown_factor() {
        let molded = Formula::parse("y ~ x").unwrap().mold(&data()).unwrap();
        let mut params = FormulaBlueprint {
            formula: "y ~ x".into(),
            intercept: false,
            terms: vec![Term(vec!["z".into()])],
            predictors: molded.blueprint.predictors().clone(),
            outcomes: molded.blueprint.outcomes().clone(),
        };
        assert!(FormulaBlueprint::from_params(params.clone()).is_err());
        params.terms = vec![Term(vec!["x".into()])];
        assert!(FormulaBlueprint::from_params(params).is_ok());
    }
}
