use tracing::debug;

use crate::error::StatResult;
use crate::formula::FormulaId;
use crate::input::InputValues;
use crate::result::CalculationResult;

/// Evaluate the formula registered under `formula_id`.
///
/// Pure: the same id and inputs always give the same result.
pub fn evaluate(formula_id: &str, inputs: &InputValues) -> StatResult<CalculationResult> {
    let id: FormulaId = formula_id.parse()?;
    debug!(formula = %id, "evaluating");
    id.evaluate(inputs)
}
