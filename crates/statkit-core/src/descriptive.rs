//! Descriptive statistics over a list of values.

use crate::error::{StatError, StatResult};
use crate::format::{derived, fixed, join, raw};
use crate::formula::{FormulaId, SAMPLE};
use crate::input::{parse_number_list, InputValues};
use crate::result::CalculationResult;

pub(crate) fn mean(inputs: &InputValues) -> StatResult<CalculationResult> {
    let values = parse_number_list(inputs.require("values")?)?;
    let n = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / n as f64;

    Ok(CalculationResult::builder()
        .step("Data values", join(&values, raw))
        .step("Sum of values", format!("Σx = {}", derived(sum)))
        .step("Number of values", format!("n = {n}"))
        .step(
            "Mean",
            format!("x̄ = {}/{n} = {}", derived(sum), fixed(mean)),
        )
        .finish(fixed(mean)))
}

pub(crate) fn std_dev(inputs: &InputValues) -> StatResult<CalculationResult> {
    let values = parse_number_list(inputs.require("values")?)?;
    let sample = FormulaId::StdDev.spec().choice("type", inputs)? == SAMPLE;

    let n = values.len();
    if sample && n < 2 {
        return Err(StatError::validation(
            "sample standard deviation needs at least two values",
        ));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let squared: Vec<f64> = values.iter().map(|x| (x - mean).powi(2)).collect();
    let sum_squared: f64 = squared.iter().sum();
    let divisor = if sample { n - 1 } else { n };
    let variance = sum_squared / divisor as f64;
    let sd = variance.sqrt();

    let (divisor_label, sd_symbol) = if sample { ("n - 1", "s") } else { ("N", "σ") };

    Ok(CalculationResult::builder()
        .step("Data values", join(&values, raw))
        .step("Mean", format!("μ = {}", fixed(mean)))
        .step(
            "Squared deviations",
            format!("(x - μ)² = {}", join(&squared, derived)),
        )
        .step(
            "Sum of squared deviations",
            format!("Σ(x - μ)² = {}", derived(sum_squared)),
        )
        .step("Divisor", format!("{divisor_label} = {divisor}"))
        .step("Variance", format!("σ² = {}", fixed(variance)))
        .step("Standard Deviation", format!("{sd_symbol} = {}", fixed(sd)))
        .finish(fixed(sd)))
}
