//! Inferential statistics from summary values.

use std::fmt;

use crate::error::{StatError, StatResult};
use crate::format::{fixed, raw};
use crate::formula::FormulaId;
use crate::input::{parse_number, parse_sample_size, InputValues};
use crate::result::CalculationResult;

/// Supported confidence levels. The critical values are a lookup table, not a
/// quantile function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    Ninety,
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    pub fn z(self) -> f64 {
        match self {
            Self::Ninety => 1.645,
            Self::NinetyFive => 1.96,
            Self::NinetyNine => 2.576,
        }
    }

    pub fn percent(self) -> u8 {
        match self {
            Self::Ninety => 90,
            Self::NinetyFive => 95,
            Self::NinetyNine => 99,
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

impl std::str::FromStr for ConfidenceLevel {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "90" => Ok(Self::Ninety),
            "95" => Ok(Self::NinetyFive),
            "99" => Ok(Self::NinetyNine),
            other => Err(StatError::validation(format!(
                "unsupported confidence level: {other}"
            ))),
        }
    }
}

fn number(inputs: &InputValues, id: &str) -> StatResult<f64> {
    parse_number(id, inputs.require(id)?)
}

fn sample_size(inputs: &InputValues, id: &str) -> StatResult<u64> {
    parse_sample_size(id, inputs.require(id)?)
}

fn positive(id: &str, value: f64) -> StatResult<f64> {
    if value <= 0.0 {
        return Err(StatError::validation(format!(
            "{id} must be greater than zero"
        )));
    }
    Ok(value)
}

pub(crate) fn confidence_interval(inputs: &InputValues) -> StatResult<CalculationResult> {
    let mean = number(inputs, "mean")?;
    let sd = number(inputs, "stdDev")?;
    let n = sample_size(inputs, "sampleSize")?;
    let level: ConfidenceLevel = FormulaId::ConfidenceInterval
        .spec()
        .choice("confidence", inputs)?
        .parse()?;
    if sd < 0.0 {
        return Err(StatError::validation("stdDev must not be negative"));
    }

    let z = level.z();
    let se = sd / (n as f64).sqrt();
    let margin = z * se;
    let (lower, upper) = (mean - margin, mean + margin);
    let interval = format!("[{}, {}]", fixed(lower), fixed(upper));

    Ok(CalculationResult::builder()
        .step("Sample Mean", format!("x̄ = {}", raw(mean)))
        .step("Standard Deviation", format!("σ = {}", raw(sd)))
        .step("Sample Size", format!("n = {n}"))
        .step("Z-score", format!("z = {}", raw(z)))
        .step(
            "Standard Error",
            format!("SE = σ/√n = {}/√{n} = {}", raw(sd), fixed(se)),
        )
        .step(
            "Margin of Error",
            format!("ME = z × SE = {} × {} = {}", raw(z), fixed(se), fixed(margin)),
        )
        .step(
            "Confidence Interval",
            format!("{} ± {} = {interval}", raw(mean), fixed(margin)),
        )
        .finish(interval))
}

/// Plain-language reading of a z-score. Only an exact zero is "at the mean".
pub fn interpret_z(z: f64) -> String {
    if z > 0.0 {
        format!("{:.2} standard deviations above the mean", z.abs())
    } else if z < 0.0 {
        format!("{:.2} standard deviations below the mean", z.abs())
    } else {
        "exactly at the mean".to_string()
    }
}

pub(crate) fn z_score(inputs: &InputValues) -> StatResult<CalculationResult> {
    let x = number(inputs, "value")?;
    let mean = number(inputs, "mean")?;
    let sd = positive("stdDev", number(inputs, "stdDev")?)?;

    let z = (x - mean) / sd;

    Ok(CalculationResult::builder()
        .step("Value", format!("x = {}", raw(x)))
        .step("Mean", format!("μ = {}", raw(mean)))
        .step("Standard Deviation", format!("σ = {}", raw(sd)))
        .step(
            "Calculation",
            format!("z = ({} - {})/{}", raw(x), raw(mean), raw(sd)),
        )
        .step("Z-Score", fixed(z))
        .step("Interpretation", interpret_z(z))
        .finish(fixed(z)))
}

pub(crate) fn t_statistic(inputs: &InputValues) -> StatResult<CalculationResult> {
    let x_bar = number(inputs, "sampleMean")?;
    let mu0 = number(inputs, "hypothesizedMean")?;
    let s = positive("sampleStdDev", number(inputs, "sampleStdDev")?)?;
    let n = sample_size(inputs, "sampleSize")?;

    let se = s / (n as f64).sqrt();
    let t = (x_bar - mu0) / se;
    // Reported only; nothing downstream uses it.
    let df = n - 1;

    Ok(CalculationResult::builder()
        .step("Sample Mean", format!("x̄ = {}", raw(x_bar)))
        .step("Hypothesized Mean", format!("μ₀ = {}", raw(mu0)))
        .step("Sample Std Dev", format!("s = {}", raw(s)))
        .step("Sample Size", format!("n = {n}"))
        .step(
            "Standard Error",
            format!("SE = s/√n = {}/√{n} = {}", raw(s), fixed(se)),
        )
        .step(
            "T-Statistic",
            format!(
                "t = ({} - {})/{} = {}",
                raw(x_bar),
                raw(mu0),
                fixed(se),
                fixed(t)
            ),
        )
        .step("Degrees of Freedom", format!("df = n - 1 = {df}"))
        .finish(fixed(t)))
}
