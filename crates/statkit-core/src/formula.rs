use serde::Serialize;
use std::fmt;

use crate::error::{StatError, StatResult};
use crate::input::InputValues;
use crate::result::CalculationResult;
use crate::{descriptive, inference};

// ---------------------------------------------------------------------------
// FormulaId
// ---------------------------------------------------------------------------

/// Every calculator the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormulaId {
    Mean,
    StdDev,
    ConfidenceInterval,
    ZScore,
    TStatistic,
}

impl FormulaId {
    /// Registry order.
    pub const ALL: [FormulaId; 5] = [
        Self::Mean,
        Self::StdDev,
        Self::ConfidenceInterval,
        Self::ZScore,
        Self::TStatistic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::StdDev => "std-dev",
            Self::ConfidenceInterval => "confidence-interval",
            Self::ZScore => "z-score",
            Self::TStatistic => "t-statistic",
        }
    }

    pub fn spec(self) -> &'static FormulaSpec {
        match self {
            Self::Mean => &MEAN,
            Self::StdDev => &STD_DEV,
            Self::ConfidenceInterval => &CONFIDENCE_INTERVAL,
            Self::ZScore => &Z_SCORE,
            Self::TStatistic => &T_STATISTIC,
        }
    }

    pub fn evaluate(self, inputs: &InputValues) -> StatResult<CalculationResult> {
        match self {
            Self::Mean => descriptive::mean(inputs),
            Self::StdDev => descriptive::std_dev(inputs),
            Self::ConfidenceInterval => inference::confidence_interval(inputs),
            Self::ZScore => inference::z_score(inputs),
            Self::TStatistic => inference::t_statistic(inputs),
        }
    }
}

impl fmt::Display for FormulaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FormulaId {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| StatError::UnknownFormula(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// FormulaSpec / InputStep
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaSpec {
    pub id: FormulaId,
    pub display_name: &'static str,
    pub symbol: &'static str,
    /// TeX-style expression; rendering is up to the caller.
    pub formula_expression: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InputStep],
}

impl FormulaSpec {
    pub fn input(&self, id: &str) -> Option<&'static InputStep> {
        self.inputs.iter().find(|step| step.id == id)
    }

    /// Ids of steps that still have no value.
    pub fn missing_inputs(&self, values: &InputValues) -> Vec<&'static str> {
        self.inputs
            .iter()
            .filter(|step| !values.is_provided(step.id))
            .map(|step| step.id)
            .collect()
    }

    /// Validated option value for the enum-select step `step_id`.
    pub(crate) fn choice(&self, step_id: &str, values: &InputValues) -> StatResult<&'static str> {
        let step = self
            .input(step_id)
            .ok_or_else(|| StatError::validation(format!("{} has no input {step_id}", self.id)))?;
        step.choose(values.require(step_id)?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputStep {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: InputKind,
    pub placeholder: Option<&'static str>,
    pub hint: Option<&'static str>,
    pub example: Option<&'static str>,
    pub help_text: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "camelCase")]
pub enum InputKind {
    NumberList,
    Number,
    EnumSelect(&'static [SelectOption]),
}

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl InputStep {
    const fn number(id: &'static str, label: &'static str, placeholder: &'static str, hint: &'static str) -> Self {
        Self {
            id,
            label,
            kind: InputKind::Number,
            placeholder: Some(placeholder),
            hint: Some(hint),
            example: None,
            help_text: None,
        }
    }

    const fn select(id: &'static str, label: &'static str, options: &'static [SelectOption], hint: &'static str) -> Self {
        Self {
            id,
            label,
            kind: InputKind::EnumSelect(options),
            placeholder: None,
            hint: Some(hint),
            example: None,
            help_text: None,
        }
    }

    /// Option values accepted by an enum select; empty for other kinds.
    pub fn option_values(&self) -> Vec<&'static str> {
        match self.kind {
            InputKind::EnumSelect(options) => options.iter().map(|o| o.value).collect(),
            _ => Vec::new(),
        }
    }

    /// Check `raw` against the declared options and return the matching value.
    pub(crate) fn choose(&self, raw: &str) -> StatResult<&'static str> {
        let raw = raw.trim();
        self.option_values()
            .into_iter()
            .find(|v| *v == raw)
            .ok_or_else(|| {
                StatError::validation(format!(
                    "'{raw}' is not a valid choice for {} (expected one of: {})",
                    self.id,
                    self.option_values().join(", ")
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

const VALUES_PLACEHOLDER: &str = "Enter values separated by commas (e.g., 10, 20, 30)";

static MEAN: FormulaSpec = FormulaSpec {
    id: FormulaId::Mean,
    display_name: "Mean (Average)",
    symbol: "x̄",
    formula_expression: "\\bar{x} = \\frac{\\sum x_i}{n}",
    description: "Calculate the average of a dataset",
    inputs: &[InputStep {
        id: "values",
        label: "Enter your data values",
        kind: InputKind::NumberList,
        placeholder: Some(VALUES_PLACEHOLDER),
        hint: Some("These are the individual data points you want to average"),
        example: Some("Example dataset: 23, 45, 67, 89, 12, 34, 56"),
        help_text: Some("Enter each number separated by a comma. You can paste data from a spreadsheet."),
    }],
};

pub(crate) const POPULATION: &str = "population";
pub(crate) const SAMPLE: &str = "sample";

static STD_DEV: FormulaSpec = FormulaSpec {
    id: FormulaId::StdDev,
    display_name: "Standard Deviation",
    symbol: "σ",
    formula_expression: "\\sigma = \\sqrt{\\frac{\\sum (x_i - \\mu)^2}{N}}",
    description: "Measure the spread of data around the mean",
    inputs: &[
        InputStep {
            id: "values",
            label: "Enter your data values",
            kind: InputKind::NumberList,
            placeholder: Some(VALUES_PLACEHOLDER),
            hint: Some("The dataset you want to analyze"),
            example: Some("Example: Test scores: 85, 92, 78, 95, 88, 79, 83"),
            help_text: Some("Paste from a spreadsheet or enter numbers separated by commas, spaces, or line breaks"),
        },
        InputStep::select(
            "type",
            "Population or Sample?",
            &[
                SelectOption { value: POPULATION, label: "Population (σ)" },
                SelectOption { value: SAMPLE, label: "Sample (s)" },
            ],
            "Use sample if your data is a subset of a larger population",
        ),
    ],
};

static CONFIDENCE_INTERVAL: FormulaSpec = FormulaSpec {
    id: FormulaId::ConfidenceInterval,
    display_name: "Confidence Interval",
    symbol: "CI",
    formula_expression: "\\bar{x} \\pm z \\cdot \\frac{\\sigma}{\\sqrt{n}}",
    description: "Calculate the confidence interval for a population mean",
    inputs: &[
        InputStep::number("mean", "Sample Mean (x̄)", "e.g., 75.5", "The average of your sample data"),
        InputStep::number("stdDev", "Standard Deviation (σ or s)", "e.g., 10.2", "The spread of your data"),
        InputStep::number("sampleSize", "Sample Size (n)", "e.g., 30", "Number of observations in your sample"),
        InputStep::select(
            "confidence",
            "Confidence Level",
            &[
                SelectOption { value: "90", label: "90% (z = 1.645)" },
                SelectOption { value: "95", label: "95% (z = 1.96)" },
                SelectOption { value: "99", label: "99% (z = 2.576)" },
            ],
            "How confident you want to be in your interval",
        ),
    ],
};

static Z_SCORE: FormulaSpec = FormulaSpec {
    id: FormulaId::ZScore,
    display_name: "Z-Score",
    symbol: "z",
    formula_expression: "z = \\frac{x - \\mu}{\\sigma}",
    description: "Standardize a value to see how many standard deviations it is from the mean",
    inputs: &[
        InputStep::number("value", "Value (x)", "e.g., 85", "The value you want to standardize"),
        InputStep::number("mean", "Population Mean (μ)", "e.g., 75", "The average of the population"),
        InputStep::number("stdDev", "Population Standard Deviation (σ)", "e.g., 10", "The spread of the population"),
    ],
};

static T_STATISTIC: FormulaSpec = FormulaSpec {
    id: FormulaId::TStatistic,
    display_name: "T-Statistic",
    symbol: "t",
    formula_expression: "t = \\frac{\\bar{x} - \\mu_0}{s/\\sqrt{n}}",
    description: "Calculate the t-statistic for hypothesis testing",
    inputs: &[
        InputStep::number("sampleMean", "Sample Mean (x̄)", "e.g., 52.5", "The average of your sample"),
        InputStep::number("hypothesizedMean", "Hypothesized Mean (μ₀)", "e.g., 50", "The mean value in your null hypothesis"),
        InputStep::number("sampleStdDev", "Sample Standard Deviation (s)", "e.g., 5.2", "The spread of your sample data"),
        InputStep::number("sampleSize", "Sample Size (n)", "e.g., 25", "Number of observations in your sample"),
    ],
};

/// Look up a formula by its string id.
pub fn lookup(id: &str) -> StatResult<&'static FormulaSpec> {
    id.parse::<FormulaId>().map(FormulaId::spec)
}

/// All registered formulas in registry order.
pub fn registry() -> impl Iterator<Item = &'static FormulaSpec> {
    FormulaId::ALL.into_iter().map(FormulaId::spec)
}

/// Up to `limit` formulas other than `id`, in registry order.
pub fn related(id: FormulaId, limit: usize) -> Vec<&'static FormulaSpec> {
    registry().filter(|f| f.id != id).take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_round_trip_through_str() {
        for id in FormulaId::ALL {
            assert_eq!(id.as_str().parse::<FormulaId>().unwrap(), id);
            assert_eq!(id.spec().id, id);
        }
    }

    #[test]
    fn test_unknown_id() {
        let err = "median".parse::<FormulaId>().unwrap_err();
        assert!(matches!(err, StatError::UnknownFormula(ref s) if s == "median"));
        assert!(lookup("").is_err());
    }

    #[test]
    fn test_step_ids_unique_within_formula() {
        for spec in registry() {
            let ids: HashSet<_> = spec.inputs.iter().map(|s| s.id).collect();
            assert_eq!(ids.len(), spec.inputs.len(), "duplicate step in {}", spec.id);
        }
    }

    #[test]
    fn test_related_excludes_self() {
        let rel = related(FormulaId::StdDev, 3);
        assert_eq!(rel.len(), 3);
        assert!(rel.iter().all(|f| f.id != FormulaId::StdDev));
        assert_eq!(rel[0].id, FormulaId::Mean);
        assert_eq!(rel[1].id, FormulaId::ConfidenceInterval);
    }

    #[test]
    fn test_missing_inputs() {
        let spec = FormulaId::ConfidenceInterval.spec();
        let values = InputValues::new().with("mean", "50").with("stdDev", "");
        assert_eq!(
            spec.missing_inputs(&values),
            vec!["stdDev", "sampleSize", "confidence"]
        );
    }

    #[test]
    fn test_choose_validates_options() {
        let step = FormulaId::StdDev.spec().input("type").unwrap();
        assert_eq!(step.choose(" sample ").unwrap(), SAMPLE);
        let err = step.choose("both").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("population, sample"));
    }

    #[test]
    fn test_spec_serializes_kind_and_options() {
        let json = serde_json::to_value(FormulaId::ConfidenceInterval.spec()).unwrap();
        assert_eq!(json["id"], "confidence-interval");
        assert_eq!(json["inputs"][0]["kind"], "number");
        assert_eq!(json["inputs"][3]["kind"], "enumSelect");
        assert_eq!(json["inputs"][3]["options"][1]["value"], "95");
    }
}
