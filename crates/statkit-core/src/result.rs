use serde::{Deserialize, Serialize};

/// One labelled intermediate value in a derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationStep {
    pub label: String,
    pub value: String,
}

impl DerivationStep {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Output of a single evaluation. Step order is the order of the derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub final_value: String,
    pub derivation_steps: Vec<DerivationStep>,
}

impl CalculationResult {
    pub(crate) fn builder() -> TraceBuilder {
        TraceBuilder::default()
    }

    /// Value of the first step carrying `label`.
    pub fn step(&self, label: &str) -> Option<&str> {
        self.derivation_steps
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.value.as_str())
    }

    pub fn labels(&self) -> Vec<&str> {
        self.derivation_steps
            .iter()
            .map(|s| s.label.as_str())
            .collect()
    }
}

#[derive(Default)]
pub(crate) struct TraceBuilder {
    steps: Vec<DerivationStep>,
}

impl TraceBuilder {
    pub fn step(mut self, label: &str, value: impl Into<String>) -> Self {
        self.steps.push(DerivationStep::new(label, value));
        self
    }

    pub fn finish(self, final_value: impl Into<String>) -> CalculationResult {
        CalculationResult {
            final_value: final_value.into(),
            derivation_steps: self.steps,
        }
    }
}
