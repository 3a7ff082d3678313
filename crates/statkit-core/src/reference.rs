//! Static reference tables: the symbol glossary and the formula sheet.

use serde::Serialize;

use crate::formula::FormulaId;

pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Serialize)]
pub struct SymbolEntry {
    pub symbol: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub formula: Option<&'static str>,
}

impl SymbolEntry {
    fn matches(&self, needle: &str) -> bool {
        [self.symbol, self.name, self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

const fn sym(
    symbol: &'static str,
    name: &'static str,
    description: &'static str,
    category: &'static str,
    formula: Option<&'static str>,
) -> SymbolEntry {
    SymbolEntry {
        symbol,
        name,
        description,
        category,
        formula,
    }
}

static SYMBOLS: [SymbolEntry; 25] = [
    sym("μ", "Mu (Population Mean)", "The average value of a population", "Descriptive", Some("\\mu = \\frac{\\sum x_i}{N}")),
    sym("σ", "Sigma (Population Std Dev)", "Measures the spread of data in a population", "Descriptive", Some("\\sigma = \\sqrt{\\frac{\\sum(x_i - \\mu)^2}{N}}")),
    sym("σ²", "Sigma Squared (Variance)", "The average of squared deviations from the mean", "Descriptive", Some("\\sigma^2 = \\frac{\\sum(x_i - \\mu)^2}{N}")),
    sym("x̄", "X-bar (Sample Mean)", "The average value of a sample", "Descriptive", Some("\\bar{x} = \\frac{\\sum x_i}{n}")),
    sym("s", "Sample Standard Deviation", "Measures the spread of data in a sample", "Descriptive", Some("s = \\sqrt{\\frac{\\sum(x_i - \\bar{x})^2}{n-1}}")),
    sym("Σ", "Capital Sigma (Summation)", "Used to sum a series of values", "General", Some("\\sum_{i=1}^{n} x_i")),
    sym("n", "Sample Size", "The number of observations in a sample", "General", None),
    sym("N", "Population Size", "The total number of observations in a population", "General", None),
    sym("p", "p-value", "Probability of observing results assuming null hypothesis is true", "Inference", Some("P(data|H_0)")),
    sym("α", "Alpha (Significance Level)", "The probability of Type I error (rejecting true H₀)", "Inference", Some("\\alpha = 0.05 \\text{ (common)}")),
    sym("β", "Beta (Type II Error)", "The probability of failing to reject false H₀", "Inference", Some("\\beta = P(\\text{fail to reject } H_0|H_0 \\text{ false})")),
    sym("H₀", "Null Hypothesis", "The default assumption (no effect)", "Inference", None),
    sym("H₁", "Alternative Hypothesis", "The research hypothesis (there is an effect)", "Inference", None),
    sym("r", "Correlation Coefficient", "Measures linear relationship between two variables", "Correlation", Some("r = \\frac{\\sum(x_i - \\bar{x})(y_i - \\bar{y})}{\\sqrt{\\sum(x_i - \\bar{x})^2 \\sum(y_i - \\bar{y})^2}}")),
    sym("R²", "Coefficient of Determination", "Proportion of variance explained by the model", "Regression", Some("R^2 = 1 - \\frac{SS_{res}}{SS_{tot}}")),
    sym("SE", "Standard Error", "Standard deviation of the sampling distribution", "Inference", Some("SE = \\frac{s}{\\sqrt{n}}")),
    sym("CI", "Confidence Interval", "Range likely containing population parameter", "Inference", Some("\\bar{x} \\pm z \\cdot \\frac{\\sigma}{\\sqrt{n}}")),
    sym("z", "z-score", "Number of standard deviations from mean", "Probability", Some("z = \\frac{x - \\mu}{\\sigma}")),
    sym("t", "t-statistic", "Test statistic for t-test", "Inference", Some("t = \\frac{\\bar{x} - \\mu_0}{s/\\sqrt{n}}")),
    sym("χ²", "Chi-square", "Test statistic for categorical data", "Inference", Some("\\chi^2 = \\sum \\frac{(O_i - E_i)^2}{E_i}")),
    sym("df", "Degrees of Freedom", "Number of independent values", "Inference", Some("df = n - 1")),
    sym("P(A)", "Probability of A", "Likelihood of event A occurring", "Probability", Some("P(A) = \\frac{\\text{favorable outcomes}}{\\text{total outcomes}}")),
    sym("P(A|B)", "Conditional Probability", "Probability of A given B occurred", "Probability", Some("P(A|B) = \\frac{P(A \\cap B)}{P(B)}")),
    sym("E(X)", "Expected Value", "The long-run average value", "Probability", Some("E(X) = \\sum x_i \\cdot P(x_i)")),
    sym("Var(X)", "Variance", "Expected value of squared deviations", "Probability", Some("Var(X) = E[(X - \\mu)^2]")),
];

pub fn symbols() -> &'static [SymbolEntry] {
    &SYMBOLS
}

pub fn symbol(symbol: &str) -> Option<&'static SymbolEntry> {
    SYMBOLS.iter().find(|s| s.symbol == symbol)
}

/// "All" followed by each category in first-seen order.
pub fn categories() -> Vec<&'static str> {
    let mut out = vec![ALL_CATEGORIES];
    for entry in &SYMBOLS {
        if !out.contains(&entry.category) {
            out.push(entry.category);
        }
    }
    out
}

/// Case-insensitive search over symbol, name and description, restricted to
/// `category` unless it is "All".
pub fn search(term: &str, category: &str) -> Vec<&'static SymbolEntry> {
    let needle = term.trim().to_lowercase();
    SYMBOLS
        .iter()
        .filter(|s| needle.is_empty() || s.matches(&needle))
        .filter(|s| category == ALL_CATEGORIES || s.category == category)
        .collect()
}

// ---------------------------------------------------------------------------
// Formula sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SheetItem {
    pub name: &'static str,
    pub formula: &'static str,
    pub explanation: &'static str,
    pub example: &'static str,
    /// Engine calculator for this item, when one exists.
    pub calculator: Option<FormulaId>,
}

#[derive(Debug, Serialize)]
pub struct SheetSection {
    pub category: &'static str,
    pub items: &'static [SheetItem],
}

const fn item(
    name: &'static str,
    formula: &'static str,
    explanation: &'static str,
    example: &'static str,
    calculator: Option<FormulaId>,
) -> SheetItem {
    SheetItem {
        name,
        formula,
        explanation,
        example,
        calculator,
    }
}

static SHEET: [SheetSection; 5] = [
    SheetSection {
        category: "Descriptive Statistics",
        items: &[
            item("Mean", "\\bar{x} = \\frac{\\sum x_i}{n}", "Sum all values and divide by count", "For [2, 4, 6, 8]: mean = (2+4+6+8)/4 = 5", Some(FormulaId::Mean)),
            item("Median", "\\text{Middle value when sorted}", "Sort data and find middle value", "For [2, 4, 6, 8, 10]: median = 6", None),
            item("Standard Deviation", "s = \\sqrt{\\frac{\\sum(x_i - \\bar{x})^2}{n-1}}", "Square root of variance", "Measures typical distance from mean", Some(FormulaId::StdDev)),
            item("Variance", "s^2 = \\frac{\\sum(x_i - \\bar{x})^2}{n-1}", "Average squared deviation from mean", "For sample: divide by n-1 (Bessel's correction)", None),
            item("Range", "\\text{Max} - \\text{Min}", "Difference between largest and smallest", "For [2, 4, 6, 8]: range = 8 - 2 = 6", None),
        ],
    },
    SheetSection {
        category: "Probability Distributions",
        items: &[
            item("Normal Distribution", "f(x) = \\frac{1}{\\sigma\\sqrt{2\\pi}}e^{-\\frac{1}{2}(\\frac{x-\\mu}{\\sigma})^2}", "Bell curve distribution", "68% within 1σ, 95% within 2σ, 99.7% within 3σ", None),
            item("Binomial Distribution", "P(X=k) = \\binom{n}{k}p^k(1-p)^{n-k}", "Probability of k successes in n trials", "Coin flips, pass/fail scenarios", None),
            item("Poisson Distribution", "P(X=k) = \\frac{\\lambda^k e^{-\\lambda}}{k!}", "Events in fixed interval", "Customers per hour, defects per batch", None),
        ],
    },
    SheetSection {
        category: "Hypothesis Testing",
        items: &[
            item("One-sample t-test", "t = \\frac{\\bar{x} - \\mu_0}{s/\\sqrt{n}}", "Compare sample mean to known value", "Test if average height differs from 170cm", Some(FormulaId::TStatistic)),
            item("Two-sample t-test", "t = \\frac{\\bar{x}_1 - \\bar{x}_2}{s_p\\sqrt{\\frac{1}{n_1} + \\frac{1}{n_2}}}", "Compare means of two groups", "Compare treatment vs control group", None),
            item("Chi-square test", "\\chi^2 = \\sum \\frac{(O - E)^2}{E}", "Test independence/goodness of fit", "Test if gender and preference are independent", None),
            item("ANOVA F-test", "F = \\frac{MS_{between}}{MS_{within}}", "Compare means of 3+ groups", "Test if teaching methods differ in effectiveness", None),
        ],
    },
    SheetSection {
        category: "Confidence Intervals",
        items: &[
            item("CI for Mean (σ known)", "\\bar{x} \\pm z_{\\alpha/2} \\cdot \\frac{\\sigma}{\\sqrt{n}}", "Use z-score when σ is known", "95% CI: mean ± 1.96 × SE", Some(FormulaId::ConfidenceInterval)),
            item("CI for Mean (σ unknown)", "\\bar{x} \\pm t_{\\alpha/2} \\cdot \\frac{s}{\\sqrt{n}}", "Use t-score when σ is unknown", "Use t-table with df = n-1", None),
            item("CI for Proportion", "\\hat{p} \\pm z \\cdot \\sqrt{\\frac{\\hat{p}(1-\\hat{p})}{n}}", "Interval for population proportion", "Poll: 60% ± margin of error", None),
        ],
    },
    SheetSection {
        category: "Regression & Correlation",
        items: &[
            item("Linear Regression", "y = \\beta_0 + \\beta_1 x + \\epsilon", "Model linear relationship", "Predict sales from advertising spend", None),
            item("Correlation Coefficient", "r = \\frac{\\text{Cov}(X,Y)}{\\sigma_X \\sigma_Y}", "Measure of linear association", "r = 0.8 indicates strong positive correlation", None),
            item("R-squared", "R^2 = \\frac{SS_{regression}}{SS_{total}}", "Proportion of variance explained", "R² = 0.75 means model explains 75% of variance", None),
        ],
    },
];

pub fn formula_sheet() -> &'static [SheetSection] {
    &SHEET
}
