//! Number rendering shared by every derivation.

/// Echo of a user-supplied number in its shortest round-trip form.
pub fn raw(x: f64) -> String {
    format!("{x}")
}

/// Final answers and non-integral derived quantities: always 4 decimals.
pub fn fixed(x: f64) -> String {
    format!("{x:.4}")
}

/// Sums, counts and other terms: plain when integral, 4 decimals otherwise.
pub fn derived(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{x}")
    } else {
        fixed(x)
    }
}

pub(crate) fn join(values: &[f64], render: fn(f64) -> String) -> String {
    values
        .iter()
        .map(|v| render(*v))
        .collect::<Vec<_>>()
        .join(", ")
}
