//! Ensemble input parameters and their variation classification

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::case::{ParameterValue, SummaryCase};

/// Ranges narrower than this are treated as having no spread at all
const MIN_VARIATION_RANGE: f64 = 1.0e-4;

/// Normalized standard deviations at or below this are "no variation"
pub const NO_VARIATION_EPSILON: f64 = 1.0e-9;

/// Number of variation bins above "no variation"
pub const VARIATION_BIN_COUNT: usize = 3;

/// Value type of an ensemble parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParameterKind {
    /// No case defined a usable value
    #[default]
    None,
    Numeric,
    Text,
}

/// Coarse classification of how much a parameter varies across the ensemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum VariationBin {
    NoVariation,
    LowVariation,
    #[default]
    MediumVariation,
    HighVariation,
}

impl VariationBin {
    fn from_bin_number(bin: i32) -> Self {
        match bin {
            i32::MIN..=-1 => VariationBin::NoVariation,
            0 => VariationBin::LowVariation,
            1 => VariationBin::MediumVariation,
            _ => VariationBin::HighVariation,
        }
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            VariationBin::NoVariation => "No Variation",
            VariationBin::LowVariation => "Low Variation",
            VariationBin::MediumVariation => "Medium Variation",
            VariationBin::HighVariation => "High Variation",
        }
    }
}

/// Snapshot of one named input parameter across all cases of an ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleParameter {
    pub name: String,
    pub kind: ParameterKind,
    /// Numeric value per case, index-aligned with the case order.
    /// Cases without a numeric value hold `+inf`.
    pub values: Vec<f64>,
    /// Sorted, de-duplicated texts for text parameters
    pub text_values: Vec<String>,
    pub min_value: f64,
    pub max_value: f64,
    pub variation: VariationBin,
}

impl EnsembleParameter {
    /// Build a parameter snapshot from the cases of an ensemble.
    ///
    /// Cases mixing numeric and text values for the same name are resolved by
    /// majority: the minority type is discarded (numeric wins) or converted to
    /// text (text wins).
    pub fn from_cases<C: SummaryCase>(name: &str, cases: &[C]) -> Self {
        let mut values = vec![f64::INFINITY; cases.len()];
        let mut texts: Vec<Option<String>> = vec![None; cases.len()];
        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        let mut numeric_count = 0usize;
        let mut text_count = 0usize;

        for (idx, case) in cases.iter().enumerate() {
            match case.parameter_value(name) {
                Some(ParameterValue::Numeric(v)) if v.is_finite() => {
                    values[idx] = v;
                    min_value = min_value.min(v);
                    max_value = max_value.max(v);
                    numeric_count += 1;
                }
                Some(ParameterValue::Text(text)) => {
                    texts[idx] = Some(text);
                    text_count += 1;
                }
                _ => {}
            }
        }

        let kind = match (numeric_count, text_count) {
            (0, 0) => ParameterKind::None,
            (_, 0) => ParameterKind::Numeric,
            (0, _) => ParameterKind::Text,
            (n, t) if n > t => ParameterKind::Numeric,
            _ => ParameterKind::Text,
        };

        let mut text_values = Vec::new();
        if kind == ParameterKind::Text {
            let mut unique = BTreeSet::new();
            for (idx, text) in texts.into_iter().enumerate() {
                match text {
                    Some(text) => {
                        unique.insert(text);
                    }
                    None if values[idx].is_finite() => {
                        unique.insert(values[idx].to_string());
                    }
                    None => {}
                }
            }
            text_values = unique.into_iter().collect();
            values.iter_mut().for_each(|v| *v = f64::INFINITY);
            min_value = f64::INFINITY;
            max_value = f64::NEG_INFINITY;
        }

        Self {
            name: name.to_string(),
            kind,
            values,
            text_values,
            min_value,
            max_value,
            variation: VariationBin::default(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ParameterKind::Numeric
    }

    pub fn is_text(&self) -> bool {
        self.kind == ParameterKind::Text
    }

    pub fn is_valid(&self) -> bool {
        self.kind != ParameterKind::None
    }

    /// Population standard deviation over the finite values
    #[must_use]
    pub fn std_deviation(&self) -> f64 {
        let finite: Vec<f64> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return 0.0;
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt()
    }

    /// Standard deviation relative to the value range, in `[0, 0.5]`
    #[must_use]
    pub fn normalized_std_deviation(&self) -> f64 {
        if !self.is_numeric() {
            return 0.0;
        }
        let range = self.max_value - self.min_value;
        if !(range >= MIN_VARIATION_RANGE) {
            return 0.0;
        }
        self.std_deviation() / range
    }
}

/// Assign variation bins and sort parameters with the highest variation first.
///
/// Within a bin the incoming order is kept, so alphabetic input stays alphabetic.
pub fn classify_variation(parameters: &mut [EnsembleParameter]) {
    let mut min_std_dev = f64::INFINITY;
    let mut max_std_dev = 0.0_f64;
    for parameter in parameters.iter() {
        let std_dev = parameter.normalized_std_deviation();
        if std_dev != 0.0 {
            min_std_dev = min_std_dev.min(std_dev);
            max_std_dev = max_std_dev.max(std_dev);
        }
    }
    if !(max_std_dev - min_std_dev > 0.0) {
        return;
    }

    let delta = (max_std_dev - min_std_dev) / VARIATION_BIN_COUNT as f64;
    let mut edges = Vec::with_capacity(VARIATION_BIN_COUNT);
    edges.push(0.0);
    for i in 0..VARIATION_BIN_COUNT - 1 {
        edges.push(min_std_dev + (i + 1) as f64 * delta);
    }

    for parameter in parameters.iter_mut() {
        let std_dev = parameter.normalized_std_deviation();
        let exceeded = edges.iter().filter(|&&edge| std_dev > edge).count() as i32;
        parameter.variation = VariationBin::from_bin_number(exceeded - 1);
    }

    parameters.sort_by(|a, b| b.variation.cmp(&a.variation));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemoryCase;

    fn numeric(name: &str, values: &[f64]) -> EnsembleParameter {
        let cases: Vec<MemoryCase> = values
            .iter()
            .enumerate()
            .map(|(i, v)| MemoryCase::new(format!("c{i}")).with_parameter(name, *v))
            .collect();
        EnsembleParameter::from_cases(name, &cases)
    }

    #[test]
    fn test_numeric_parameter_snapshot() {
        let p = numeric("PERM", &[10.0, 30.0, 20.0]);
        assert!(p.is_numeric());
        assert_eq!(p.values, vec![10.0, 30.0, 20.0]);
        assert_eq!(p.min_value, 10.0);
        assert_eq!(p.max_value, 30.0);
    }

    #[test]
    fn test_missing_values_are_infinite() {
        let cases = vec![
            MemoryCase::new("a").with_parameter("X", 1.0),
            MemoryCase::new("b"),
        ];
        let p = EnsembleParameter::from_cases("X", &cases);
        assert!(p.is_numeric());
        assert_eq!(p.values[0], 1.0);
        assert!(p.values[1].is_infinite());
    }

    #[test]
    fn test_mixed_types_resolve_by_majority() {
        let numeric_majority = vec![
            MemoryCase::new("a").with_parameter("X", 1.0),
            MemoryCase::new("b").with_parameter("X", 2.0),
            MemoryCase::new("c").with_text_parameter("X", "high"),
        ];
        let p = EnsembleParameter::from_cases("X", &numeric_majority);
        assert!(p.is_numeric());
        assert!(p.values[2].is_infinite());

        let text_majority = vec![
            MemoryCase::new("a").with_text_parameter("X", "low"),
            MemoryCase::new("b").with_text_parameter("X", "high"),
            MemoryCase::new("c").with_parameter("X", 3.0),
        ];
        let p = EnsembleParameter::from_cases("X", &text_majority);
        assert!(p.is_text());
        assert_eq!(p.text_values, vec!["3", "high", "low"]);
        assert!(p.values.iter().all(|v| v.is_infinite()));
    }

    #[test]
    fn test_undefined_parameter_is_invalid() {
        let cases = vec![MemoryCase::new("a")];
        let p = EnsembleParameter::from_cases("NOPE", &cases);
        assert!(!p.is_valid());
        assert_eq!(p.normalized_std_deviation(), 0.0);
    }

    #[test]
    fn test_classify_variation_orders_high_first() {
        let mut params = vec![
            numeric("A_CONST", &[1.0, 1.0, 1.0, 1.0]),
            numeric("B_LOW", &[0.0, 0.0, 0.0, 10.0]),
            numeric("C_HIGH", &[0.0, 0.0, 10.0, 10.0]),
        ];
        classify_variation(&mut params);

        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C_HIGH", "B_LOW", "A_CONST"]);
        assert_eq!(params[0].variation, VariationBin::HighVariation);
        assert_eq!(params[1].variation, VariationBin::LowVariation);
        assert_eq!(params[2].variation, VariationBin::NoVariation);
    }

    #[test]
    fn test_classify_variation_skips_uniform_spread() {
        let mut params = vec![numeric("A", &[0.0, 1.0]), numeric("B", &[0.0, 2.0])];
        classify_variation(&mut params);
        assert!(params.iter().all(|p| p.variation == VariationBin::MediumVariation));
        assert_eq!(params[0].name, "A");
    }
}
