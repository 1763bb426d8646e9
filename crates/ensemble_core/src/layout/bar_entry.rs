use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::GroupLevel;

/// One bar in a grouped bar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
    pub major_key: String,
    pub mid_key: String,
    pub minor_key: String,
    /// Orders bars within their innermost group, largest first
    pub sort_value: f64,
    /// Bars sharing a legend key form one coloured series
    pub legend_key: String,
    /// Text drawn on the bar; empty for none
    pub bar_label: String,
    pub value: f64,
    /// Largest `sort_value` in the major group, when groups are ordered by it
    #[serde(default = "unbounded")]
    pub major_group_max: f64,
    #[serde(default = "unbounded")]
    pub mid_group_max: f64,
}

fn unbounded() -> f64 {
    f64::INFINITY
}

impl BarEntry {
    pub fn new(
        major_key: impl Into<String>,
        mid_key: impl Into<String>,
        minor_key: impl Into<String>,
        sort_value: f64,
        legend_key: impl Into<String>,
        bar_label: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            major_key: major_key.into(),
            mid_key: mid_key.into(),
            minor_key: minor_key.into(),
            sort_value,
            legend_key: legend_key.into(),
            bar_label: bar_label.into(),
            value,
            major_group_max: f64::INFINITY,
            mid_group_max: f64::INFINITY,
        }
    }

    /// Ungrouped bar whose legend key and label are both `name`
    pub fn ungrouped(name: impl Into<String>, sort_value: f64, value: f64) -> Self {
        let name = name.into();
        Self::new("", "", "", sort_value, name.clone(), name, value)
    }

    pub fn key(&self, level: GroupLevel) -> &str {
        match level {
            GroupLevel::Major => &self.major_key,
            GroupLevel::Mid => &self.mid_key,
            GroupLevel::Minor => &self.minor_key,
        }
    }

    /// Canonical bar order: groups by max (desc) then key (asc) from coarse to
    /// fine, then `sort_value` descending, then legend key.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        other
            .major_group_max
            .total_cmp(&self.major_group_max)
            .then_with(|| self.major_key.cmp(&other.major_key))
            .then_with(|| other.mid_group_max.total_cmp(&self.mid_group_max))
            .then_with(|| self.mid_key.cmp(&other.mid_key))
            .then_with(|| self.minor_key.cmp(&other.minor_key))
            .then_with(|| other.sort_value.total_cmp(&self.sort_value))
            .then_with(|| self.legend_key.cmp(&other.legend_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_unbounded_group_max() {
        let entry = BarEntry::ungrouped("PERM", 0.4, -0.4);
        assert_eq!(entry.major_group_max, f64::INFINITY);
        assert_eq!(entry.mid_group_max, f64::INFINITY);
        assert_eq!(entry.legend_key, "PERM");
        assert_eq!(entry.bar_label, "PERM");
        assert_eq!(entry.key(GroupLevel::Major), "");
    }

    #[test]
    fn test_canonical_order_keys_before_sort_value() {
        let a = BarEntry::new("A", "", "", 0.1, "x", "", 0.1);
        let b = BarEntry::new("B", "", "", 0.9, "x", "", 0.9);
        assert_eq!(a.canonical_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_canonical_order_sort_value_descending() {
        let low = BarEntry::ungrouped("low", 0.1, 0.1);
        let high = BarEntry::ungrouped("high", 0.9, 0.9);
        let mut bars = vec![low.clone(), high.clone()];
        bars.sort_by(BarEntry::canonical_cmp);
        assert_eq!(bars, vec![high, low]);
    }

    #[test]
    fn test_canonical_order_group_max_first() {
        let mut a = BarEntry::new("A", "", "", 0.1, "x", "", 0.1);
        let mut b = BarEntry::new("B", "", "", 0.9, "x", "", 0.9);
        a.major_group_max = 0.1;
        b.major_group_max = 0.9;
        assert_eq!(b.canonical_cmp(&a), Ordering::Less);
    }

    #[test]
    fn test_deserialize_without_group_max() {
        let entry: BarEntry = serde_json::from_str(
            r#"{"major_key":"","mid_key":"","minor_key":"","sort_value":1.0,
                "legend_key":"a","bar_label":"","value":1.0}"#,
        )
        .unwrap();
        assert_eq!(entry.major_group_max, f64::INFINITY);
    }
}
