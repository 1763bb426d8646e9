use std::fmt::Write as _;

use super::engine::compute_layout;
use super::{BarEntry, GroupedAxisLayout, Rgb};

/// Collects bar entries and produces their layout
#[derive(Debug, Clone, Default)]
pub struct GroupedBarChartBuilder {
    entries: Vec<BarEntry>,
    sort_by_group_max: bool,
    bar_color: Option<Rgb>,
}

impl GroupedBarChartBuilder {
    pub fn new(sort_by_group_max: bool) -> Self {
        Self {
            sort_by_group_max,
            ..Default::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_bar_entry(
        &mut self,
        major_key: impl Into<String>,
        mid_key: impl Into<String>,
        minor_key: impl Into<String>,
        sort_value: f64,
        legend_key: impl Into<String>,
        bar_label: impl Into<String>,
        value: f64,
    ) {
        self.push(BarEntry::new(
            major_key, mid_key, minor_key, sort_value, legend_key, bar_label, value,
        ));
    }

    pub fn push(&mut self, entry: BarEntry) {
        self.entries.push(entry);
    }

    /// Use one colour for every series instead of the category palette
    pub fn set_bar_color(&mut self, color: Rgb) {
        self.bar_color = Some(color);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn layout(&self, max_bar_count: Option<usize>) -> GroupedAxisLayout {
        compute_layout(
            &self.entries,
            max_bar_count,
            self.sort_by_group_max,
            self.bar_color,
        )
    }

    /// Entries as a tab-separated table in canonical order.
    ///
    /// Group, legend and bar columns only appear when some entry fills them; the
    /// bar column is also left out when every bar label equals its legend key.
    pub fn plot_content_as_text(&self) -> String {
        let mut ordered: Vec<&BarEntry> = self.entries.iter().collect();
        ordered.sort_by(|a, b| a.canonical_cmp(b));

        let has_major = ordered.iter().any(|e| !e.major_key.is_empty());
        let has_mid = ordered.iter().any(|e| !e.mid_key.is_empty());
        let has_minor = ordered.iter().any(|e| !e.minor_key.is_empty());
        let has_legend = ordered.iter().any(|e| !e.legend_key.is_empty());
        let has_bar = ordered
            .iter()
            .any(|e| !e.bar_label.is_empty() && e.bar_label != e.legend_key);

        let mut header: Vec<&str> = Vec::new();
        if has_major {
            header.push("Major");
        }
        if has_mid {
            header.push("Mid");
        }
        if has_minor {
            header.push("Minor");
        }
        if has_legend {
            header.push("Legend");
        }
        if has_bar {
            header.push("Bar");
        }
        header.push("Value");

        let mut text = header.join("\t");
        text.push('\n');

        for entry in ordered {
            let mut fields: Vec<&str> = Vec::with_capacity(header.len());
            if has_major {
                fields.push(&entry.major_key);
            }
            if has_mid {
                fields.push(&entry.mid_key);
            }
            if has_minor {
                fields.push(&entry.minor_key);
            }
            if has_legend {
                fields.push(&entry.legend_key);
            }
            if has_bar {
                fields.push(&entry.bar_label);
            }
            for field in fields {
                text.push_str(field);
                text.push('\t');
            }
            let _ = writeln!(text, "{}", entry.value);
        }
        text
    }
}
