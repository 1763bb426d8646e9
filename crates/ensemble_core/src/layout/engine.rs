use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::{BarEntry, GroupLevel, Rgb, category_color};

/// A bar placed on the group axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedBar {
    pub position: f64,
    pub value: f64,
    /// Index into [`GroupedAxisLayout::series`]
    pub series: usize,
}

/// All bars sharing a legend key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub legend_key: String,
    pub color: Rgb,
    /// `(position, value)` in axis order
    pub points: Vec<(f64, f64)>,
}

/// Group label placed at the centre of its group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub position: f64,
    pub level: GroupLevel,
    pub label: String,
}

/// Text drawn on a bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarLabel {
    pub position: f64,
    pub label: String,
    /// Drawn on the far side of the value axis (negative bars)
    pub opposite_side: bool,
}

/// Grid line positions between groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDividers {
    pub major: Vec<f64>,
    pub mid: Vec<f64>,
    pub minor: Vec<f64>,
}

impl GroupDividers {
    fn at_mut(&mut self, level: GroupLevel) -> &mut Vec<f64> {
        match level {
            GroupLevel::Major => &mut self.major,
            GroupLevel::Mid => &mut self.mid,
            GroupLevel::Minor => &mut self.minor,
        }
    }
}

/// Padding that keeps tick labels of different levels from overlapping.
///
/// On a horizontal (bottom) axis, coarser labels are pushed down by line breaks.
/// On a vertical (left) axis they are pushed out by trailing spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickLabelPadding {
    pub max_minor_lines: usize,
    pub max_mid_lines: usize,
    pub max_minor_chars: usize,
    pub max_mid_chars: usize,
}

impl TickLabelPadding {
    pub fn from_ticks(ticks: &[AxisTick]) -> Self {
        let mut padding = Self::default();
        for tick in ticks {
            let lines = 1 + tick.label.matches('\n').count();
            let chars = tick.label.chars().count();
            match tick.level {
                GroupLevel::Mid => {
                    padding.max_mid_lines = padding.max_mid_lines.max(lines);
                    padding.max_mid_chars = padding.max_mid_chars.max(chars);
                }
                GroupLevel::Minor => {
                    padding.max_minor_lines = padding.max_minor_lines.max(lines);
                    padding.max_minor_chars = padding.max_minor_chars.max(chars);
                }
                GroupLevel::Major => {}
            }
        }
        padding
    }

    /// Label text for a horizontal group axis
    pub fn bottom_label(&self, tick: &AxisTick) -> String {
        let breaks = match tick.level {
            GroupLevel::Major => self.max_minor_lines + self.max_mid_lines,
            GroupLevel::Mid => self.max_minor_lines,
            GroupLevel::Minor => 0,
        };
        format!("{}{}", "\n".repeat(breaks), tick.label)
    }

    /// Label text for a vertical group axis
    pub fn left_label(&self, tick: &AxisTick) -> String {
        let spaces = match tick.level {
            GroupLevel::Major => 2 * (self.max_minor_chars + self.max_mid_chars),
            GroupLevel::Mid => 2 * self.max_minor_chars,
            GroupLevel::Minor => 0,
        };
        format!("{}{}", tick.label, " ".repeat(spaces))
    }
}

/// Positions and annotations for a grouped bar chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedAxisLayout {
    /// Bars in axis order
    pub bars: Vec<PositionedBar>,
    /// Series ordered by legend key
    pub series: Vec<BarSeries>,
    pub ticks: Vec<AxisTick>,
    pub dividers: GroupDividers,
    pub bar_labels: Vec<BarLabel>,
    /// The group axis spans `[0, axis_end]`
    pub axis_end: f64,
    pub padding: TickLabelPadding,
}

impl GroupedAxisLayout {
    pub fn positions(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.position).collect()
    }

    pub fn ticks_at(&self, level: GroupLevel) -> impl Iterator<Item = &AxisTick> + '_ {
        self.ticks.iter().filter(move |tick| tick.level == level)
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Lay out bars along a group axis.
///
/// Bars are put in canonical order, reduced to the `max_bar_count` largest by
/// `|value|` if requested, and, with `sort_by_group_max`, groups are ordered by
/// their largest `sort_value`. Positions start at 1.0 with one unit per bar;
/// ending a major, mid or minor group inserts 1.6, 0.5 or 0.2 of extra space.
pub fn layout_grouped_bars(
    entries: &[BarEntry],
    max_bar_count: Option<usize>,
    sort_by_group_max: bool,
) -> GroupedAxisLayout {
    compute_layout(entries, max_bar_count, sort_by_group_max, None)
}

pub(super) fn compute_layout(
    entries: &[BarEntry],
    max_bar_count: Option<usize>,
    sort_by_group_max: bool,
    color_override: Option<Rgb>,
) -> GroupedAxisLayout {
    let mut ordered = entries.to_vec();
    ordered.sort_by(BarEntry::canonical_cmp);

    if let Some(n) = max_bar_count {
        ordered = keep_largest(ordered, n);
    }

    if sort_by_group_max {
        assign_group_max(&mut ordered);
        ordered.sort_by(BarEntry::canonical_cmp);
    }

    let mut layout = assign_positions(&ordered, color_override);
    layout.padding = TickLabelPadding::from_ticks(&layout.ticks);

    tracing::debug!(
        input = entries.len(),
        bars = layout.bars.len(),
        series = layout.series.len(),
        ticks = layout.ticks.len(),
        "laid out grouped bars"
    );
    layout
}

/// Keep the `n` entries with the largest magnitude, preserving relative order
fn keep_largest(ordered: Vec<BarEntry>, n: usize) -> Vec<BarEntry> {
    if n >= ordered.len() {
        return ordered;
    }

    let mut by_magnitude: Vec<usize> = (0..ordered.len()).collect();
    by_magnitude.sort_by(|&a, &b| ordered[b].value.abs().total_cmp(&ordered[a].value.abs()));
    by_magnitude.truncate(n);

    let keep: FxHashSet<usize> = by_magnitude.into_iter().collect();
    ordered
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep.contains(idx))
        .map(|(_, entry)| entry)
        .collect()
}

fn assign_group_max(entries: &mut [BarEntry]) {
    let mut major_max: FxHashMap<String, f64> = FxHashMap::default();
    let mut mid_max: FxHashMap<(String, String), f64> = FxHashMap::default();

    for entry in entries.iter() {
        if !entry.major_key.is_empty() {
            major_max
                .entry(entry.major_key.clone())
                .and_modify(|max| *max = max.max(entry.sort_value))
                .or_insert(entry.sort_value);
        }
        if !entry.mid_key.is_empty() {
            mid_max
                .entry((entry.major_key.clone(), entry.mid_key.clone()))
                .and_modify(|max| *max = max.max(entry.sort_value))
                .or_insert(entry.sort_value);
        }
    }

    for entry in entries.iter_mut() {
        if let Some(&max) = major_max.get(&entry.major_key) {
            entry.major_group_max = max;
        }
        if let Some(&max) = mid_max.get(&(entry.major_key.clone(), entry.mid_key.clone())) {
            entry.mid_group_max = max;
        }
    }
}

/// Open group at one level while walking the bars
#[derive(Debug, Default)]
struct OpenGroup {
    seen: FxHashSet<String>,
    label: String,
    start: f64,
}

struct PositionWalker {
    position: f64,
    groups: [OpenGroup; 3],
    ticks: Vec<AxisTick>,
    dividers: GroupDividers,
}

impl PositionWalker {
    fn new() -> Self {
        let start = 1.0;
        Self {
            position: start,
            groups: std::array::from_fn(|_| OpenGroup {
                start,
                ..Default::default()
            }),
            ticks: Vec::new(),
            dividers: GroupDividers::default(),
        }
    }

    fn emit_tick(&mut self, level: GroupLevel) {
        let group = &self.groups[level.index()];
        if group.label.is_empty() {
            return;
        }
        let position =
            group.start + 0.5 * (self.position - 1.0 - group.start) + level.tick_offset();
        self.ticks.push(AxisTick {
            position,
            level,
            label: group.label.clone(),
        });
    }

    /// Emit ticks for `level` and all finer levels, then open up the gap
    fn finish_group(&mut self, level: GroupLevel) {
        for finer in GroupLevel::ALL.into_iter().filter(|l| *l >= level) {
            self.emit_tick(finer);
        }
        let spacing = level.spacing();
        self.position += spacing;
        self.dividers
            .at_mut(level)
            .push(self.position - 0.5 - 0.5 * spacing);
    }

    fn start_group(&mut self, level: GroupLevel, key: &str) {
        let position = self.position;
        let group = &mut self.groups[level.index()];
        group.label = key.to_string();
        group.start = position;
        for finer in GroupLevel::ALL.into_iter().filter(|l| *l > level) {
            let group = &mut self.groups[finer.index()];
            group.seen.clear();
            group.label.clear();
            group.start = position;
        }
    }

    /// Advance past group boundaries for `entry`; returns the bar position
    fn place(&mut self, entry: &BarEntry) -> f64 {
        for level in GroupLevel::ALL {
            let key = entry.key(level);
            let group = &mut self.groups[level.index()];
            let had_any = !group.seen.is_empty();
            let is_new = group.seen.insert(key.to_string());

            if is_new && had_any {
                self.finish_group(level);
            }
            if is_new {
                self.start_group(level, key);
            }
        }
        let position = self.position;
        self.position += 1.0;
        position
    }

    fn flush(&mut self) {
        for level in GroupLevel::ALL {
            self.emit_tick(level);
        }
    }
}

fn assign_positions(ordered: &[BarEntry], color_override: Option<Rgb>) -> GroupedAxisLayout {
    let mut walker = PositionWalker::new();
    let mut placed: Vec<(f64, &BarEntry)> = Vec::with_capacity(ordered.len());
    let mut bar_labels = Vec::new();

    for entry in ordered {
        let position = walker.place(entry);
        if !entry.bar_label.is_empty() {
            bar_labels.push(BarLabel {
                position,
                label: entry.bar_label.clone(),
                opposite_side: entry.value < 0.0,
            });
        }
        placed.push((position, entry));
    }
    walker.flush();

    let mut points_by_legend: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for (position, entry) in &placed {
        points_by_legend
            .entry(entry.legend_key.as_str())
            .or_default()
            .push((*position, entry.value));
    }

    let series_index: FxHashMap<&str, usize> = points_by_legend
        .keys()
        .enumerate()
        .map(|(idx, key)| (*key, idx))
        .collect();

    let bars = placed
        .iter()
        .map(|(position, entry)| PositionedBar {
            position: *position,
            value: entry.value,
            series: series_index[entry.legend_key.as_str()],
        })
        .collect();

    let series = points_by_legend
        .into_iter()
        .enumerate()
        .map(|(idx, (legend_key, points))| BarSeries {
            legend_key: legend_key.to_string(),
            color: color_override.unwrap_or_else(|| category_color(idx)),
            points,
        })
        .collect();

    GroupedAxisLayout {
        bars,
        series,
        ticks: walker.ticks,
        dividers: walker.dividers,
        bar_labels,
        axis_end: walker.position,
        padding: TickLabelPadding::default(),
    }
}
