//! Grouped (hierarchical) bar chart layout
//!
//! Bars carry up to three levels of group keys (major, mid, minor). The layout
//! orders them, optionally keeps only the strongest, and assigns axis positions
//! with extra spacing between groups, group tick labels, divider positions and
//! per-legend series. Rendering is left to the caller.

mod bar_entry;
mod builder;
mod engine;

pub use bar_entry::BarEntry;
pub use builder::GroupedBarChartBuilder;
pub use engine::{
    AxisTick, BarLabel, BarSeries, GroupDividers, GroupedAxisLayout, PositionedBar,
    TickLabelPadding, layout_grouped_bars,
};

use serde::{Deserialize, Serialize};

/// Hierarchy level of a group key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLevel {
    Major,
    Mid,
    Minor,
}

impl GroupLevel {
    pub const ALL: [GroupLevel; 3] = [GroupLevel::Major, GroupLevel::Mid, GroupLevel::Minor];

    /// Extra axis space inserted when a group of this level ends
    pub fn spacing(&self) -> f64 {
        match self {
            GroupLevel::Major => 1.6,
            GroupLevel::Mid => 0.5,
            GroupLevel::Minor => 0.2,
        }
    }

    /// Nudge applied to tick positions so ticks of different levels never coincide
    pub fn tick_offset(&self) -> f64 {
        match self {
            GroupLevel::Major => 0.0,
            GroupLevel::Mid => 1e-4,
            GroupLevel::Minor => 2e-4,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Categorical colours assigned to series in legend order, cycled
pub const CATEGORY_PALETTE: [Rgb; 10] = [
    Rgb::new(0x1f, 0x77, 0xb4),
    Rgb::new(0xff, 0x7f, 0x0e),
    Rgb::new(0x2c, 0xa0, 0x2c),
    Rgb::new(0xd6, 0x27, 0x28),
    Rgb::new(0x94, 0x67, 0xbd),
    Rgb::new(0x8c, 0x56, 0x4b),
    Rgb::new(0xe3, 0x77, 0xc2),
    Rgb::new(0x7f, 0x7f, 0x7f),
    Rgb::new(0xbc, 0xbd, 0x22),
    Rgb::new(0x17, 0xbe, 0xcf),
];

/// Palette colour for the series at `index`
pub fn category_color(index: usize) -> Rgb {
    CATEGORY_PALETTE[index % CATEGORY_PALETTE.len()]
}
