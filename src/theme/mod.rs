use std::collections::{BTreeMap, HashMap};

use crate::color::Color;

/// Wallpaper carried alongside a theme's colors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Background {
    /// Image bytes copied verbatim from the source theme.
    Raw(Vec<u8>),
    /// RGBA color used to synthesize a tiled wallpaper.
    SolidColor(Color),
    #[default]
    Absent,
}

impl Background {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Parsed Android theme. Colors are stored in RGBA ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTheme {
    pub colors: HashMap<String, Color>,
    pub background: Background,
}

impl SourceTheme {
    pub fn color(&self, key: &str) -> Option<Color> {
        self.colors.get(key).copied()
    }
}

/// Desktop theme ready for packaging. Keys iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetTheme {
    pub colors: BTreeMap<String, Color>,
    pub background: Background,
}
