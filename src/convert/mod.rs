use crate::color::{apply_transparency, ColorOrdering};
use crate::error::{Diagnosed, Warning};
use crate::keymap::{KeyMap, TransparencyMap};
use crate::theme::{SourceTheme, TargetTheme};

/// Translates Android themes into desktop themes using the static maps.
///
/// Holds only read-only tables, so one converter serves a whole batch.
#[derive(Debug, Clone, Default)]
pub struct ThemeConverter {
    key_map: KeyMap,
    transparency: TransparencyMap,
}

impl ThemeConverter {
    pub fn new(key_map: KeyMap, transparency: TransparencyMap) -> Self {
        Self {
            key_map,
            transparency,
        }
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn transparency(&self) -> &TransparencyMap {
        &self.transparency
    }

    pub fn convert(&self, source: &SourceTheme) -> Diagnosed<TargetTheme> {
        let mut target = TargetTheme {
            background: source.background.clone(),
            ..TargetTheme::default()
        };
        let mut warnings = Vec::new();

        for (desktop_key, source_key) in &self.key_map {
            let Some(color) = source.color(source_key) else {
                warnings.push(Warning::UnmappedKey {
                    desktop_key: desktop_key.clone(),
                    source_key: source_key.clone(),
                });
                continue;
            };

            let mut color = color.to_ordering(ColorOrdering::Rgba);
            if let Some(&alpha) = self.transparency.get(desktop_key) {
                color = apply_transparency(color, alpha);
            }
            target.colors.insert(desktop_key.clone(), color);
        }

        Diagnosed::new(target, warnings)
    }
}
