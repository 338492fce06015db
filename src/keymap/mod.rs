//! Static translation tables between desktop and Android color keys.
//!
//! Map files hold one `key=value` pair per line. Any line that contains a
//! comment marker anywhere is skipped entirely, so a value containing `#`
//! also hides its line. Existing map files rely on this, keep it.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{Diagnosed, MapKind, Warning};

pub type KeyMapResult<T> = std::result::Result<T, KeyMapError>;

#[derive(Debug, Error)]
pub enum KeyMapError {
    #[error("failed to read map file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Desktop key to Android key.
pub type KeyMap = BTreeMap<String, String>;

/// Desktop key to alpha byte.
pub type TransparencyMap = BTreeMap<String, u8>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSyntax {
    pub separator: char,
    pub comment_markers: Vec<String>,
}

impl Default for MapSyntax {
    fn default() -> Self {
        Self {
            separator: '=',
            comment_markers: vec!["//".to_string(), ";".to_string(), "#".to_string()],
        }
    }
}

impl MapSyntax {
    pub fn is_comment(&self, line: &str) -> bool {
        self.comment_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
    }

    /// Splits a non-comment line on the first separator.
    pub fn split_pair<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        if self.is_comment(line) {
            return None;
        }
        line.split_once(self.separator)
            .map(|(key, value)| (key.trim(), value.trim()))
    }

    fn pairs<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        text.lines().filter_map(move |line| self.split_pair(line))
    }
}

pub fn parse_key_map(text: &str, syntax: &MapSyntax) -> KeyMap {
    syntax
        .pairs(text)
        .map(|(desktop_key, source_key)| (desktop_key.to_string(), source_key.to_string()))
        .collect()
}

/// Entries whose value isn't a hex byte are dropped with a warning.
pub fn parse_transparency_map(text: &str, syntax: &MapSyntax) -> Diagnosed<TransparencyMap> {
    let mut map = TransparencyMap::new();
    let mut warnings = Vec::new();

    for (key, value) in syntax.pairs(text) {
        match u8::from_str_radix(value, 16) {
            Ok(alpha) => {
                map.insert(key.to_string(), alpha);
            }
            Err(_) => {
                tracing::debug!(key, value, "dropping transparency entry");
                warnings.push(Warning::InvalidTransparency {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    Diagnosed::new(map, warnings)
}

/// Set of keys a theme format is known to support, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    keys: HashSet<String>,
}

impl Vocabulary {
    pub fn parse(text: &str) -> Self {
        let keys = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Cross-checks both maps against the reference vocabularies.
///
/// Purely diagnostic: the maps are used as-is whatever this reports.
pub fn validate_maps(
    key_map: &KeyMap,
    transparency: &TransparencyMap,
    desktop_keys: &Vocabulary,
    source_keys: &Vocabulary,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let unknown = |map, key: &str| Warning::UnknownKey {
        map,
        key: key.to_string(),
    };

    for (desktop_key, source_key) in key_map {
        if !desktop_keys.contains(desktop_key) {
            warnings.push(unknown(MapKind::Theme, desktop_key));
        }
        if !source_keys.contains(source_key) {
            warnings.push(unknown(MapKind::Theme, source_key));
        }
    }

    for key in transparency.keys() {
        if !desktop_keys.contains(key) {
            warnings.push(unknown(MapKind::Transparency, key));
        } else if !key_map.contains_key(key) {
            warnings.push(Warning::IgnoredTransparency { key: key.clone() });
        }
    }

    warnings
}

pub fn read_map_file(path: &Path) -> KeyMapResult<String> {
    fs::read_to_string(path).map_err(|source| KeyMapError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_map_skips_comments_and_lines_without_separator() {
        let text = "\
; desktop=android
windowBg=windowBackgroundWhite
// old entry
dialogsBg=chats_menuBackground

just some text
  windowFg = windowBackgroundWhiteBlackText
";
        let map = parse_key_map(text, &MapSyntax::default());
        assert_eq!(map.len(), 3);
        assert_eq!(map["windowBg"], "windowBackgroundWhite");
        assert_eq!(map["dialogsBg"], "chats_menuBackground");
        assert_eq!(map["windowFg"], "windowBackgroundWhiteBlackText");
    }

    #[test]
    fn comment_marker_anywhere_in_line_hides_the_entry() {
        let text = "windowBg=windowBackgroundWhite ; trailing note\nmenuBg=chats#menu\n";
        let map = parse_key_map(text, &MapSyntax::default());
        assert!(map.is_empty());
    }

    #[test]
    fn parse_key_map_splits_on_first_separator() {
        let map = parse_key_map("a=b=c\n", &MapSyntax::default());
        assert_eq!(map["a"], "b=c");
    }

    #[test]
    fn custom_syntax_is_honoured() {
        let syntax = MapSyntax {
            separator: ':',
            comment_markers: vec!["--".to_string()],
        };
        let map = parse_key_map("windowBg:windowBackgroundWhite\n-- x:y\n", &syntax);
        assert_eq!(map.len(), 1);
        assert_eq!(map["windowBg"], "windowBackgroundWhite");
    }

    #[test]
    fn parse_transparency_map_drops_invalid_values_with_warning() {
        let text = "msgInShadow=40\nmsgOutShadow=zz\nhistoryScrollBg=1ff\nboxDivider=FF\n";
        let parsed = parse_transparency_map(text, &MapSyntax::default());

        assert_eq!(parsed.value.len(), 2);
        assert_eq!(parsed.value["msgInShadow"], 0x40);
        assert_eq!(parsed.value["boxDivider"], 0xFF);
        assert!(!parsed.value.contains_key("msgOutShadow"));
        assert_eq!(
            parsed.warnings,
            vec![
                Warning::InvalidTransparency {
                    key: "msgOutShadow".to_string(),
                    value: "zz".to_string(),
                },
                Warning::InvalidTransparency {
                    key: "historyScrollBg".to_string(),
                    value: "1ff".to_string(),
                },
            ]
        );
    }

    #[test]
    fn loading_twice_yields_identical_maps() {
        let text = "windowBg=windowBackgroundWhite\nmenuBg=chats_menuBackground\n";
        let syntax = MapSyntax::default();
        assert_eq!(parse_key_map(text, &syntax), parse_key_map(text, &syntax));
    }

    #[test]
    fn vocabulary_ignores_blank_lines_and_whitespace() {
        let vocabulary = Vocabulary::parse("windowBg\n\n  windowFg \n");
        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.contains("windowFg"));
        assert!(!vocabulary.contains(""));
    }

    #[test]
    fn validate_maps_reports_unknown_keys_but_keeps_entries() {
        let key_map = parse_key_map(
            "windowBg=windowBackgroundWhite\nbogusDesktop=bogusAndroid\n",
            &MapSyntax::default(),
        );
        let transparency = parse_transparency_map(
            "windowBg=80\nmenuBg=40\nnotAKey=10\n",
            &MapSyntax::default(),
        )
        .value;
        let desktop = Vocabulary::parse("windowBg\nmenuBg\n");
        let android = Vocabulary::parse("windowBackgroundWhite\n");

        let warnings = validate_maps(&key_map, &transparency, &desktop, &android);

        assert_eq!(
            warnings,
            vec![
                Warning::UnknownKey {
                    map: MapKind::Theme,
                    key: "bogusDesktop".to_string(),
                },
                Warning::UnknownKey {
                    map: MapKind::Theme,
                    key: "bogusAndroid".to_string(),
                },
                Warning::IgnoredTransparency {
                    key: "menuBg".to_string(),
                },
                Warning::UnknownKey {
                    map: MapKind::Transparency,
                    key: "notAKey".to_string(),
                },
            ]
        );
        assert_eq!(key_map.len(), 2);
    }

    #[test]
    fn read_map_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ini");
        let err = read_map_file(&path).unwrap_err();
        assert!(matches!(err, KeyMapError::ReadFile { path: p, .. } if p == path));
    }
}
