use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::keymap::{read_map_file, KeyMapResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

const APP_DIR: &str = "tdroiddesk";
const APP_CONFIG_FILE: &str = "config.json";

const BUILTIN_THEME_MAP: &str = include_str!("../../maps/theme-map.ini");
const BUILTIN_TRANSPARENCY_MAP: &str = include_str!("../../maps/transparency-map.ini");
const BUILTIN_DESKTOP_KEYS: &str = include_str!("../../maps/desktop.keys");
const BUILTIN_ANDROID_KEYS: &str = include_str!("../../maps/android.keys");

/// Settings from `config.json`. Every path replaces a built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme_map: Option<PathBuf>,
    pub transparency_map: Option<PathBuf>,
    pub desktop_keys: Option<PathBuf>,
    pub android_keys: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn map_sources(&self) -> KeyMapResult<MapSources> {
        Ok(MapSources {
            theme_map: load_or_builtin(self.theme_map.as_deref(), BUILTIN_THEME_MAP)?,
            transparency_map: load_or_builtin(
                self.transparency_map.as_deref(),
                BUILTIN_TRANSPARENCY_MAP,
            )?,
            desktop_keys: load_or_builtin(self.desktop_keys.as_deref(), BUILTIN_DESKTOP_KEYS)?,
            android_keys: load_or_builtin(self.android_keys.as_deref(), BUILTIN_ANDROID_KEYS)?,
        })
    }
}

/// Text of the four static tables, resolved once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSources {
    pub theme_map: String,
    pub transparency_map: String,
    pub desktop_keys: String,
    pub android_keys: String,
}

impl MapSources {
    pub fn builtin() -> Self {
        Self {
            theme_map: BUILTIN_THEME_MAP.to_string(),
            transparency_map: BUILTIN_TRANSPARENCY_MAP.to_string(),
            desktop_keys: BUILTIN_DESKTOP_KEYS.to_string(),
            android_keys: BUILTIN_ANDROID_KEYS.to_string(),
        }
    }
}

fn load_or_builtin(path: Option<&Path>, builtin: &str) -> KeyMapResult<String> {
    match path {
        Some(path) => read_map_file(path),
        None => Ok(builtin.to_string()),
    }
}

/// Loads the user config, falling back to defaults on any problem.
pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match load_app_config_from(&path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to load config.json; using defaults");
            AppConfig::default()
        }
    }
}

/// Loads an explicitly requested config file. Errors are returned, not masked.
pub fn load_app_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{parse_key_map, parse_transparency_map, MapSyntax, Vocabulary};
    use std::fs;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "tdroiddesk",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/tdroiddesk/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("tdroiddesk", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/tdroiddesk/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("tdroiddesk", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let root = tempfile::tempdir().unwrap();
        let config = load_app_config_with(Some(root.path()), None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn invalid_config_file_yields_defaults() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("tdroiddesk");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.json"), "{ invalid ").unwrap();

        let config = load_app_config_with(Some(root.path()), None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn config_file_overrides_selected_paths() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("tdroiddesk");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("config.json"),
            r#"{ "theme_map": "/etc/tdroiddesk/theme-map.ini", "output_dir": "out" }"#,
        )
        .unwrap();

        let config = load_app_config_with(Some(root.path()), None);
        assert_eq!(
            config.theme_map,
            Some(PathBuf::from("/etc/tdroiddesk/theme-map.ini"))
        );
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert!(config.transparency_map.is_none());
    }

    #[test]
    fn explicit_config_errors_are_reported() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("broken.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            load_app_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            load_app_config_from(&root.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn configured_map_path_replaces_builtin_table() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("theme-map.ini");
        fs::write(&path, "windowBg=windowBackgroundWhite\n").unwrap();

        let config = AppConfig {
            theme_map: Some(path),
            ..AppConfig::default()
        };
        let sources = config.map_sources().unwrap();
        assert_eq!(sources.theme_map, "windowBg=windowBackgroundWhite\n");
        assert_eq!(sources.desktop_keys, MapSources::builtin().desktop_keys);
    }

    #[test]
    fn builtin_tables_are_consistent() {
        let sources = MapSources::builtin();
        let syntax = MapSyntax::default();
        let key_map = parse_key_map(&sources.theme_map, &syntax);
        let transparency = parse_transparency_map(&sources.transparency_map, &syntax);
        let desktop = Vocabulary::parse(&sources.desktop_keys);
        let android = Vocabulary::parse(&sources.android_keys);

        assert!(!key_map.is_empty());
        assert!(transparency.warnings.is_empty());
        assert_eq!(key_map["desktop_bg_color"], "chat_wallpaper");
        assert!(crate::keymap::validate_maps(
            &key_map,
            &transparency.value,
            &desktop,
            &android
        )
        .is_empty());
    }
}
