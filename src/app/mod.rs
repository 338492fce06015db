//! Parse, convert and package pipeline, for one theme or a batch.

use std::path::{Path, PathBuf};

use crate::archive::{ArchiveLayout, ArchiveWriter};
use crate::config::{AppConfig, MapSources};
use crate::convert::ThemeConverter;
use crate::error::{AppError, AppResult, Diagnosed};
use crate::keymap::{parse_key_map, parse_transparency_map, validate_maps, MapSyntax, Vocabulary};
use crate::parser::ThemeParser;
use crate::storage::StorageService;

pub const THEME_EXTENSION: &str = "attheme";

/// Outcome of a batch run. One failing theme never affects the others.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, AppError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

#[derive(Debug, Clone)]
pub struct App {
    parser: ThemeParser,
    converter: ThemeConverter,
    writer: ArchiveWriter,
    output_dir: Option<PathBuf>,
}

impl App {
    pub fn new(parser: ThemeParser, converter: ThemeConverter, writer: ArchiveWriter) -> Self {
        Self {
            parser,
            converter,
            writer,
            output_dir: None,
        }
    }

    /// Loads the static tables once; they are shared by every conversion.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let sources = config.map_sources()?;
        let converter = load_converter(&sources, &MapSyntax::default()).log_warnings("maps");
        tracing::debug!(
            mapped_keys = converter.key_map().len(),
            transparent_keys = converter.transparency().len(),
            "loaded theme maps"
        );

        let storage = config
            .staging_dir
            .clone()
            .map(StorageService::with_root)
            .unwrap_or_default();
        let writer = ArchiveWriter::new(ArchiveLayout::default(), storage);

        Ok(Self::new(ThemeParser::default(), converter, writer)
            .with_output_dir(config.output_dir.clone()))
    }

    /// Archives go next to their input when no directory is set.
    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn converter(&self) -> &ThemeConverter {
        &self.converter
    }

    pub fn convert_file(&self, path: &Path) -> AppResult<PathBuf> {
        let context = path.display().to_string();
        let source = self.parser.parse_file(path)?.log_warnings(&context);
        let target = self.converter.convert(&source).log_warnings(&context);

        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| parent_dir(path));
        let archive = self
            .writer
            .write(&target, &output_dir, &theme_name(path))?;
        Ok(archive)
    }

    pub fn convert_batch<I>(&self, paths: I) -> BatchReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut report = BatchReport::default();
        for path in paths {
            tracing::info!("converting {}", path.display());
            match self.convert_file(&path) {
                Ok(archive) => {
                    tracing::info!("done converting {} -> {}", path.display(), archive.display());
                    report.converted.push(archive);
                }
                Err(err) => {
                    tracing::error!(path = %path.display(), "{err}");
                    report.failed.push((path, err));
                }
            }
        }
        report
    }
}

pub fn load_converter(sources: &MapSources, syntax: &MapSyntax) -> Diagnosed<ThemeConverter> {
    let key_map = parse_key_map(&sources.theme_map, syntax);
    let transparency = parse_transparency_map(&sources.transparency_map, syntax);
    let mut warnings = transparency.warnings;
    warnings.extend(validate_maps(
        &key_map,
        &transparency.value,
        &Vocabulary::parse(&sources.desktop_keys),
        &Vocabulary::parse(&sources.android_keys),
    ));
    Diagnosed::new(ThemeConverter::new(key_map, transparency.value), warnings)
}

/// Every `*.attheme` file directly inside `dir`, sorted by path.
pub fn discover_themes(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let pattern = format!(
        "{}/*.{THEME_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let entries = glob::glob(&pattern).map_err(|err| AppError::Discovery {
        pattern: pattern.clone(),
        message: err.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => paths.push(path),
            Ok(_) => {}
            Err(err) => tracing::warn!(?err, "skipping unreadable path"),
        }
    }
    paths.sort();
    Ok(paths)
}

pub fn theme_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "theme".to_string())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
