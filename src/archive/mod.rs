//! Desktop theme packaging.
//!
//! A `.tdesktop-theme` file is a zip holding the color list and, when the
//! source had one, a wallpaper: either the source image or a tile
//! synthesized from the wallpaper color.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::color::{format_rgba_hex, Color};
use crate::storage::{StagingArea, StorageError, StorageService};
use crate::theme::{Background, TargetTheme};

pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Every variant means the archive for this theme was not written.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build archive {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("failed to encode wallpaper tile {path}: {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Staging(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub extension: String,
    pub colors_entry: String,
    pub background_entry: String,
    pub tile_entry: String,
    pub tile_size: u32,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            extension: "tdesktop-theme".to_string(),
            colors_entry: "colors.tdesktop-theme".to_string(),
            background_entry: "background.jpg".to_string(),
            tile_entry: "tiled.png".to_string(),
            tile_size: 100,
        }
    }
}

/// One `key: #rrggbbaa;` line per color, in key order.
pub fn render_color_list(theme: &TargetTheme) -> String {
    theme
        .colors
        .iter()
        .map(|(key, color)| format!("{key}: #{};\n", format_rgba_hex(*color)))
        .collect()
}

/// Uniform square in the color's RGB channels. Alpha is dropped.
pub fn render_tile(color: Color, size: u32) -> RgbImage {
    let channels = color.channels();
    RgbImage::from_pixel(size, size, Rgb([channels.r, channels.g, channels.b]))
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    layout: ArchiveLayout,
    storage: StorageService,
}

impl ArchiveWriter {
    pub fn new(layout: ArchiveLayout, storage: StorageService) -> Self {
        Self { layout, storage }
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    pub fn archive_path(&self, output_dir: &Path, theme_name: &str) -> PathBuf {
        output_dir.join(format!("{theme_name}.{}", self.layout.extension))
    }

    /// Stages the theme's files and packages them at the archive path.
    ///
    /// The archive only appears once it is complete; on failure any earlier
    /// archive at that path is left as it was.
    pub fn write(
        &self,
        theme: &TargetTheme,
        output_dir: &Path,
        theme_name: &str,
    ) -> ArchiveResult<PathBuf> {
        let staging = self.storage.prepare(theme_name)?;
        let entries = self.stage_entries(theme, &staging)?;
        let destination = self.archive_path(output_dir, theme_name);

        package(&entries, &destination)?;

        if let Err(err) = staging.discard() {
            tracing::warn!(theme_name, ?err, "failed to clean staging area after packaging");
        }
        tracing::debug!(
            destination = %destination.display(),
            entries = entries.len(),
            "packaged desktop theme"
        );
        Ok(destination)
    }

    fn stage_entries<'a>(
        &'a self,
        theme: &TargetTheme,
        staging: &StagingArea,
    ) -> ArchiveResult<Vec<(&'a str, PathBuf)>> {
        let mut entries = Vec::with_capacity(2);

        if let Background::SolidColor(color) = &theme.background {
            let path = staging.file(&self.layout.tile_entry);
            render_tile(*color, self.layout.tile_size)
                .save_with_format(&path, ImageFormat::Png)
                .map_err(|source| ArchiveError::ImageEncode {
                    path: path.clone(),
                    source,
                })?;
            entries.push((self.layout.tile_entry.as_str(), path));
        }

        let colors = staging.write(&self.layout.colors_entry, render_color_list(theme).as_bytes())?;
        entries.push((self.layout.colors_entry.as_str(), colors));

        if let Background::Raw(bytes) = &theme.background {
            let path = staging.write(&self.layout.background_entry, bytes)?;
            entries.push((self.layout.background_entry.as_str(), path));
        }

        Ok(entries)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ArchiveError {
    let path = path.to_path_buf();
    move |source| ArchiveError::Io { path, source }
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
}

/// Zips `entries` into a sibling temp file, then renames it into place.
fn package(entries: &[(&str, PathBuf)], destination: &Path) -> ArchiveResult<()> {
    let zip_error = |source| ArchiveError::Zip {
        path: destination.to_path_buf(),
        source,
    };

    let dir = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let mut partial = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(io_error(dir))?;

    {
        let mut zip = ZipWriter::new(partial.as_file_mut());
        for (name, path) in entries {
            let bytes = fs::read(path).map_err(io_error(path))?;
            zip.start_file(*name, entry_options()).map_err(zip_error)?;
            zip.write_all(&bytes).map_err(io_error(destination))?;
        }
        zip.finish().map_err(zip_error)?;
    }
    partial.as_file().sync_all().map_err(io_error(partial.path()))?;

    partial
        .persist(destination)
        .map_err(|err| ArchiveError::Io {
            path: destination.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}
