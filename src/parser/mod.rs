//! Android `.attheme` reader.
//!
//! A theme file is ASCII `key=value` lines, then a line holding the
//! wallpaper marker, then raw image bytes up to end of stream.

mod state;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::color::parse_color_literal;
use crate::error::{Diagnosed, Warning};
use crate::theme::{Background, SourceTheme};

pub use state::{HeaderLine, ParseState};

pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid color: {key}={raw_text}")]
    MalformedColor { key: String, raw_text: String },
    #[error("invalid theme file: {path}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSettings {
    pub separator: char,
    /// Substring that marks the line where the wallpaper starts.
    pub background_marker: String,
    /// Color used as wallpaper when the file carries no image.
    pub background_key: String,
    pub chunk_size: usize,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            separator: '=',
            background_marker: "WPS".to_string(),
            background_key: "chat_wallpaper".to_string(),
            chunk_size: 1024,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThemeParser {
    settings: ParserSettings,
}

impl ThemeParser {
    pub const fn new(settings: ParserSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn parse_file(&self, path: &Path) -> ParseResult<Diagnosed<SourceTheme>> {
        let file = File::open(path).map_err(|source| ParseError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_reader(BufReader::new(file), path)
    }

    /// `origin` only labels errors.
    pub fn parse_reader<R: BufRead>(
        &self,
        mut reader: R,
        origin: &Path,
    ) -> ParseResult<Diagnosed<SourceTheme>> {
        let unreadable = |source: io::Error| ParseError::UnreadableFile {
            path: origin.to_path_buf(),
            source,
        };

        let mut theme = SourceTheme::default();
        let mut wallpaper = Vec::new();
        let mut state = ParseState::ReadHeader;
        let mut line = Vec::new();
        let mut line_number = 0usize;

        while state == ParseState::ReadHeader {
            line.clear();
            if reader.read_until(b'\n', &mut line).map_err(unreadable)? == 0 {
                break;
            }
            line_number += 1;
            let text = decode_header_line(&line, line_number).map_err(unreadable)?;

            let header_line = HeaderLine::classify(text, &self.settings);
            if let HeaderLine::Entry { key, value } = header_line {
                let color = parse_color_literal(value).map_err(|_| ParseError::MalformedColor {
                    key: key.to_string(),
                    raw_text: value.to_string(),
                })?;
                theme.colors.insert(key.to_string(), color);
            }
            state = state.next(header_line);
        }

        if state == ParseState::ReadBackground {
            read_chunks(&mut reader, self.settings.chunk_size, &mut wallpaper)
                .map_err(unreadable)?;
        }

        let mut warnings = Vec::new();
        theme.background = if !wallpaper.is_empty() {
            Background::Raw(wallpaper)
        } else if let Some(color) = theme.color(&self.settings.background_key) {
            Background::SolidColor(color)
        } else {
            warnings.push(Warning::MissingBackground);
            Background::Absent
        };

        tracing::debug!(
            origin = %origin.display(),
            colors = theme.colors.len(),
            final_state = ?state,
            "parsed theme"
        );
        Ok(Diagnosed::new(theme, warnings))
    }
}

fn decode_header_line(line: &[u8], line_number: usize) -> io::Result<&str> {
    if !line.is_ascii() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("header line {line_number} is not ASCII"),
        ));
    }
    std::str::from_utf8(line).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Appends fixed-size chunks until a read returns no data.
fn read_chunks<R: Read>(reader: &mut R, chunk_size: usize, out: &mut Vec<u8>) -> io::Result<()> {
    let mut chunk = vec![0u8; chunk_size.max(1)];
    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => return Ok(()),
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        out.extend_from_slice(&chunk[..read]);
    }
}
