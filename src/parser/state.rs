use super::ParserSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    ReadHeader,
    ReadBackground,
}

impl ParseState {
    /// The marker line is the only transition; `ReadBackground` is terminal.
    pub fn next(self, line: HeaderLine<'_>) -> Self {
        match (self, line) {
            (Self::ReadHeader, HeaderLine::Marker) => Self::ReadBackground,
            (Self::ReadHeader, _) => Self::ReadHeader,
            (Self::ReadBackground, _) => Self::ReadBackground,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLine<'a> {
    Marker,
    Entry { key: &'a str, value: &'a str },
    Other,
}

impl<'a> HeaderLine<'a> {
    /// Marker detection wins over the separator, so `WPS=1` starts the wallpaper.
    pub fn classify(line: &'a str, settings: &ParserSettings) -> Self {
        if line.contains(settings.background_marker.as_str()) {
            tracing::debug!("wallpaper marker found");
            return Self::Marker;
        }
        match line.split_once(settings.separator) {
            Some((key, value)) => Self::Entry {
                key: key.trim(),
                value: value.trim(),
            },
            None => Self::Other,
        }
    }
}
