//! Format selection by file extension or explicit tag.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use emotes_core::EmoteData;

use crate::error::{Result, SerializerError};
use crate::{binary, json, quark};

/// Every emote file format known to the dispatcher.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmoteFormat {
    /// Emotecraft JSON, also accepting GeckoLib animation JSON.
    Json,
    /// Quark `.emote` scripts. Read only.
    Quark,
    /// `.emotecraft` binary files.
    Binary,
}

impl EmoteFormat {
    /// Registration order; the first format with a matching extension wins.
    pub const ALL: [EmoteFormat; 3] = [EmoteFormat::Json, EmoteFormat::Quark, EmoteFormat::Binary];

    pub fn extension(self) -> &'static str {
        match self {
            EmoteFormat::Json => json::FORMAT,
            EmoteFormat::Quark => quark::FORMAT,
            EmoteFormat::Binary => binary::FORMAT,
        }
    }

    /// Case-insensitive lookup by extension.
    pub fn from_extension(tag: &str) -> Option<EmoteFormat> {
        EmoteFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(tag))
    }

    pub fn can_write(self) -> bool {
        !matches!(self, EmoteFormat::Quark)
    }

    /// Decode `bytes`. `filename` is only used by formats that can take a
    /// fallback name from it.
    pub fn read(self, bytes: &[u8], filename: Option<&str>) -> Result<Vec<EmoteData>> {
        let result = match self {
            EmoteFormat::Json => json::read(bytes),
            EmoteFormat::Quark => quark::read(bytes, filename),
            EmoteFormat::Binary => binary::read(bytes),
        };
        result.map_err(|err| SerializerError::wrap(self.extension(), err))
    }

    pub fn write(self, emote: &EmoteData, out: &mut dyn Write) -> Result<()> {
        let result = match self {
            EmoteFormat::Json => json::write(emote, out),
            EmoteFormat::Binary => binary::write(emote, out),
            EmoteFormat::Quark => {
                return Err(SerializerError::new(
                    self.extension(),
                    format!("No writer has been found for format: {}", self),
                ))
            }
        };
        result.map_err(|err| SerializerError::wrap(self.extension(), err))
    }
}

impl fmt::Display for EmoteFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Tag for `filename`: everything after the last `.`, lowercased.
fn tag_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map_or(filename, |(_, ext)| ext)
        .to_lowercase()
}

/// Decode emotes from `bytes`, routed by `format` or else by `filename`.
///
/// # Panics
/// If neither `filename` nor `format` is given.
pub fn read_data(
    bytes: &[u8],
    filename: Option<&str>,
    format: Option<&str>,
) -> Result<Vec<EmoteData>> {
    let tag = match (format, filename) {
        (Some(format), _) => format.to_lowercase(),
        (None, Some(filename)) if !filename.is_empty() => tag_of(filename),
        _ => panic!("read_data needs a filename or a format tag"),
    };
    match EmoteFormat::from_extension(&tag) {
        Some(handler) => handler.read(bytes, filename),
        None => Err(SerializerError::new(tag, "No known reader for format")),
    }
}

/// Read `path` and decode it according to its extension.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<EmoteData>> {
    let path = path.as_ref();
    let filename = path.to_string_lossy();
    let bytes = fs::read(path).map_err(|err| {
        SerializerError::with_source(
            tag_of(&filename),
            format!("failed to read {}", path.display()),
            err,
        )
    })?;
    read_data(&bytes, Some(filename.as_ref()), None)
}

/// Encode `emote` into `writer`.
pub fn write_data(writer: &mut dyn Write, emote: &EmoteData, format: EmoteFormat) -> Result<()> {
    format.write(emote, writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_come_from_the_last_extension() {
        assert_eq!(tag_of("wave.JSON"), "json");
        assert_eq!(tag_of("dance.v2.Emotecraft"), "emotecraft");
        assert_eq!(EmoteFormat::from_extension("EMOTE"), Some(EmoteFormat::Quark));
        assert_eq!(EmoteFormat::from_extension("png"), None);
    }

    #[test]
    fn unknown_format_is_reported_with_its_tag() {
        let err = read_data(b"", Some("icon.PNG"), None).unwrap_err();
        assert_eq!(err.format, "png");
        assert_eq!(err.message, "No known reader for format");
    }

    #[test]
    fn explicit_format_wins_over_filename() {
        let err = read_data(b"not json", Some("wave.emotecraft"), Some("JSON")).unwrap_err();
        assert_eq!(err.format, "json");
        assert!(err.source.is_some());
    }

    #[test]
    #[should_panic]
    fn reading_without_any_hint_panics() {
        let _ = read_data(b"{}", None, None);
    }

    #[test]
    fn quark_cannot_be_written() {
        assert!(!EmoteFormat::Quark.can_write());
        let mut builder = emotes_core::EmoteBuilder::new();
        builder.end_tick = 1;
        let emote = builder.build().unwrap();
        let err = write_data(&mut Vec::<u8>::new(), &emote, EmoteFormat::Quark).unwrap_err();
        assert_eq!(err.format, "emote");
        assert!(err.message.starts_with("No writer has been found for format"));
    }
}
