use std::error::Error as StdError;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure to read or write an emote in a given format.
#[derive(Debug, Error)]
#[error("{message} (format: {format})")]
pub struct SerializerError {
    /// Lowercase format tag (file extension) the operation was routed to.
    pub format: String,
    pub message: String,
    #[source]
    pub source: Option<BoxError>,
}

impl SerializerError {
    pub fn new(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        format: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            format: format.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Keep a `SerializerError` as is; wrap anything else under `format`.
    pub(crate) fn wrap(format: &str, err: BoxError) -> Self {
        match err.downcast::<SerializerError>() {
            Ok(err) => *err,
            Err(other) => Self {
                format: format.to_string(),
                message: other.to_string(),
                source: Some(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SerializerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_the_format() {
        let err = SerializerError::new("json", "endTick must be bigger than 0");
        assert_eq!(err.to_string(), "endTick must be bigger than 0 (format: json)");
    }

    #[test]
    fn wrap_passes_serializer_errors_through() {
        let inner: BoxError = Box::new(SerializerError::new("emote", "bad line"));
        let err = SerializerError::wrap("json", inner);
        assert_eq!(err.format, "emote");
        assert!(err.source.is_none());
    }

    #[test]
    fn wrap_keeps_foreign_causes_as_source() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SerializerError::wrap("json", Box::new(cause));
        assert_eq!(err.format, "json");
        assert!(err.source().is_some());
    }
}
