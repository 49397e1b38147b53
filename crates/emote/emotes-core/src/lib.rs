//! Emotes Core (format-agnostic)
//!
//! Data model for keyframed player emotes: easing curves, per-channel keyframe
//! states, body-part collections, the `EmoteBuilder` accumulator and the
//! immutable `EmoteData` it produces, attached note-block songs, and the
//! UUID-keyed registry used to look emotes up once loaded.
//!
//! Readers, writers and the wire protocol live in `emotes-serializer` and
//! `emotes-network`; they all funnel through the builder defined here.

pub mod easing;
pub mod emote;
pub mod error;
pub mod parts;
pub mod registry;
pub mod song;
pub mod state;

// Re-exports for consumers (codecs and adapters)
pub use easing::Ease;
pub use emote::{EmoteBuilder, EmoteData};
pub use error::ModelError;
pub use parts::{default_parts, Channel, StateCollection, PART_NAMES, SCHEMA_VERSION};
pub use registry::EmoteRegistry;
pub use song::{Layer, Note, Song};
pub use state::{KeyFrame, State};
pub use uuid::Uuid;
