//! Emotes Serializer
//!
//! Reads and writes emote files and keeps a directory of them loaded.
//!
//! - `format`: dispatcher choosing a codec by extension or explicit tag
//! - `json`: Emotecraft JSON (read/write); GeckoLib JSON is detected and
//!   imported by `geckolib`
//! - `quark`: read-only importer for Quark `.emote` scripts
//! - `binary`: `.emotecraft` files, a `File` purpose transfer envelope
//! - `nbs`: note block songs attached next to emote files
//! - `loader`: directory scanning and the visible/hidden emote library
//!
//! Every failure surfaces as a [`SerializerError`] tagged with the format it
//! was routed to.

pub mod error;
pub mod format;
pub mod loader;
pub mod nbs;

mod binary;
mod geckolib;
mod json;
mod quark;

pub use error::{Result, SerializerError};
pub use format::{read_data, read_file, write_data, EmoteFormat};
pub use loader::{load_emote_file, scan_directory, BuiltinEmote, EmoteLibrary, LoaderConfig};
pub use nbs::read_song;
