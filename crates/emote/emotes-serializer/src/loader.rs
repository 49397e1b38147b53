//! Directory scanning and the server-side emote library.
//!
//! A file `wave.json` may be accompanied by `wave.png` (icon, attached to
//! every emote read from the file) and `wave.nbs` (song, attached only when
//! the file held exactly one emote). A broken file is logged and skipped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use emotes_core::{EmoteData, EmoteRegistry, Uuid};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::{read_data, read_file, EmoteFormat};
use crate::nbs;

/// Sub-directory whose emotes are always streamed to clients.
pub const SERVER_DIR: &str = "server";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoaderConfig {
    pub load_builtin_emotes: bool,
    /// Stream emotes from the main directory to clients instead of only
    /// keeping them server side.
    pub load_emotes_server_side: bool,
    pub enable_quark: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            load_builtin_emotes: true,
            load_emotes_server_side: false,
            enable_quark: false,
        }
    }
}

impl LoaderConfig {
    fn accepts(&self, format: EmoteFormat) -> bool {
        format != EmoteFormat::Quark || self.enable_quark
    }
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Load every emote in `path` plus its side-channel icon and song.
///
/// Failures are logged; a file that cannot be read yields no emotes.
pub fn load_emote_file(path: &Path) -> Vec<EmoteData> {
    let mut emotes = match read_file(path) {
        Ok(emotes) => emotes,
        Err(err) => {
            warn!("Error while importing external emote: {}", path.display());
            warn!("{}", err);
            return Vec::new();
        }
    };

    let icon_path = sibling(path, "png");
    if icon_path.is_file() {
        match fs::read(&icon_path) {
            Ok(icon) => {
                emotes = emotes
                    .into_iter()
                    .map(|emote| emote.with_icon(icon.clone()))
                    .collect();
            }
            Err(err) => warn!("Error while reading icon {}: {}", icon_path.display(), err),
        }
    }

    let song_path = sibling(path, "nbs");
    if song_path.is_file() && emotes.len() == 1 {
        match fs::read(&song_path).and_then(|bytes| nbs::read_song(&bytes)) {
            Ok(song) => {
                emotes = emotes
                    .into_iter()
                    .map(|emote| emote.with_song(song.clone()))
                    .collect();
            }
            Err(err) => warn!("Error while reading song {}: {}", song_path.display(), err),
        }
    }

    emotes
}

/// Emote files directly inside `dir`, in name order.
fn emote_files(dir: &Path, config: &LoaderConfig) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(EmoteFormat::from_extension);
        if format.is_some_and(|format| config.accepts(format)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Import every emote file of `dir` into `registry`, creating `dir` if it
/// does not exist. Returns the number of emotes added.
pub fn scan_directory(
    dir: &Path,
    registry: &mut EmoteRegistry,
    config: &LoaderConfig,
) -> io::Result<usize> {
    fs::create_dir_all(dir)?;
    if config.enable_quark {
        info!("Quark importer is active");
    }

    let mut loaded = 0;
    for path in emote_files(dir, config)? {
        let emotes = load_emote_file(&path);
        loaded += emotes.len();
        registry.add_all(emotes);
    }
    info!("Loaded {} emote(s) from {}", loaded, dir.display());
    Ok(loaded)
}

/// A packaged emote shipped with the application.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinEmote<'a> {
    pub json: &'a [u8],
    pub icon: Option<&'a [u8]>,
}

/// Emotes known to a server.
///
/// `visible` emotes are streamed to clients; `hidden` ones are only played
/// when a client already has them.
#[derive(Debug, Default)]
pub struct EmoteLibrary {
    pub visible: EmoteRegistry,
    pub hidden: EmoteRegistry,
}

impl EmoteLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a packaged JSON emote into the hidden registry.
    pub fn add_builtin(&mut self, json: &[u8], icon: Option<&[u8]>) -> Result<usize> {
        let emotes = read_data(json, None, Some(EmoteFormat::Json.extension()))?;
        let count = emotes.len();
        self.hidden.add_all(emotes.into_iter().map(|emote| {
            let emote = emote.with_builtin(true);
            match icon {
                Some(icon) => emote.with_icon(icon.to_vec()),
                None => emote,
            }
        }));
        Ok(count)
    }

    /// Drop everything and load builtins, `dir` and `dir/server` again.
    ///
    /// Not atomic: lookups racing with a reload may see a partial library.
    pub fn reload(
        &mut self,
        dir: &Path,
        config: &LoaderConfig,
        builtins: &[BuiltinEmote<'_>],
    ) -> io::Result<()> {
        self.visible.clear();
        self.hidden.clear();

        if config.load_builtin_emotes {
            for builtin in builtins {
                if let Err(err) = self.add_builtin(builtin.json, builtin.icon) {
                    warn!("Failed to load builtin emote: {}", err);
                }
            }
        }

        let target = if config.load_emotes_server_side {
            &mut self.visible
        } else {
            &mut self.hidden
        };
        scan_directory(dir, target, config)?;
        scan_directory(&dir.join(SERVER_DIR), &mut self.visible, config)?;
        Ok(())
    }

    /// Visible emotes shadow hidden ones with the same uuid.
    pub fn get(&self, uuid: &Uuid) -> Option<Arc<EmoteData>> {
        self.visible.get(uuid).or_else(|| self.hidden.get(uuid))
    }

    pub fn len(&self) -> usize {
        self.visible.len() + self.hidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.hidden.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_partial_documents() {
        assert_eq!(
            LoaderConfig::default(),
            LoaderConfig {
                load_builtin_emotes: true,
                load_emotes_server_side: false,
                enable_quark: false,
            }
        );
        let config: LoaderConfig = serde_json::from_str(r#"{"enableQuark": true}"#).unwrap();
        assert!(config.enable_quark);
        assert!(config.load_builtin_emotes);
    }

    #[test]
    fn quark_files_need_the_flag() {
        let mut config = LoaderConfig::default();
        assert!(!config.accepts(EmoteFormat::Quark));
        assert!(config.accepts(EmoteFormat::Binary));
        config.enable_quark = true;
        assert!(config.accepts(EmoteFormat::Quark));
    }
}
