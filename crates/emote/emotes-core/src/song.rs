//! Note-block song attached to an emote for synced playback.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub tick: i32,
    pub instrument: u8,
    pub key: u8,
    /// 0..=100
    pub velocity: u8,
    /// 0..=200, 100 is centered
    pub panning: u8,
    /// Fine pitch in cents.
    pub pitch: i16,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub lock: bool,
    /// 0..=100
    pub volume: u8,
    /// 0..=200, 100 is centered
    pub stereo: u8,
    pub notes: Vec<Note>,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            name: String::new(),
            lock: false,
            volume: 100,
            stereo: 100,
            notes: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub version: u8,
    pub vanilla_instrument_count: u8,
    /// Length in song ticks.
    pub length: i16,
    pub name: String,
    pub author: String,
    pub original_author: String,
    pub description: String,
    /// Song ticks per second.
    pub tempo: f32,
    pub loop_on: bool,
    pub max_loop_count: u8,
    pub loop_start_tick: i16,
    pub layers: Vec<Layer>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            version: 5,
            vanilla_instrument_count: 16,
            length: 0,
            name: String::new(),
            author: String::new(),
            original_author: String::new(),
            description: String::new(),
            tempo: 10.0,
            loop_on: false,
            max_loop_count: 0,
            loop_start_tick: 0,
            layers: Vec::new(),
        }
    }
}

impl Song {
    pub fn note_count(&self) -> usize {
        self.layers.iter().map(|l| l.notes.len()).sum()
    }

    /// Tick of the last note, or zero for an empty song.
    pub fn last_tick(&self) -> i32 {
        self.layers
            .iter()
            .flat_map(|l| l.notes.iter().map(|n| n.tick))
            .max()
            .unwrap_or(0)
    }
}
