//! Canonical emote model (`EmoteData`) and its builder.
//!
//! Readers and network packets accumulate fields into an [`EmoteBuilder`];
//! [`EmoteBuilder::build`] validates the tick bounds once and yields an
//! immutable [`EmoteData`] that may be shared freely afterwards.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::parts::{default_parts, StateCollection};
use crate::song::Song;

/// A complete emote: pose-over-time data plus metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct EmoteData {
    uuid: Uuid,
    name: Option<String>,
    description: Option<String>,
    author: Option<String>,
    begin_tick: i32,
    end_tick: i32,
    stop_tick: i32,
    is_looped: bool,
    return_tick: i32,
    nsfw: bool,
    is_easing_before: bool,
    is_builtin: bool,
    body_parts: IndexMap<String, StateCollection>,
    icon_data: Option<Vec<u8>>,
    song: Option<Song>,
}

impl EmoteData {
    #[inline]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[inline]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    #[inline]
    pub fn begin_tick(&self) -> i32 {
        self.begin_tick
    }

    #[inline]
    pub fn end_tick(&self) -> i32 {
        self.end_tick
    }

    #[inline]
    pub fn stop_tick(&self) -> i32 {
        self.stop_tick
    }

    #[inline]
    pub fn is_looped(&self) -> bool {
        self.is_looped
    }

    #[inline]
    pub fn return_tick(&self) -> i32 {
        self.return_tick
    }

    #[inline]
    pub fn nsfw(&self) -> bool {
        self.nsfw
    }

    #[inline]
    pub fn is_easing_before(&self) -> bool {
        self.is_easing_before
    }

    #[inline]
    pub fn is_builtin(&self) -> bool {
        self.is_builtin
    }

    #[inline]
    pub fn body_parts(&self) -> &IndexMap<String, StateCollection> {
        &self.body_parts
    }

    pub fn part(&self, name: &str) -> Option<&StateCollection> {
        self.body_parts.get(name)
    }

    #[inline]
    pub fn icon_data(&self) -> Option<&[u8]> {
        self.icon_data.as_deref()
    }

    #[inline]
    pub fn song(&self) -> Option<&Song> {
        self.song.as_ref()
    }

    /// Attach icon bytes loaded from a side-channel file.
    pub fn with_icon(mut self, icon: Vec<u8>) -> Self {
        self.icon_data = Some(icon);
        self
    }

    pub fn with_song(mut self, song: Song) -> Self {
        self.song = Some(song);
        self
    }

    pub fn with_builtin(mut self, builtin: bool) -> Self {
        self.is_builtin = builtin;
        self
    }

    /// Reopen this emote for editing; the copy keeps the uuid.
    pub fn to_builder(&self) -> EmoteBuilder {
        EmoteBuilder {
            uuid: Some(self.uuid),
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            begin_tick: self.begin_tick,
            end_tick: self.end_tick,
            stop_tick: Some(self.stop_tick),
            is_looped: self.is_looped,
            return_tick: self.return_tick,
            nsfw: self.nsfw,
            is_easing_before: self.is_easing_before,
            is_builtin: self.is_builtin,
            body_parts: self.body_parts.clone(),
            icon_data: self.icon_data.clone(),
            song: self.song.clone(),
        }
    }
}

/// Mutable accumulator for one emote.
///
/// Starts with an empty collection for every part of the current schema.
#[derive(Clone, Debug)]
pub struct EmoteBuilder {
    pub uuid: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub begin_tick: i32,
    pub end_tick: i32,
    /// Defaults to `end_tick` at build time.
    pub stop_tick: Option<i32>,
    pub is_looped: bool,
    pub return_tick: i32,
    pub nsfw: bool,
    pub is_easing_before: bool,
    pub is_builtin: bool,
    pub body_parts: IndexMap<String, StateCollection>,
    pub icon_data: Option<Vec<u8>>,
    pub song: Option<Song>,
}

impl Default for EmoteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmoteBuilder {
    pub fn new() -> Self {
        Self {
            uuid: None,
            name: None,
            description: None,
            author: None,
            begin_tick: 0,
            end_tick: 0,
            stop_tick: None,
            is_looped: false,
            return_tick: 0,
            nsfw: false,
            is_easing_before: false,
            is_builtin: false,
            body_parts: default_parts(),
            icon_data: None,
            song: None,
        }
    }

    pub fn part(&self, name: &str) -> Option<&StateCollection> {
        self.body_parts.get(name)
    }

    /// `None` when `name` is not part of the schema.
    pub fn part_mut(&mut self, name: &str) -> Option<&mut StateCollection> {
        self.body_parts.get_mut(name)
    }

    pub fn fully_enable_parts(&mut self) {
        for part in self.body_parts.values_mut() {
            part.fully_enable();
        }
    }

    pub fn optimize_emote(&mut self) {
        let (is_looped, return_tick) = (self.is_looped, self.return_tick);
        for part in self.body_parts.values_mut() {
            part.optimize(is_looped, return_tick);
        }
    }

    /// Validate tick bounds and freeze the emote.
    pub fn build(self) -> Result<EmoteData> {
        if self.end_tick <= 0 {
            return Err(ModelError::InvalidEndTick(self.end_tick));
        }
        if self.is_looped && (self.return_tick < 0 || self.return_tick > self.end_tick) {
            return Err(ModelError::InvalidReturnTick {
                return_tick: self.return_tick,
                end_tick: self.end_tick,
            });
        }

        let stop_tick = self.stop_tick.unwrap_or(self.end_tick);
        let uuid = match self.uuid {
            Some(uuid) => uuid,
            None => Uuid::new_v5(&Uuid::NAMESPACE_OID, &self.content_digest(stop_tick)),
        };

        Ok(EmoteData {
            uuid,
            name: self.name,
            description: self.description,
            author: self.author,
            begin_tick: self.begin_tick,
            end_tick: self.end_tick,
            stop_tick,
            is_looped: self.is_looped,
            return_tick: self.return_tick,
            nsfw: self.nsfw,
            is_easing_before: self.is_easing_before,
            is_builtin: self.is_builtin,
            body_parts: self.body_parts,
            icon_data: self.icon_data,
            song: self.song,
        })
    }

    /// Stable byte image of everything that identifies the emote, used to
    /// derive a uuid when the source did not carry one.
    fn content_digest(&self, stop_tick: i32) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        for text in [&self.name, &self.description, &self.author] {
            let bytes = text.as_deref().unwrap_or_default().as_bytes();
            out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        for tick in [self.begin_tick, self.end_tick, stop_tick, self.return_tick] {
            out.extend_from_slice(&tick.to_be_bytes());
        }
        out.push(self.is_looped as u8 | (self.nsfw as u8) << 1 | (self.is_easing_before as u8) << 2);
        for (name, part) in &self.body_parts {
            out.extend_from_slice(name.as_bytes());
            for state in part.states() {
                out.push(state.is_enabled() as u8);
                for key_frame in state.key_frames() {
                    out.extend_from_slice(&key_frame.tick.to_be_bytes());
                    out.extend_from_slice(&key_frame.value.to_bits().to_be_bytes());
                    out.push(key_frame.ease.id());
                    out.extend_from_slice(&key_frame.turn.to_be_bytes());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Ease;

    fn builder(end_tick: i32) -> EmoteBuilder {
        let mut b = EmoteBuilder::new();
        b.end_tick = end_tick;
        b
    }

    #[test]
    fn build_rejects_non_positive_end_tick() {
        assert_eq!(builder(0).build(), Err(ModelError::InvalidEndTick(0)));
        assert_eq!(builder(-4).build(), Err(ModelError::InvalidEndTick(-4)));
    }

    #[test]
    fn loop_bounds_are_inclusive() {
        for (return_tick, ok) in [(0, true), (20, true), (21, false), (-1, false)] {
            let mut b = builder(20);
            b.is_looped = true;
            b.return_tick = return_tick;
            assert_eq!(b.build().is_ok(), ok, "return_tick={return_tick}");
        }
        // Not looped: return tick is ignored.
        let mut b = builder(20);
        b.return_tick = 99;
        assert!(b.build().is_ok());
    }

    #[test]
    fn stop_tick_defaults_to_end_tick() {
        let emote = builder(40).build().unwrap();
        assert_eq!(emote.stop_tick(), 40);

        let mut b = builder(40);
        b.stop_tick = Some(45);
        assert_eq!(b.build().unwrap().stop_tick(), 45);
    }

    #[test]
    fn derived_uuid_is_stable_and_content_sensitive() {
        let make = |pitch: f32| {
            let mut b = builder(10);
            b.name = Some("\"Wave\"".into());
            b.part_mut("head")
                .unwrap()
                .pitch
                .add_key_frame(5, pitch, Ease::Linear, 0, false);
            b.build().unwrap().uuid()
        };
        assert_eq!(make(1.0), make(1.0));
        assert_ne!(make(1.0), make(2.0));
    }

    #[test]
    fn explicit_uuid_wins_and_survives_to_builder() {
        let id = Uuid::new_v4();
        let mut b = builder(10);
        b.uuid = Some(id);
        let emote = b.build().unwrap().with_builtin(true);
        assert_eq!(emote.uuid(), id);
        let again = emote.to_builder().build().unwrap();
        assert_eq!(again, emote);
    }

    #[test]
    fn unknown_parts_are_not_created() {
        let mut b = builder(10);
        assert!(b.part_mut("torso").is_none());
        assert!(b.part_mut("body").is_some());
    }
}
