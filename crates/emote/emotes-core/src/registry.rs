//! UUID-keyed emote store.
//!
//! The registry is plain owned state without interior locking. Reloading is
//! `clear()` followed by `add_all(..)`, which is *not* atomic: a reader that
//! observes the registry between the two calls sees it empty or partially
//! filled. Serialize reloads against lookups on the caller side.

use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::emote::EmoteData;

#[derive(Clone, Debug, Default)]
pub struct EmoteRegistry {
    emotes: IndexMap<Uuid, Arc<EmoteData>>,
}

impl EmoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one emote; an existing entry with the same uuid is replaced and returned.
    pub fn add(&mut self, emote: impl Into<Arc<EmoteData>>) -> Option<Arc<EmoteData>> {
        let emote = emote.into();
        let replaced = self.emotes.insert(emote.uuid(), emote);
        if let Some(old) = &replaced {
            log::debug!("replacing emote {} ({:?})", old.uuid(), old.name());
        }
        replaced
    }

    /// Insert every emote; duplicates overwrite earlier entries (last wins).
    pub fn add_all<I>(&mut self, emotes: I)
    where
        I: IntoIterator,
        I::Item: Into<Arc<EmoteData>>,
    {
        for emote in emotes {
            self.add(emote);
        }
    }

    pub fn get(&self, uuid: &Uuid) -> Option<Arc<EmoteData>> {
        self.emotes.get(uuid).cloned()
    }

    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.emotes.contains_key(uuid)
    }

    pub fn remove(&mut self, uuid: &Uuid) -> Option<Arc<EmoteData>> {
        self.emotes.shift_remove(uuid)
    }

    pub fn len(&self) -> usize {
        self.emotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emotes.is_empty()
    }

    /// Emotes in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EmoteData>> {
        self.emotes.values()
    }

    pub fn uuids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.emotes.keys().copied()
    }

    pub fn clear(&mut self) {
        self.emotes.clear();
    }
}
