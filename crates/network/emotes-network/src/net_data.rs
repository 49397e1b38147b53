//! Per-transfer context shared by the packet kinds of one envelope.
//!
//! Encoding reads the emote and flags from a `NetData`; decoding fills the
//! same structure, accumulating emote fields into a builder across packets.
//! A `NetData` lives exactly as long as one transfer.

use std::sync::Arc;

use emotes_core::{EmoteBuilder, EmoteData, ModelError};
use hashbrown::HashMap;
use uuid::Uuid;

/// Why a transfer is sent; decides which packet kinds are included.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransferPurpose {
    /// Start playing an emote on a player.
    Play,
    /// Send an emote (with its header) to a peer's library.
    Stream,
    /// Capability discovery.
    Config,
    /// Stop a playing emote.
    Stop,
    /// Persist to disk.
    File,
}

impl TransferPurpose {
    pub fn id(self) -> u8 {
        match self {
            TransferPurpose::Play => 0,
            TransferPurpose::Stream => 1,
            TransferPurpose::Config => 8,
            TransferPurpose::Stop => 10,
            TransferPurpose::File => 0x10,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TransferPurpose::Play),
            1 => Some(TransferPurpose::Stream),
            8 => Some(TransferPurpose::Config),
            10 => Some(TransferPurpose::Stop),
            0x10 => Some(TransferPurpose::File),
            _ => None,
        }
    }

    /// Name, description, author and icon travel with the emote.
    pub fn exchange_header(self) -> bool {
        matches!(self, TransferPurpose::Stream | TransferPurpose::File)
    }

    /// The emote body (ticks, keyframes) travels with the transfer.
    pub fn carries_emote(self) -> bool {
        matches!(
            self,
            TransferPurpose::Play | TransferPurpose::Stream | TransferPurpose::File
        )
    }
}

#[derive(Debug)]
pub struct NetData {
    pub purpose: TransferPurpose,
    /// Emote being sent.
    pub emote: Option<Arc<EmoteData>>,
    /// Emote being received, created by the first packet that needs it.
    pub builder: Option<EmoteBuilder>,
    pub stop_emote_id: Option<Uuid>,
    /// Player the emote is played on or stopped for.
    pub player: Option<Uuid>,
    pub is_forced: bool,
    /// Packet kind id -> newest layout version the peer understands.
    pub versions: HashMap<u8, u8>,
}

impl NetData {
    pub fn new(purpose: TransferPurpose) -> Self {
        Self {
            purpose,
            emote: None,
            builder: None,
            stop_emote_id: None,
            player: None,
            is_forced: false,
            versions: HashMap::new(),
        }
    }

    pub fn with_emote(purpose: TransferPurpose, emote: impl Into<Arc<EmoteData>>) -> Self {
        let mut data = Self::new(purpose);
        data.emote = Some(emote.into());
        data
    }

    pub fn play(emote: impl Into<Arc<EmoteData>>, player: Option<Uuid>) -> Self {
        let mut data = Self::with_emote(TransferPurpose::Play, emote);
        data.player = player;
        data
    }

    pub fn stop(emote_id: Uuid, player: Option<Uuid>) -> Self {
        let mut data = Self::new(TransferPurpose::Stop);
        data.stop_emote_id = Some(emote_id);
        data.player = player;
        data
    }

    pub fn builder_mut(&mut self) -> &mut EmoteBuilder {
        self.builder.get_or_insert_with(EmoteBuilder::new)
    }

    /// Build the received emote, if any packet contributed to one.
    pub fn take_emote(&mut self) -> Result<Option<EmoteData>, ModelError> {
        self.builder.take().map(EmoteBuilder::build).transpose()
    }

    /// Layout version to use for `id`: ours, capped by what the peer
    /// advertised. `None` when the peer disabled the kind.
    pub fn negotiated_version(&self, id: u8, ours: u8) -> Option<u8> {
        match self.versions.get(&id) {
            Some(0) => None,
            Some(theirs) => Some(ours.min(*theirs)),
            None => Some(ours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_ids_round_trip() {
        for purpose in [
            TransferPurpose::Play,
            TransferPurpose::Stream,
            TransferPurpose::Config,
            TransferPurpose::Stop,
            TransferPurpose::File,
        ] {
            assert_eq!(TransferPurpose::from_id(purpose.id()), Some(purpose));
        }
        assert_eq!(TransferPurpose::from_id(0x42), None);
    }

    #[test]
    fn negotiation_caps_and_disables() {
        let mut data = NetData::new(TransferPurpose::Play);
        assert_eq!(data.negotiated_version(0x11, 2), Some(2));
        data.versions.insert(0x11, 1);
        assert_eq!(data.negotiated_version(0x11, 2), Some(1));
        data.versions.insert(0x12, 0);
        assert_eq!(data.negotiated_version(0x12, 1), None);
    }

    #[test]
    fn take_emote_without_packets_is_none() {
        let mut data = NetData::new(TransferPurpose::Stream);
        assert_eq!(data.take_emote(), Ok(None));
    }
}
