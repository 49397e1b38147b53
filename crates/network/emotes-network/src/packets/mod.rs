//! Packet kinds carried inside an [`crate::EmotePacket`] envelope.
//!
//! Every kind owns a stable id (never reused) and a layout version. The sender
//! asks `should_write` and `calculate_size` before `write`; the size promise
//! must be exact, the envelope treats a mismatch as a bug.

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::net_data::NetData;

mod discovery;
mod emote_data;
mod header;
mod icon;
mod player;
mod song;
mod stop;

pub use discovery::DiscoveryPacket;
pub use emote_data::EmoteDataPacket;
pub use header::HeaderPacket;
pub use icon::IconPacket;
pub use player::PlayerDataPacket;
pub use song::SongPacket;
pub use stop::StopPacket;

pub trait NetworkPacket {
    fn id(&self) -> u8;

    /// Newest layout version this side reads and writes.
    fn version(&self) -> u8;

    /// Decode one payload into `data`. `buf` holds exactly this packet's bytes.
    /// Returns whether the packet contributed anything to the transfer.
    fn read(&self, buf: &mut Bytes, data: &mut NetData, version: u8) -> Result<bool>;

    fn should_write(&self, data: &NetData) -> bool;

    /// Exact number of bytes `write` will append.
    fn calculate_size(&self, data: &NetData) -> usize;

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()>;
}

/// The closed set of packet kinds, in envelope write order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Discovery,
    Stop,
    PlayerData,
    Header,
    Icon,
    EmoteData,
    Song,
}

impl PacketKind {
    pub const ALL: [PacketKind; 7] = [
        PacketKind::Discovery,
        PacketKind::Stop,
        PacketKind::PlayerData,
        PacketKind::Header,
        PacketKind::Icon,
        PacketKind::EmoteData,
        PacketKind::Song,
    ];

    pub fn packet(self) -> &'static dyn NetworkPacket {
        match self {
            PacketKind::Discovery => &DiscoveryPacket,
            PacketKind::Stop => &StopPacket,
            PacketKind::PlayerData => &PlayerDataPacket,
            PacketKind::Header => &HeaderPacket,
            PacketKind::Icon => &IconPacket,
            PacketKind::EmoteData => &EmoteDataPacket,
            PacketKind::Song => &SongPacket,
        }
    }

    #[inline]
    pub fn id(self) -> u8 {
        self.packet().id()
    }

    pub fn from_id(id: u8) -> Option<PacketKind> {
        PacketKind::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_stable() {
        let ids: Vec<u8> = PacketKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids, vec![0x08, 0x0A, 0x01, 0x11, 0x12, 0x00, 0x03]);
        for kind in PacketKind::ALL {
            assert_eq!(PacketKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(PacketKind::from_id(0x7f), None);
    }
}
