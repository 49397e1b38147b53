//! Emotes Network
//!
//! Wire layer used to move emotes between two peers (and, with the `File`
//! purpose, to disk). A transfer is one envelope holding several sub-packets;
//! each sub-packet kind has a stable one-byte id and its own layout version.
//!
//! - `framing`: primitive read/write helpers, including the length-prefixed
//!   string convention shared by every packet kind
//! - `net_data`: the per-transfer context packets read from and write into
//! - `packets`: the packet kinds
//! - `emote_packet`: envelope encode/decode

pub mod emote_packet;
pub mod error;
pub mod framing;
pub mod net_data;
pub mod packets;

pub use emote_packet::{EmotePacket, PROTOCOL_VERSION};
pub use error::{NetworkError, Result};
pub use net_data::{NetData, TransferPurpose};
pub use packets::{NetworkPacket, PacketKind};
