//! Envelope encode/decode.
//!
//! ```text
//! protocol:u8 purpose:u8 count:u8
//! count x { kind:u8 version:u8 size:i32 payload[size] }
//! ```
//! Readers skip kinds they do not know and layouts newer than their own, so
//! peers on different releases still exchange what they have in common.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use log::{debug, warn};

use crate::error::{NetworkError, Result};
use crate::framing::{get_length, get_u8, LENGTH_PREFIX};
use crate::net_data::{NetData, TransferPurpose};
use crate::packets::PacketKind;

/// Envelope layout version.
pub const PROTOCOL_VERSION: u8 = 1;

const ENVELOPE_HEADER_SIZE: usize = 3;
const PACKET_HEADER_SIZE: usize = 1 + 1 + LENGTH_PREFIX;

pub struct EmotePacket;

impl EmotePacket {
    /// Encode every packet kind that applies to `data`.
    ///
    /// # Panics
    /// If a packet kind writes a different number of bytes than it reported.
    pub fn write(data: &NetData) -> Result<BytesMut> {
        let planned: Vec<(PacketKind, u8, usize)> = PacketKind::ALL
            .into_iter()
            .filter(|kind| kind.packet().should_write(data))
            .filter_map(|kind| {
                let packet = kind.packet();
                let version = data.negotiated_version(packet.id(), packet.version())?;
                Some((kind, version, packet.calculate_size(data)))
            })
            .collect();

        let total = ENVELOPE_HEADER_SIZE
            + planned
                .iter()
                .map(|(_, _, size)| PACKET_HEADER_SIZE + size)
                .sum::<usize>();
        let mut buf = BytesMut::with_capacity(total);

        buf.put_u8(PROTOCOL_VERSION);
        buf.put_u8(data.purpose.id());
        buf.put_u8(planned.len() as u8);
        for (kind, version, size) in planned {
            let size_prefix = i32::try_from(size).map_err(|_| NetworkError::TooMany {
                what: "payload bytes",
                count: size,
            })?;
            buf.put_u8(kind.id());
            buf.put_u8(version);
            buf.put_i32(size_prefix);
            let start = buf.len();
            kind.packet().write(&mut buf, data)?;
            assert_eq!(
                buf.len() - start,
                size,
                "packet {:?} wrote a different size than it calculated",
                kind
            );
        }
        debug_assert_eq!(buf.len(), total);
        Ok(buf)
    }

    pub fn read(mut bytes: Bytes) -> Result<NetData> {
        let protocol = get_u8(&mut bytes)?;
        if protocol > PROTOCOL_VERSION {
            return Err(NetworkError::UnsupportedProtocol {
                found: protocol,
                supported: PROTOCOL_VERSION,
            });
        }
        let purpose_id = get_u8(&mut bytes)?;
        let purpose =
            TransferPurpose::from_id(purpose_id).ok_or(NetworkError::UnknownPurpose(purpose_id))?;
        let mut data = NetData::new(purpose);

        let count = get_u8(&mut bytes)?;
        for _ in 0..count {
            let id = get_u8(&mut bytes)?;
            let version = get_u8(&mut bytes)?;
            let size = get_length(&mut bytes)?;
            let mut payload = bytes.split_to(size);

            let Some(kind) = PacketKind::from_id(id) else {
                debug!("Skipping unknown packet kind 0x{:02x} ({} bytes)", id, size);
                continue;
            };
            let packet = kind.packet();
            if version > packet.version() {
                warn!(
                    "Skipping {:?} packet: layout version {} is newer than {}",
                    kind,
                    version,
                    packet.version()
                );
                continue;
            }
            packet.read(&mut payload, &mut data, version)?;
            if payload.has_remaining() {
                debug!(
                    "{:?} packet left {} trailing bytes unread",
                    kind,
                    payload.remaining()
                );
            }
        }
        Ok(data)
    }
}
