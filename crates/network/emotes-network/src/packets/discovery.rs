use bytes::{BufMut, Bytes, BytesMut};

use super::{NetworkPacket, PacketKind};
use crate::error::Result;
use crate::framing::get_u8;
use crate::net_data::{NetData, TransferPurpose};

/// Advertises which packet kinds (and layout versions) this side understands.
///
/// Layout: `count: u8` then `count` pairs of `(kind id, version)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryPacket;

impl NetworkPacket for DiscoveryPacket {
    fn id(&self) -> u8 {
        0x08
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        let count = get_u8(buf)?;
        for _ in 0..count {
            let id = get_u8(buf)?;
            let version = get_u8(buf)?;
            data.versions.insert(id, version);
        }
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        data.purpose == TransferPurpose::Config
    }

    fn calculate_size(&self, _data: &NetData) -> usize {
        1 + 2 * PacketKind::ALL.len()
    }

    fn write(&self, buf: &mut BytesMut, _data: &NetData) -> Result<()> {
        buf.put_u8(PacketKind::ALL.len() as u8);
        for kind in PacketKind::ALL {
            let packet = kind.packet();
            buf.put_u8(packet.id());
            buf.put_u8(packet.version());
        }
        Ok(())
    }
}
