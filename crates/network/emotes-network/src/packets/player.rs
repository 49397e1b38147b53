use bytes::{BufMut, Bytes, BytesMut};

use super::NetworkPacket;
use crate::error::{NetworkError, Result};
use crate::framing::{get_bool, get_uuid, put_uuid, UUID_SIZE};
use crate::net_data::{NetData, TransferPurpose};

/// Which player an emote is played on or stopped for.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerDataPacket;

impl NetworkPacket for PlayerDataPacket {
    fn id(&self) -> u8 {
        0x01
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        data.player = Some(get_uuid(buf)?);
        data.is_forced = get_bool(buf)?;
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        data.player.is_some()
            && matches!(data.purpose, TransferPurpose::Play | TransferPurpose::Stop)
    }

    fn calculate_size(&self, _data: &NetData) -> usize {
        UUID_SIZE + 1
    }

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()> {
        let player = data.player.ok_or(NetworkError::MissingData("player"))?;
        put_uuid(buf, &player);
        buf.put_u8(data.is_forced as u8);
        Ok(())
    }
}
