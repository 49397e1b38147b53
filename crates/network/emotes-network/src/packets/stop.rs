use bytes::{Bytes, BytesMut};

use super::NetworkPacket;
use crate::error::{NetworkError, Result};
use crate::framing::{get_uuid, put_uuid, UUID_SIZE};
use crate::net_data::{NetData, TransferPurpose};

/// Stop the emote with the given uuid.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopPacket;

impl NetworkPacket for StopPacket {
    fn id(&self) -> u8 {
        0x0A
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        data.stop_emote_id = Some(get_uuid(buf)?);
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        data.purpose == TransferPurpose::Stop && data.stop_emote_id.is_some()
    }

    fn calculate_size(&self, _data: &NetData) -> usize {
        UUID_SIZE
    }

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()> {
        let id = data
            .stop_emote_id
            .ok_or(NetworkError::MissingData("stop_emote_id"))?;
        put_uuid(buf, &id);
        Ok(())
    }
}
