use bytes::{Bytes, BytesMut};

use super::NetworkPacket;
use crate::error::{NetworkError, Result};
use crate::framing::{read_byte_array, write_byte_array, LENGTH_PREFIX};
use crate::net_data::NetData;

/// Raw icon image bytes, sent alongside the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct IconPacket;

impl NetworkPacket for IconPacket {
    fn id(&self) -> u8 {
        0x12
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        let icon = read_byte_array(buf)?;
        data.builder_mut().icon_data = Some(icon);
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        data.purpose.exchange_header()
            && data
                .emote
                .as_ref()
                .is_some_and(|e| e.icon_data().is_some())
    }

    fn calculate_size(&self, data: &NetData) -> usize {
        LENGTH_PREFIX
            + data
                .emote
                .as_ref()
                .and_then(|e| e.icon_data())
                .map_or(0, <[u8]>::len)
    }

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()> {
        let icon = data
            .emote
            .as_ref()
            .and_then(|e| e.icon_data())
            .ok_or(NetworkError::MissingData("icon"))?;
        write_byte_array(buf, icon);
        Ok(())
    }
}
