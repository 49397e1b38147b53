use bytes::{Bytes, BytesMut};

use super::NetworkPacket;
use crate::error::{NetworkError, Result};
use crate::framing::{read_string, sum_strings, write_string};
use crate::net_data::NetData;

/// Name, description and author of the emote, as three framed strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderPacket;

impl NetworkPacket for HeaderPacket {
    fn id(&self) -> u8 {
        0x11
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        let builder = data.builder_mut();
        builder.name = read_string(buf)?;
        builder.description = read_string(buf)?;
        builder.author = read_string(buf)?;
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        data.emote.is_some() && data.purpose.exchange_header()
    }

    fn calculate_size(&self, data: &NetData) -> usize {
        data.emote
            .as_ref()
            .map_or(0, |e| sum_strings(&[e.name(), e.description(), e.author()]))
    }

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()> {
        let emote = data.emote.as_ref().ok_or(NetworkError::MissingData("emote"))?;
        write_string(buf, emote.name());
        write_string(buf, emote.description());
        write_string(buf, emote.author());
        Ok(())
    }
}
