//! The emote body: ticks, flags and every keyframed channel.
//!
//! Layout (v1):
//! ```text
//! uuid[16] begin:i32 end:i32 stop:i32 return:i32 flags:u8 parts:u8
//! per part:    name:str bendable:u8
//!   per channel (6, or 8 when bendable):
//!              enabled:u8 count:i32 { tick:i32 value:f32 ease:u8 turn:i32 }*
//! ```
//! Parts that are disabled and carry no keyframes are left out.

use bytes::{BufMut, Bytes, BytesMut};
use emotes_core::{Channel, Ease, EmoteData, KeyFrame, StateCollection};
use log::warn;

use super::NetworkPacket;
use crate::error::{NetworkError, Result};
use crate::framing::{
    get_bool, get_count, get_f32, get_i32, get_u8, get_uuid, put_uuid, read_string, string_size,
    write_string, LENGTH_PREFIX, UUID_SIZE,
};
use crate::net_data::NetData;

const FLAG_LOOPED: u8 = 1;
const FLAG_NSFW: u8 = 1 << 1;
const FLAG_EASING_BEFORE: u8 = 1 << 2;

const KEY_FRAME_SIZE: usize = 4 + 4 + 1 + 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct EmoteDataPacket;

fn is_sent(part: &StateCollection) -> bool {
    part.is_enabled() || part.states().any(|s| !s.is_empty())
}

fn sent_parts(emote: &EmoteData) -> impl Iterator<Item = &StateCollection> {
    emote.body_parts().values().filter(|p| is_sent(p))
}

fn part_size(part: &StateCollection) -> usize {
    let states: usize = part
        .states()
        .map(|s| 1 + LENGTH_PREFIX + s.len() * KEY_FRAME_SIZE)
        .sum();
    string_size(Some(part.name())) + 1 + states
}

fn read_part(buf: &mut Bytes, part: &mut StateCollection) -> Result<()> {
    let channels: Vec<Channel> = part.states().map(|s| s.channel()).collect();
    for channel in channels {
        let enabled = get_bool(buf)?;
        let count = get_count(buf, KEY_FRAME_SIZE)?;
        let Some(state) = part.state_mut(channel) else {
            continue;
        };
        for _ in 0..count {
            let tick = get_i32(buf)?;
            let value = get_f32(buf)?;
            let ease = Ease::from_id(get_u8(buf)?)?;
            let turn = get_i32(buf)?;
            state.insert(KeyFrame::new(tick, value, ease).with_turn(turn));
        }
        state.set_enabled(enabled);
    }
    Ok(())
}

impl NetworkPacket for EmoteDataPacket {
    fn id(&self) -> u8 {
        0x00
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        let builder = data.builder_mut();
        builder.uuid = Some(get_uuid(buf)?);
        builder.begin_tick = get_i32(buf)?;
        builder.end_tick = get_i32(buf)?;
        builder.stop_tick = Some(get_i32(buf)?);
        builder.return_tick = get_i32(buf)?;
        let flags = get_u8(buf)?;
        builder.is_looped = flags & FLAG_LOOPED != 0;
        builder.nsfw = flags & FLAG_NSFW != 0;
        builder.is_easing_before = flags & FLAG_EASING_BEFORE != 0;

        let part_count = get_u8(buf)?;
        for _ in 0..part_count {
            let name = read_string(buf)?.unwrap_or_default();
            let bendable = get_bool(buf)?;
            match builder.part_mut(&name) {
                Some(part) if part.is_bendable() == bendable => read_part(buf, part)?,
                known => {
                    warn!(
                        "Skipping body part '{}' (known: {}, bendable: {})",
                        name,
                        known.is_some(),
                        bendable
                    );
                    let mut scratch = StateCollection::new(name, [0.0; 3], bendable);
                    read_part(buf, &mut scratch)?;
                }
            }
        }
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        data.emote.is_some() && data.purpose.carries_emote()
    }

    fn calculate_size(&self, data: &NetData) -> usize {
        let Some(emote) = data.emote.as_ref() else {
            return 0;
        };
        UUID_SIZE + 4 * 4 + 1 + 1 + sent_parts(emote).map(part_size).sum::<usize>()
    }

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()> {
        let emote = data.emote.as_ref().ok_or(NetworkError::MissingData("emote"))?;
        let part_count = sent_parts(emote).count();
        if part_count > u8::MAX as usize {
            return Err(NetworkError::TooMany {
                what: "body parts",
                count: part_count,
            });
        }

        put_uuid(buf, &emote.uuid());
        buf.put_i32(emote.begin_tick());
        buf.put_i32(emote.end_tick());
        buf.put_i32(emote.stop_tick());
        buf.put_i32(emote.return_tick());
        let mut flags = 0;
        if emote.is_looped() {
            flags |= FLAG_LOOPED;
        }
        if emote.nsfw() {
            flags |= FLAG_NSFW;
        }
        if emote.is_easing_before() {
            flags |= FLAG_EASING_BEFORE;
        }
        buf.put_u8(flags);

        buf.put_u8(part_count as u8);
        for part in sent_parts(emote) {
            write_string(buf, Some(part.name()));
            buf.put_u8(part.is_bendable() as u8);
            for state in part.states() {
                buf.put_u8(state.is_enabled() as u8);
                buf.put_i32(state.len() as i32);
                for key_frame in state.key_frames() {
                    buf.put_i32(key_frame.tick);
                    buf.put_f32(key_frame.value);
                    buf.put_u8(key_frame.ease.id());
                    buf.put_i32(key_frame.turn);
                }
            }
        }
        Ok(())
    }
}
