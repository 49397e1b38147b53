use bytes::{BufMut, Bytes, BytesMut};
use emotes_core::{Layer, Note, Song};

use super::NetworkPacket;
use crate::error::{NetworkError, Result};
use crate::framing::{
    get_bool, get_count, get_f32, get_i16, get_i32, get_u8, read_string, string_size,
    write_string, LENGTH_PREFIX,
};
use crate::net_data::{NetData, TransferPurpose};

const NOTE_SIZE: usize = 4 + 1 + 1 + 1 + 1 + 2;
// version, instrument count, length, tempo, loop flag, max loop, loop start
const FIXED_HEADER_SIZE: usize = 1 + 1 + 2 + 4 + 1 + 1 + 2;

/// Note-block song attached to an emote.
#[derive(Debug, Clone, Copy, Default)]
pub struct SongPacket;

fn song_of(data: &NetData) -> Option<&Song> {
    data.emote.as_ref().and_then(|e| e.song())
}

impl NetworkPacket for SongPacket {
    fn id(&self) -> u8 {
        0x03
    }

    fn version(&self) -> u8 {
        1
    }

    fn read(&self, buf: &mut Bytes, data: &mut NetData, _version: u8) -> Result<bool> {
        let mut song = Song {
            version: get_u8(buf)?,
            vanilla_instrument_count: get_u8(buf)?,
            length: get_i16(buf)?,
            ..Song::default()
        };
        song.name = read_string(buf)?.unwrap_or_default();
        song.author = read_string(buf)?.unwrap_or_default();
        song.original_author = read_string(buf)?.unwrap_or_default();
        song.description = read_string(buf)?.unwrap_or_default();
        song.tempo = get_f32(buf)?;
        song.loop_on = get_bool(buf)?;
        song.max_loop_count = get_u8(buf)?;
        song.loop_start_tick = get_i16(buf)?;

        let layer_count = get_count(buf, LENGTH_PREFIX + 3 + LENGTH_PREFIX)?;
        song.layers.reserve(layer_count);
        for _ in 0..layer_count {
            let mut layer = Layer {
                name: read_string(buf)?.unwrap_or_default(),
                lock: get_bool(buf)?,
                volume: get_u8(buf)?,
                stereo: get_u8(buf)?,
                notes: Vec::new(),
            };
            let note_count = get_count(buf, NOTE_SIZE)?;
            layer.notes.reserve(note_count);
            for _ in 0..note_count {
                layer.notes.push(Note {
                    tick: get_i32(buf)?,
                    instrument: get_u8(buf)?,
                    key: get_u8(buf)?,
                    velocity: get_u8(buf)?,
                    panning: get_u8(buf)?,
                    pitch: get_i16(buf)?,
                });
            }
            song.layers.push(layer);
        }

        data.builder_mut().song = Some(song);
        Ok(true)
    }

    fn should_write(&self, data: &NetData) -> bool {
        song_of(data).is_some()
            && matches!(
                data.purpose,
                TransferPurpose::Play | TransferPurpose::Stream | TransferPurpose::File
            )
    }

    fn calculate_size(&self, data: &NetData) -> usize {
        let Some(song) = song_of(data) else {
            return 0;
        };
        let strings = [
            song.name.as_str(),
            song.author.as_str(),
            song.original_author.as_str(),
            song.description.as_str(),
        ]
        .iter()
        .map(|s| string_size(Some(s)))
        .sum::<usize>();
        let layers = song
            .layers
            .iter()
            .map(|l| string_size(Some(&l.name)) + 3 + LENGTH_PREFIX + l.notes.len() * NOTE_SIZE)
            .sum::<usize>();
        FIXED_HEADER_SIZE + strings + LENGTH_PREFIX + layers
    }

    fn write(&self, buf: &mut BytesMut, data: &NetData) -> Result<()> {
        let song = song_of(data).ok_or(NetworkError::MissingData("song"))?;
        buf.put_u8(song.version);
        buf.put_u8(song.vanilla_instrument_count);
        buf.put_i16(song.length);
        write_string(buf, Some(&song.name));
        write_string(buf, Some(&song.author));
        write_string(buf, Some(&song.original_author));
        write_string(buf, Some(&song.description));
        buf.put_f32(song.tempo);
        buf.put_u8(song.loop_on as u8);
        buf.put_u8(song.max_loop_count);
        buf.put_i16(song.loop_start_tick);

        buf.put_i32(song.layers.len() as i32);
        for layer in &song.layers {
            write_string(buf, Some(&layer.name));
            buf.put_u8(layer.lock as u8);
            buf.put_u8(layer.volume);
            buf.put_u8(layer.stereo);
            buf.put_i32(layer.notes.len() as i32);
            for note in &layer.notes {
                buf.put_i32(note.tick);
                buf.put_u8(note.instrument);
                buf.put_u8(note.key);
                buf.put_u8(note.velocity);
                buf.put_u8(note.panning);
                buf.put_i16(note.pitch);
            }
        }
        Ok(())
    }
}
