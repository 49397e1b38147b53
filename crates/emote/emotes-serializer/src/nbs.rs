//! Open Note Block Studio (`.nbs`) song reader.
//!
//! Handles the classic layout and the versioned layout up to version 5. All
//! numbers are little-endian; strings are an `i32` byte length followed by the
//! bytes.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use emotes_core::{Layer, Note, Song};

/// Newest versioned layout this reader understands.
pub const MAX_NBS_VERSION: u8 = 5;

/// Instrument count implied by files in the classic layout.
const CLASSIC_INSTRUMENT_COUNT: u8 = 10;

/// Highest layer index a note may address.
const MAX_LAYER_INDEX: usize = u16::MAX as usize;

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

fn read_string(r: &mut impl Read) -> io::Result<String> {
    let len = r.read_i32::<LittleEndian>()?;
    let len = usize::try_from(len)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "negative string length"))?;
    let mut raw = Vec::new();
    r.take(len as u64).read_to_end(&mut raw)?;
    if raw.len() != len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

fn layer_mut(layers: &mut Vec<Layer>, index: usize) -> &mut Layer {
    if layers.len() <= index {
        layers.resize_with(index + 1, Layer::default);
    }
    &mut layers[index]
}

/// Decode a complete `.nbs` file.
pub fn read_song(bytes: &[u8]) -> io::Result<Song> {
    let mut r = Cursor::new(bytes);
    let mut song = Song::default();

    let first = r.read_i16::<LittleEndian>()?;
    let layer_count;
    if first == 0 {
        song.version = r.read_u8()?;
        if song.version > MAX_NBS_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "unsupported nbs version {} (newest known is {})",
                    song.version, MAX_NBS_VERSION
                ),
            ));
        }
        song.vanilla_instrument_count = r.read_u8()?;
        if song.version >= 3 {
            song.length = r.read_i16::<LittleEndian>()?;
        }
        layer_count = r.read_i16::<LittleEndian>()?;
    } else {
        song.version = 0;
        song.vanilla_instrument_count = CLASSIC_INSTRUMENT_COUNT;
        song.length = first;
        layer_count = r.read_i16::<LittleEndian>()?;
    }

    song.name = read_string(&mut r)?;
    song.author = read_string(&mut r)?;
    song.original_author = read_string(&mut r)?;
    song.description = read_string(&mut r)?;
    song.tempo = r.read_i16::<LittleEndian>()? as f32 / 100.0;
    let _auto_save = r.read_u8()?;
    let _auto_save_duration = r.read_u8()?;
    let _time_signature = r.read_u8()?;
    for _ in 0..5 {
        // minutes spent, left clicks, right clicks, blocks added, blocks removed
        r.read_i32::<LittleEndian>()?;
    }
    let _midi_name = read_string(&mut r)?;
    if song.version >= 4 {
        song.loop_on = r.read_u8()? != 0;
        song.max_loop_count = r.read_u8()?;
        song.loop_start_tick = r.read_i16::<LittleEndian>()?;
    }

    let mut layers: Vec<Layer> = Vec::new();
    let mut tick: i32 = -1;
    loop {
        let jump = r.read_i16::<LittleEndian>()?;
        if jump == 0 {
            break;
        }
        tick = tick
            .checked_add(jump as i32)
            .ok_or_else(|| invalid("note tick overflows"))?;
        let mut layer: i32 = -1;
        loop {
            let jump = r.read_i16::<LittleEndian>()?;
            if jump == 0 {
                break;
            }
            layer = layer
                .checked_add(jump as i32)
                .ok_or_else(|| invalid("layer index overflows"))?;
            let mut note = Note {
                tick,
                instrument: r.read_u8()?,
                key: r.read_u8()?,
                velocity: 100,
                panning: 100,
                pitch: 0,
            };
            if song.version >= 4 {
                note.velocity = r.read_u8()?;
                note.panning = r.read_u8()?;
                note.pitch = r.read_i16::<LittleEndian>()?;
            }
            let index =
                usize::try_from(layer).map_err(|_| invalid("note on a negative layer"))?;
            if index > MAX_LAYER_INDEX {
                return Err(invalid("note on an out of range layer"));
            }
            layer_mut(&mut layers, index).notes.push(note);
        }
    }

    for index in 0..layer_count.max(0) as usize {
        let layer = layer_mut(&mut layers, index);
        layer.name = read_string(&mut r)?;
        if song.version >= 4 {
            layer.lock = r.read_u8()? != 0;
        }
        layer.volume = r.read_u8()?;
        if song.version >= 2 {
            layer.stereo = r.read_u8()?;
        }
    }
    song.layers = layers;

    // Versions 1 and 2 do not store the length.
    if (1..3).contains(&song.version) {
        song.length = i16::try_from(song.last_tick() + 1).unwrap_or(i16::MAX);
    }
    Ok(song)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Write;

    fn put_string(out: &mut Vec<u8>, s: &str) {
        out.write_i32::<LittleEndian>(s.len() as i32).unwrap();
        out.write_all(s.as_bytes()).unwrap();
    }

    /// Version 5 file with one layer holding notes at ticks 0 and 4.
    fn v5_song() -> Vec<u8> {
        let mut out = Vec::new();
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_u8(5).unwrap();
        out.write_u8(16).unwrap();
        out.write_i16::<LittleEndian>(5).unwrap(); // length
        out.write_i16::<LittleEndian>(1).unwrap(); // layers
        put_string(&mut out, "Tune");
        put_string(&mut out, "me");
        put_string(&mut out, "");
        put_string(&mut out, "test song");
        out.write_i16::<LittleEndian>(1000).unwrap(); // 10 t/s
        out.write_all(&[0, 10, 4]).unwrap();
        for _ in 0..5 {
            out.write_i32::<LittleEndian>(0).unwrap();
        }
        put_string(&mut out, "");
        out.write_all(&[1, 3]).unwrap();
        out.write_i16::<LittleEndian>(2).unwrap();

        // tick 0, layer 0
        out.write_i16::<LittleEndian>(1).unwrap();
        out.write_i16::<LittleEndian>(1).unwrap();
        out.write_all(&[2, 45, 90, 100]).unwrap();
        out.write_i16::<LittleEndian>(-15).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        // tick 4, layer 0
        out.write_i16::<LittleEndian>(4).unwrap();
        out.write_i16::<LittleEndian>(1).unwrap();
        out.write_all(&[0, 50, 100, 150]).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();

        put_string(&mut out, "Piano");
        out.write_all(&[0, 80, 100]).unwrap();
        out
    }

    #[test]
    fn reads_versioned_layout() {
        let song = read_song(&v5_song()).unwrap();
        assert_eq!(song.version, 5);
        assert_eq!(song.name, "Tune");
        assert_eq!(song.description, "test song");
        assert_eq!(song.tempo, 10.0);
        assert!(song.loop_on);
        assert_eq!(song.max_loop_count, 3);
        assert_eq!(song.loop_start_tick, 2);
        assert_eq!(song.layers.len(), 1);
        assert_eq!(song.note_count(), 2);
        let layer = &song.layers[0];
        assert_eq!(layer.name, "Piano");
        assert_eq!(layer.volume, 80);
        let ticks: Vec<i32> = layer.notes.iter().map(|n| n.tick).collect();
        assert_eq!(ticks, vec![0, 4]);
        assert_eq!(layer.notes[0].pitch, -15);
        assert_eq!(layer.notes[1].panning, 150);
    }

    /// Classic layout header, up to the first note block.
    fn classic_header() -> Vec<u8> {
        let mut out = Vec::new();
        out.write_i16::<LittleEndian>(8).unwrap(); // length
        out.write_i16::<LittleEndian>(1).unwrap(); // layers
        for s in ["Old", "", "", ""] {
            put_string(&mut out, s);
        }
        out.write_i16::<LittleEndian>(500).unwrap();
        out.write_all(&[0, 0, 4]).unwrap();
        for _ in 0..5 {
            out.write_i32::<LittleEndian>(0).unwrap();
        }
        put_string(&mut out, "");
        out
    }

    #[test]
    fn reads_classic_layout() {
        let mut out = classic_header();
        out.write_i16::<LittleEndian>(3).unwrap();
        out.write_i16::<LittleEndian>(1).unwrap();
        out.write_all(&[1, 33]).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        put_string(&mut out, "");
        out.write_u8(100).unwrap();

        let song = read_song(&out).unwrap();
        assert_eq!(song.version, 0);
        assert_eq!(song.vanilla_instrument_count, 10);
        assert_eq!(song.tempo, 5.0);
        assert_eq!(song.layers[0].notes[0].tick, 2);
        assert_eq!(song.layers[0].notes[0].velocity, 100);
        assert_eq!(song.length, 8);
    }

    #[test]
    fn newer_versions_and_truncation_fail() {
        let mut bytes = v5_song();
        bytes[2] = 6;
        assert_eq!(
            read_song(&bytes).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );

        let bytes = v5_song();
        assert_eq!(
            read_song(&bytes[..bytes.len() - 2]).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn tick_overflow_is_invalid_data() {
        let mut out = classic_header();
        for _ in 0..70_000 {
            out.write_i16::<LittleEndian>(i16::MAX).unwrap();
            out.write_i16::<LittleEndian>(0).unwrap();
        }
        out.write_i16::<LittleEndian>(0).unwrap();
        assert_eq!(read_song(&out).unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn far_away_layers_are_rejected() {
        let mut out = classic_header();
        out.write_i16::<LittleEndian>(1).unwrap();
        for _ in 0..3 {
            out.write_i16::<LittleEndian>(i16::MAX).unwrap();
            out.write_all(&[0, 40]).unwrap();
        }
        out.write_i16::<LittleEndian>(0).unwrap();
        out.write_i16::<LittleEndian>(0).unwrap();
        let err = read_song(&out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("out of range layer"));
    }
}
