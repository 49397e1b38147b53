//! `.emotecraft` files: one transfer envelope written with the `File` purpose.

use std::io::Write;

use bytes::Bytes;
use emotes_core::EmoteData;
use emotes_network::{EmotePacket, NetData, TransferPurpose};

use crate::error::{BoxError, SerializerError};

pub(crate) const FORMAT: &str = "emotecraft";

pub(crate) fn read(bytes: &[u8]) -> Result<Vec<EmoteData>, BoxError> {
    let mut data = EmotePacket::read(Bytes::copy_from_slice(bytes))?;
    let emote = data
        .take_emote()?
        .ok_or_else(|| SerializerError::new(FORMAT, "file does not contain an emote"))?;
    Ok(vec![emote])
}

pub(crate) fn write(emote: &EmoteData, out: &mut dyn Write) -> Result<(), BoxError> {
    let data = NetData::with_emote(TransferPurpose::File, emote.clone());
    let buf = EmotePacket::write(&data)?;
    out.write_all(&buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotes_core::{Ease, EmoteBuilder};

    #[test]
    fn envelope_without_emote_is_rejected() {
        let stop = NetData::stop(uuid::Uuid::new_v4(), None);
        let bytes = EmotePacket::write(&stop).unwrap();
        let err = read(&bytes).unwrap_err();
        assert!(err.to_string().contains("does not contain an emote"));
    }

    #[test]
    fn builtin_flag_is_not_persisted() {
        let mut b = EmoteBuilder::new();
        b.end_tick = 10;
        b.part_mut("head")
            .unwrap()
            .yaw
            .add_key_frame(3, 0.5, Ease::OutQuad, 0, false);
        let emote = b.build().unwrap().with_builtin(true);

        let mut out = Vec::new();
        write(&emote, &mut out).unwrap();
        let back = read(&out).unwrap().remove(0);
        assert!(!back.is_builtin());
        assert_eq!(back.uuid(), emote.uuid());
        assert_eq!(back.part("head"), emote.part("head"));
    }
}
