//! Importer for GeckoLib / Bedrock animation JSON.
//!
//! Each entry of `animations` becomes one emote named after its key. Bone
//! rotations are in degrees around the model axes, positions are offsets from
//! the part's rest position.

use std::str::FromStr;

use emotes_core::{Ease, EmoteBuilder, EmoteData, State, StateCollection};
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{BoxError, SerializerError};
use crate::json::FORMAT;

const TICKS_PER_SECOND: f32 = 20.0;

#[derive(Deserialize)]
struct GeckoFile {
    animations: IndexMap<String, GeckoAnimation>,
}

#[derive(Deserialize)]
struct GeckoAnimation {
    #[serde(default)]
    animation_length: Option<f32>,
    /// `true`, `false` or `"hold_on_last_frame"`.
    #[serde(rename = "loop", default)]
    looping: Value,
    #[serde(default)]
    bones: IndexMap<String, GeckoBone>,
}

#[derive(Deserialize)]
struct GeckoBone {
    #[serde(default)]
    rotation: Option<GeckoTrack>,
    #[serde(default)]
    position: Option<GeckoTrack>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeckoTrack {
    Constant([f32; 3]),
    Keyed(IndexMap<String, GeckoKey>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GeckoKey {
    Vector([f32; 3]),
    Detailed {
        vector: [f32; 3],
        #[serde(default)]
        easing: Option<String>,
    },
}

struct Sample {
    tick: i32,
    vector: [f32; 3],
    ease: Ease,
}

fn seconds_to_tick(seconds: f32) -> i32 {
    (seconds * TICKS_PER_SECOND).round() as i32
}

/// Schema part for a GeckoLib bone name (`right_arm`, `RightArm`, `torso`, ...).
fn part_for_bone(bone: &str) -> Option<&'static str> {
    let key: String = bone
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match key.as_str() {
        "head" => Some("head"),
        "body" | "torso" => Some("body"),
        "rightarm" => Some("rightArm"),
        "leftarm" => Some("leftArm"),
        "rightleg" => Some("rightLeg"),
        "leftleg" => Some("leftLeg"),
        _ => None,
    }
}

fn samples(track: &GeckoTrack) -> Result<Vec<Sample>, BoxError> {
    match track {
        GeckoTrack::Constant(vector) => Ok(vec![Sample {
            tick: 0,
            vector: *vector,
            ease: Ease::Linear,
        }]),
        GeckoTrack::Keyed(keys) => keys
            .iter()
            .map(|(time, key)| -> Result<Sample, BoxError> {
                let seconds: f32 = time.trim().parse().map_err(|_| {
                    SerializerError::new(FORMAT, format!("invalid keyframe time '{}'", time))
                })?;
                let (vector, ease) = match key {
                    GeckoKey::Vector(vector) => (*vector, Ease::Linear),
                    GeckoKey::Detailed { vector, easing } => {
                        let ease = easing
                            .as_deref()
                            .map(Ease::from_str)
                            .transpose()?
                            .unwrap_or_default();
                        (*vector, ease)
                    }
                };
                Ok(Sample {
                    tick: seconds_to_tick(seconds),
                    vector,
                    ease,
                })
            })
            .collect(),
    }
}

fn last_tick(animation: &GeckoAnimation) -> Result<i32, BoxError> {
    let mut last = 0;
    for bone in animation.bones.values() {
        for track in [&bone.rotation, &bone.position].into_iter().flatten() {
            for sample in samples(track)? {
                last = last.max(sample.tick);
            }
        }
    }
    Ok(last)
}

fn add_samples(state: &mut State, samples: &[Sample], axis: usize, sign: f32, degrees: bool) {
    let rest = if state.is_angle() {
        0.0
    } else {
        state.default_value()
    };
    for sample in samples {
        let value = rest + sign * sample.vector[axis];
        state.add_key_frame(sample.tick, value, sample.ease, 0, degrees);
    }
}

fn apply_bone(part: &mut StateCollection, bone: &GeckoBone) -> Result<(), BoxError> {
    if let Some(rotation) = &bone.rotation {
        let samples = samples(rotation)?;
        add_samples(&mut part.pitch, &samples, 0, -1.0, true);
        add_samples(&mut part.yaw, &samples, 1, -1.0, true);
        add_samples(&mut part.roll, &samples, 2, 1.0, true);
    }
    if let Some(position) = &bone.position {
        let samples = samples(position)?;
        add_samples(&mut part.x, &samples, 0, 1.0, false);
        add_samples(&mut part.y, &samples, 1, -1.0, false);
        add_samples(&mut part.z, &samples, 2, 1.0, false);
    }
    Ok(())
}

fn convert(name: &str, animation: &GeckoAnimation) -> Result<EmoteData, BoxError> {
    let mut builder = EmoteBuilder::new();
    builder.name = Some(Value::String(name.to_string()).to_string());

    let length_ticks = match animation.animation_length {
        Some(seconds) => seconds_to_tick(seconds),
        None => last_tick(animation)?,
    };
    builder.end_tick = length_ticks.max(1);
    builder.is_looped = animation.looping.as_bool().unwrap_or(false);
    builder.return_tick = 0;

    for (bone_name, bone) in &animation.bones {
        match part_for_bone(bone_name).and_then(|part| builder.part_mut(part)) {
            Some(part) => apply_bone(part, bone)?,
            None => warn!("Unknown bone '{}' in animation '{}', skipped", bone_name, name),
        }
    }

    builder.fully_enable_parts();
    builder.optimize_emote();
    Ok(builder.build()?)
}

pub(crate) fn read(root: &Value) -> Result<Vec<EmoteData>, BoxError> {
    if root.get("animations").is_none() {
        return Err(Box::new(SerializerError::new(
            FORMAT,
            "not an emote: neither 'emote' nor 'animations' is present",
        )));
    }
    let file = GeckoFile::deserialize(root)?;
    file.animations
        .iter()
        .map(|(name, animation)| convert(name, animation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bone_names_are_normalized() {
        assert_eq!(part_for_bone("right_arm"), Some("rightArm"));
        assert_eq!(part_for_bone("LeftLeg"), Some("leftLeg"));
        assert_eq!(part_for_bone("torso"), Some("body"));
        assert_eq!(part_for_bone("tail"), None);
    }

    #[test]
    fn missing_animations_is_an_error() {
        let err = read(&json!({"format_version": "1.8.0"})).unwrap_err();
        assert!(err.to_string().contains("animations"));
    }

    #[test]
    fn keyed_rotation_becomes_radians_with_flipped_axes() {
        let root = json!({
            "animations": {
                "wave": {
                    "animation_length": 1.0,
                    "loop": true,
                    "bones": {
                        "right_arm": {
                            "rotation": {
                                "0.0": [0, 0, 0],
                                "0.5": {"vector": [90, 0, -45], "easing": "easeInOutSine"},
                                "1.0": [0, 0, 0]
                            }
                        },
                        "tail": {"rotation": [10, 0, 0]}
                    }
                }
            }
        });
        let emotes = read(&root).unwrap();
        assert_eq!(emotes.len(), 1);
        let emote = &emotes[0];
        assert_eq!(emote.name(), Some("\"wave\""));
        assert_eq!(emote.end_tick(), 20);
        assert!(emote.is_looped());
        assert_eq!(emote.return_tick(), 0);

        let arm = emote.part("rightArm").unwrap();
        let mid = arm.pitch.key_frames().iter().find(|k| k.tick == 10).unwrap();
        assert!((mid.value + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert_eq!(mid.ease, Ease::InOutSine);
        let roll = arm.roll.key_frames().iter().find(|k| k.tick == 10).unwrap();
        assert!((roll.value + std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn position_is_relative_to_rest_pose() {
        let root = json!({
            "animations": {
                "hop": {
                    "bones": {"left_leg": {"position": {"0.25": [1, 2, 0]}}}
                }
            }
        });
        let emote = read(&root).unwrap().remove(0);
        assert_eq!(emote.end_tick(), 5);
        let leg = emote.part("leftLeg").unwrap();
        assert!((leg.x.key_frames()[0].value - 2.9).abs() < 1e-6);
        assert!((leg.y.key_frames()[0].value - 10.0).abs() < 1e-6);
    }
}
