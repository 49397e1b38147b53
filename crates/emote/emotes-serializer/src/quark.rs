//! Importer for Quark `.emote` scripts.
//!
//! ```text
//! name Wave
//! unit 1
//! animation
//! sequence
//!     move right_arm_x 250 -90 inOutQuad
//!     parallel
//!         move right_arm_z 250 20
//!         move head_y 500 15
//!     end
//!     pause 100
//! end
//! ```
//! Durations are milliseconds, values are degrees. Only rotation channels
//! exist in the format.

use std::path::Path;
use std::str::FromStr;

use emotes_core::{Channel, Ease, EmoteBuilder, EmoteData, KeyFrame, State};
use serde_json::Value;

use crate::error::{BoxError, SerializerError};

pub(crate) const FORMAT: &str = "emote";

const MS_PER_TICK: i32 = 50;

#[derive(Debug, Clone, Copy)]
enum Block {
    /// Children run one after another starting at `start`.
    Sequence { start: i32, cursor: i32 },
    /// Children all start at `start`; the block lasts as long as the longest.
    Parallel { start: i32, longest: i32 },
}

impl Block {
    /// Tick at which the next child starts.
    fn next_start(self) -> i32 {
        match self {
            Block::Sequence { cursor, .. } => cursor,
            Block::Parallel { start, .. } => start,
        }
    }

    /// `None` when the block would run past `i32::MAX` ticks.
    fn advance(&mut self, duration: i32) -> Option<()> {
        match self {
            Block::Sequence { cursor, .. } => *cursor = cursor.checked_add(duration)?,
            Block::Parallel { start, longest } => {
                start.checked_add(duration)?;
                *longest = (*longest).max(duration);
            }
        }
        Some(())
    }

    fn duration(self) -> i32 {
        match self {
            Block::Sequence { start, cursor } => cursor - start,
            Block::Parallel { longest, .. } => longest,
        }
    }
}

fn malformed(line_no: usize, line: &str, reason: &str) -> BoxError {
    Box::new(SerializerError::new(
        FORMAT,
        format!("line {}: {} ({})", line_no, reason, line.trim()),
    ))
}

fn part_for_bone(bone: &str) -> Option<&'static str> {
    match bone {
        "head" => Some("head"),
        "body" => Some("body"),
        "right_arm" => Some("rightArm"),
        "left_arm" => Some("leftArm"),
        "right_leg" => Some("rightLeg"),
        "left_leg" => Some("leftLeg"),
        _ => None,
    }
}

fn channel_for_axis(axis: &str) -> Option<Channel> {
    match axis {
        "x" => Some(Channel::Pitch),
        "y" => Some(Channel::Yaw),
        "z" => Some(Channel::Roll),
        _ => None,
    }
}

fn ms_to_ticks(ms: i32) -> i32 {
    ms / MS_PER_TICK
}

/// Value the channel holds at `tick` given the keyframes so far.
fn value_at(state: &State, tick: i32) -> f32 {
    state
        .key_frames()
        .iter()
        .take_while(|k| k.tick <= tick)
        .last()
        .map_or(state.default_value(), |k| k.value)
}

fn advance_top(
    stack: &mut [Block],
    duration: i32,
    line_no: usize,
    line: &str,
) -> Result<(), BoxError> {
    match stack.last_mut() {
        Some(block) => block
            .advance(duration)
            .ok_or_else(|| malformed(line_no, line, "emote is too long")),
        None => Ok(()),
    }
}

fn parse_ms(token: Option<&str>, line_no: usize, line: &str) -> Result<i32, BoxError> {
    let token = token.ok_or_else(|| malformed(line_no, line, "missing duration"))?;
    let ms: i32 = token
        .parse()
        .map_err(|_| malformed(line_no, line, "duration is not an integer"))?;
    if ms < 0 {
        return Err(malformed(line_no, line, "negative duration"));
    }
    Ok(ms)
}

pub(crate) fn read(bytes: &[u8], filename: Option<&str>) -> Result<Vec<EmoteData>, BoxError> {
    let text = std::str::from_utf8(bytes)?;
    let mut builder = EmoteBuilder::new();
    let mut name: Option<String> = None;
    let mut stack = vec![Block::Sequence {
        start: 0,
        cursor: 0,
    }];

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let mut tokens = content.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "name" => {
                let rest = content[keyword.len()..].trim();
                if rest.is_empty() {
                    return Err(malformed(line_no, line, "empty name"));
                }
                name = Some(rest.to_string());
            }
            "unit" | "tier" | "use" | "animation" => {}
            "sequence" | "parallel" => {
                let start = stack.last().map_or(0, |b| b.next_start());
                stack.push(if keyword == "sequence" {
                    Block::Sequence {
                        start,
                        cursor: start,
                    }
                } else {
                    Block::Parallel { start, longest: 0 }
                });
            }
            "end" => {
                if stack.len() < 2 {
                    return Err(malformed(line_no, line, "'end' without an open block"));
                }
                if let Some(block) = stack.pop() {
                    advance_top(&mut stack, block.duration(), line_no, line)?;
                }
            }
            "pause" => {
                let duration = ms_to_ticks(parse_ms(tokens.next(), line_no, line)?);
                advance_top(&mut stack, duration, line_no, line)?;
            }
            "move" => {
                let target = tokens
                    .next()
                    .ok_or_else(|| malformed(line_no, line, "missing target"))?;
                let duration = ms_to_ticks(parse_ms(tokens.next(), line_no, line)?);
                let value: f32 = tokens
                    .next()
                    .ok_or_else(|| malformed(line_no, line, "missing value"))?
                    .parse()
                    .map_err(|_| malformed(line_no, line, "value is not a number"))?;
                let ease = tokens
                    .next()
                    .map(Ease::from_str)
                    .transpose()?
                    .unwrap_or_default();

                let (bone, axis) = target
                    .rsplit_once('_')
                    .ok_or_else(|| malformed(line_no, line, "target must be <bone>_<axis>"))?;
                let part = part_for_bone(bone)
                    .ok_or_else(|| malformed(line_no, line, "unknown bone"))?;
                let channel = channel_for_axis(axis)
                    .ok_or_else(|| malformed(line_no, line, "unknown axis"))?;

                let start = stack.last().map_or(0, |b| b.next_start());
                let end = start
                    .checked_add(duration)
                    .ok_or_else(|| malformed(line_no, line, "emote is too long"))?;
                let state = builder
                    .part_mut(part)
                    .and_then(|p| p.state_mut(channel))
                    .ok_or_else(|| malformed(line_no, line, "channel not in schema"))?;
                if !state.key_frames().iter().any(|k| k.tick == start) {
                    let held = value_at(state, start);
                    state.insert(KeyFrame::new(start, held, Ease::Linear));
                }
                state.add_key_frame(end, value, ease, 0, true);
                advance_top(&mut stack, duration, line_no, line)?;
            }
            other => {
                return Err(malformed(
                    line_no,
                    line,
                    &format!("unknown keyword '{}'", other),
                ))
            }
        }
    }

    if stack.len() > 1 {
        return Err(Box::new(SerializerError::new(
            FORMAT,
            format!("{} block(s) not closed with 'end'", stack.len() - 1),
        )));
    }

    let name = name
        .or_else(|| {
            filename
                .and_then(|f| Path::new(f).file_stem())
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .ok_or_else(|| SerializerError::new(FORMAT, "emote has no name"))?;
    builder.name = Some(Value::String(name).to_string());

    let length = stack.first().map_or(0, |b| b.duration());
    let last_key = builder
        .body_parts
        .values()
        .flat_map(|p| p.states())
        .filter_map(|s| s.key_frames().last().map(|k| k.tick))
        .max()
        .unwrap_or(0);
    builder.end_tick = length.max(last_key).max(1);

    builder.fully_enable_parts();
    builder.optimize_emote();
    Ok(vec![builder.build()?])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_one(text: &str) -> EmoteData {
        read(text.as_bytes(), Some("dir/quark_wave.emote"))
            .unwrap()
            .remove(0)
    }

    fn ticks(state: &State) -> Vec<i32> {
        state.key_frames().iter().map(|k| k.tick).collect()
    }

    #[test]
    fn sequence_moves_follow_each_other() {
        let emote = read_one(
            "name Wave\nanimation\nsequence\n  move right_arm_x 250 -90\n  pause 100\n  move right_arm_x 250 0\nend\n",
        );
        assert_eq!(emote.name(), Some("\"Wave\""));
        let arm = emote.part("rightArm").unwrap();
        assert_eq!(ticks(&arm.pitch), vec![0, 5, 7, 12]);
        assert_eq!(emote.end_tick(), 12);
        let held = arm.pitch.key_frames()[2];
        assert!((held.value + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn parallel_block_lasts_as_long_as_its_longest_child() {
        let emote = read_one(
            "# comment line\nsequence\n  parallel\n    move head_y 500 15 inOutQuad\n    move left_leg_z 100 5\n  end\n  move head_y 100 0\nend\n",
        );
        assert_eq!(emote.name(), Some("\"quark_wave\""));
        let head = emote.part("head").unwrap();
        assert_eq!(ticks(&head.yaw), vec![0, 10, 12]);
        assert_eq!(head.yaw.key_frames()[1].ease, Ease::InOutQuad);
        assert_eq!(ticks(&emote.part("leftLeg").unwrap().roll), vec![0, 2]);
        assert_eq!(emote.end_tick(), 12);
    }

    #[test]
    fn malformed_lines_fail() {
        for text in [
            "move right_arm_x 250",
            "move tail_x 250 10",
            "move right_arm_w 250 10",
            "move right_arm_x soon 10",
            "jump 10",
            "end",
            "sequence\nmove head_x 50 1",
        ] {
            assert!(read(text.as_bytes(), Some("x.emote")).is_err(), "{text}");
        }
    }

    #[test]
    fn overlong_timelines_fail_instead_of_overflowing() {
        let mut text = String::from("name X\n");
        for _ in 0..60 {
            text.push_str("pause 2147483647\n");
        }
        let message = read(text.as_bytes(), Some("x.emote")).unwrap_err().to_string();
        assert!(message.contains("emote is too long"), "{message}");

        let mut text = String::from("name X\nsequence\n");
        for _ in 0..60 {
            text.push_str("  move head_x 2147483647 10\n");
        }
        text.push_str("end\n");
        assert!(read(text.as_bytes(), Some("x.emote")).is_err());

        let mut text = String::from("name X\n");
        for _ in 0..60 {
            text.push_str("parallel\n  pause 2147483647\nend\n");
        }
        assert!(read(text.as_bytes(), Some("x.emote")).is_err());
    }

    #[test]
    fn name_is_required_without_filename() {
        assert!(read(b"move head_x 50 1", None).is_err());
    }
}
