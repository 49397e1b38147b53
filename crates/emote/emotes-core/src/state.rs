//! Keyframes and the single-channel `State` that keeps them ordered.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::easing::Ease;
use crate::parts::Channel;

/// Values closer than this are treated as the same pose when optimizing.
const SAME_VALUE_EPSILON: f32 = 1e-6;

/// One sample of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame {
    pub tick: i32,
    /// Radians for angular channels, model units for translation channels.
    pub value: f32,
    pub ease: Ease,
    /// Full rotations added on top of `value`.
    pub turn: i32,
}

impl KeyFrame {
    pub fn new(tick: i32, value: f32, ease: Ease) -> Self {
        Self {
            tick,
            value,
            ease,
            turn: 0,
        }
    }

    #[inline]
    pub fn with_turn(mut self, turn: i32) -> Self {
        self.turn = turn;
        self
    }

    /// `value` with the full rotations applied.
    #[inline]
    pub fn unwrapped_value(&self) -> f32 {
        self.value + self.turn as f32 * TAU
    }
}

/// A keyframed channel (`x`, `pitch`, `bend`, ...) of one body part.
///
/// Keyframes are kept sorted by tick; adding a keyframe at an occupied tick
/// replaces the previous one.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    channel: Channel,
    default_value: f32,
    is_enabled: bool,
    key_frames: Vec<KeyFrame>,
}

impl State {
    pub fn new(channel: Channel, default_value: f32) -> Self {
        Self {
            channel,
            default_value,
            is_enabled: false,
            key_frames: Vec::new(),
        }
    }

    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.channel.name()
    }

    #[inline]
    pub fn is_angle(&self) -> bool {
        self.channel.is_angle()
    }

    #[inline]
    pub fn default_value(&self) -> f32 {
        self.default_value
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.is_enabled = enabled;
    }

    #[inline]
    pub fn key_frames(&self) -> &[KeyFrame] {
        &self.key_frames
    }

    pub fn len(&self) -> usize {
        self.key_frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_frames.is_empty()
    }

    /// Add a keyframe as authored in a source format.
    ///
    /// `degrees` converts angular values to radians; translation channels
    /// ignore both `degrees` and `turn`.
    pub fn add_key_frame(&mut self, tick: i32, value: f32, ease: Ease, turn: i32, degrees: bool) {
        let key_frame = if self.is_angle() {
            let value = if degrees { value.to_radians() } else { value };
            KeyFrame::new(tick, value, ease).with_turn(turn)
        } else {
            KeyFrame::new(tick, value, ease)
        };
        self.insert(key_frame);
    }

    /// Insert an already normalized keyframe at its sorted position.
    pub fn insert(&mut self, key_frame: KeyFrame) {
        match self
            .key_frames
            .binary_search_by_key(&key_frame.tick, |k| k.tick)
        {
            Ok(index) => self.key_frames[index] = key_frame,
            Err(index) => self.key_frames.insert(index, key_frame),
        }
        self.is_enabled = true;
    }

    /// Drop keyframes that cannot change the resulting curve.
    ///
    /// A keyframe at the loop's return tick is always kept.
    pub fn optimize(&mut self, is_looped: bool, return_tick: i32) {
        let pinned = |k: &KeyFrame| is_looped && k.tick == return_tick;

        let mut i = 1;
        while i + 1 < self.key_frames.len() {
            let prev = &self.key_frames[i - 1];
            let current = &self.key_frames[i];
            let next = &self.key_frames[i + 1];
            if !pinned(current) && same_pose(prev, current) && same_pose(current, next) {
                self.key_frames.remove(i);
            } else {
                i += 1;
            }
        }

        if self.key_frames.len() >= 2 {
            let first = &self.key_frames[0];
            let second = &self.key_frames[1];
            if first.tick == 0
                && !pinned(first)
                && (first.unwrapped_value() - self.default_value).abs() <= SAME_VALUE_EPSILON
                && same_pose(first, second)
            {
                self.key_frames.remove(0);
            }
        }
    }
}

#[inline]
fn same_pose(a: &KeyFrame, b: &KeyFrame) -> bool {
    (a.unwrapped_value() - b.unwrapped_value()).abs() <= SAME_VALUE_EPSILON
}
