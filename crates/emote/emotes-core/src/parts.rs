//! Body parts, their channels and the default player schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::state::State;

/// Newest schema version understood by the readers.
pub const SCHEMA_VERSION: i32 = 3;

/// Body parts recognized by the current schema, in canonical order.
pub const PART_NAMES: [&str; 6] = ["head", "body", "rightArm", "leftArm", "rightLeg", "leftLeg"];

/// (name, default x/y/z, bendable)
const SCHEMA: [(&str, [f32; 3], bool); 6] = [
    ("head", [0.0, 0.0, 0.0], false),
    ("body", [0.0, 0.0, 0.0], true),
    ("rightArm", [-5.0, 2.0, 0.0], true),
    ("leftArm", [5.0, 2.0, 0.0], true),
    ("rightLeg", [-1.9, 12.0, 0.1], true),
    ("leftLeg", [1.9, 12.0, 0.1], true),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    X,
    Y,
    Z,
    Pitch,
    Yaw,
    Roll,
    Bend,
    BendDirection,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::X,
        Channel::Y,
        Channel::Z,
        Channel::Pitch,
        Channel::Yaw,
        Channel::Roll,
        Channel::Bend,
        Channel::BendDirection,
    ];

    /// Channel key as written in emote JSON.
    pub fn name(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Z => "z",
            Channel::Pitch => "pitch",
            Channel::Yaw => "yaw",
            Channel::Roll => "roll",
            Channel::Bend => "bend",
            Channel::BendDirection => "axis",
        }
    }

    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Translation channels are plain offsets; everything else is an angle.
    #[inline]
    pub fn is_angle(self) -> bool {
        !matches!(self, Channel::X | Channel::Y | Channel::Z)
    }

    #[inline]
    pub fn is_bend(self) -> bool {
        matches!(self, Channel::Bend | Channel::BendDirection)
    }
}

/// All channels of one body part.
///
/// Non-bendable parts carry no `bend`/`bend_direction` states at all.
#[derive(Clone, Debug, PartialEq)]
pub struct StateCollection {
    name: String,
    pub x: State,
    pub y: State,
    pub z: State,
    pub pitch: State,
    pub yaw: State,
    pub roll: State,
    pub bend: Option<State>,
    pub bend_direction: Option<State>,
}

impl StateCollection {
    pub fn new(name: impl Into<String>, translation: [f32; 3], bendable: bool) -> Self {
        Self {
            name: name.into(),
            x: State::new(Channel::X, translation[0]),
            y: State::new(Channel::Y, translation[1]),
            z: State::new(Channel::Z, translation[2]),
            pitch: State::new(Channel::Pitch, 0.0),
            yaw: State::new(Channel::Yaw, 0.0),
            roll: State::new(Channel::Roll, 0.0),
            bend: bendable.then(|| State::new(Channel::Bend, 0.0)),
            bend_direction: bendable.then(|| State::new(Channel::BendDirection, 0.0)),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_bendable(&self) -> bool {
        self.bend.is_some()
    }

    pub fn state(&self, channel: Channel) -> Option<&State> {
        match channel {
            Channel::X => Some(&self.x),
            Channel::Y => Some(&self.y),
            Channel::Z => Some(&self.z),
            Channel::Pitch => Some(&self.pitch),
            Channel::Yaw => Some(&self.yaw),
            Channel::Roll => Some(&self.roll),
            Channel::Bend => self.bend.as_ref(),
            Channel::BendDirection => self.bend_direction.as_ref(),
        }
    }

    pub fn state_mut(&mut self, channel: Channel) -> Option<&mut State> {
        match channel {
            Channel::X => Some(&mut self.x),
            Channel::Y => Some(&mut self.y),
            Channel::Z => Some(&mut self.z),
            Channel::Pitch => Some(&mut self.pitch),
            Channel::Yaw => Some(&mut self.yaw),
            Channel::Roll => Some(&mut self.roll),
            Channel::Bend => self.bend.as_mut(),
            Channel::BendDirection => self.bend_direction.as_mut(),
        }
    }

    /// Present channels in canonical order.
    pub fn states(&self) -> impl Iterator<Item = &State> {
        Channel::ALL.into_iter().filter_map(|c| self.state(c))
    }

    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut State> {
        [
            Some(&mut self.x),
            Some(&mut self.y),
            Some(&mut self.z),
            Some(&mut self.pitch),
            Some(&mut self.yaw),
            Some(&mut self.roll),
            self.bend.as_mut(),
            self.bend_direction.as_mut(),
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_enabled(&self) -> bool {
        self.states().any(State::is_enabled)
    }

    /// Once any channel is animated the whole part is driven by the emote.
    pub fn fully_enable(&mut self) {
        if self.is_enabled() {
            self.states_mut().for_each(|s| s.set_enabled(true));
        }
    }

    pub fn optimize(&mut self, is_looped: bool, return_tick: i32) {
        self.states_mut()
            .for_each(|s| s.optimize(is_looped, return_tick));
    }
}

/// Fresh, empty collections for every part of the current schema.
pub fn default_parts() -> IndexMap<String, StateCollection> {
    SCHEMA
        .iter()
        .map(|(name, translation, bendable)| {
            (
                name.to_string(),
                StateCollection::new(*name, *translation, *bendable),
            )
        })
        .collect()
}
