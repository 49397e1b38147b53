//! Emotecraft JSON emotes.
//!
//! The document is walked as a `serde_json::Value` rather than derived:
//! authors sprinkle `comment` keys and other notes anywhere, and those only
//! produce warnings. Files without an `emote` object are handed to the
//! GeckoLib importer.

use std::io::Write;
use std::str::FromStr;

use emotes_core::{Channel, Ease, EmoteBuilder, EmoteData, SCHEMA_VERSION};
use log::warn;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::error::{BoxError, SerializerError};
use crate::geckolib;

pub(crate) const FORMAT: &str = "json";

const ROOT_KEYS: [&str; 7] = [
    "uuid",
    "author",
    "comment",
    "name",
    "description",
    "emote",
    "version",
];
const EMOTE_KEYS: [&str; 10] = [
    "beginTick",
    "comment",
    "endTick",
    "stopTick",
    "degrees",
    "moves",
    "returnTick",
    "isLoop",
    "easeBeforeKeyframe",
    "nsfw",
];
const MOVE_KEYS: [&str; 4] = ["tick", "comment", "easing", "turn"];

fn error(message: impl Into<String>) -> BoxError {
    Box::new(SerializerError::new(FORMAT, message))
}

fn warn_unknown(key: &str, value: &Value) {
    warn!("Can't understand: {} : {}", key, value);
    warn!("If it is a comment, ignore the warning");
}

fn get_i32(value: &Value, key: &str) -> Result<i32, BoxError> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| error(format!("'{}' must be an integer, got {}", key, value)))
}

fn get_f32(value: &Value, key: &str) -> Result<f32, BoxError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| error(format!("'{}' must be a number, got {}", key, value)))
}

fn get_bool(value: &Value, key: &str) -> Result<bool, BoxError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(error(format!("'{}' must be a boolean, got {}", key, value))),
    }
}

/// Text fields keep their JSON form (a plain string keeps its quotes) so
/// formatted text components survive untouched. `null` counts as absent.
fn raw_text(value: Option<&Value>) -> Option<String> {
    value.filter(|v| !v.is_null()).map(Value::to_string)
}

pub(crate) fn read(bytes: &[u8]) -> Result<Vec<EmoteData>, BoxError> {
    let root: Value = serde_json::from_slice(bytes)?;
    let node = root
        .as_object()
        .ok_or_else(|| error("the root element must be an object"))?;

    if !node.contains_key("emote") {
        return geckolib::read(&root);
    }

    let version = node
        .get("version")
        .map(|v| get_i32(v, "version"))
        .transpose()?
        .unwrap_or(1);
    // An explicit `null` is a nameless emote; only a missing key is an error.
    let name = raw_text(Some(
        node.get("name").ok_or_else(|| error("emote has no name"))?,
    ));

    if version > SCHEMA_VERSION {
        let shown = name.as_deref().unwrap_or("null");
        warn!("Emote: {} was made for a newer version", shown);
        return Err(error(format!(
            "{} is version {}. Only version {} can be processed",
            shown, version, SCHEMA_VERSION
        )));
    }

    let emote_node = node
        .get("emote")
        .and_then(Value::as_object)
        .ok_or_else(|| error("'emote' must be an object"))?;
    let mut builder = read_emote(emote_node, version)?;

    builder.name = name;
    builder.author = raw_text(node.get("author"));
    builder.description = raw_text(node.get("description"));
    if let Some(uuid) = node.get("uuid") {
        let text = uuid
            .as_str()
            .ok_or_else(|| error(format!("'uuid' must be a string, got {}", uuid)))?;
        builder.uuid = Some(Uuid::parse_str(text)?);
    }

    for (key, value) in node {
        if !ROOT_KEYS.contains(&key.as_str()) {
            warn_unknown(key, value);
        }
    }

    builder.optimize_emote();
    Ok(vec![builder.build()?])
}

fn read_emote(node: &Map<String, Value>, version: i32) -> Result<EmoteBuilder, BoxError> {
    let mut builder = EmoteBuilder::new();
    if let Some(v) = node.get("beginTick") {
        builder.begin_tick = get_i32(v, "beginTick")?;
    }
    builder.end_tick = get_i32(
        node.get("endTick")
            .ok_or_else(|| error("'endTick' is required"))?,
        "endTick",
    )?;
    if builder.end_tick <= 0 {
        return Err(error("endTick must be bigger than 0"));
    }

    if let (Some(is_loop), Some(return_tick)) = (node.get("isLoop"), node.get("returnTick")) {
        builder.is_looped = get_bool(is_loop, "isLoop")?;
        builder.return_tick = get_i32(return_tick, "returnTick")?;
        if builder.is_looped && (builder.return_tick > builder.end_tick || builder.return_tick < 0)
        {
            return Err(error(
                "return tick have to be smaller than endTick and not smaller than 0",
            ));
        }
    }

    if let Some(v) = node.get("nsfw") {
        builder.nsfw = get_bool(v, "nsfw")?;
    }

    for (key, value) in node {
        if !EMOTE_KEYS.contains(&key.as_str()) {
            warn_unknown(key, value);
        }
    }

    builder.stop_tick = node
        .get("stopTick")
        .map(|v| get_i32(v, "stopTick"))
        .transpose()?;
    let degrees = node
        .get("degrees")
        .map(|v| get_bool(v, "degrees"))
        .transpose()?
        .unwrap_or(true);
    if let Some(v) = node.get("easeBeforeKeyframe") {
        builder.is_easing_before = get_bool(v, "easeBeforeKeyframe")?;
    }

    let moves = node
        .get("moves")
        .and_then(Value::as_array)
        .ok_or_else(|| error("'moves' must be an array"))?;
    read_moves(&mut builder, moves, degrees, version)?;

    builder.fully_enable_parts();
    Ok(builder)
}

fn read_moves(
    builder: &mut EmoteBuilder,
    moves: &[Value],
    degrees: bool,
    version: i32,
) -> Result<(), BoxError> {
    for entry in moves {
        let obj = entry
            .as_object()
            .ok_or_else(|| error(format!("a move must be an object, got {}", entry)))?;
        let tick = get_i32(
            obj.get("tick")
                .ok_or_else(|| error(format!("move without 'tick': {}", entry)))?,
            "tick",
        )?;
        let ease = match obj.get("easing") {
            Some(v) => Ease::from_str(
                v.as_str()
                    .ok_or_else(|| error(format!("'easing' must be a string, got {}", v)))?,
            )?,
            None => Ease::Linear,
        };
        let turn = obj
            .get("turn")
            .map(|v| get_i32(v, "turn"))
            .transpose()?
            .unwrap_or(0);

        for (key, value) in obj {
            if MOVE_KEYS.contains(&key.as_str()) {
                continue;
            }
            read_part_move(builder, key, value, degrees, tick, ease, turn, version)?;
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn read_part_move(
    builder: &mut EmoteBuilder,
    name: &str,
    value: &Value,
    degrees: bool,
    tick: i32,
    ease: Ease,
    turn: i32,
    version: i32,
) -> Result<(), BoxError> {
    let name = if version < 3 && name == "torso" {
        "body"
    } else {
        name
    };
    let Some(part) = builder.part_mut(name) else {
        warn_unknown(name, value);
        return Ok(());
    };
    let channels = value
        .as_object()
        .ok_or_else(|| error(format!("'{}' must be an object, got {}", name, value)))?;

    for (key, value) in channels {
        if key != "comment" && Channel::from_name(key).is_none() {
            warn_unknown(key, value);
        }
    }

    for channel in Channel::ALL {
        let Some(value) = channels.get(channel.name()) else {
            continue;
        };
        let amount = get_f32(value, channel.name())?;
        match part.state_mut(channel) {
            Some(state) => state.add_key_frame(tick, amount, ease, turn, degrees),
            None => warn!("'{}' has no '{}' channel, keyframe dropped", name, channel.name()),
        }
    }
    Ok(())
}

fn embed_raw(text: Option<&str>) -> Result<Value, BoxError> {
    match text {
        None => Ok(Value::Null),
        Some(text) => serde_json::from_str(text).map_err(|e| {
            Box::new(SerializerError::with_source(
                FORMAT,
                format!("stored text is not valid JSON: {}", text),
                e,
            )) as BoxError
        }),
    }
}

/// JSON document for `emote`. Keyframe values are written in radians.
pub(crate) fn to_value(emote: &EmoteData) -> Result<Value, BoxError> {
    let mut root = Map::new();
    root.insert(
        "version".into(),
        json!(if emote.is_easing_before() { 2 } else { 1 }),
    );
    root.insert("name".into(), embed_raw(emote.name())?);
    root.insert("description".into(), embed_raw(emote.description())?);
    if emote.author().is_some() {
        root.insert("author".into(), embed_raw(emote.author())?);
    }
    root.insert("uuid".into(), json!(emote.uuid().to_string()));

    let mut node = Map::new();
    node.insert("beginTick".into(), json!(emote.begin_tick()));
    node.insert("endTick".into(), json!(emote.end_tick()));
    node.insert("stopTick".into(), json!(emote.stop_tick()));
    node.insert("isLoop".into(), json!(emote.is_looped()));
    node.insert("returnTick".into(), json!(emote.return_tick()));
    node.insert("nsfw".into(), json!(emote.nsfw()));
    node.insert("degrees".into(), json!(false));
    if emote.is_easing_before() {
        node.insert("easeBeforeKeyframe".into(), json!(true));
    }
    node.insert("moves".into(), Value::Array(moves(emote)));
    root.insert("emote".into(), Value::Object(node));

    Ok(Value::Object(root))
}

fn moves(emote: &EmoteData) -> Vec<Value> {
    let mut out = Vec::new();
    for part in emote.body_parts().values() {
        for state in part.states() {
            for key_frame in state.key_frames() {
                let mut entry = Map::new();
                entry.insert("tick".into(), json!(key_frame.tick));
                entry.insert("easing".into(), json!(key_frame.ease.json_name()));
                if key_frame.turn != 0 {
                    entry.insert("turn".into(), json!(key_frame.turn));
                }
                let mut channel = Map::new();
                channel.insert(state.name().to_string(), json!(key_frame.value));
                entry.insert(part.name().to_string(), Value::Object(channel));
                out.push(Value::Object(entry));
            }
        }
    }
    out
}

pub(crate) fn write(emote: &EmoteData, out: &mut dyn Write) -> Result<(), BoxError> {
    let value = to_value(emote)?;
    serde_json::to_writer_pretty(out, &value)?;
    Ok(())
}
