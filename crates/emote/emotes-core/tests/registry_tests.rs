use std::sync::Arc;

use emotes_core::{Ease, EmoteBuilder, EmoteData, EmoteRegistry, Uuid};

fn mk_emote(id: Uuid, name: &str, end_tick: i32) -> EmoteData {
    let mut b = EmoteBuilder::new();
    b.uuid = Some(id);
    b.name = Some(name.to_string());
    b.end_tick = end_tick;
    b.part_mut("rightArm")
        .expect("rightArm is in the schema")
        .pitch
        .add_key_frame(0, -90.0, Ease::OutQuad, 0, true);
    b.build().expect("valid emote")
}

#[test]
fn add_all_then_clear_forgets_everything() {
    let a = mk_emote(Uuid::new_v4(), "a", 10);
    let b = mk_emote(Uuid::new_v4(), "b", 20);
    let (a_id, b_id) = (a.uuid(), b.uuid());

    let mut registry = EmoteRegistry::new();
    registry.add_all([a, b]);
    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&a_id));
    assert_eq!(registry.get(&b_id).unwrap().end_tick(), 20);

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.get(&a_id).is_none());
}

#[test]
fn duplicate_uuid_overwrites_with_newest() {
    let id = Uuid::new_v4();
    let mut registry = EmoteRegistry::new();
    registry.add(mk_emote(id, "old", 10));
    let replaced = registry.add(mk_emote(id, "new", 30));

    assert_eq!(replaced.unwrap().name(), Some("old"));
    assert_eq!(registry.len(), 1);
    let current = registry.get(&id).unwrap();
    assert_eq!(current.name(), Some("new"));
    assert_eq!(current.end_tick(), 30);
}

#[test]
fn removed_emotes_are_absent() {
    let id = Uuid::new_v4();
    let mut registry = EmoteRegistry::new();
    registry.add(mk_emote(id, "gone", 8));
    assert_eq!(registry.remove(&id).unwrap().name(), Some("gone"));
    assert!(!registry.contains(&id));
    assert!(registry.remove(&id).is_none());
}

#[test]
fn lookups_for_unknown_ids_are_absent() {
    let registry = EmoteRegistry::new();
    assert!(registry.get(&Uuid::new_v4()).is_none());
}

#[test]
fn shared_handles_outlive_a_reload() {
    let id = Uuid::new_v4();
    let mut registry = EmoteRegistry::new();
    registry.add(mk_emote(id, "kept", 12));
    let handle: Arc<EmoteData> = registry.get(&id).unwrap();

    registry.clear();
    registry.add_all(Vec::<EmoteData>::new());

    assert_eq!(handle.name(), Some("kept"));
    assert_eq!(registry.uuids().count(), 0);
}

#[test]
fn iteration_follows_insertion_order() {
    let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let mut registry = EmoteRegistry::new();
    registry.add_all(ids.iter().map(|id| mk_emote(*id, "e", 5)));
    let seen: Vec<Uuid> = registry.iter().map(|e| e.uuid()).collect();
    assert_eq!(seen, ids);
}
