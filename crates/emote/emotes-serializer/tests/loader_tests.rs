use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use emotes_core::EmoteRegistry;
use emotes_serializer::loader::SERVER_DIR;
use emotes_serializer::{
    load_emote_file, read_data, scan_directory, write_data, BuiltinEmote, EmoteFormat,
    EmoteLibrary, LoaderConfig,
};
use emotes_test_fixtures::{emotes, imports};
use tempfile::tempdir;

fn put_string(out: &mut Vec<u8>, s: &str) {
    out.write_i32::<LittleEndian>(s.len() as i32).unwrap();
    out.write_all(s.as_bytes()).unwrap();
}

/// Classic layout song with a single note on tick 2.
fn classic_song() -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i16::<LittleEndian>(3).unwrap(); // length
    out.write_i16::<LittleEndian>(1).unwrap(); // layers
    for text in ["Ding", "", "", ""] {
        put_string(&mut out, text);
    }
    out.write_i16::<LittleEndian>(2000).unwrap();
    out.write_all(&[0, 0, 4]).unwrap();
    for _ in 0..5 {
        out.write_i32::<LittleEndian>(0).unwrap();
    }
    put_string(&mut out, "");
    out.write_i16::<LittleEndian>(3).unwrap();
    out.write_i16::<LittleEndian>(1).unwrap();
    out.write_all(&[1, 52]).unwrap();
    out.write_i16::<LittleEndian>(0).unwrap();
    out.write_i16::<LittleEndian>(0).unwrap();
    put_string(&mut out, "Bell");
    out.write_u8(100).unwrap();
    out
}

fn copy_fixture(name: &str, dir: &Path) {
    fs::write(dir.join(format!("{name}.json")), emotes::json(name).unwrap()).unwrap();
}

#[test]
fn side_channel_icon_and_song_are_attached() {
    let dir = tempdir().unwrap();
    copy_fixture("waving", dir.path());
    fs::write(dir.path().join("waving.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(dir.path().join("waving.nbs"), classic_song()).unwrap();

    let list = load_emote_file(&dir.path().join("waving.json"));
    assert_eq!(list.len(), 1);
    let emote = &list[0];
    assert_eq!(emote.icon_data(), Some(&[0x89, b'P', b'N', b'G'][..]));
    let song = emote.song().unwrap();
    assert_eq!(song.name, "Ding");
    assert_eq!(song.tempo, 20.0);
    assert_eq!(song.layers[0].notes[0].tick, 2);
}

#[test]
fn song_is_ignored_when_the_file_holds_several_emotes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dance.json");
    fs::write(&path, imports::bytes("geckolib-dance").unwrap()).unwrap();
    fs::write(dir.path().join("dance.png"), [1, 2, 3]).unwrap();
    fs::write(dir.path().join("dance.nbs"), classic_song()).unwrap();

    let list = load_emote_file(&path);
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|emote| emote.icon_data() == Some(&[1, 2, 3][..])));
    assert!(list.iter().all(|emote| emote.song().is_none()));
}

#[test]
fn scan_skips_broken_and_unknown_files() {
    let dir = tempdir().unwrap();
    copy_fixture("waving", dir.path());
    fs::write(dir.path().join("broken.json"), "{").unwrap();
    fs::write(dir.path().join("notes.txt"), "not an emote").unwrap();

    let backflip = read_data(emotes::json("backflip").unwrap().as_bytes(), None, Some("json"))
        .unwrap()
        .remove(0);
    let mut file = fs::File::create(dir.path().join("backflip.emotecraft")).unwrap();
    write_data(&mut file, &backflip, EmoteFormat::Binary).unwrap();
    drop(file);

    let mut registry = EmoteRegistry::new();
    let loaded = scan_directory(dir.path(), &mut registry, &LoaderConfig::default()).unwrap();
    assert_eq!(loaded, 2);
    assert!(registry.contains(&backflip.uuid()));
}

#[test]
fn quark_scripts_load_only_when_enabled() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("wave.emote"),
        imports::bytes("quark-wave").unwrap(),
    )
    .unwrap();

    let mut registry = EmoteRegistry::new();
    let loaded = scan_directory(dir.path(), &mut registry, &LoaderConfig::default()).unwrap();
    assert_eq!(loaded, 0);

    let config = LoaderConfig {
        enable_quark: true,
        ..LoaderConfig::default()
    };
    let loaded = scan_directory(dir.path(), &mut registry, &config).unwrap();
    assert_eq!(loaded, 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn scan_creates_a_missing_directory() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("emotes");
    let mut registry = EmoteRegistry::new();
    let loaded = scan_directory(&target, &mut registry, &LoaderConfig::default()).unwrap();
    assert_eq!(loaded, 0);
    assert!(target.is_dir());
}

#[test]
fn library_reload_sorts_emotes_into_visible_and_hidden() {
    let dir = tempdir().unwrap();
    copy_fixture("backflip", dir.path());
    fs::create_dir_all(dir.path().join(SERVER_DIR)).unwrap();
    copy_fixture("waving", &dir.path().join(SERVER_DIR));

    let waving_json = emotes::json("waving").unwrap();
    let builtins = [BuiltinEmote {
        json: waving_json.as_bytes(),
        icon: Some(&[7u8, 7][..]),
    }];

    let mut library = EmoteLibrary::new();
    library
        .reload(dir.path(), &LoaderConfig::default(), &builtins)
        .unwrap();
    assert_eq!(library.hidden.len(), 2);
    assert_eq!(library.visible.len(), 1);

    let waving = read_data(waving_json.as_bytes(), None, Some("json"))
        .unwrap()
        .remove(0);
    let found = library.get(&waving.uuid()).unwrap();
    assert!(!found.is_builtin(), "visible emotes shadow builtins");
    let builtin = library.hidden.get(&waving.uuid()).unwrap();
    assert!(builtin.is_builtin());
    assert_eq!(builtin.icon_data(), Some(&[7, 7][..]));

    let config = LoaderConfig {
        load_builtin_emotes: false,
        load_emotes_server_side: true,
        ..LoaderConfig::default()
    };
    library.reload(dir.path(), &config, &builtins).unwrap();
    assert!(library.hidden.is_empty());
    assert_eq!(library.visible.len(), 2);
    assert_eq!(library.len(), 2);
}
