//! Tests for loading and saving documents.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use super::qoi_rgb;
use crate::error::EditorError;
use crate::format::bridge::{
    data_to_json, document_to_json, load_document, parse_document, save_document,
};
use crate::format::schema::{
    AnimationEntry, AtlasEntry, DocumentData, EventEntry, EventInfoEntry, LocationEntry,
    MetaPropEntry, MetadataEntry, ParamEntry, RectFrameEntry, RectLayerEntry, SpriteEntry,
    SpriteFrameEntry, SpriteLayerEntry, ValueType,
};
use crate::host::StdFs;
use crate::model::{Document, ImageState};
use crate::pixels::DecoderRegistry;

/// Create a document exercising every record type.
fn create_full_data() -> DocumentData {
    let mut data = DocumentData::new();

    data.atlas.push(
        AtlasEntry::new("hero", "img/hero.qoi")
            .with_sprite(SpriteEntry::new("idle", 0, 0, 16, 16))
            .with_sprite(SpriteEntry::new("run", 16, 0, 16, 16)),
    );
    data.atlas.push(AtlasEntry::new("fx", "fx.png"));

    let mut walk = AnimationEntry::new("walk", 24);
    walk.sprite_layers.push(SpriteLayerEntry {
        atlas_id: "hero".into(),
        frames: vec![
            SpriteFrameEntry {
                time: 0,
                sprite_id: "idle".into(),
                pos_x: None,
                pos_y: None,
                scale_x: None,
                scale_y: None,
            },
            SpriteFrameEntry {
                time: 12,
                sprite_id: "run".into(),
                pos_x: Some(-3),
                pos_y: Some(4),
                scale_x: Some(1.5),
                scale_y: Some(-1.0),
            },
        ],
    });
    walk.rect_layers.push(RectLayerEntry {
        id: 7,
        group_id: "hitbox".into(),
        frames: vec![RectFrameEntry {
            time: -2,
            active: false,
            x: Some(1),
            y: None,
            width: Some(10),
            height: Some(20),
        }],
    });
    walk.events.push(EventEntry {
        event_id: "footstep".into(),
        time: 6,
        params: vec![json!("grass"), json!(0.5)],
        location: Some(LocationEntry { x: 3, y: 9 }),
    });
    let mut meta = serde_json::Map::new();
    meta.insert("speed".into(), json!(2));
    walk.metadata.push(MetadataEntry { time: 0, data: meta });
    data.animation.push(walk);

    data.event.push(EventInfoEntry {
        id: "footstep".into(),
        has_location: true,
        params: vec![ParamEntry {
            id: "surface".into(),
            value_type: ValueType::String,
        }],
    });
    data.metadata.push(MetaPropEntry {
        id: "speed".into(),
        value_type: ValueType::Number,
        default: Some(json!(1)),
    });
    data.metadata.push(MetaPropEntry {
        id: "tags".into(),
        value_type: ValueType::StringArray,
        default: None,
    });

    data
}

#[test]
fn test_roundtrip_preserves_canonical_fields() {
    let data = create_full_data();
    let doc = Document::from_data(data.clone());

    let json = document_to_json(&doc).unwrap();
    let reparsed = parse_document(json.as_bytes()).unwrap();

    assert_eq!(reparsed, data);
    assert_eq!(Document::from_data(reparsed), doc);
}

#[test]
fn test_saved_text_layout() {
    let json = data_to_json(&DocumentData::new()).unwrap();
    assert_eq!(
        json,
        "{\n  \"animation\": [],\n  \"atlas\": [],\n  \"event\": [],\n  \"metadata\": []\n}\n"
    );

    let json = data_to_json(&create_full_data()).unwrap();
    assert!(json.contains("\"spriteLayers\""));
    assert!(json.contains("\"hasLocation\": true"));
    assert!(json.contains("\"type\": \"string-array\""));
    // Absent optional fields are left out, not written as null.
    assert!(!json.contains("null"));
}

#[test]
fn test_save_is_idempotent() {
    let temp = TempDir::new().expect("should create temp dir");
    let source = temp.path().join("walk.json");
    fs::write(&source, data_to_json(&create_full_data()).unwrap()).unwrap();

    let decoders = DecoderRegistry::new();
    let (doc, _) = load_document(&StdFs, &source, &decoders).unwrap();

    let first = temp.path().join("first.json");
    let second = temp.path().join("second.json");
    save_document(&StdFs, &doc, &first).unwrap();
    save_document(&StdFs, &doc, &second).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

    let (reloaded, _) = load_document(&StdFs, &first, &decoders).unwrap();
    let third = temp.path().join("third.json");
    save_document(&StdFs, &reloaded, &third).unwrap();
    assert_eq!(fs::read(&first).unwrap(), fs::read(&third).unwrap());
}

#[test]
fn test_load_decodes_images_and_tolerates_failures() {
    let temp = TempDir::new().expect("should create temp dir");
    fs::create_dir(temp.path().join("img")).unwrap();
    fs::write(
        temp.path().join("img/hero.qoi"),
        qoi_rgb(2, 1, &[[10, 20, 30], [40, 50, 60]]),
    )
    .unwrap();
    let path = temp.path().join("doc.json");
    fs::write(&path, data_to_json(&create_full_data()).unwrap()).unwrap();

    let (doc, report) = load_document(&StdFs, &path, &DecoderRegistry::new()).unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "fx");

    let hero = doc.atlas_by_id("hero").unwrap();
    let pixmap = hero.image().pixmap().unwrap();
    assert_eq!(pixmap.pixels(), &[10, 20, 30, 255, 40, 50, 60, 255]);
    assert!(matches!(
        doc.atlas_by_id("fx").unwrap().image(),
        ImageState::Failed(_)
    ));
}

#[test]
fn test_loading_normalises_unsorted_and_duplicate_frames() {
    let text = r#"{
        "animation": [{
            "id": "a", "duration": 4,
            "spriteLayers": [{ "atlasId": "x", "frames": [
                { "time": 3, "spriteId": "late" },
                { "time": 1, "spriteId": "first" },
                { "time": 3, "spriteId": "later" }
            ]}]
        }]
    }"#;
    let doc = Document::from_data(parse_document(text.as_bytes()).unwrap());
    let frames = &doc.to_data().animation[0].sprite_layers[0].frames;
    let seen: Vec<(i64, &str)> = frames.iter().map(|f| (f.time, f.sprite_id.as_str())).collect();
    assert_eq!(seen, vec![(1, "first"), (3, "later")]);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().expect("should create temp dir");
    let err = load_document(
        &StdFs,
        &temp.path().join("absent.json"),
        &DecoderRegistry::new(),
    )
    .unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_structural_errors_are_malformed() {
    let cases: [&[u8]; 5] = [
        b"{ not json",
        br#"{"animation": {}}"#,
        br#"{"animation": [{"id": "a", "duration": "long"}]}"#,
        br#"{"metadata": [{"id": "m", "type": "integer"}]}"#,
        b"\xff\xfe{}",
    ];
    for bytes in cases {
        let err = parse_document(bytes).unwrap_err();
        assert!(err.is_malformed(), "expected malformed for {:?}", bytes);
        assert!(!err.is_io());
    }
}

#[test]
fn test_byte_order_mark_and_unknown_keys_accepted() {
    let mut bytes = "\u{feff}".as_bytes().to_vec();
    bytes.extend_from_slice(br#"{"atlas": [], "version": 3}"#);
    let data = parse_document(&bytes).unwrap();
    assert_eq!(data, DocumentData::new());
}

#[test]
fn test_save_to_unwritable_path_is_io_error() {
    let temp = TempDir::new().expect("should create temp dir");
    let path = temp.path().join("no/such/dir/doc.json");
    let err = save_document(&StdFs, &Document::new(), &path).unwrap_err();
    assert!(matches!(err, EditorError::Io { .. }));
}
