use std::collections::{BTreeMap, HashMap};

use indoc::indoc;
use serde::Deserialize;

use saphyr_archive::{ErrorKind, from_slice, from_str};

#[derive(Debug, Deserialize, PartialEq)]
struct Primitives {
    flag: bool,
    legacy_flag: bool,
    small: i8,
    hex: u32,
    big: i128,
    ratio: f32,
    not_a_number: f64,
    letter: char,
    text: String,
}

#[test]
fn primitives_parse_from_scalar_text() {
    let yaml = indoc! {"
        flag: true
        legacy_flag: off
        small: -12
        hex: 0xff
        big: 170141183460469231731687303715884105727
        ratio: 1.5e1
        not_a_number: .nan
        letter: z
        text: '42'
    "};
    let p: Primitives = from_str(yaml).unwrap();
    assert!(p.flag);
    assert!(!p.legacy_flag);
    assert_eq!(p.small, -12);
    assert_eq!(p.hex, 255);
    assert_eq!(p.big, i128::MAX);
    assert_eq!(p.ratio, 15.0);
    assert!(p.not_a_number.is_nan());
    assert_eq!(p.letter, 'z');
    assert_eq!(p.text, "42");
}

#[test]
fn tuples_and_newtypes() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Meters(f64);

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pair(i32, String);

    #[derive(Debug, Deserialize, PartialEq)]
    struct Doc {
        pair: Pair,
        tuple: (u8, bool),
        length: Meters,
        marker: (),
    }

    let doc: Doc = from_str("pair: [1, one]\ntuple: [2, yes]\nlength: 2.5\nmarker: ~\n").unwrap();
    assert_eq!(
        doc,
        Doc { pair: Pair(1, "one".into()), tuple: (2, true), length: Meters(2.5), marker: () }
    );
}

#[test]
fn tuple_with_extra_elements_is_rejected() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Doc {
        tuple: (u8, u8),
    }

    let err = from_str::<Doc>("tuple: [1, 2, 3]\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Custom));
    assert!(err.to_string().contains("entry for tuple tuple"));
}

#[test]
fn enum_variants_of_every_shape() {
    #[derive(Debug, Deserialize, PartialEq)]
    enum Shape {
        Dot,
        Circle(f64),
        Segment(i32, i32),
        Rect { w: u32, h: u32 },
    }

    let yaml = indoc! {"
        - Dot
        - Dot: ~
        - Circle: 0.5
        - Segment: [1, 2]
        - Rect: { w: 2, h: 3 }
    "};
    let shapes: Vec<Shape> = from_str(yaml).unwrap();
    assert_eq!(
        shapes,
        vec![
            Shape::Dot,
            Shape::Dot,
            Shape::Circle(0.5),
            Shape::Segment(1, 2),
            Shape::Rect { w: 2, h: 3 }
        ]
    );
}

#[test]
fn struct_variant_rejects_unknown_keys() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    enum Shape {
        Rect { w: u32, h: u32 },
    }

    let err = from_str::<Shape>("Rect: { w: 1, h: 2, d: 3 }\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnrecognizedKey));
    assert!(err.to_string().contains("key d did not match any visited value entry for <root> while accepting YAML node of type Mapping (with size 1 and keys {Rect}) while visiting Shape Rect"));
}

#[test]
fn map_keys_are_parsed_for_the_key_type() {
    let map: HashMap<u16, String> = from_str("1: a\n0x10: b\n").unwrap();
    assert_eq!(map[&1], "a");
    assert_eq!(map[&16], "b");

    let err = from_str::<HashMap<u16, String>>("one: a\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Custom));
}

#[test]
fn nested_collections() {
    let yaml = indoc! {"
        groups:
          admins: [root, alice]
          users: []
    "};
    let doc: BTreeMap<String, BTreeMap<String, Vec<String>>> = from_str(yaml).unwrap();
    assert_eq!(doc["groups"]["admins"], vec!["root", "alice"]);
    assert!(doc["groups"]["users"].is_empty());
}

#[test]
fn self_describing_targets_infer_scalar_types() {
    let yaml = indoc! {"
        name: demo
        count: 3
        ratio: 0.25
        enabled: true
        missing: ~
        items: [1, two]
        nested: { a: -1 }
    "};
    let value: serde_json::Value = from_str(yaml).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "name": "demo",
            "count": 3,
            "ratio": 0.25,
            "enabled": true,
            "missing": null,
            "items": [1, "two"],
            "nested": { "a": -1 }
        })
    );
    // document order is preserved
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["name", "count", "ratio", "enabled", "missing", "items", "nested"]);
}

#[test]
fn quoted_scalars_stay_strings_only_for_typed_targets() {
    let yaml = "count: '42'\nflag: \"true\"\n";
    // no scalar style survives loading, so inference sees plain text
    let value: serde_json::Value = from_str(yaml).unwrap();
    assert_eq!(value, serde_json::json!({ "count": 42, "flag": true }));

    #[derive(Debug, Deserialize, PartialEq)]
    struct Texts {
        count: String,
        flag: String,
    }
    let texts: Texts = from_str(yaml).unwrap();
    assert_eq!(texts, Texts { count: "42".into(), flag: "true".into() });
}

#[test]
fn optional_root_and_slices() {
    let none: Option<u8> = from_str("~\n").unwrap();
    assert_eq!(none, None);
    let some: Option<u8> = from_str("7\n").unwrap();
    assert_eq!(some, Some(7));

    let list: Vec<u8> = from_slice(b"[1, 2, 3]\n").unwrap();
    assert_eq!(list, [1, 2, 3]);
    assert!(from_slice::<Vec<u8>>(&[0xff, 0xfe]).is_err());
}

#[test]
fn null_where_a_string_is_expected() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Doc {
        name: String,
    }

    let err = from_str::<Doc>("name:\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TypeMismatch));
    assert!(err.to_string().contains("has non-Scalar (Null) entry for String name"));
}
