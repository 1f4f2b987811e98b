use std::collections::BTreeMap;

use indoc::indoc;
use serde::{Deserialize, Serialize};

use saphyr_archive::{ErrorKind, Options, from_node_with_defaults, from_str_with_defaults, load_str, options};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Log {
    level: String,
    file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Settings {
    name: String,
    retries: u32,
    ratio: f64,
    limits: BTreeMap<String, u32>,
    ports: Vec<u16>,
    log: Log,
}

fn defaults() -> Settings {
    Settings {
        name: "svc".into(),
        retries: 3,
        ratio: 0.5,
        limits: BTreeMap::from([("cpu".into(), 1), ("mem".into(), 2)]),
        ports: vec![80, 443],
        log: Log { level: "info".into(), file: Some("/var/log/svc".into()) },
    }
}

const OVERLAY: &str = indoc! {"
    retries: 5
    limits: { disk: 9 }
    log: { level: debug }
"};

#[test]
fn absent_fields_keep_their_prior_values() {
    let lenient = options! { allow_cpp_with_no_yaml: true };
    let s = from_str_with_defaults(OVERLAY, &defaults(), lenient).unwrap();
    assert_eq!(s.name, "svc");
    assert_eq!(s.retries, 5);
    assert_eq!(s.ratio, 0.5);
    assert_eq!(s.ports, vec![80, 443]);
    assert_eq!(s.log, Log { level: "debug".into(), file: Some("/var/log/svc".into()) });
    // maps are replaced unless retained
    assert_eq!(s.limits, BTreeMap::from([("disk".into(), 9)]));
}

#[test]
fn retained_map_defaults_are_merged_with_document_entries() {
    let options = options! { allow_cpp_with_no_yaml: true, retain_map_defaults: true };
    let s = from_str_with_defaults(OVERLAY, &defaults(), options).unwrap();
    assert_eq!(
        s.limits,
        BTreeMap::from([("cpu".into(), 1), ("disk".into(), 9), ("mem".into(), 2)])
    );

    let s = from_str_with_defaults("limits: { cpu: 4 }\n", &defaults(), options).unwrap();
    assert_eq!(s.limits, BTreeMap::from([("cpu".into(), 4), ("mem".into(), 2)]));
}

#[test]
fn sequences_are_replaced_not_merged() {
    let options = options! { allow_cpp_with_no_yaml: true, retain_map_defaults: true };
    let s = from_str_with_defaults("ports: [8080]\n", &defaults(), options).unwrap();
    assert_eq!(s.ports, vec![8080]);
}

#[test]
fn strict_archive_ignores_defaults_for_missing_fields() {
    let err = from_str_with_defaults(OVERLAY, &defaults(), Options::default()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::MissingEntry));
    assert!(err.to_string().contains("is missing entry for String name"));
}

#[test]
fn null_prior_option_stays_none() {
    let mut prior = defaults();
    prior.log.file = None;
    let node = load_str("log: { level: warn }\n").unwrap();
    let s = from_node_with_defaults(&node, &prior, options! { allow_cpp_with_no_yaml: true })
        .unwrap();
    assert_eq!(s.log.file, None);
    assert_eq!(s.log.level, "warn");
}

#[test]
fn special_floats_survive_the_round_trip() {
    let mut prior = defaults();
    prior.ratio = f64::INFINITY;
    let s = from_str_with_defaults("name: x\n", &prior, options! { allow_cpp_with_no_yaml: true })
        .unwrap();
    assert_eq!(s.ratio, f64::INFINITY);
}
