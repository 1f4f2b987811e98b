use indoc::indoc;
use serde::Deserialize;

use saphyr_archive::{ErrorKind, from_str};

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Plant {
    name: String,
    stages: Vec<Stage>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Stage {
    kind: StageKind,
    limit: u32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
enum StageKind {
    Idle,
    Run { speed: f64 },
}

#[test]
fn path_runs_through_sequence_elements_and_enum_payloads() {
    let yaml = indoc! {"
        name: line
        stages:
          - kind: Idle
            limit: 3
          - kind:
              Run: { speed: fast }
            limit: 4
    "};
    let err = from_str::<Plant>(yaml).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidScalar));
    assert_eq!(
        err.to_string(),
        "YAML node of type Mapping (with size 1 and keys {speed}) has invalid Scalar (invalid floating point value: `fast`) entry for f64 speed \
         while accepting YAML node of type Mapping (with size 1 and keys {Run}) while visiting StageKind Run \
         while accepting YAML node of type Mapping (with size 2 and keys {kind, limit}) while visiting StageKind kind \
         while accepting YAML node of type Mapping (with size 1 and keys {[1]}) while visiting Stage [1] \
         while accepting YAML node of type Mapping (with size 2 and keys {name, stages}) while visiting sequence stages."
    );
}

#[test]
fn missing_field_three_levels_deep() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Outer {
        outer: Middle,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Middle {
        inner: Inner,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Inner {
        value: u32,
    }

    let err = from_str::<Outer>("outer:\n  inner:\n    other: 1\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::MissingEntry));
    assert_eq!(
        err.to_string(),
        "YAML node of type Mapping (with size 1 and keys {other}) is missing entry for u32 value \
         while accepting YAML node of type Mapping (with size 1 and keys {inner}) while visiting Inner inner \
         while accepting YAML node of type Mapping (with size 1 and keys {outer}) while visiting Middle outer."
    );
}

#[test]
fn type_mismatch_names_expected_and_actual_shapes() {
    let err = from_str::<Plant>("name: line\nstages: { a: 1 }\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TypeMismatch));
    assert_eq!(
        err.to_string(),
        "YAML node of type Mapping (with size 2 and keys {name, stages}) has non-Sequence (Mapping) entry for sequence stages."
    );
}

#[test]
fn scalar_element_where_a_struct_is_expected() {
    let err = from_str::<Plant>("name: line\nstages: [3]\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TypeMismatch));
    assert_eq!(
        err.to_string(),
        "YAML node of type Mapping (with size 1 and keys {[0]}) has non-Mapping (Scalar) entry for Stage [0] \
         while accepting YAML node of type Mapping (with size 2 and keys {name, stages}) while visiting sequence stages."
    );
}

#[test]
fn serde_errors_are_wrapped_with_the_path() {
    let yaml = indoc! {"
        name: line
        stages:
          - kind: Walk
            limit: 1
    "};
    let err = from_str::<Plant>(yaml).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Custom));
    let text = err.to_string();
    assert!(text.contains("has unaccepted value (unknown variant `Walk`"), "{text}");
    assert!(text.contains("entry for StageKind kind while accepting"), "{text}");
    assert!(text.ends_with("while visiting sequence stages."), "{text}");
}

#[test]
fn multi_entry_enum_mapping_is_rejected() {
    let yaml = indoc! {"
        name: line
        stages:
          - kind: { Idle: ~, Run: { speed: 1 } }
            limit: 1
    "};
    let err = from_str::<Plant>(yaml).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TypeMismatch));
    assert!(err.to_string().contains("has non-single-entry Mapping (size 2) entry for StageKind kind"));
}

#[test]
fn errors_after_a_field_completes_report_the_root() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Doc {
        a: u8,
    }

    let err = from_str::<Doc>("a: 1\nb: 2\n").unwrap_err();
    assert!(err.to_string().ends_with("entry for <root>."));
}

#[test]
fn out_of_range_integer() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Doc {
        small: u8,
    }

    let err = from_str::<Doc>("small: 300\n").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidScalar));
    assert_eq!(
        err.to_string(),
        "YAML node of type Mapping (with size 1 and keys {small}) has invalid Scalar (invalid u8: `300`) entry for u8 small."
    );
}

#[test]
fn wrong_root_shape() {
    let err = from_str::<Plant>("- a\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "YAML node of type Sequence has non-Mapping (Sequence) entry for <root>."
    );
}
