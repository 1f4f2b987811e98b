//! Core-schema tags the loader cares about when classifying scalars.

pub(crate) const TAG_NULL: &str = "!!null";
pub(crate) const TAG_NULL_SHORTHAND: &str = "!null";
pub(crate) const TAG_NULL_CANONICAL: &str = "tag:yaml.org,2002:null";
pub(crate) const TAG_NULL_CANONICAL_ALT: &str = "tag:yaml.org,2002:!null";

pub(crate) const TAG_STR: &str = "!!str";
pub(crate) const TAG_STR_SHORTHAND: &str = "!str";
pub(crate) const TAG_STR_CANONICAL: &str = "tag:yaml.org,2002:str";
pub(crate) const TAG_STR_CANONICAL_ALT: &str = "tag:yaml.org,2002:!str";

pub(crate) fn is_null_tag(tag: Option<&str>) -> bool {
    match tag {
        Some(t) => matches!(
            t,
            TAG_NULL | TAG_NULL_SHORTHAND | TAG_NULL_CANONICAL | TAG_NULL_CANONICAL_ALT
        ),
        None => false,
    }
}

pub(crate) fn is_str_tag(tag: Option<&str>) -> bool {
    match tag {
        Some(t) => matches!(
            t,
            TAG_STR | TAG_STR_SHORTHAND | TAG_STR_CANONICAL | TAG_STR_CANONICAL_ALT
        ),
        None => false,
    }
}

/// Plain scalars spelled like this load as `Null` (YAML 1.2 core schema).
pub(crate) fn is_plain_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_spellings() {
        assert!(is_plain_null("~"));
        assert!(is_plain_null(""));
        assert!(is_plain_null("NULL"));
        assert!(!is_plain_null("nil"));
        assert!(is_null_tag(Some("tag:yaml.org,2002:null")));
        assert!(!is_null_tag(None));
        assert!(is_str_tag(Some("!!str")));
        assert!(!is_str_tag(Some("!!int")));
    }
}
