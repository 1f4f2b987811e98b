//! Shorthand constructors for the option structs.

/// Build [`crate::Options`], naming only the flags that differ from the strict default.
///
/// ```rust
/// let options = saphyr_archive::options! {
///     allow_yaml_with_no_cpp: true,
/// };
/// assert!(options.allow_yaml_with_no_cpp);
/// assert!(!options.allow_cpp_with_no_yaml);
/// ```
#[macro_export]
macro_rules! options {
    ( $( $flag:ident : $value:expr ),* $(,)? ) => {
        $crate::Options {
            $( $flag: $value, )*
            ..<$crate::Options as ::core::default::Default>::default()
        }
    };
}

/// Build [`crate::LoadOptions`] from its defaults and the listed overrides.
///
/// ```rust
/// use saphyr_archive::DuplicateKeyPolicy;
///
/// let load = saphyr_archive::load_options! {
///     duplicate_keys: DuplicateKeyPolicy::Error,
///     max_depth: 16,
/// };
/// assert_eq!(load.max_depth, 16);
/// ```
#[macro_export]
macro_rules! load_options {
    ( $( $setting:ident : $value:expr ),* $(,)? ) => {
        $crate::LoadOptions {
            $( $setting: $value, )*
            ..<$crate::LoadOptions as ::core::default::Default>::default()
        }
    };
}
