use std::fmt;

/// Identifier of a persisted key-value collection.
///
/// Mediums may use the name directly as a storage identifier (the SQLite medium uses it as a
/// table name), so it is restricted to ASCII letters and underscores. Construction is `const` and
/// fails to compile for invalid names when used in a constant.
///
/// # Example
/// ```rust
/// use vcamera_state::Namespace;
///
/// const LENS_SETTINGS: Namespace = Namespace::new("lens_settings");
/// assert_eq!(LENS_SETTINGS.name(), "lens_settings");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace(&'static str);

impl Namespace {
    /// Create a namespace, panicking if `name` is not a valid identifier.
    pub const fn new(name: &'static str) -> Self {
        assert!(
            validate_namespace_name(name),
            "Namespace names must be non-empty and contain only alphabetic characters and underscores"
        );
        Self(name)
    }

    /// The storage name of this namespace.
    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Validate that the provided name can be used as a namespace identifier.
/// Valid characters are a-z, A-Z, and underscore (_). The empty string is rejected.
pub const fn validate_namespace_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        if !(byte.is_ascii_alphabetic() || byte == b'_') {
            return false;
        }
        i += 1;
    }
    true
}
