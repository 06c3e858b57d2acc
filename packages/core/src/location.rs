//! Call-site capture attached to every error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a request was issued from.
///
/// Created at the call site with [`debug_location!`](crate::debug_location)
/// and carried unchanged into any error the request produces, so a failure
/// in a log or a user bug report points back at the code that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLocation {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl DebugLocation {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Build from the type name of a marker fn nested inside the caller.
    ///
    /// Strips the marker segment and any `{{closure}}` segments async fns add.
    #[doc(hidden)]
    pub fn from_marker(file: &str, line: u32, marker_type_name: &str) -> Self {
        let mut function = marker_type_name.strip_suffix("::marker").unwrap_or(marker_type_name);
        while let Some(stripped) = function.strip_suffix("::{{closure}}") {
            function = stripped;
        }
        Self::new(file, line, function)
    }
}

impl fmt::Display for DebugLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.function)
    }
}

/// Capture the current file, line and enclosing function as a
/// [`DebugLocation`].
#[macro_export]
macro_rules! debug_location {
    () => {{
        fn marker() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::location::DebugLocation::from_marker(file!(), line!(), type_name_of(marker))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_captures_enclosing_function() {
        let location = crate::debug_location!();
        assert!(location.file.ends_with("location.rs"));
        assert!(location.line > 0);
        assert!(
            location.function.ends_with("macro_captures_enclosing_function"),
            "got {}",
            location.function
        );
    }

    #[test]
    fn closure_segments_are_stripped() {
        let location = DebugLocation::from_marker(
            "src/lib.rs",
            7,
            "my_crate::load::{{closure}}::{{closure}}::marker",
        );
        assert_eq!(location.function, "my_crate::load");
    }

    #[test]
    fn display_format() {
        let location = DebugLocation::new("src/a.rs", 12, "a::b");
        assert_eq!(location.to_string(), "src/a.rs:12 (a::b)");
    }
}
