//! Path validation
//!
//! Classifies client-supplied paths before they touch the filesystem.

/// Shape of a path argument as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Starts with `.`: `.`, `..`, `./x`, `../x`, `.hidden`.
    DotLeading,
    /// Contains a `..` segment after the first one.
    ParentSegment,
    /// Starts with `/`, resolved against the session root.
    Absolute,
    Relative,
}

impl PathClass {
    pub fn classify(path: &str) -> Self {
        if path.starts_with('.') {
            PathClass::DotLeading
        } else if path.split('/').any(|segment| segment == "..") {
            PathClass::ParentSegment
        } else if path.starts_with('/') {
            PathClass::Absolute
        } else {
            PathClass::Relative
        }
    }

    /// Whether CWD refuses this path outright.
    pub fn is_traversal(self) -> bool {
        matches!(self, PathClass::DotLeading | PathClass::ParentSegment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_leading_paths() {
        for path in [".", "..", "./sub", "../etc", "..foo", ".hidden", "../../.."] {
            assert_eq!(PathClass::classify(path), PathClass::DotLeading, "{path}");
            assert!(PathClass::classify(path).is_traversal());
        }
    }

    #[test]
    fn test_embedded_parent_segments() {
        assert_eq!(PathClass::classify("a/../.."), PathClass::ParentSegment);
        assert_eq!(PathClass::classify("/a/.."), PathClass::ParentSegment);
        assert!(PathClass::ParentSegment.is_traversal());
    }

    #[test]
    fn test_plain_paths() {
        assert_eq!(PathClass::classify("sub/dir"), PathClass::Relative);
        assert_eq!(PathClass::classify("a..b"), PathClass::Relative);
        assert_eq!(PathClass::classify("/pub"), PathClass::Absolute);
        assert!(!PathClass::classify("/pub").is_traversal());
    }
}
