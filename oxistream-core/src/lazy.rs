//! Tri-state for lazily probed capabilities.

/// A `bool` that may not be resolved yet.
///
/// Used for capabilities that can only be discovered by probing a live
/// handle, e.g. whether a stream supports random access. Resolution is
/// monotone: once `True` or `False`, the value never changes again. Closing
/// the owner collapses a still-`Unknown` value to `False`, so a dead handle
/// is never probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LazyBool {
    /// Not probed yet.
    #[default]
    Unknown,
    /// Resolved to `true`.
    True,
    /// Resolved to `false`.
    False,
}

impl LazyBool {
    /// The resolved value, or `None` while unresolved.
    #[inline]
    pub fn resolved(self) -> Option<bool> {
        match self {
            Self::Unknown => None,
            Self::True => Some(true),
            Self::False => Some(false),
        }
    }

    /// Collapse an unresolved value to `False`.
    #[inline]
    pub fn collapse(&mut self) {
        if *self == Self::Unknown {
            *self = Self::False;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution() {
        let mut state = LazyBool::Unknown;
        assert_eq!(state.resolved(), None);
        state = LazyBool::True;
        assert_eq!(state.resolved(), Some(true));
        state.collapse();
        assert_eq!(state, LazyBool::True);
    }

    #[test]
    fn test_collapse_on_close() {
        let mut state = LazyBool::Unknown;
        state.collapse();
        assert_eq!(state, LazyBool::False);
    }
}
