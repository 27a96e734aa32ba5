//! Flush/sync depth selection.

/// How far a flush or sync should propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Flush data to the immediately underlying object: the stream's own
    /// buffer is drained one level down. Cheap; sufficient when the same
    /// process keeps using the underlying object.
    #[default]
    FromObject,
    /// Flush data through the process's I/O stack, e.g. a `flush` on the
    /// underlying handle, so other processes observe it.
    FromProcess,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(FlushMode::default(), FlushMode::FromObject);
    }
}
