//! Errors produced by the registry.

/// Registry-level failures. TU state-machine rejections (e.g. `pickup` in a
/// state where it has no effect) are not errors: they are communicated to
/// the client via a re-sent notification instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PbxError {
    /// The extension table has no free slot left.
    NoFreeExtension,
    /// The TU is not present in the registry.
    NotRegistered,
}

impl std::fmt::Display for PbxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PbxError::NoFreeExtension => write!(f, "no free extension available"),
            PbxError::NotRegistered => write!(f, "TU is not registered"),
        }
    }
}

impl std::error::Error for PbxError {}
