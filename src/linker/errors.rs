use thiserror::Error;

/// The decoded tree lacks a sub-tree the scan requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("store root '{root}' lacks required sub-tree(s): {missing}; processing cannot continue")]
    MissingSubtree { root: String, missing: String },
}

impl StructureError {
    pub fn code(&self) -> &'static str {
        match self {
            StructureError::MissingSubtree { .. } => "AMCACHE_MISSING_SUBTREE",
        }
    }
}
