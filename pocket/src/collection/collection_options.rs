use serde::{Deserialize, Serialize};

/// Per-collection settings, persisted with the collection record.
///
/// With `auto_commit` enabled every insert, update and remove is followed by
/// a plaintext commit of the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOptions {
    #[serde(default = "auto_commit_default")]
    auto_commit: bool,
}

fn auto_commit_default() -> bool {
    true
}

impl CollectionOptions {
    pub fn new(auto_commit: bool) -> Self {
        CollectionOptions { auto_commit }
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }
}

impl Default for CollectionOptions {
    fn default() -> Self {
        CollectionOptions {
            auto_commit: auto_commit_default(),
        }
    }
}
