//! Document identity and editor session state.

use std::fmt;

/// The kind of persistable unit a [`DocumentRef`] points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Asset,
    Prefab,
    Scene,
}

/// Stable reference to one persistable document in the object store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    pub path: String,
    pub kind: DocumentKind,
}

impl DocumentRef {
    pub fn new(path: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn asset(path: impl Into<String>) -> Self {
        Self::new(path, DocumentKind::Asset)
    }

    pub fn prefab(path: impl Into<String>) -> Self {
        Self::new(path, DocumentKind::Prefab)
    }

    pub fn scene(path: impl Into<String>) -> Self {
        Self::new(path, DocumentKind::Scene)
    }

    /// File stem of the path, used for ordering and progress labels.
    pub fn name(&self) -> &str {
        let file = self.path.rsplit('/').next().unwrap_or(&self.path);
        match file.rfind('.') {
            Some(index) if index > 0 => &file[..index],
            _ => file,
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// How a scene is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenMode {
    /// Close every currently open scene first; the opened scene becomes
    /// the active one.
    Exclusive,
    /// Open alongside the currently open scenes.
    Additive,
}

/// Snapshot of the editor's multi-scene session: which scene paths are
/// open and which of them is active. Captured before the scene phase and
/// restored afterwards, instead of being read back from ambient editor
/// state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub open: Vec<String>,
    pub active: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_strips_folders_and_extension() {
        assert_eq!(DocumentRef::prefab("Assets/Props/Barrel.prefab").name(), "Barrel");
        assert_eq!(DocumentRef::scene("Level1.scene").name(), "Level1");
        assert_eq!(DocumentRef::asset("Assets/raw_data").name(), "raw_data");
    }

    #[test]
    fn name_keeps_leading_dot() {
        assert_eq!(DocumentRef::asset("Assets/.hidden").name(), ".hidden");
    }
}
