use flameview_protocol::SharedStr;
use serde::{Deserialize, Serialize};

/// Source location a call-tree node was sampled in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlameFrame {
    pub file: SharedStr,
    pub function: SharedStr,
    pub line: u32,
}

impl FlameFrame {
    pub fn new(file: impl Into<SharedStr>, function: impl Into<SharedStr>, line: u32) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
            line,
        }
    }

    /// Hover label: `"<basename>, <function>: line <N>"`.
    pub fn label(&self) -> String {
        format!("{}, {}: line {}", self.file.basename(), self.function, self.line)
    }
}

/// Index into a frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub u32);

impl FrameId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a call-tree node or a tag-image cell refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrameRef {
    Frame(FrameId),
    /// Synthetic root, padding, or a pixel no node covers.
    #[default]
    Unknown,
}

impl FrameRef {
    pub fn frame_id(self) -> Option<FrameId> {
        match self {
            Self::Frame(id) => Some(id),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}
