use std::collections::HashMap;

use thiserror::Error;

use super::frame::{FlameFrame, FrameId, FrameRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("frame {0:?} is not in the frame table")]
    UnknownFrame(FrameId),
    #[error("children of {parent:?} would need {requested} samples but only {available} remain")]
    Overflow {
        parent: NodeId,
        available: u32,
        requested: u32,
    },
    #[error("sample count exceeds u32::MAX")]
    TooManySamples,
}

/// One node of the weighted call tree.
#[derive(Debug, Clone)]
pub struct CallTreeNode {
    pub frame: FrameRef,
    /// Samples attributed to this node and its descendants.
    pub width: u32,
    pub children: Vec<NodeId>,
    /// Sum of the children's widths.
    children_width: u32,
}

impl CallTreeNode {
    fn new(frame: FrameRef, width: u32) -> Self {
        Self {
            frame,
            width,
            children: Vec::new(),
            children_width: 0,
        }
    }

    /// Samples not covered by any child (self time).
    pub fn self_width(&self) -> u32 {
        self.width - self.children_width
    }
}

/// A rooted, ordered call tree with a synthetic root.
///
/// Nodes live in an arena and refer to an interned frame table, so equal
/// frames appearing at many call sites share one [`FrameId`]. The root's width
/// is the total sample count; every node's children fit inside it.
#[derive(Debug, Clone)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
    frames: Vec<FlameFrame>,
    frame_index: HashMap<FlameFrame, FrameId>,
    child_index: HashMap<(NodeId, FrameRef), NodeId>,
}

impl CallTree {
    pub const ROOT: NodeId = NodeId(0);

    /// A tree whose root spans `total_samples`, to be filled with
    /// [`CallTree::add_child`].
    pub fn with_total(total_samples: u32) -> Self {
        Self {
            nodes: vec![CallTreeNode::new(FrameRef::Unknown, total_samples)],
            frames: Vec::new(),
            frame_index: HashMap::new(),
            child_index: HashMap::new(),
        }
    }

    /// An empty tree that grows through [`CallTree::add_stack`].
    pub fn new() -> Self {
        Self::with_total(0)
    }

    pub fn root(&self) -> &CallTreeNode {
        &self.nodes[Self::ROOT.index()]
    }

    pub fn node(&self, id: NodeId) -> Option<&CallTreeNode> {
        self.nodes.get(id.index())
    }

    pub fn frame(&self, id: FrameId) -> Option<&FlameFrame> {
        self.frames.get(id.index())
    }

    pub fn frames(&self) -> &[FlameFrame] {
        &self.frames
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn total_width(&self) -> u32 {
        self.root().width
    }

    /// Nothing to draw: no samples, or no node below the synthetic root.
    pub fn is_empty(&self) -> bool {
        self.total_width() == 0 || self.root().children.is_empty()
    }

    /// Deepest node depth; the root is depth 0.
    pub fn max_depth(&self) -> u32 {
        let mut max = 0;
        let mut stack = vec![(Self::ROOT, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            for &child in &self.nodes[id.index()].children {
                stack.push((child, depth + 1));
            }
        }
        max
    }

    /// Return the id for `frame`, adding it to the frame table if new.
    pub fn intern(&mut self, frame: FlameFrame) -> FrameId {
        if let Some(&id) = self.frame_index.get(&frame) {
            return id;
        }
        let id = FrameId(self.frames.len() as u32);
        self.frames.push(frame.clone());
        self.frame_index.insert(frame, id);
        id
    }

    /// Append a child of `parent` covering `width` samples. Children are laid
    /// out in insertion order.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        frame: FrameRef,
        width: u32,
    ) -> Result<NodeId, TreeError> {
        if let FrameRef::Frame(fid) = frame
            && self.frame(fid).is_none()
        {
            return Err(TreeError::UnknownFrame(fid));
        }
        let next = NodeId(self.nodes.len() as u32);
        let parent_node = self
            .nodes
            .get_mut(parent.index())
            .ok_or(TreeError::UnknownNode(parent))?;
        let available = parent_node.self_width();
        if width > available {
            return Err(TreeError::Overflow {
                parent,
                available,
                requested: width,
            });
        }
        parent_node.children_width += width;
        parent_node.children.push(next);
        self.child_index.entry((parent, frame)).or_insert(next);
        self.nodes.push(CallTreeNode::new(frame, width));
        Ok(next)
    }

    /// Intern `frame` and append it as a child of `parent`.
    pub fn add_frame(
        &mut self,
        parent: NodeId,
        frame: FlameFrame,
        width: u32,
    ) -> Result<NodeId, TreeError> {
        let id = self.intern(frame);
        self.add_child(parent, FrameRef::Frame(id), width)
    }

    /// Attribute `count` samples to the call stack `stack` (outermost frame
    /// first), merging with existing nodes that share a prefix.
    pub fn add_stack<I>(&mut self, stack: I, count: u32) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = FlameFrame>,
    {
        if count == 0 {
            return Ok(());
        }
        let refs: Vec<FrameRef> = stack
            .into_iter()
            .map(|f| FrameRef::Frame(self.intern(f)))
            .collect();

        // Widen every node on the path first so a child never outgrows its parent.
        let root = &mut self.nodes[Self::ROOT.index()];
        root.width = root.width.checked_add(count).ok_or(TreeError::TooManySamples)?;

        let mut parent = Self::ROOT;
        for frame in refs {
            let node = match self.child_index.get(&(parent, frame)) {
                Some(&existing) => {
                    self.nodes[parent.index()].children_width += count;
                    let node = &mut self.nodes[existing.index()];
                    node.width = node.width.checked_add(count).ok_or(TreeError::TooManySamples)?;
                    existing
                }
                None => self.add_child(parent, frame, count)?,
            };
            parent = node;
        }
        Ok(())
    }
}

impl Default for CallTree {
    fn default() -> Self {
        Self::new()
    }
}
