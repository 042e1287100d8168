use indexmap::IndexMap;

/// Block name a layout frame captures into unless told otherwise.
pub const DEFAULT_BLOCK: &str = "content";

/// One pending nested layout invocation.
///
/// Created by `use_layout`; its active block rotates on `start_new_block`; destroyed when the
/// unwind step renders `layout` with the captured blocks merged into the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutFrame {
    /// The layout to render when this frame unwinds.
    pub layout: String,
    /// The block currently being captured.
    pub active_block: String,
    /// Blocks already captured, in capture order.
    pub captured_blocks: IndexMap<String, String>,
}

impl LayoutFrame {
    pub fn new(layout: impl Into<String>, block: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
            active_block: block.into(),
            captured_blocks: IndexMap::new(),
        }
    }

    /// True if `name` is already taken within this frame, either captured or currently active.
    pub fn has_block(&self, name: &str) -> bool {
        self.active_block == name || self.captured_blocks.contains_key(name)
    }
}

/// Ordered stack of pending layout frames, innermost last.
#[derive(Debug, Default)]
pub struct LayoutStack {
    frames: Vec<LayoutFrame>,
}

impl LayoutStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: LayoutFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<LayoutFrame> {
        self.frames.pop()
    }

    pub fn last(&self) -> Option<&LayoutFrame> {
        self.frames.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut LayoutFrame> {
        self.frames.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
