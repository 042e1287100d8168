use std::io::Write;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::capture::sink::CaptureSink;
use crate::foundation::env::{Environment, Scope};
use crate::foundation::error::{FolioError, FolioResult};
use crate::layout::resolver::LayoutResolver;
use crate::layout::stack::{DEFAULT_BLOCK, LayoutFrame, LayoutStack};
use crate::render::evaluator::TemplateEvaluator;

/// One in-progress `render`/`display` call.
///
/// Kept so a nested render triggered while evaluating the current layout can inherit the
/// enclosing call's environment as defaults.
#[derive(Clone, Debug)]
struct RenderCall {
    #[allow(dead_code)]
    layout: String,
    env: Environment,
}

/// The rendering orchestrator.
///
/// Owns the capture sink and layout stack for one logical request. The safety contract of the
/// unwind protocol assumes exactly one render in flight against this state at a time, so
/// concurrent request handling needs one engine per request, never a shared instance.
pub struct RenderingEngine {
    resolver: Arc<dyn LayoutResolver>,
    evaluator: Arc<dyn TemplateEvaluator>,
    sink: CaptureSink,
    layouts: LayoutStack,
    rendering_stack: Vec<RenderCall>,
    rendering_id: u64,
}

impl RenderingEngine {
    /// Engine writing its primary output to stdout.
    pub fn new(resolver: Arc<dyn LayoutResolver>, evaluator: Arc<dyn TemplateEvaluator>) -> Self {
        Self::with_primary(resolver, evaluator, Box::new(std::io::stdout()))
    }

    /// Engine writing its primary output to `primary`.
    pub fn with_primary(
        resolver: Arc<dyn LayoutResolver>,
        evaluator: Arc<dyn TemplateEvaluator>,
        primary: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            resolver,
            evaluator,
            sink: CaptureSink::new(primary),
            layouts: LayoutStack::new(),
            rendering_stack: Vec::new(),
            rendering_id: 0,
        }
    }

    /// Monotonic identifier of the most recent render call, diagnostic use only.
    pub fn rendering_id(&self) -> u64 {
        self.rendering_id
    }

    /// Current layout-stack depth.
    pub fn layout_depth(&self) -> usize {
        self.layouts.depth()
    }

    /// Current capture-frame depth.
    pub fn capture_depth(&self) -> usize {
        self.sink.depth()
    }

    /// True while a `render`/`display` call is in progress on this engine.
    pub fn is_rendering(&self) -> bool {
        !self.rendering_stack.is_empty()
    }

    /// Render `layout` against `env` and return the produced text.
    ///
    /// Layout-stack and capture depth are restored to their pre-call values on every exit path;
    /// an evaluator failure propagates only after that cleanup.
    #[tracing::instrument(skip(self, env))]
    pub fn render(&mut self, layout: &str, env: &Environment) -> FolioResult<String> {
        self.sink.begin_capture();
        let result = self.display(layout, env);
        let text = self.sink.end_capture().unwrap_or_default();
        result.map(|_| text)
    }

    /// Render `layout` against `env` into the current output channel.
    ///
    /// At the top level that is the primary channel; during an evaluation it is the innermost
    /// capture frame, which is what lets one layout include another inline.
    pub fn display(&mut self, layout: &str, env: &Environment) -> FolioResult<()> {
        if layout.is_empty() {
            return Err(FolioError::invalid_layout("layout name must be non-empty"));
        }
        self.rendering_id += 1;

        let mut env = env.clone();
        if let Some(call) = self.rendering_stack.last() {
            env.merge_defaults(&call.env);
        }

        let prev_depth = self.layouts.depth();
        self.rendering_stack.push(RenderCall {
            layout: layout.to_owned(),
            env: env.clone(),
        });
        let scope = Scope::from_env(&env);

        let mut result = match self.resolver.resolve(layout) {
            Ok(path) => {
                let evaluator = Arc::clone(&self.evaluator);
                evaluator.evaluate(&path, &scope, self)
            }
            Err(e) => Err(e),
        };

        self.rendering_stack.pop();

        // Unwind to the depth recorded at entry. A failure anywhere (the evaluator body or a
        // wrapping layout rendered mid-unwind) switches to plain frame disposal; the first close
        // reporting no active capture stops the loop.
        while self.layouts.depth() > prev_depth {
            if result.is_err() {
                if !self.close_interrupted_layout() {
                    break;
                }
            } else {
                match self.end_current_layout(&env) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => result = Err(e),
                }
            }
        }

        result
    }

    /// Wrap the remainder of the current template into `layout`, capturing into its
    /// `"content"` block.
    pub fn use_layout(&mut self, layout: &str) -> FolioResult<()> {
        self.use_layout_block(layout, DEFAULT_BLOCK)
    }

    /// Wrap the remainder of the current template into `layout`, capturing into `block`.
    pub fn use_layout_block(&mut self, layout: &str, block: &str) -> FolioResult<()> {
        if layout.is_empty() {
            return Err(FolioError::invalid_layout("layout name must be non-empty"));
        }
        if !self.is_rendering() {
            return Err(FolioError::invalid_layout(
                "use_layout requires a render in progress",
            ));
        }
        trace!(layout, block, "use_layout");
        self.layouts.push(LayoutFrame::new(layout, block));
        self.sink.begin_capture();
        Ok(())
    }

    /// Close the innermost frame's active block and start capturing `name` instead.
    ///
    /// A block name may be captured at most once per frame; reusing one, including the name
    /// currently being captured, is a [`FolioError::DuplicateBlock`]. The check runs before the
    /// active capture is touched, so a rejected call leaves depth intact.
    pub fn start_new_block(&mut self, name: &str) -> FolioResult<()> {
        let Some(frame) = self.layouts.last_mut() else {
            return Err(FolioError::invalid_layout(
                "start_new_block requires an active layout",
            ));
        };
        if frame.has_block(name) {
            return Err(FolioError::duplicate_block(name));
        }
        let Some(text) = self.sink.end_capture() else {
            return Err(FolioError::invalid_layout("no capture in progress"));
        };
        trace!(
            from = frame.active_block.as_str(),
            to = name,
            "start_new_block"
        );
        let closed = std::mem::replace(&mut frame.active_block, name.to_owned());
        frame.captured_blocks.insert(closed, text);
        self.sink.begin_capture();
        Ok(())
    }

    /// Append text to the current output channel; the surface templates use for ordinary
    /// output.
    pub fn write(&mut self, text: &str) -> FolioResult<()> {
        self.sink.write_str(text)
    }

    /// Close the innermost layout frame and render its wrapping layout.
    ///
    /// The final active block is assigned unchecked (the unwind step overwrites a same-named
    /// block rather than erroring), then the wrapping layout renders with the captured blocks
    /// merged as defaults over `env`.
    fn end_current_layout(&mut self, env: &Environment) -> FolioResult<bool> {
        if self.layouts.is_empty() {
            return Ok(false);
        }
        let Some(text) = self.sink.end_capture() else {
            return Ok(false);
        };
        let Some(frame) = self.layouts.pop() else {
            return Ok(false);
        };
        let LayoutFrame {
            layout,
            active_block,
            mut captured_blocks,
        } = frame;
        captured_blocks.insert(active_block, text);

        let mut layout_env: Environment = captured_blocks
            .into_iter()
            .map(|(name, text)| (name, Value::String(text)))
            .collect();
        layout_env.merge_defaults(env);

        self.display(&layout, &layout_env)?;
        Ok(true)
    }

    /// Interrupted-path disposal: drop the innermost frame and its partial capture.
    fn close_interrupted_layout(&mut self) -> bool {
        if self.sink.end_capture().is_none() {
            return false;
        }
        if let Some(frame) = self.layouts.pop() {
            debug!(layout = frame.layout.as_str(), "discarding interrupted layout frame");
        }
        true
    }
}

impl std::fmt::Debug for RenderingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderingEngine")
            .field("layout_depth", &self.layouts.depth())
            .field("capture_depth", &self.sink.depth())
            .field("rendering_id", &self.rendering_id)
            .finish_non_exhaustive()
    }
}
