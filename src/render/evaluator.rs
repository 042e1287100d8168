use std::collections::HashMap;
use std::path::Path;

use crate::foundation::env::Scope;
use crate::foundation::error::{FolioError, FolioResult};
use crate::render::engine::RenderingEngine;

/// Evaluates a resolved template against a variable scope.
///
/// An evaluator writes output through [`RenderingEngine::write`] and may reentrantly drive the
/// engine: calling [`RenderingEngine::use_layout`] to wrap itself into another layout,
/// [`RenderingEngine::start_new_block`] to rotate the captured region, or
/// [`RenderingEngine::display`] to include another layout inline.
pub trait TemplateEvaluator: Send + Sync {
    /// Evaluate the template at `layout`, writing its output to the engine's current capture.
    fn evaluate(
        &self,
        layout: &Path,
        scope: &Scope,
        engine: &mut RenderingEngine,
    ) -> FolioResult<()>;
}

type ScriptFn = dyn Fn(&Scope, &mut RenderingEngine) -> FolioResult<()> + Send + Sync;

/// Evaluator whose templates are Rust closures registered under layout identifiers.
///
/// The embedding story for programmatic templates, and the crate's own test vehicle; pair it
/// with [`crate::PassthroughResolver`] so layout names reach the registry unchanged.
#[derive(Default)]
pub struct ScriptEvaluator {
    scripts: HashMap<String, Box<ScriptFn>>,
}

impl ScriptEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` as the template for `layout`.
    pub fn register<F>(&mut self, layout: impl Into<String>, body: F)
    where
        F: Fn(&Scope, &mut RenderingEngine) -> FolioResult<()> + Send + Sync + 'static,
    {
        self.scripts.insert(layout.into(), Box::new(body));
    }
}

impl TemplateEvaluator for ScriptEvaluator {
    fn evaluate(
        &self,
        layout: &Path,
        scope: &Scope,
        engine: &mut RenderingEngine,
    ) -> FolioResult<()> {
        let key = layout.to_string_lossy();
        let body = self
            .scripts
            .get(key.as_ref())
            .ok_or_else(|| FolioError::template(format!("unknown layout script: {key}")))?;
        body(scope, engine)
    }
}

impl std::fmt::Debug for ScriptEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEvaluator")
            .field("scripts", &self.scripts.len())
            .finish()
    }
}
