//! Folio is a server-side layout composition and rendering engine.
//!
//! A **layout** is a named template unit. Rendering a layout evaluates it against a variable
//! [`Environment`]; while evaluating, a template may wrap itself into another layout by
//! redirecting its output into a named **block** that the wrapping layout later consumes.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: `layout name -> template location` via a [`LayoutResolver`]
//! 2. **Evaluate**: a [`TemplateEvaluator`] writes text through the engine's capture sink and may
//!    reentrantly call [`RenderingEngine::use_layout`] / [`RenderingEngine::start_new_block`]
//! 3. **Unwind**: pending layout frames are closed innermost-first, each captured block set
//!    feeding the render of its wrapping layout
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No ambient globals**: all capture/stack state is owned by a [`RenderingEngine`]; one
//!   engine per logical request.
//! - **Depth-neutral on every exit path**: a `render` call restores layout-stack and
//!   capture-buffer depth before returning, on success and on failure alike.
#![forbid(unsafe_code)]

mod capture;
mod foundation;
mod layout;
mod menu;
mod render;

pub use capture::sink::CaptureSink;
pub use foundation::env::{Environment, RESERVED_NAMES, Scope};
pub use foundation::error::{FolioError, FolioResult};
pub use layout::resolver::{LayoutResolver, PassthroughResolver, ThemeResolver};
pub use layout::stack::{DEFAULT_BLOCK, LayoutFrame, LayoutStack};
pub use menu::builder::{
    DEFAULT_MENU_LAYOUT, Localizer, MenuBuilder, MenuConfig, MenuItemSource, Route, RouteRegistry,
    UrlGenerator,
};
pub use menu::item::MenuItem;
pub use render::engine::RenderingEngine;
pub use render::evaluator::{ScriptEvaluator, TemplateEvaluator};
