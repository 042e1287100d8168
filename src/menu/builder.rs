use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::foundation::env::Environment;
use crate::foundation::error::{FolioError, FolioResult};
use crate::menu::item::MenuItem;
use crate::render::engine::RenderingEngine;

/// Layout used by [`MenuBuilder::show_menu`] when none is supplied.
pub const DEFAULT_MENU_LAYOUT: &str = "menu.default";

/// One named route known to the surrounding framework.
pub trait Route {
    /// Whether the current viewer may reach this route. Inaccessible routes are silently
    /// skipped during menu construction.
    fn is_accessible(&self) -> bool;
}

/// Lookup of named routes.
pub trait RouteRegistry: Send + Sync {
    fn route(&self, name: &str) -> Option<&dyn Route>;
}

/// Produces the URL for a named route given the current controller context.
pub trait UrlGenerator: Send + Sync {
    fn url(&self, route: &str, context: &Environment) -> String;
}

/// Translates label keys into display text.
pub trait Localizer: Send + Sync {
    fn localize(&self, key: &str) -> String;
}

/// A registered producer of menu items, spliced in where a menu entry references its key.
pub trait MenuItemSource: Send + Sync {
    fn items(&self) -> FolioResult<Vec<MenuItem>>;
}

/// Declarative menu configuration: menu name to ordered entry list.
///
/// Entry grammar, processed in order (empty entries are skipped):
///
/// - `\key` — splice the items of the [`MenuItemSource`] registered under `key`
/// - `#link|labelKey` — static item with a hardcoded link and a localized label
/// - anything else — a route reference; unknown or inaccessible routes are skipped
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MenuConfig {
    menus: IndexMap<String, Vec<String>>,
}

impl MenuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or replace a menu's entry list.
    pub fn insert(&mut self, menu: impl Into<String>, entries: Vec<String>) {
        self.menus.insert(menu.into(), entries);
    }

    pub fn entries(&self, menu: &str) -> Option<&[String]> {
        self.menus.get(menu).map(Vec::as_slice)
    }
}

/// Builds ordered menu-item lists from declarative configuration and displays them through a
/// layout.
pub struct MenuBuilder {
    config: MenuConfig,
    routes: Arc<dyn RouteRegistry>,
    urls: Arc<dyn UrlGenerator>,
    localizer: Arc<dyn Localizer>,
    sources: HashMap<String, Box<dyn MenuItemSource>>,
    route_context: Environment,
    current_link: Option<String>,
}

impl MenuBuilder {
    pub fn new(
        config: MenuConfig,
        routes: Arc<dyn RouteRegistry>,
        urls: Arc<dyn UrlGenerator>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        Self {
            config,
            routes,
            urls,
            localizer,
            sources: HashMap::new(),
            route_context: Environment::new(),
            current_link: None,
        }
    }

    /// Register the [`MenuItemSource`] that `\key` entries resolve to.
    pub fn register_source(&mut self, key: impl Into<String>, source: Box<dyn MenuItemSource>) {
        self.sources.insert(key.into(), source);
    }

    /// Controller values fed to the URL generator for route-reference entries.
    pub fn set_route_context(&mut self, context: Environment) {
        self.route_context = context;
    }

    /// Link of the current request, the default active link for [`MenuBuilder::show_menu`].
    pub fn set_current_link(&mut self, link: impl Into<String>) {
        self.current_link = Some(link.into());
    }

    /// Build the ordered item list for `menu`.
    ///
    /// Every item whose link equals the active link is marked active, all matches rather than
    /// the first. An unknown menu yields an empty list. An unresolvable source entry aborts
    /// construction; no partial list is returned.
    pub fn build(&self, menu: &str, active_link: Option<&str>) -> FolioResult<Vec<MenuItem>> {
        let Some(entries) = self.config.entries(menu) else {
            return Ok(Vec::new());
        };

        let mut items = Vec::new();
        for entry in entries {
            if entry.is_empty() {
                continue;
            }
            if let Some(key) = entry.strip_prefix('\\') {
                let source = self
                    .sources
                    .get(key)
                    .ok_or_else(|| FolioError::unresolved_menu_source(key))?;
                items.extend(source.items()?);
            } else if let Some(rest) = entry.strip_prefix('#') {
                // Static link; never active through route matching.
                let (link, label_key) = rest.split_once('|').unwrap_or((rest, rest));
                items.push(MenuItem::new(link, self.localizer.localize(label_key)));
            } else {
                let route_name = entry.as_str();
                let accessible = self
                    .routes
                    .route(route_name)
                    .is_some_and(|route| route.is_accessible());
                if !accessible {
                    debug!(route = route_name, "skipping unavailable menu route");
                    continue;
                }
                items.push(
                    MenuItem::new(
                        self.urls.url(route_name, &self.route_context),
                        self.localizer.localize(route_name),
                    )
                    .with_route(route_name),
                );
            }
        }

        if let Some(active) = active_link.or(self.current_link.as_deref()) {
            for item in &mut items {
                if item.link == active {
                    item.active = true;
                }
            }
        }
        Ok(items)
    }

    /// Build `menu` and display it through `layout` with env `{ menu, items }`.
    ///
    /// An unknown or empty menu displays nothing and is not an error. `active_link` falls back
    /// to the configured current link.
    #[tracing::instrument(skip(self, engine))]
    pub fn show_menu(
        &self,
        engine: &mut RenderingEngine,
        menu: &str,
        layout: Option<&str>,
        active_link: Option<&str>,
    ) -> FolioResult<()> {
        if self.config.entries(menu).is_none_or(<[String]>::is_empty) {
            return Ok(());
        }
        let items = self.build(menu, active_link)?;

        let mut env = Environment::new();
        env.insert("menu", menu);
        env.insert(
            "items",
            serde_json::to_value(&items).map_err(|e| FolioError::Other(e.into()))?,
        );
        engine.display(layout.unwrap_or(DEFAULT_MENU_LAYOUT), &env)
    }
}

impl std::fmt::Debug for MenuBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuBuilder")
            .field("config", &self.config)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("current_link", &self.current_link)
            .finish_non_exhaustive()
    }
}
