use std::io::Write;
use std::sync::{Arc, Mutex};

use folio::{
    Environment, FolioResult, Localizer, MenuBuilder, MenuConfig, MenuItem, MenuItemSource,
    PassthroughResolver, RenderingEngine, Route, RouteRegistry, ScriptEvaluator, UrlGenerator,
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

struct OpenRoute;

impl Route for OpenRoute {
    fn is_accessible(&self) -> bool {
        true
    }
}

struct OpenRoutes(Vec<String>);

impl RouteRegistry for OpenRoutes {
    fn route(&self, name: &str) -> Option<&dyn Route> {
        self.0
            .iter()
            .any(|r| r == name)
            .then_some(&OpenRoute as &dyn Route)
    }
}

struct PrefixUrls;

impl UrlGenerator for PrefixUrls {
    fn url(&self, route: &str, context: &Environment) -> String {
        match context.get("id").and_then(|v| v.as_str()) {
            Some(id) => format!("/{route}/{id}"),
            None => format!("/{route}"),
        }
    }
}

struct IdentityLabels;

impl Localizer for IdentityLabels {
    fn localize(&self, key: &str) -> String {
        key.to_owned()
    }
}

struct TwoLinks;

impl MenuItemSource for TwoLinks {
    fn items(&self) -> FolioResult<Vec<MenuItem>> {
        Ok(vec![
            MenuItem::new("/ext/a", "A"),
            MenuItem::new("/ext/b", "B"),
        ])
    }
}

fn menu_layout_scripts() -> ScriptEvaluator {
    let mut scripts = ScriptEvaluator::new();
    scripts.register("menu.default", |scope, engine| {
        let items = scope
            .get("items")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        engine.write("<ul>")?;
        for item in &items {
            let label = item["label"].as_str().unwrap_or("");
            let link = item["link"].as_str().unwrap_or("");
            if item["active"].as_bool().unwrap_or(false) {
                engine.write(&format!("<li class=\"active\"><a href=\"{link}\">{label}</a></li>"))?;
            } else {
                engine.write(&format!("<li><a href=\"{link}\">{label}</a></li>"))?;
            }
        }
        engine.write("</ul>")
    });
    scripts
}

fn engine_with(scripts: ScriptEvaluator) -> (RenderingEngine, SharedBuf) {
    let buf = SharedBuf::default();
    let engine = RenderingEngine::with_primary(
        Arc::new(PassthroughResolver),
        Arc::new(scripts),
        Box::new(buf.clone()),
    );
    (engine, buf)
}

fn builder(config: MenuConfig, routes: Vec<&str>) -> MenuBuilder {
    MenuBuilder::new(
        config,
        Arc::new(OpenRoutes(routes.into_iter().map(str::to_owned).collect())),
        Arc::new(PrefixUrls),
        Arc::new(IdentityLabels),
    )
}

#[test]
fn show_menu_renders_items_through_the_layout() {
    let mut config = MenuConfig::new();
    config.insert(
        "main",
        vec!["#/home|Home".to_owned(), "about".to_owned()],
    );
    let builder = builder(config, vec!["about"]);
    let (mut engine, buf) = engine_with(menu_layout_scripts());

    builder
        .show_menu(&mut engine, "main", None, Some("/about"))
        .unwrap();
    assert_eq!(
        buf.text(),
        "<ul><li><a href=\"/home\">Home</a></li>\
         <li class=\"active\"><a href=\"/about\">about</a></li></ul>"
    );
    assert_eq!(engine.capture_depth(), 0);
}

#[test]
fn show_menu_uses_the_supplied_layout() {
    let mut config = MenuConfig::new();
    config.insert("main", vec!["#/home|Home".to_owned()]);
    let builder = builder(config, vec![]);

    let mut scripts = ScriptEvaluator::new();
    scripts.register("menu.compact", |scope, engine| {
        let count = scope
            .get("items")
            .and_then(|v| v.as_array())
            .map_or(0, Vec::len);
        engine.write(&format!(
            "{}:{count}",
            scope.get_str("menu").unwrap_or("")
        ))
    });
    let (mut engine, buf) = engine_with(scripts);

    builder
        .show_menu(&mut engine, "main", Some("menu.compact"), None)
        .unwrap();
    assert_eq!(buf.text(), "main:1");
}

#[test]
fn show_menu_of_an_unknown_menu_displays_nothing() {
    let builder = builder(MenuConfig::new(), vec![]);
    let (mut engine, buf) = engine_with(ScriptEvaluator::new());

    builder.show_menu(&mut engine, "ghost", None, None).unwrap();
    assert_eq!(buf.text(), "");
    assert_eq!(engine.rendering_id(), 0);
}

#[test]
fn show_menu_of_an_empty_menu_displays_nothing() {
    let mut config = MenuConfig::new();
    config.insert("main", Vec::new());
    let builder = builder(config, vec![]);
    let (mut engine, buf) = engine_with(ScriptEvaluator::new());

    builder.show_menu(&mut engine, "main", None, None).unwrap();
    assert_eq!(buf.text(), "");
}

#[test]
fn route_context_reaches_the_url_generator() {
    let mut config = MenuConfig::new();
    config.insert("main", vec!["user.profile".to_owned()]);
    let mut builder = builder(config, vec!["user.profile"]);
    let mut context = Environment::new();
    context.insert("id", "42");
    builder.set_route_context(context);

    let items = builder.build("main", None).unwrap();
    assert_eq!(items[0].link, "/user.profile/42");
}

#[test]
fn spliced_source_items_participate_in_active_marking() {
    let mut config = MenuConfig::new();
    config.insert("main", vec!["\\links".to_owned()]);
    let mut builder = builder(config, vec![]);
    builder.register_source("links", Box::new(TwoLinks));

    let items = builder.build("main", Some("/ext/b")).unwrap();
    assert_eq!(items.len(), 2);
    assert!(!items[0].active);
    assert!(items[1].active);
}
