/// One entry of a rendered menu.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MenuItem {
    /// Target of the entry, as emitted into the menu layout.
    pub link: String,
    /// Localized display text.
    pub label: String,
    /// Name of the originating route, when the entry came from a route reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Whether the entry matches the active link. `current` is accepted as a legacy alias.
    #[serde(default, alias = "current")]
    pub active: bool,
}

impl MenuItem {
    pub fn new(link: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            label: label.into(),
            route: None,
            active: false,
        }
    }

    /// Remember the route this item was built from.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Legacy accessor, synonym for [`MenuItem::is_active`].
    pub fn is_current(&self) -> bool {
        self.active
    }
}
