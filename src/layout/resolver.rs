use std::path::{Path, PathBuf};

use crate::foundation::error::{FolioError, FolioResult};

/// Maps a logical layout name to a concrete template location.
pub trait LayoutResolver: Send + Sync {
    /// Resolve a layout name to the location handed to the template evaluator.
    fn resolve(&self, layout: &str) -> FolioResult<PathBuf>;

    /// Whether the layout resolves to an existing template.
    fn exists(&self, layout: &str) -> bool;
}

/// Resolver mapping every layout name to itself.
///
/// The natural companion of [`crate::ScriptEvaluator`], where layout identifiers are registry
/// keys rather than filesystem paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughResolver;

impl LayoutResolver for PassthroughResolver {
    fn resolve(&self, layout: &str) -> FolioResult<PathBuf> {
        Ok(PathBuf::from(layout))
    }

    fn exists(&self, _layout: &str) -> bool {
        true
    }
}

/// Filesystem resolver for themed template trees.
///
/// Layouts live under `<resource_path>/<themes_folder>/<theme>/<layouts_folder>/<name>.<ext>`.
/// An identifier that is already a readable file passes through as a literal path.
#[derive(Clone, Debug)]
pub struct ThemeResolver {
    resource_path: PathBuf,
    themes_folder: String,
    theme: String,
    layouts_folder: String,
    extension: String,
    theme_folder_uri: Option<String>,
}

impl ThemeResolver {
    pub fn new(resource_path: impl Into<PathBuf>, theme: impl Into<String>) -> Self {
        Self {
            resource_path: resource_path.into(),
            themes_folder: "themes".to_owned(),
            theme: theme.into(),
            layouts_folder: "layouts".to_owned(),
            extension: "html".to_owned(),
            theme_folder_uri: None,
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// Switch the theme used to resolve subsequent layouts.
    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.theme = theme.into();
    }

    /// Set the public URI under which theme folders are served.
    pub fn set_theme_folder_uri(&mut self, uri: impl Into<String>) {
        self.theme_folder_uri = Some(uri.into());
    }

    /// Template filename extension, without the dot.
    pub fn set_extension(&mut self, extension: impl Into<String>) {
        self.extension = extension.into();
    }

    /// Path to the current theme directory.
    pub fn theme_path(&self) -> PathBuf {
        self.resource_path.join(&self.themes_folder).join(&self.theme)
    }

    /// Path to the current theme's layouts directory.
    pub fn layouts_path(&self) -> PathBuf {
        self.theme_path().join(&self.layouts_folder)
    }

    /// Public URL of the current theme folder.
    ///
    /// The URI side is configuration the surrounding framework may legitimately not have set;
    /// asking for it while unset is a [`FolioError::MissingThemeConfig`], distinguishable from
    /// rendering errors.
    pub fn theme_url(&self) -> FolioResult<String> {
        let base = self.theme_folder_uri.as_deref().ok_or_else(|| {
            FolioError::missing_theme_config(
                "no theme folder URI provided, use set_theme_folder_uri",
            )
        })?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), self.theme))
    }

    fn layout_path(&self, layout: &str) -> PathBuf {
        let literal = Path::new(layout);
        if literal.is_file() {
            return literal.to_path_buf();
        }
        self.layouts_path()
            .join(format!("{}.{}", layout, self.extension))
    }
}

impl LayoutResolver for ThemeResolver {
    fn resolve(&self, layout: &str) -> FolioResult<PathBuf> {
        Ok(self.layout_path(layout))
    }

    fn exists(&self, layout: &str) -> bool {
        self.layout_path(layout).is_file()
    }
}
