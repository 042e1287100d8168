/// Convenience alias for `Result<T, FolioError>`.
pub type FolioResult<T> = Result<T, FolioError>;

/// Crate-wide error type.
///
/// Evaluator failures propagate to the caller of `render`/`display` only after the engine has
/// restored layout-stack and capture depth, so a failed render never corrupts subsequent ones.
#[derive(thiserror::Error, Debug)]
pub enum FolioError {
    /// Missing/empty layout identifier, or a stack operation invoked outside an active render.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// A block name was reused within one layout frame.
    #[error("duplicate block: {0}")]
    DuplicateBlock(String),

    /// A menu source entry named a key with no registered [`crate::MenuItemSource`].
    #[error("unresolved menu source: {0}")]
    UnresolvedMenuSource(String),

    /// Theme resource-URI configuration is absent.
    #[error("missing theme configuration: {0}")]
    MissingThemeConfig(String),

    /// A template evaluator failure that carries only a message.
    #[error("template error: {0}")]
    Template(String),

    /// Any other failure, typically IO on the primary output channel or a foreign evaluator
    /// error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        Self::InvalidLayout(msg.into())
    }

    pub fn duplicate_block(name: impl Into<String>) -> Self {
        Self::DuplicateBlock(name.into())
    }

    pub fn unresolved_menu_source(key: impl Into<String>) -> Self {
        Self::UnresolvedMenuSource(key.into())
    }

    pub fn missing_theme_config(msg: impl Into<String>) -> Self {
        Self::MissingThemeConfig(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            FolioError::invalid_layout("x")
                .to_string()
                .contains("invalid layout:")
        );
        assert!(
            FolioError::duplicate_block("x")
                .to_string()
                .contains("duplicate block:")
        );
        assert!(
            FolioError::unresolved_menu_source("x")
                .to_string()
                .contains("unresolved menu source:")
        );
        assert!(
            FolioError::missing_theme_config("x")
                .to_string()
                .contains("missing theme configuration:")
        );
        assert!(
            FolioError::template("x")
                .to_string()
                .contains("template error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = FolioError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
