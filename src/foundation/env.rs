use indexmap::IndexMap;
use serde_json::Value;

/// Names the engine binds itself; environment keys colliding with these are skipped when
/// building a [`Scope`] rather than erroring.
pub const RESERVED_NAMES: &[&str] = &["layout", "env", "rendering"];

/// The named-variable context supplied to a render call.
///
/// An ordered mapping from variable name to arbitrary value. The engine never mutates an
/// environment it was handed; merging copies values between owned instances.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Environment(IndexMap<String, Value>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for that name, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Fill in entries from `defaults` for names not already present.
    ///
    /// Present names win; this is how an enclosing render call's environment and a frame's
    /// captured blocks flow into a nested render without overriding explicit values.
    pub fn merge_defaults(&mut self, defaults: &Environment) {
        for (name, value) in &defaults.0 {
            if !self.0.contains_key(name) {
                self.0.insert(name.clone(), value.clone());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, Value>> for Environment {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Environment {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The flattened variable view handed to a template evaluator.
///
/// Built from an [`Environment`] with engine-reserved names skipped, so a template addresses
/// each variable by name without being able to shadow the engine's own bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    vars: IndexMap<String, Value>,
}

impl Scope {
    pub(crate) fn from_env(env: &Environment) -> Self {
        let vars = env
            .iter()
            .filter(|(name, _)| !RESERVED_NAMES.contains(name))
            .map(|(name, value)| (name.to_owned(), value.clone()))
            .collect();
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Borrow a variable as a string slice, `None` if absent or not a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(Value::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_defaults_keeps_present_values() {
        let mut env = Environment::new();
        env.insert("title", "kept");

        let mut defaults = Environment::new();
        defaults.insert("title", "dropped");
        defaults.insert("extra", 7);

        env.merge_defaults(&defaults);
        assert_eq!(env.get("title"), Some(&Value::from("kept")));
        assert_eq!(env.get("extra"), Some(&Value::from(7)));
    }

    #[test]
    fn merge_defaults_preserves_insertion_order() {
        let mut env = Environment::new();
        env.insert("b", 1);

        let mut defaults = Environment::new();
        defaults.insert("a", 2);
        defaults.insert("c", 3);

        env.merge_defaults(&defaults);
        let names: Vec<&str> = env.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn scope_skips_reserved_names() {
        let mut env = Environment::new();
        env.insert("rendering", "shadow");
        env.insert("title", "ok");

        let scope = Scope::from_env(&env);
        assert!(scope.get("rendering").is_none());
        assert_eq!(scope.get_str("title"), Some("ok"));
        assert_eq!(scope.len(), 1);
    }
}
