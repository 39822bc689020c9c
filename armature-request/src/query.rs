//! Query parameters with out-of-band unused parameters.
//!
//! Routing can consume parts of a URL and hand leftover parameters back
//! through an [`UnusedParameterSource`]. The [`QueryParameterBag`] merges
//! them in before every access, so cleaned getters see them like any other
//! query parameter.

use crate::bag::ParameterBag;
use armature_xss::{Params, Value};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Supplies query parameters that were not consumed by routing.
pub trait UnusedParameterSource: Send + Sync {
    fn unused_parameters(&self) -> Params;
}

impl<F> UnusedParameterSource for F
where
    F: Fn() -> Params + Send + Sync,
{
    fn unused_parameters(&self) -> Params {
        self()
    }
}

/// A shared supplier that a routing layer updates in place.
#[derive(Debug, Default)]
pub struct StaticUnusedParameters {
    parameters: RwLock<Params>,
}

impl StaticUnusedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(parameters: Params) -> Self {
        Self {
            parameters: RwLock::new(parameters),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.parameters.write().insert(key.into(), value.into());
    }

    pub fn replace(&self, parameters: Params) {
        *self.parameters.write() = parameters;
    }

    pub fn clear(&self) {
        self.parameters.write().clear();
    }
}

impl UnusedParameterSource for StaticUnusedParameters {
    fn unused_parameters(&self) -> Params {
        self.parameters.read().clone()
    }
}

/// Query parameters that absorb unused routing parameters on access.
///
/// Explicit parameters always win over unused ones. Absorbed parameters are
/// appended in the order the source reports them. A removed key comes back on
/// the next access if the source still reports it.
#[derive(Clone, Default)]
pub struct QueryParameterBag {
    bag: ParameterBag,
    unused: Option<Arc<dyn UnusedParameterSource>>,
}

impl QueryParameterBag {
    pub fn new(bag: ParameterBag) -> Self {
        Self { bag, unused: None }
    }

    /// Attach the source of unused parameters.
    pub fn with_unused_source(mut self, source: Arc<dyn UnusedParameterSource>) -> Self {
        self.unused = Some(source);
        self
    }

    pub fn set_unused_source(&mut self, source: Arc<dyn UnusedParameterSource>) {
        self.unused = Some(source);
    }

    /// Merge unused parameters that are not present yet.
    pub fn refresh(&mut self) {
        let Some(source) = &self.unused else {
            return;
        };

        let mut absorbed = 0usize;
        for (key, value) in source.unused_parameters() {
            if !self.bag.has(&key) {
                self.bag.set(key, value);
                absorbed += 1;
            }
        }

        if absorbed > 0 {
            debug!(absorbed, "Absorbed unused query parameters");
        }
    }

    pub fn all(&mut self) -> &Params {
        self.refresh();
        self.bag.all()
    }

    pub fn keys(&mut self) -> Vec<String> {
        self.refresh();
        self.bag.keys()
    }

    pub fn get(&mut self, key: &str) -> Option<&Value> {
        self.refresh();
        self.bag.get(key)
    }

    pub fn get_or(&mut self, key: &str, default: impl Into<Value>) -> Value {
        self.refresh();
        self.bag.get_or(key, default)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.refresh();
        self.bag.set(key, value);
    }

    pub fn has(&mut self, key: &str) -> bool {
        self.refresh();
        self.bag.has(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.refresh();
        self.bag.remove(key)
    }

    pub fn add(&mut self, parameters: impl IntoIterator<Item = (String, Value)>) {
        self.refresh();
        self.bag.add(parameters);
    }

    pub fn replace(&mut self, parameters: Params) {
        self.refresh();
        self.bag.replace(parameters);
    }

    pub fn count(&mut self) -> usize {
        self.refresh();
        self.bag.count()
    }

    pub fn iter(&mut self) -> indexmap::map::Iter<'_, String, Value> {
        self.refresh();
        self.bag.iter()
    }

    pub fn get_alpha(&mut self, key: &str) -> String {
        self.refresh();
        self.bag.get_alpha(key)
    }

    pub fn get_alnum(&mut self, key: &str) -> String {
        self.refresh();
        self.bag.get_alnum(key)
    }

    pub fn get_digits(&mut self, key: &str) -> String {
        self.refresh();
        self.bag.get_digits(key)
    }

    pub fn get_int(&mut self, key: &str) -> i64 {
        self.refresh();
        self.bag.get_int(key)
    }

    pub fn get_boolean(&mut self, key: &str) -> bool {
        self.refresh();
        self.bag.get_boolean(key)
    }

    /// The explicit parameters, without merging.
    pub fn inner(&self) -> &ParameterBag {
        &self.bag
    }

    pub fn inner_mut(&mut self) -> &mut ParameterBag {
        &mut self.bag
    }

    pub fn into_inner(self) -> ParameterBag {
        self.bag
    }
}

impl From<ParameterBag> for QueryParameterBag {
    fn from(bag: ParameterBag) -> Self {
        Self::new(bag)
    }
}

impl fmt::Debug for QueryParameterBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParameterBag")
            .field("bag", &self.bag)
            .field("has_unused_source", &self.unused.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, &str)]) -> Params {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(*value)))
            .collect()
    }

    #[test]
    fn test_without_source_behaves_like_bag() {
        let mut query = QueryParameterBag::new([("a", "1")].into_iter().collect());

        assert!(query.has("a"));
        assert_eq!(query.count(), 1);
    }

    #[test]
    fn test_unused_parameters_are_absorbed() {
        let source = Arc::new(StaticUnusedParameters::with_parameters(params(&[
            ("page", "2"),
            ("sort", "asc"),
        ])));
        let mut query = QueryParameterBag::new([("q", "x")].into_iter().collect())
            .with_unused_source(source);

        assert_eq!(query.keys(), vec!["q", "page", "sort"]);
        assert_eq!(query.get("page"), Some(&Value::from("2")));
    }

    #[test]
    fn test_explicit_parameters_win() {
        let source = Arc::new(StaticUnusedParameters::with_parameters(params(&[(
            "page", "99",
        )])));
        let mut query = QueryParameterBag::new([("page", "1")].into_iter().collect())
            .with_unused_source(source);

        assert_eq!(query.get("page"), Some(&Value::from("1")));
    }

    #[test]
    fn test_source_updates_are_seen_on_next_access() {
        let source = Arc::new(StaticUnusedParameters::new());
        let mut query = QueryParameterBag::default().with_unused_source(source.clone());

        assert_eq!(query.count(), 0);

        source.set("late", "yes");
        assert!(query.has("late"));
    }

    #[test]
    fn test_removed_key_reappears_while_reported() {
        let source = Arc::new(StaticUnusedParameters::with_parameters(params(&[(
            "page", "2",
        )])));
        let mut query = QueryParameterBag::default().with_unused_source(source.clone());

        assert_eq!(query.remove("page"), Some(Value::from("2")));
        assert!(query.has("page"));

        source.clear();
        query.remove("page");
        assert!(!query.has("page"));
    }

    #[test]
    fn test_closure_source() {
        let source: Arc<dyn UnusedParameterSource> = Arc::new(|| {
            let mut unused = Params::new();
            unused.insert("from_closure".to_string(), Value::from("1"));
            unused
        });
        let mut query = QueryParameterBag::default().with_unused_source(source);

        assert!(query.has("from_closure"));
    }

    #[test]
    fn test_typed_getters_see_unused_parameters() {
        let source = Arc::new(StaticUnusedParameters::with_parameters(params(&[(
            "page", "2nd",
        )])));
        let mut query = QueryParameterBag::default().with_unused_source(source);

        assert_eq!(query.get_int("page"), 2);
        assert_eq!(query.get_alpha("page"), "nd");
    }

    #[test]
    fn test_inner_is_not_refreshed() {
        let source = Arc::new(StaticUnusedParameters::with_parameters(params(&[(
            "page", "2",
        )])));
        let query = QueryParameterBag::default().with_unused_source(source);

        assert!(!query.inner().has("page"));
    }
}
