//! Frontend/backend scope detection.

use crate::request::SanitizedRequest;
use serde::{Deserialize, Serialize};

/// Request attribute read by [`AttributeScopeMatcher`].
pub const SCOPE_ATTRIBUTE: &str = "_scope";

/// Decides whether a request belongs to the public site or the back office.
///
/// A request may be neither, in which case body getters do not escape
/// placeholders.
pub trait ScopeMatcher: Send + Sync {
    fn is_frontend_request(&self, request: &SanitizedRequest) -> bool;

    fn is_backend_request(&self, request: &SanitizedRequest) -> bool;
}

/// A scope fixed at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedScope {
    Frontend,
    Backend,
    #[default]
    Unknown,
}

impl ScopeMatcher for FixedScope {
    fn is_frontend_request(&self, _request: &SanitizedRequest) -> bool {
        *self == FixedScope::Frontend
    }

    fn is_backend_request(&self, _request: &SanitizedRequest) -> bool {
        *self == FixedScope::Backend
    }
}

/// Reads the scope from a request attribute set by routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeScopeMatcher {
    attribute: String,
}

impl AttributeScopeMatcher {
    pub fn new() -> Self {
        Self::with_attribute(SCOPE_ATTRIBUTE)
    }

    pub fn with_attribute(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }

    fn scope_of(&self, request: &SanitizedRequest) -> FixedScope {
        match request
            .attributes()
            .get(&self.attribute)
            .and_then(|value| value.as_str())
        {
            Some(scope) if scope.eq_ignore_ascii_case("frontend") => FixedScope::Frontend,
            Some(scope) if scope.eq_ignore_ascii_case("backend") => FixedScope::Backend,
            _ => FixedScope::Unknown,
        }
    }
}

impl Default for AttributeScopeMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeMatcher for AttributeScopeMatcher {
    fn is_frontend_request(&self, request: &SanitizedRequest) -> bool {
        self.scope_of(request) == FixedScope::Frontend
    }

    fn is_backend_request(&self, request: &SanitizedRequest) -> bool {
        self.scope_of(request) == FixedScope::Backend
    }
}
