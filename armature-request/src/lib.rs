//! # Armature Request Input
//!
//! Cleaned access to query and body parameters.
//!
//! ## Features
//!
//! - ✅ **Cleaning Getters** - `get_get`, `get_post`, `get_post_html`, `get_post_raw`
//! - ✅ **Nested Parameters** - `a[]=1` and `a[b][c]=1` query strings, JSON bodies
//! - ✅ **Unused Parameters** - Leftover routing parameters merged into the query
//! - ✅ **Scope Awareness** - Placeholder escaping follows frontend/backend scope
//! - ✅ **Insert Tags** - `{{request_get::key}}` and `{{request_post::key}}`
//! - ✅ **File Configuration** - Cleaning defaults from TOML or JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use armature_request::{FixedScope, ParameterBag, SanitizedRequest};
//! use armature_xss::Value;
//!
//! let query = ParameterBag::from_query_string("page=2&tag[]=rust").unwrap();
//! let body = ParameterBag::from_json(r#"{"comment": "<b>Hi</b> {{date}}"}"#).unwrap();
//!
//! let mut request = SanitizedRequest::new(query, body, FixedScope::Frontend);
//!
//! assert_eq!(request.get_get("page"), Value::from("2"));
//! assert_eq!(
//!     request.get_post("comment"),
//!     Value::from("&#60;b&#62;Hi&#60;/b&#62; &#123;&#123;date&#125;&#125;")
//! );
//! ```
//!
//! ## Unused Parameters
//!
//! ```rust
//! use armature_request::{FixedScope, ParameterBag, SanitizedRequest, StaticUnusedParameters};
//! use armature_xss::Value;
//! use std::sync::Arc;
//!
//! let unused = Arc::new(StaticUnusedParameters::new());
//! let mut request = SanitizedRequest::new(ParameterBag::new(), ParameterBag::new(), FixedScope::Frontend)
//!     .with_unused_source(unused.clone());
//!
//! unused.set("auto_item", "news-article");
//! assert_eq!(request.get_get("auto_item"), Value::from("news-article"));
//! ```

pub mod bag;
pub mod config;
pub mod error;
pub mod insert_tags;
pub mod query;
pub mod request;
pub mod scope;

pub use bag::ParameterBag;
pub use config::{FileFormat, InputConfig};
pub use error::{RequestError, Result};
pub use insert_tags::InsertTagResolver;
pub use query::{QueryParameterBag, StaticUnusedParameters, UnusedParameterSource};
pub use request::SanitizedRequest;
pub use scope::{AttributeScopeMatcher, FixedScope, ScopeMatcher};
