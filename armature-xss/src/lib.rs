//! # Armature XSS Protection
//!
//! Request-input cleaning for Armature applications.
//!
//! ## Features
//!
//! - ✅ **XSS Pre-Filter** - Defuses attribute breakouts, script URLs and event handlers
//! - ✅ **Tag Tidy** - Encodes every tag, or keeps an allow-list of tags as markup
//! - ✅ **Entity Normalization** - No double encoding across repeated cleaning
//! - ✅ **Placeholder Escaping** - `{{ ... }}` insert tags are made inert
//! - ✅ **Identifier Passthrough** - Binary and textual UUIDs are never touched
//! - ✅ **Structure Preserving** - Nested arrays keep their keys and order
//!
//! ## Quick Start
//!
//! ```rust
//! use armature_xss::{CleanOptions, Value, XssSanitizer};
//!
//! let sanitizer = XssSanitizer::new();
//!
//! let clean = sanitizer.clean("<script>alert('xss')</script>", &CleanOptions::default());
//! assert_eq!(
//!     clean,
//!     Value::from("&#60;script&#62;alert&#40;'xss'&#41;&#60;/script&#62;")
//! );
//! ```
//!
//! ## Cleaning Modes
//!
//! ```rust
//! use armature_xss::{CleanOptions, Value, XssSanitizer};
//!
//! let sanitizer = XssSanitizer::new();
//! let input = "<p>Hello <b>World</b></p>";
//!
//! // Every tag is entity-encoded
//! let clean = sanitizer.clean(input, &CleanOptions::post());
//! assert_eq!(clean, Value::from("&#60;p&#62;Hello &#60;b&#62;World&#60;/b&#62;&#60;/p&#62;"));
//!
//! // Allow-listed tags stay markup, the rest becomes inert text
//! let options = CleanOptions::post()
//!     .with_decode_entities(true)
//!     .with_allowed_tags("<p>");
//! let html = sanitizer.clean_html(input, &options);
//! assert_eq!(html, Value::from("<p>Hello &#60;b&#62;World&#60;/b&#62;</p>"));
//!
//! // Filtered but unencoded, for contexts that encode on their own
//! let raw = sanitizer.clean_raw(input, &CleanOptions::raw());
//! assert_eq!(raw, Value::from(input));
//! ```
//!
//! An empty allow-list disables filtering: `clean_html` with decoded entities
//! and no allowed tags hands back the parsed markup as it is.
//!
//! ## Placeholders
//!
//! ```rust
//! use armature_xss::{CleanOptions, Value, XssSanitizer};
//!
//! let sanitizer = XssSanitizer::new();
//!
//! let escaped = sanitizer.clean("{{date}}", &CleanOptions::post());
//! assert_eq!(escaped, Value::from("&#123;&#123;date&#125;&#125;"));
//!
//! let literal = sanitizer.clean("{{date}}", &CleanOptions::post().with_encode_placeholders(false));
//! assert_eq!(literal, Value::from("{{date}}"));
//! ```
//!
//! ## Pattern Filter
//!
//! ```rust
//! use armature_xss::XssFilter;
//!
//! assert_eq!(XssFilter::clean("<BODY ONLOAD=alert('XSS')>", true), "");
//! assert!(XssFilter::is_suspicious("<a href='javascript:alert(1)'>Click</a>"));
//! assert!(!XssFilter::is_suspicious("<p>Hello World</p>"));
//! ```

pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod filter;
pub mod guard;
pub mod placeholder;
pub mod sanitizer;
pub mod tidy;
pub mod value;

pub use config::CleanOptions;
pub use encoder::EntityCodec;
pub use engine::{ElementPolicy, FragmentEngine, Html5everEngine};
pub use error::{Result, XssError};
pub use filter::XssFilter;
pub use guard::UuidGuard;
pub use placeholder::PlaceholderEscaper;
pub use sanitizer::XssSanitizer;
pub use tidy::AllowedTags;
pub use value::{Params, Value};
