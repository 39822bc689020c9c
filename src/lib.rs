// Armature Input - request-input sanitization for Armature applications
//
// Cleans query and body parameters on access: XSS pre-filtering, tag
// allow-lists, entity normalization and placeholder escaping.

// Re-export the cleaning pipeline
pub use armature_xss;
pub use armature_xss::{
    AllowedTags, CleanOptions, EntityCodec, ElementPolicy, FragmentEngine, Html5everEngine,
    Params, PlaceholderEscaper, UuidGuard, Value, XssError, XssFilter, XssSanitizer,
};

// Re-export the request wrapper
#[cfg(feature = "request")]
pub use armature_request;

#[cfg(feature = "request")]
pub use armature_request::{
    AttributeScopeMatcher, FileFormat, FixedScope, InputConfig, InsertTagResolver, ParameterBag,
    QueryParameterBag, RequestError, SanitizedRequest, ScopeMatcher, StaticUnusedParameters,
    UnusedParameterSource,
};

// Prelude for common imports
pub mod prelude {
    pub use crate::{AllowedTags, CleanOptions, Params, Value, XssFilter, XssSanitizer};

    #[cfg(feature = "request")]
    pub use crate::{
        AttributeScopeMatcher, FixedScope, InputConfig, InsertTagResolver, ParameterBag,
        SanitizedRequest, ScopeMatcher, StaticUnusedParameters,
    };
}
