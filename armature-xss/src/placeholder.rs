/// Escapes the `{{ ... }}` insert-tag delimiters so untrusted input cannot
/// open a new template directive.
pub struct PlaceholderEscaper;

impl PlaceholderEscaper {
    pub const OPEN: &'static str = "{{";
    pub const CLOSE: &'static str = "}}";

    /// Replace both delimiter pairs with their numeric entities.
    pub fn encode(text: &str) -> String {
        text.replace(Self::OPEN, "&#123;&#123;")
            .replace(Self::CLOSE, "&#125;&#125;")
    }

    /// Whether the text holds a delimiter pair.
    pub fn contains_placeholder(text: &str) -> bool {
        text.contains(Self::OPEN) || text.contains(Self::CLOSE)
    }
}
