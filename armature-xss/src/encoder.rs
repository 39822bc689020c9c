/// Entity codec shared by every cleaning stage.
///
/// Besides plain decoding, the codec maintains a small set of bracketed
/// placeholders (`[&]`, `[lt]`, `[gt]`, `[nbsp]`, `[-]`) that keep basic
/// entities alive through a decode pass and are turned back into entities
/// at the end of the pipeline.
pub struct EntityCodec;

const PRESERVE: [(&str, &str); 10] = [
    ("[&amp;]", "[&]"),
    ("&amp;", "[&]"),
    ("[&lt;]", "[lt]"),
    ("&lt;", "[lt]"),
    ("[&gt;]", "[gt]"),
    ("&gt;", "[gt]"),
    ("[&nbsp;]", "[nbsp]"),
    ("&nbsp;", "[nbsp]"),
    ("[&shy;]", "[-]"),
    ("&shy;", "[-]"),
];

const RESTORE: [(&str, &str); 6] = [
    ("[&]", "&amp;"),
    ("[&amp;]", "&amp;"),
    ("[lt]", "&lt;"),
    ("[gt]", "&gt;"),
    ("[nbsp]", "&nbsp;"),
    ("[-]", "&shy;"),
];

impl EntityCodec {
    /// Decode named and numeric HTML entities to their characters.
    pub fn decode_entities(text: &str) -> String {
        html_escape::decode_html_entities(text).into_owned()
    }

    /// Decode entities, keeping the basic ones as placeholders.
    pub fn decode_input_entities(text: &str) -> String {
        Self::decode_entities(&Self::preserve_basic_entities(text))
    }

    /// Encode the characters that can start markup or an attribute value.
    pub fn encode_special_chars(text: &str) -> String {
        let mut encoded = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '#' => encoded.push_str("&#35;"),
                '<' => encoded.push_str("&#60;"),
                '>' => encoded.push_str("&#62;"),
                '(' => encoded.push_str("&#40;"),
                ')' => encoded.push_str("&#41;"),
                '\\' => encoded.push_str("&#92;"),
                '=' => encoded.push_str("&#61;"),
                _ => encoded.push(c),
            }
        }
        encoded
    }

    /// Turn basic entities into their placeholders.
    pub fn preserve_basic_entities(text: &str) -> String {
        replace_all(text, &PRESERVE)
    }

    /// Turn placeholders back into basic entities, then optionally decode.
    pub fn restore_basic_entities(text: &str, decode_entities: bool) -> String {
        let restored = replace_all(text, &RESTORE);
        if decode_entities {
            Self::decode_entities(&restored)
        } else {
            restored
        }
    }
}

fn replace_all(text: &str, pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .fold(text.to_string(), |acc, &(from, to)| {
            if acc.contains(from) {
                acc.replace(from, to)
            } else {
                acc
            }
        })
}
