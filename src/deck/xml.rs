//! Small XML helpers shared by the deck modules.

use crate::error::Pdf2DeckError;
use quick_xml::events::BytesStart;

/// Escape XML special characters and drop characters XML 1.0 does not
/// allow (C0 controls other than tab, LF and CR, plus U+FFFE/U+FFFF).
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    !matches!(c, '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

pub(crate) fn malformed(part: &str, detail: impl ToString) -> Pdf2DeckError {
    Pdf2DeckError::MalformedXml {
        part: part.to_string(),
        detail: detail.to_string(),
    }
}

/// An element's attributes as `(qualified name, unescaped value)` pairs.
pub(crate) fn attributes(
    e: &BytesStart<'_>,
    part: &str,
) -> Result<Vec<(String, String)>, Pdf2DeckError> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(part, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(part, err))?
            .into_owned();
        out.push((key, value));
    }
    Ok(out)
}

/// Value of the unprefixed attribute `name`.
pub(crate) fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Value of a namespaced attribute whose local part is `local`, e.g. `r:id`.
pub(crate) fn prefixed_attr<'a>(attrs: &'a [(String, String)], local: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| {
            k.split_once(':')
                .is_some_and(|(prefix, l)| prefix != "xmlns" && l == local)
        })
        .map(|(_, v)| v.as_str())
}
