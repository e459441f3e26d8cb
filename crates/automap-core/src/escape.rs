//! HTML escaping for popup markup.

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(&mut out, text);
    out
}

pub fn escape_html_into(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        let esc = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&#39;",
            _ => continue,
        };
        if start < i {
            out.push_str(&text[start..i]);
        }
        out.push_str(esc);
        start = i + 1;
    }
    if start < text.len() {
        out.push_str(&text[start..]);
    }
}

/// Attribute values share the text escaping; URLs are not percent-encoded here.
pub fn escape_attr_into(out: &mut String, text: &str) {
    escape_html_into(out, text);
}

/// Escapes an attribute value that may already contain character references.
///
/// `&name;`, `&#NN;` and `&#xHH;` are kept as they are; every other `&` and markup character is
/// escaped. Used for URL prefixes that pages hand over already HTML-encoded.
pub fn escape_attr_preserving_entities_into(out: &mut String, text: &str) {
    let mut i = 0usize;
    while let Some(rel) = text[i..].find('&') {
        let amp = i + rel;
        escape_html_into(out, &text[i..amp]);

        let tail = &text[amp + 1..];
        if let Some(semi) = tail.find(';') {
            if is_char_reference(&tail[..semi]) {
                out.push_str(&text[amp..=amp + 1 + semi]);
                i = amp + 2 + semi;
                continue;
            }
        }

        out.push_str("&amp;");
        i = amp + 1;
    }
    escape_html_into(out, &text[i..]);
}

fn is_char_reference(entity: &str) -> bool {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit());
    }
    !entity.is_empty() && entity.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">Fish & 'Chips'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Fish &amp; &#39;Chips&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("Zürich & co"), "Zürich &amp; co");
    }

    #[test]
    fn keeps_existing_character_references() {
        let mut out = String::new();
        escape_attr_preserving_entities_into(
            &mut out,
            "/cgi?do=create&amp;from=a&b&#38;c&#x26;d&;e\"",
        );
        assert_eq!(out, "/cgi?do=create&amp;from=a&amp;b&#38;c&#x26;d&amp;;e&quot;");
    }
}
