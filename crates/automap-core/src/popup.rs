use crate::escape::{escape_attr_into, escape_attr_preserving_entities_into, escape_html_into};
use crate::point::Point;

/// Link context for one popup.
#[derive(Debug, Clone, Copy)]
pub struct PopupContext<'a> {
    /// Prefix for page links, already normalized to end with `/` (or empty).
    pub base_url: &'a str,
    /// The page currently being viewed.
    pub page: &'a str,
    /// Prefix of the page-creation URL; the target page is appended as `&page=<name>`. Character
    /// references already present (`&amp;`) are kept, so HTML-encoded prefixes work as given.
    pub create_url: &'a str,
}

/// Builds a marker's popup HTML.
///
/// - missing page: `?` create-link (nofollow) followed by the title, in a `createlink` span
/// - the viewed page itself: the title in a `selflink` span, no hyperlink
/// - otherwise: a hyperlink to `base_url + page`
///
/// The first line is wrapped in `<b>`; the address, when present, follows a `<br/>`.
pub fn popup_html(point: &Point, ctx: &PopupContext<'_>) -> String {
    let title = point.display_title();
    let mut out = String::with_capacity(64 + title.len() + point.page.len());
    out.push_str("<b>");
    if point.create {
        out.push_str(r#"<span class="createlink"><a href=""#);
        escape_attr_preserving_entities_into(&mut out, ctx.create_url);
        out.push_str("&amp;page=");
        escape_attr_into(&mut out, &point.page);
        out.push_str(r#"" rel="nofollow">?</a>"#);
        escape_html_into(&mut out, title);
        out.push_str("</span>");
    } else if point.page == ctx.page {
        out.push_str(r#"<span class="selflink">"#);
        escape_html_into(&mut out, title);
        out.push_str("</span>");
    } else {
        out.push_str(r#"<a href=""#);
        escape_attr_into(&mut out, ctx.base_url);
        escape_attr_into(&mut out, &point.page);
        out.push_str(r#"">"#);
        escape_html_into(&mut out, title);
        out.push_str("</a>");
    }
    out.push_str("</b>");

    if let Some(address) = point.address.as_deref() {
        out.push_str("<br/>");
        escape_html_into(&mut out, address);
    }
    out
}

/// Joins a configured base URL with page names: non-empty bases get a trailing `/`.
pub fn normalize_base_url(base_url: &str) -> String {
    if base_url.is_empty() || base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PopupContext<'static> {
        PopupContext {
            base_url: "/wiki/",
            page: "places/home",
            create_url: "/ikiwiki.cgi?do=create&from=places",
        }
    }

    #[test]
    fn linked_page() {
        let p = Point::new("1", 0.0, 0.0)
            .with_page("places/pub")
            .with_title("The Pub");
        assert_eq!(
            popup_html(&p, &ctx()),
            r#"<b><a href="/wiki/places/pub">The Pub</a></b>"#
        );
    }

    #[test]
    fn self_page_is_not_linked() {
        let p = Point::new("1", 0.0, 0.0)
            .with_page("places/home")
            .with_title("Home");
        let html = popup_html(&p, &ctx());
        assert_eq!(html, r#"<b><span class="selflink">Home</span></b>"#);
        assert!(!html.contains("href"));
    }

    #[test]
    fn missing_page_gets_create_link() {
        let p = Point::new("1", 0.0, 0.0)
            .with_page("places/new")
            .with_title("New Place")
            .creating();
        let html = popup_html(&p, &ctx());
        assert_eq!(
            html,
            concat!(
                r#"<b><span class="createlink"><a href="/ikiwiki.cgi?do=create&amp;from=places&amp;page=places/new" rel="nofollow">?</a>"#,
                r#"New Place</span></b>"#
            )
        );
        assert!(!html.contains(r#"href="/wiki/places/new""#));
    }

    #[test]
    fn encoded_create_url_is_not_encoded_twice() {
        let ctx = PopupContext {
            create_url: "/ikiwiki.cgi?do=create&amp;from=places",
            ..ctx()
        };
        let p = Point::new("1", 0.0, 0.0).with_page("places/new").creating();
        let html = popup_html(&p, &ctx);
        assert!(!html.contains("&amp;amp;"), "{html}");
        assert!(html.contains(
            r#"href="/ikiwiki.cgi?do=create&amp;from=places&amp;page=places/new""#
        ));
    }

    #[test]
    fn create_wins_over_self_reference() {
        let p = Point::new("1", 0.0, 0.0).with_page("places/home").creating();
        assert!(popup_html(&p, &ctx()).contains("createlink"));
    }

    #[test]
    fn address_on_second_line_and_text_escaped() {
        let p = Point::new("1", 0.0, 0.0)
            .with_page("a&b")
            .with_title("<Fish & Chips>")
            .with_address("1 Main St");
        assert_eq!(
            popup_html(&p, &ctx()),
            r#"<b><a href="/wiki/a&amp;b">&lt;Fish &amp; Chips&gt;</a></b><br/>1 Main St"#
        );
    }

    #[test]
    fn base_url_normalization() {
        assert_eq!(normalize_base_url(""), "");
        assert_eq!(normalize_base_url("/wiki"), "/wiki/");
        assert_eq!(normalize_base_url("/wiki/"), "/wiki/");
    }
}
