//! Markup for the quick links attached to a reply.

use tracing::debug;

use crate::client::types::Link;

/// Render backend links as a quick-link block. Phone links open in place,
/// everything else in a new tab. Returns an empty string for no links.
#[must_use]
pub fn render_links(links: &[Link]) -> String {
    let items: Vec<String> = links.iter().filter_map(render_link).collect();
    if items.is_empty() {
        return String::new();
    }
    format!(
        r#"<div class="mitraa-quick-links">{}</div>"#,
        items.concat()
    )
}

fn render_link(link: &Link) -> Option<String> {
    let url = link.url.trim();
    if !is_safe_url(url) {
        debug!("Dropping quick link with unsupported target: {url}");
        return None;
    }

    let anchor = if link.is_tel() {
        format!(
            r#"<a href="{}" class="mitraa-quick-link mitraa-quick-link-tel">{}</a>"#,
            html_escape(url),
            html_escape(&link.text)
        )
    } else {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="mitraa-quick-link">{}</a>"#,
            html_escape(url),
            html_escape(&link.text)
        )
    };

    let note = link
        .note
        .as_deref()
        .filter(|note| !note.trim().is_empty())
        .map(|note| format!(r#"<div class="mitraa-link-note">{}</div>"#, html_escape(note)))
        .unwrap_or_default();

    Some(format!("{anchor}{note}"))
}

fn is_safe_url(url: &str) -> bool {
    ["http://", "https://", "tel:", "mailto:"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}

/// Escape HTML special characters for safe embedding in markup.
fn html_escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}
