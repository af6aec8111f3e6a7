//! Conversion of backend text into display markup.
//!
//! Backend replies mix plain text, light markdown and the occasional raw or
//! half-broken `<a>` tag. Every link is first brought back to markdown form so
//! one rule renders all anchors with the same safe attributes. The pipeline is
//! order-sensitive and stable: formatting already formatted output is a no-op.

use regex::{Captures, Regex};

/// Inline style carried by every anchor this formatter emits.
pub const LINK_STYLE: &str = "color: #FF6B35; text-decoration: underline;";

/// URL schemes that may become an anchor `href`.
const SAFE_SCHEMES: &str = r"(?:https?://|tel:|mailto:)";

/// Regex-driven formatter for chat messages.
#[derive(Clone, Debug)]
pub struct MessageFormatter {
    broken_anchor: Regex,
    html_anchor: Regex,
    allowed_tag: Regex,
    bold: Regex,
    markdown_link: Regex,
    anchor_element: Regex,
    bare_url: Regex,
    list_item: Regex,
}

impl MessageFormatter {
    /// Compile the formatting rules.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        let anchor_open = format!(
            r#"<a href="{SAFE_SCHEMES}[^"<>\s]*" target="_blank" rel="noopener noreferrer" style="{}">"#,
            regex::escape(LINK_STYLE)
        );

        Ok(Self {
            // `URL" target="_blank" ...>Link text`, the href prefix lost upstream.
            // A URL right after a quote sits in a well-formed href and is skipped.
            broken_anchor: Regex::new(
                r#"(^|[^"])(https?://[^\s"]+)"\s*target="_blank"[^>]*>([^<]+)(?:</a>)?"#,
            )?,

            html_anchor: Regex::new(r#"(?i)<a\s+href="(https?://[^"]+)"[^>]*>([^<]*)</a>"#)?,

            // Tags the pipeline itself produces; any other `<` is escaped.
            allowed_tag: Regex::new(&format!(r"^(?:</?strong>|<br>|</a>|{anchor_open})"))?,

            bold: Regex::new(r"\*\*(.*?)\*\*")?,

            // One level of balanced parentheses may appear inside the URL.
            markdown_link: Regex::new(&format!(
                r#"\[([^\]]*)\]\(({SAFE_SCHEMES}(?:[^\s"()<>]|\([^\s"()<>]*\))*)\)"#
            ))?,

            anchor_element: Regex::new(r"(?s)<a\s[^>]*>.*?</a>")?,

            // Only at the start or after whitespace/`>`, never inside `href="`.
            bare_url: Regex::new(r#"(^|[\s>])(https?://[^\s<>)"]+)"#)?,

            list_item: Regex::new(r"(^|<br>)- ")?,
        })
    }

    /// Format raw message text into display markup.
    #[must_use]
    pub fn format(&self, raw: &str) -> String {
        let text = self.broken_anchor.replace_all(raw, "${1}[${3}](${2})");
        let text = self.html_anchor.replace_all(&text, "[${2}](${1})");
        let text = self.neutralize_markup(&text);
        let text = self.bold.replace_all(&text, "<strong>${1}</strong>");
        let text = self
            .markdown_link
            .replace_all(&text, |caps: &Captures<'_>| anchor(&caps[2], &caps[1]));
        let text = self.link_bare_urls(&text);
        let text = text.replace("\r\n", "\n").replace('\n', "<br>");
        self.list_item.replace_all(&text, "${1}• ").into_owned()
    }

    /// Escape every `<` that does not open a tag this formatter emits.
    fn neutralize_markup(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for (idx, ch) in text.char_indices() {
            if ch == '<' && !self.allowed_tag.is_match(&text[idx..]) {
                out.push_str("&lt;");
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Auto-link bare URLs outside existing anchor elements.
    fn link_bare_urls(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for element in self.anchor_element.find_iter(text) {
            out.push_str(&self.link_bare_urls_in(&text[cursor..element.start()]));
            out.push_str(element.as_str());
            cursor = element.end();
        }
        out.push_str(&self.link_bare_urls_in(&text[cursor..]));
        out
    }

    fn link_bare_urls_in(&self, segment: &str) -> String {
        self.bare_url
            .replace_all(segment, |caps: &Captures<'_>| {
                format!("{}{}", &caps[1], anchor(&caps[2], &caps[2]))
            })
            .into_owned()
    }
}

fn anchor(url: &str, text: &str) -> String {
    format!(
        r#"<a href="{url}" target="_blank" rel="noopener noreferrer" style="{LINK_STYLE}">{text}</a>"#
    )
}

impl Default for MessageFormatter {
    /// Creates the formatter with the built-in rules.
    ///
    /// # Panics
    /// Panics if the built-in regex patterns are invalid (should never happen).
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::new().expect("Built-in formatter patterns should be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        let formatter = MessageFormatter::new().unwrap();
        assert_eq!(formatter.format("Namaste!"), "Namaste!");
        assert_eq!(formatter.format(""), "");
    }

    #[test]
    fn test_bold_and_bare_url() {
        let formatter = MessageFormatter::new().unwrap();
        let once = formatter.format("**Hello** visit https://example.com for info");
        assert_eq!(
            once,
            format!(
                "<strong>Hello</strong> visit {} for info",
                anchor("https://example.com", "https://example.com")
            )
        );
        assert_eq!(formatter.format(&once), once);
    }

    #[test]
    fn test_html_anchor_matches_markdown_link() {
        let formatter = MessageFormatter::new().unwrap();
        let from_html = formatter.format(r#"<a href="https://x.com">Click</a>"#);
        let from_markdown = formatter.format("[Click](https://x.com)");
        assert_eq!(from_html, from_markdown);
        assert_eq!(from_markdown, anchor("https://x.com", "Click"));
    }

    #[test]
    fn test_html_anchor_with_extra_attributes() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format(
            r#"See <A HREF="https://oorzaayatra.com/contact" target="_blank" class="x">Contact Us</a>."#,
        );
        assert_eq!(
            out,
            format!("See {}.", anchor("https://oorzaayatra.com/contact", "Contact Us"))
        );
    }

    #[test]
    fn test_broken_anchor_fragment_repaired() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format(
            r#"Register here: https://oorzaayatra.com/login" target="_blank" rel="noopener">Registration/Login</a> today"#,
        );
        assert_eq!(
            out,
            format!(
                "Register here: {} today",
                anchor("https://oorzaayatra.com/login", "Registration/Login")
            )
        );
    }

    #[test]
    fn test_markdown_links_idempotent() {
        let formatter = MessageFormatter::new().unwrap();
        for input in [
            "[Registration/Login](https://oorzaayatra.com/login)",
            "Call [Neha](tel:8010513511) or mail [us](mailto:oorzaayatra@m2t.ai)",
            "[**Bold link**](https://x.com/a?b=c&d=e)",
        ] {
            let once = formatter.format(input);
            assert_eq!(formatter.format(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_markdown_link_url_not_rewrapped() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format("[https://x.com](https://x.com)");
        assert_eq!(out, anchor("https://x.com", "https://x.com"));
        assert_eq!(out.matches("<a ").count(), 1);
    }

    #[test]
    fn test_markdown_link_with_parenthesized_path() {
        let formatter = MessageFormatter::new().unwrap();
        let once = formatter.format("[a](https://x.com/path_(x))");
        assert_eq!(once, anchor("https://x.com/path_(x)", "a"));
        assert_eq!(formatter.format(&once), once);

        let trailing = formatter.format("see [wiki](https://x.com/Kashi_(city)) today");
        assert_eq!(
            trailing,
            format!("see {} today", anchor("https://x.com/Kashi_(city)", "wiki"))
        );
    }

    #[test]
    fn test_bare_url_after_tag_close_and_newline() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format("**WhatsApp:**\nhttps://wa.me/919205661114");
        assert_eq!(
            out,
            format!(
                "<strong>WhatsApp:</strong><br>{}",
                anchor("https://wa.me/919205661114", "https://wa.me/919205661114")
            )
        );

        let tight = formatter.format("**Site:**https://oorzaayatra.com");
        assert!(tight.contains(&anchor("https://oorzaayatra.com", "https://oorzaayatra.com")));
    }

    #[test]
    fn test_closing_paren_ends_bare_url() {
        let formatter = MessageFormatter::new().unwrap();
        assert_eq!(
            formatter.format("(see https://x.com)"),
            format!("(see {})", anchor("https://x.com", "https://x.com"))
        );
    }

    #[test]
    fn test_newlines_and_bullets() {
        let formatter = MessageFormatter::new().unwrap();
        let once = formatter.format("Packages:\n- Char Dham\n- Kashi\n\n- Ayodhya");
        assert_eq!(
            once,
            "Packages:<br>• Char Dham<br>• Kashi<br><br>• Ayodhya"
        );
        assert_eq!(formatter.format(&once), once);
        assert_eq!(formatter.format("- first"), "• first");
        assert_eq!(formatter.format("a - b"), "a - b");
    }

    #[test]
    fn test_crlf_line_breaks() {
        let formatter = MessageFormatter::new().unwrap();
        assert_eq!(formatter.format("one\r\ntwo"), "one<br>two");
    }

    #[test]
    fn test_raw_markup_neutralized() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format(r#"<script>alert(1)</script><img src=x onerror="alert(1)">"#);
        assert!(!out.contains("<script"));
        assert!(!out.contains("<img"));
        assert!(out.starts_with("&lt;script>"));
        assert_eq!(formatter.format(&out), out);
    }

    #[test]
    fn test_unsafe_link_targets_not_linked() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format("[click](javascript:alert(1))");
        assert!(!out.contains("href"));

        let html = formatter.format(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!html.contains("<a"));
    }

    #[test]
    fn test_quote_cannot_escape_href() {
        let formatter = MessageFormatter::new().unwrap();
        let out = formatter.format(r#"go https://x.com"onmouseover="alert(1)"#);
        assert!(out.starts_with(&format!("go {}", anchor("https://x.com", "https://x.com"))));
        assert!(!out.contains(r#"href="https://x.com"onmouseover"#));
    }

    #[test]
    fn test_default_matches_new() {
        let formatter = MessageFormatter::default();
        assert_eq!(formatter.format("**a**"), "<strong>a</strong>");
    }
}
