//! Live preview
//!
//! The preview only ever sees canonical source. It is rendered two ways:
//!
//! - [`render_markup`] turns markup into plain text lines for the terminal.
//!   Active content (`script`, `style`, embedded frames and objects) is
//!   dropped, links are shown as text and nothing is fetched.
//! - [`sandboxed_document`] wraps the source in a host page that embeds it
//!   through `<iframe sandbox srcdoc=...>` for viewing in a browser.
//!
//! JSX is not transformed; it goes through the same markup pass.

use crate::color_space::{preview_background, Rgb};

/// Elements whose content never reaches the rendering
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "head", "svg", "canvas",
];

/// Elements that start and end a line
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "html", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "th", "thead",
    "tr", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Plain,
    Heading,
    ListItem,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub text: String,
    pub style: LineStyle,
}

/// Keeps the rendered preview in step with the canonical source
#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    revision: Option<u64>,
    source: String,
    lines: Vec<PreviewLine>,
    background: Option<Rgb>,
    render_count: u64,
}

impl PreviewRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render if the canonical revision moved. Returns whether it did.
    pub fn sync(&mut self, revision: u64, canonical: &str, palette: &[String]) -> bool {
        self.background = Some(preview_background(palette));
        if self.revision == Some(revision) {
            return false;
        }
        self.revision = Some(revision);
        self.source = canonical.to_string();
        self.lines = render_markup(canonical);
        self.render_count += 1;
        true
    }

    /// The source currently on display
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn lines(&self) -> &[PreviewLine] {
        &self.lines
    }

    pub fn background(&self) -> Rgb {
        self.background.unwrap_or(crate::color_space::DEFAULT_BACKGROUND)
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Host page for the current source
    pub fn document(&self) -> String {
        sandboxed_document(&self.source, self.background())
    }
}

/// Render markup to text lines
pub fn render_markup(source: &str) -> Vec<PreviewLine> {
    let mut out = LineBuilder::default();
    let mut rest = source;

    while let Some(pos) = rest.find('<') {
        out.push_text(&decode_entities(&rest[..pos]));
        rest = &rest[pos..];

        if let Some(after) = rest.strip_prefix("<!--") {
            rest = after.find("-->").map_or("", |end| &after[end + 3..]);
            continue;
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
            continue;
        }

        let Some(tag) = parse_tag(rest) else {
            // a lone '<' is text
            out.push_text("<");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[tag.len..];

        if !tag.closing && !tag.self_closing && SKIPPED_ELEMENTS.contains(&tag.name.as_str()) {
            rest = skip_element(rest, &tag.name);
            continue;
        }

        let name = tag.name.as_str();
        if name == "hr" {
            out.break_line();
            out.push_rule();
        } else if name == "br" {
            out.break_line();
        } else if BLOCK_ELEMENTS.contains(&name) {
            out.break_line();
            let styled = HEADINGS.contains(&name) || name == "li";
            if tag.closing && styled {
                out.style = LineStyle::Plain;
            } else if !tag.closing && HEADINGS.contains(&name) {
                out.style = LineStyle::Heading;
            } else if !tag.closing && name == "li" {
                out.style = LineStyle::ListItem;
            }
            if name == "pre" {
                out.preformatted = !tag.closing;
            }
        }
    }
    out.push_text(&decode_entities(rest));
    out.finish()
}

struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    /// Bytes consumed including the closing `>`
    len: usize,
}

/// Parse a tag starting at `<`. Attribute values in quotes and JSX `{...}`
/// expressions may contain `>`.
fn parse_tag(input: &str) -> Option<Tag> {
    let bytes = input.as_bytes();
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'-' | b'.' | b':' | b'_')) {
        i += 1;
    }
    let is_fragment = !closing && bytes.get(i) == Some(&b'>') && i == name_start;
    let is_closing_fragment = closing && bytes.get(i) == Some(&b'>') && i == name_start;
    if i == name_start && !is_fragment && !is_closing_fragment {
        return None;
    }
    if !bytes[name_start].is_ascii_alphabetic() && !is_fragment && !is_closing_fragment {
        return None;
    }
    let name = input[name_start..i].to_ascii_lowercase();

    let mut quote: Option<u8> = None;
    let mut braces = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => braces += 1,
                b'}' => braces = braces.saturating_sub(1),
                b'>' if braces == 0 => {
                    let self_closing = i > 0 && bytes[i - 1] == b'/';
                    return Some(Tag {
                        name,
                        closing,
                        self_closing,
                        len: i + 1,
                    });
                }
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Skip past the matching close tag of `name`, or to the end of input.
/// `</style` only matches when the name ends there, so `</styled>` is not a close.
fn skip_element<'a>(rest: &'a str, name: &str) -> &'a str {
    let lower = rest.to_ascii_lowercase();
    let needle = format!("</{name}");
    let close = lower.match_indices(&needle).map(|(start, _)| start).find(|start| {
        match lower.as_bytes().get(start + needle.len()) {
            Some(b) => *b == b'>' || *b == b'/' || b.is_ascii_whitespace(),
            None => true,
        }
    });
    match close {
        Some(start) => match rest[start..].find('>') {
            Some(end) => &rest[start + end + 1..],
            None => "",
        },
        None => "",
    }
}

/// Decode the entities generated markup commonly uses
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end + 1]).map(|c| (c, end + 2)));

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    Some(match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "mdash" => '—',
        "ndash" => '–',
        "hellip" => '…',
        "middot" => '·',
        "bull" => '•',
        "rarr" => '→',
        "larr" => '←',
        _ => return None,
    })
}

#[derive(Default)]
struct LineBuilder {
    lines: Vec<PreviewLine>,
    current: String,
    style: LineStyle,
    preformatted: bool,
}

impl LineBuilder {
    fn push_text(&mut self, text: &str) {
        if self.preformatted {
            let mut parts = text.split('\n');
            if let Some(first) = parts.next() {
                self.current.push_str(first);
            }
            for part in parts {
                self.flush(true);
                self.current.push_str(part);
            }
            return;
        }

        for c in text.chars() {
            if c.is_whitespace() && c != '\u{a0}' {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else {
                self.current.push(if c == '\u{a0}' { ' ' } else { c });
            }
        }
    }

    fn push_rule(&mut self) {
        self.lines.push(PreviewLine {
            text: "─".repeat(24),
            style: LineStyle::Rule,
        });
    }

    fn break_line(&mut self) {
        self.flush(false);
    }

    fn flush(&mut self, keep_blank: bool) {
        let text = if self.preformatted {
            self.current.trim_end().to_string()
        } else {
            self.current.trim().to_string()
        };
        self.current.clear();

        if text.is_empty() && !keep_blank {
            return;
        }

        let text = match self.style {
            LineStyle::ListItem => format!("• {text}"),
            _ => text,
        };
        self.lines.push(PreviewLine {
            text,
            style: self.style,
        });
        self.style = LineStyle::Plain;
    }

    fn finish(mut self) -> Vec<PreviewLine> {
        self.flush(false);
        self.lines
    }
}

/// Escape text for use inside a double-quoted HTML attribute
pub fn escape_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Host page that shows `source` inside a fully sandboxed frame.
///
/// The empty `sandbox` attribute denies scripts, forms, popups, top-level
/// navigation and same-origin access. The CSP additionally forbids scripts,
/// plugins and form posts in the host and, through inheritance, the frame.
pub fn sandboxed_document(source: &str, background: Rgb) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta http-equiv="Content-Security-Policy" content="script-src 'none'; object-src 'none'; base-uri 'none'; form-action 'none'">
<meta name="referrer" content="no-referrer">
<title>Live Preview</title>
<style>html,body{{margin:0;height:100%}}body{{background:{bg};padding:8px;box-sizing:border-box}}iframe{{width:100%;height:100%;border:none;border-radius:6px;background:#fff}}</style>
</head>
<body>
<iframe title="preview" sandbox="" referrerpolicy="no-referrer" srcdoc="{srcdoc}"></iframe>
</body>
</html>
"#,
        bg = background.to_hex(),
        srcdoc = escape_attribute(source),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        render_markup(source).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn test_simple_div() {
        assert_eq!(texts("<div>X</div>"), vec!["X"]);
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(texts("new text"), vec!["new text"]);
        assert!(texts("").is_empty());
    }

    #[test]
    fn test_scripts_and_styles_dropped() {
        let source = r#"<style>h1{color:red}</style><p>Hi</p><script>alert("x")</script><SCRIPT>x()</SCRIPT>"#;
        assert_eq!(texts(source), vec!["Hi"]);
    }

    #[test]
    fn test_close_tag_needs_exact_name() {
        let source = "<style>/* </styled> */ p{}</style ><p>Hi</p><template><x/></templates></template><p>Bye</p>";
        assert_eq!(texts(source), vec!["Hi", "Bye"]);
    }

    #[test]
    fn test_head_is_not_rendered() {
        let source = "<html><head><title>Generated UI</title><link href=\"x.css\"></head><body><h1>Card</h1></body></html>";
        let lines = render_markup(source);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Card");
        assert_eq!(lines[0].style, LineStyle::Heading);
    }

    #[test]
    fn test_entities_and_whitespace() {
        assert_eq!(texts("<p>Fish  &amp;\n chips &lt;3 &#x41;&#66; &bogus;</p>"), vec!["Fish & chips <3 AB &bogus;"]);
    }

    #[test]
    fn test_list_items_and_rules() {
        let lines = render_markup("<ul><li>One</li><li>Two</li></ul><hr/>");
        let rendered: Vec<_> = lines.iter().map(|l| (l.text.as_str(), l.style)).collect();
        assert_eq!(rendered[0], ("• One", LineStyle::ListItem));
        assert_eq!(rendered[1], ("• Two", LineStyle::ListItem));
        assert_eq!(rendered[2].1, LineStyle::Rule);
    }

    #[test]
    fn test_nested_block_keeps_list_style() {
        let lines = render_markup("<ol><li><p>Nested</p></li></ol><p>After</p>");
        assert_eq!(lines[0].text, "• Nested");
        assert_eq!(lines[1].style, LineStyle::Plain);
    }

    #[test]
    fn test_jsx_expression_attributes() {
        let source = r#"<button onClick={() => count > 1 && go()} className="btn">Buy</button>"#;
        assert_eq!(texts(source), vec!["Buy"]);
    }

    #[test]
    fn test_stray_angle_bracket() {
        assert_eq!(texts("a < b"), vec!["a < b"]);
    }

    #[test]
    fn test_renderer_follows_revision_only() {
        let mut renderer = PreviewRenderer::new();
        assert!(renderer.sync(1, "<p>one</p>", &[]));
        assert!(!renderer.sync(1, "<p>ignored</p>", &[]));
        assert_eq!(renderer.source(), "<p>one</p>");
        assert!(renderer.sync(2, "<p>two</p>", &[]));
        assert_eq!(renderer.lines()[0].text, "two");
        assert_eq!(renderer.render_count(), 2);
    }

    #[test]
    fn test_sandboxed_document_escapes_source() {
        let doc = sandboxed_document(r#"<p class="x">a & b</p>"#, Rgb::new(0, 0, 0));
        assert!(doc.contains(r#"srcdoc="&lt;p class=&quot;x&quot;&gt;a &amp; b&lt;/p&gt;""#));
        assert!(doc.contains(r#"sandbox="""#));
        assert!(doc.contains("background:#000000"));
        assert!(!doc.contains("allow-scripts"));
    }

    #[test]
    fn test_document_uses_palette_background() {
        let mut renderer = PreviewRenderer::new();
        renderer.sync(1, "<p/>", &["#ff0000".to_string()]);
        assert!(renderer.document().contains("background:#ff0000"));
    }
}
