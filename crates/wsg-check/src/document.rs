/// Lightweight HTML extraction.
///
/// This is a tag scanner, not a DOM: it walks start/end tags left to right with a regex,
/// skips comments, treats `<script>`, `<style>` and `<title>` bodies as raw text, and
/// records only the facts the checks consume. Malformed markup degrades to fewer facts;
/// the scanner never panics.
use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("document contains no HTML elements")]
    NoElements,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub is_async: bool,
    pub defer: bool,
    pub module: bool,
    pub in_head: bool,
    /// Length of the inline body; 0 for external scripts.
    pub inline_bytes: usize,
}

impl ScriptTag {
    /// A classic script in `<head>` that blocks parsing until it has loaded and run.
    pub fn is_render_blocking(&self) -> bool {
        self.in_head && self.src.is_some() && !self.is_async && !self.defer && !self.module
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StylesheetLink {
    pub href: String,
    pub media: Option<String>,
    pub in_head: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageTag {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub loading: Option<String>,
    pub has_dimensions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageDocument {
    pub title: Option<String>,
    pub lang: Option<String>,
    /// `<meta name|property=... content=...>` keyed by lower-cased name.
    pub meta: BTreeMap<String, String>,
    pub has_viewport: bool,
    pub scripts: Vec<ScriptTag>,
    pub stylesheets: Vec<StylesheetLink>,
    pub inline_styles: Vec<String>,
    pub images: Vec<ImageTag>,
    pub links: Vec<String>,
    /// Start tags seen, keyed by lower-cased element name.
    pub element_counts: BTreeMap<String, usize>,
    pub html_bytes: usize,
}

impl PageDocument {
    pub fn count(&self, element: &str) -> usize {
        self.element_counts.get(element).copied().unwrap_or(0)
    }

    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }
}

type Attributes = BTreeMap<String, String>;

/// Scan `html` into a `PageDocument`.
pub fn parse_document(html: &str) -> Result<PageDocument, DocumentError> {
    let comment_re = Regex::new(r"(?s)<!--.*?-->").expect("valid regex");
    let tag_re = Regex::new(r#"<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
        .expect("valid regex");
    let attr_re = Regex::new(
        r#"([A-Za-z_:@][-A-Za-z0-9_:.@]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#,
    )
    .expect("valid regex");

    let stripped = comment_re.replace_all(html, "");
    let source: &str = &stripped;
    let lower = source.to_ascii_lowercase();

    let mut doc = PageDocument {
        html_bytes: html.len(),
        ..PageDocument::default()
    };
    let mut in_head = false;
    let mut saw_element = false;
    let mut pos = 0;

    while let Some(caps) = tag_re.captures_at(source, pos) {
        let whole = caps.get(0).expect("group 0 always present");
        pos = whole.end();
        saw_element = true;

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();

        if closing {
            if name == "head" {
                in_head = false;
            }
            continue;
        }

        let attrs = parse_attributes(&attr_re, &caps[3]);
        *doc.element_counts.entry(name.clone()).or_insert(0) += 1;

        match name.as_str() {
            "html" => {
                doc.lang = attrs
                    .get("lang")
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty());
            }
            "head" => in_head = true,
            "body" => in_head = false,
            "title" => {
                let (body, next) = raw_text(source, &lower, pos, "title");
                if doc.title.is_none() {
                    doc.title = Some(collapse_whitespace(body)).filter(|t| !t.is_empty());
                }
                pos = next;
            }
            "script" => {
                let (body, next) = raw_text(source, &lower, pos, "script");
                let kind = attrs.get("type").map(|t| t.to_ascii_lowercase());
                doc.scripts.push(ScriptTag {
                    src: attrs.get("src").cloned(),
                    is_async: attrs.contains_key("async"),
                    defer: attrs.contains_key("defer"),
                    module: kind.as_deref() == Some("module"),
                    in_head,
                    inline_bytes: if attrs.contains_key("src") { 0 } else { body.len() },
                });
                pos = next;
            }
            "style" => {
                let (body, next) = raw_text(source, &lower, pos, "style");
                doc.inline_styles.push(body.to_string());
                pos = next;
            }
            "meta" => {
                let key = attrs.get("name").or_else(|| attrs.get("property"));
                if let (Some(key), Some(content)) = (key, attrs.get("content")) {
                    let key = key.to_ascii_lowercase();
                    if key == "viewport" {
                        doc.has_viewport = true;
                    }
                    doc.meta.entry(key).or_insert_with(|| content.clone());
                }
            }
            "link" => {
                let is_stylesheet = attrs.get("rel").is_some_and(|rel| {
                    rel.split_whitespace()
                        .any(|r| r.eq_ignore_ascii_case("stylesheet"))
                });
                if let (true, Some(href)) = (is_stylesheet, attrs.get("href")) {
                    doc.stylesheets.push(StylesheetLink {
                        href: href.clone(),
                        media: attrs.get("media").cloned(),
                        in_head,
                    });
                }
            }
            "img" => doc.images.push(ImageTag {
                src: attrs.get("src").cloned(),
                alt: attrs.get("alt").cloned(),
                loading: attrs.get("loading").map(|l| l.to_ascii_lowercase()),
                has_dimensions: attrs.contains_key("width") && attrs.contains_key("height"),
            }),
            "a" => {
                if let Some(href) = attrs.get("href") {
                    doc.links.push(href.clone());
                }
            }
            _ => {}
        }
    }

    if !saw_element {
        return Err(DocumentError::NoElements);
    }
    Ok(doc)
}

fn parse_attributes(attr_re: &Regex, raw: &str) -> Attributes {
    let mut attrs = Attributes::new();
    for caps in attr_re.captures_iter(raw) {
        let name = caps[1].to_ascii_lowercase();
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        // first occurrence wins, as in browsers
        attrs.entry(name).or_insert(value);
    }
    attrs
}

/// Body of a raw-text element starting at `from`, and the offset just past its end tag.
/// An unterminated element runs to the end of input.
fn raw_text<'a>(source: &'a str, lower: &str, from: usize, element: &str) -> (&'a str, usize) {
    let end_tag = format!("</{element}");
    match lower[from..].find(&end_tag) {
        Some(rel) => {
            let body_end = from + rel;
            let after = lower[body_end..]
                .find('>')
                .map(|gt| body_end + gt + 1)
                .unwrap_or(source.len());
            (&source[from..body_end], after)
        }
        None => (&source[from..], source.len()),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="Description" content="A small test page">
  <meta property="og:title" content="Test">
  <title>
    Hello   world
  </title>
  <link rel="stylesheet" href="/site.css">
  <link rel="preload stylesheet" href="/dark.css" media="(prefers-color-scheme: dark)">
  <link rel="icon" href="/favicon.ico">
  <script src="/blocking.js"></script>
  <script src="/deferred.js" defer></script>
  <script type="module" src="/app.mjs"></script>
  <script>if (a < b) { document.write("<p>not a tag</p>"); }</script>
  <style>@media (prefers-reduced-motion: reduce) { * { animation: none; } }</style>
</head>
<body>
  <!-- <img src="commented-out.png"> -->
  <main>
    <img src="/a.png" alt="A" loading="lazy" width="10" height="10">
    <img src='/b.png'>
    <a href="/about">About</a>
    <script async src="https://analytics.example.net/t.js"></script>
  </main>
</body>
</html>"#;

    #[test]
    fn extracts_head_metadata() {
        let doc = parse_document(PAGE).unwrap();
        assert_eq!(doc.lang.as_deref(), Some("en"));
        assert_eq!(doc.title.as_deref(), Some("Hello world"));
        assert!(doc.has_viewport);
        assert_eq!(doc.meta("description"), Some("A small test page"));
        assert_eq!(doc.meta("og:title"), Some("Test"));
        assert_eq!(doc.html_bytes, PAGE.len());
    }

    #[test]
    fn classifies_scripts() {
        let doc = parse_document(PAGE).unwrap();
        assert_eq!(doc.scripts.len(), 5);

        let blocking: Vec<_> = doc.scripts.iter().filter(|s| s.is_render_blocking()).collect();
        assert_eq!(blocking.len(), 1);
        assert_eq!(blocking[0].src.as_deref(), Some("/blocking.js"));

        assert!(doc.scripts[1].defer);
        assert!(doc.scripts[2].module);
        assert!(doc.scripts[3].inline_bytes > 0);
        assert!(!doc.scripts[4].in_head);
        assert!(doc.scripts[4].is_async);
    }

    #[test]
    fn script_bodies_are_not_scanned_for_tags() {
        let doc = parse_document(PAGE).unwrap();
        assert_eq!(doc.count("p"), 0);
    }

    #[test]
    fn collects_stylesheets_images_and_links() {
        let doc = parse_document(PAGE).unwrap();
        assert_eq!(doc.stylesheets.len(), 2);
        assert_eq!(
            doc.stylesheets[1].media.as_deref(),
            Some("(prefers-color-scheme: dark)")
        );
        assert_eq!(doc.inline_styles.len(), 1);
        assert!(doc.inline_styles[0].contains("prefers-reduced-motion"));

        assert_eq!(doc.images.len(), 2, "commented-out image must be ignored");
        assert_eq!(doc.images[0].loading.as_deref(), Some("lazy"));
        assert!(doc.images[0].has_dimensions);
        assert_eq!(doc.images[1].src.as_deref(), Some("/b.png"));
        assert!(doc.images[1].alt.is_none());

        assert_eq!(doc.links, vec!["/about".to_string()]);
        assert_eq!(doc.count("main"), 1);
    }

    #[test]
    fn plain_text_is_rejected() {
        assert_eq!(parse_document("no markup here"), Err(DocumentError::NoElements));
        assert_eq!(parse_document(""), Err(DocumentError::NoElements));
    }

    #[test]
    fn unterminated_script_runs_to_end() {
        let doc = parse_document("<html><script>var x = '<div>';").unwrap();
        assert_eq!(doc.scripts.len(), 1);
        assert_eq!(doc.count("div"), 0);
    }
}
