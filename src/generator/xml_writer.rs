//! Indented XML element writer.
//!
//! Every element is written on its own line at `depth * 2` spaces and ends
//! with a newline. An element whose child callback produced nothing is
//! collapsed to the self-closing form, so `<delay/>` and `<model/>` come out
//! without the caller having to know in advance whether children exist.

use crate::generator::attributes::Attributes;
use html_escape::{encode_double_quoted_attribute, encode_text};

const INDENT: &str = "  ";

#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            depth: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn open_tag(&mut self, tag: &str, attrs: &Attributes) {
        self.indent();
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs.iter() {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            push_attribute_value(&mut self.out, value);
            self.out.push('"');
        }
    }

    /// Append text verbatim, without indentation or escaping.
    pub fn push_raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Write `<tag attrs>` + children + `</tag>`, or `<tag attrs/>` when the
    /// callback writes nothing.
    pub fn element<F>(&mut self, tag: &str, attrs: &Attributes, children: F)
    where
        F: FnOnce(&mut XmlWriter),
    {
        self.open_tag(tag, attrs);
        let mark = self.out.len();
        self.out.push_str(">\n");
        let body_start = self.out.len();

        self.depth += 1;
        children(self);
        self.depth -= 1;

        if self.out.len() == body_start {
            self.out.truncate(mark);
            self.out.push_str("/>\n");
        } else {
            self.indent();
            self.out.push_str("</");
            self.out.push_str(tag);
            self.out.push_str(">\n");
        }
    }

    pub fn empty_element(&mut self, tag: &str, attrs: &Attributes) {
        self.element(tag, attrs, |_| {});
    }

    /// `<tag attrs>text</tag>` on one line, with `text` escaped.
    pub fn text_element(&mut self, tag: &str, attrs: &Attributes, text: &str) {
        let escaped = encode_text(text);
        self.inline_element(tag, attrs, &escaped);
    }

    /// `<tag attrs>content</tag>` on one line, `content` written as is.
    pub fn inline_element(&mut self, tag: &str, attrs: &Attributes, content: &str) {
        self.open_tag(tag, attrs);
        self.out.push('>');
        self.out.push_str(content);
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// Write a stored XML fragment line by line at the current depth.
    ///
    /// Fragments are kept without their own leading indentation (see
    /// [`dedent_fragment`]); blank lines stay blank.
    pub fn fragment(&mut self, xml: &str) {
        for line in xml.lines() {
            if line.trim().is_empty() {
                self.out.push('\n');
                continue;
            }
            self.indent();
            self.out.push_str(line);
            self.out.push('\n');
        }
    }

    pub fn comment(&mut self, text: &str) {
        self.indent();
        self.out.push_str("<!-- ");
        self.out.push_str(&text.replace("--", "- -"));
        self.out.push_str(" -->\n");
    }
}

/// Escape an attribute value. Tabs and line breaks become character
/// references; attribute-value normalization would turn them into spaces.
fn push_attribute_value(out: &mut String, value: &str) {
    for c in encode_double_quoted_attribute(value).chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
}

/// Strip `columns` leading spaces from every line but the first.
///
/// A fragment sliced out of an indented document starts right at its `<`,
/// while its continuation lines carry the indentation of the surrounding
/// element. Removing that indentation makes [`XmlWriter::fragment`] put it
/// back unchanged.
pub fn dedent_fragment(xml: &str, columns: usize) -> String {
    let mut out = String::with_capacity(xml.len());
    for (i, line) in xml.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            let leading = line.len() - line.trim_start_matches(' ').len();
            out.push_str(&line[leading.min(columns)..]);
        } else {
            out.push_str(line);
        }
    }
    out
}
