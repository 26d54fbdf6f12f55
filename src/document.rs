//! Structured-document codec (C2): tokenizer, recursive-descent parser with
//! an explicit open-element stack, and a pretty-printing writer.
//!
//! Ported from `examples/original_source/src/XMLParser.cpp` and
//! `include/XMLParser.h` (token shapes, closed-schema validation) and from
//! `Vault`/`Directory`/`File::write_content` (tab-indented writer shape).

use crate::error::VaultError;

/// The closed set of tags this format recognizes. Any other tag name is a
/// fatal parse error — there is no extensibility escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Vault,
    Directory,
    File,
    Compressed,
    Encrypted,
}

impl Tag {
    fn from_name(name: &str) -> Option<Tag> {
        match name {
            "vault" => Some(Tag::Vault),
            "directory" => Some(Tag::Directory),
            "file" => Some(Tag::File),
            "compressed" => Some(Tag::Compressed),
            "encrypted" => Some(Tag::Encrypted),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Vault => "vault",
            Tag::Directory => "directory",
            Tag::File => "file",
            Tag::Compressed => "compressed",
            Tag::Encrypted => "encrypted",
        }
    }

    /// Required (and, in this schema, the complete set of allowed) attributes.
    fn required_attrs(self) -> &'static [&'static str] {
        match self {
            Tag::Vault => &["name"],
            Tag::Directory => &["name"],
            Tag::File => &["name", "data"],
            Tag::Compressed => &["originalSize", "data"],
            Tag::Encrypted => &["data", "nonce", "salt"],
        }
    }

    fn is_self_closing(self) -> bool {
        matches!(self, Tag::File | Tag::Compressed | Tag::Encrypted)
    }
}

/// A parsed (or to-be-serialized) element: a tag, its attributes in
/// writer-significant order, and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub tag: Tag,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Document>,
}

impl Document {
    pub fn new(tag: Tag, attrs: Vec<(String, String)>, children: Vec<Document>) -> Self {
        Document { tag, attrs, children }
    }

    /// Look up a required attribute. Parsing guarantees every required
    /// attribute of `self.tag` is present, so this never fails on a document
    /// that came out of [`parse`].
    pub fn attr(&self, key: &str) -> &str {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("attribute '{key}' missing from <{}> — schema invariant violated", self.tag.name()))
    }
}

// ---------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    OpenStart(String),
    Close(String),
    End,
    SelfClose,
    AttrName(String),
    AttrValue(String),
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

fn tokenize(input: &str) -> Result<Vec<Token>, VaultError> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut pos = 0usize;
    let mut tokens = Vec::new();

    while pos < len {
        if is_blank(chars[pos]) {
            pos += 1;
            continue;
        }
        match chars[pos] {
            '<' if chars.get(pos + 1) == Some(&'/') => {
                let start = pos;
                pos += 2;
                while pos < len && chars[pos] != '>' {
                    pos += 1;
                }
                if pos == len {
                    return Err(VaultError::BadArchive("unterminated closing tag".into()));
                }
                let name: String = chars[start + 2..pos].iter().collect();
                tokens.push(Token::Close(name));
                pos += 1;
            }
            '<' => {
                let start = pos;
                pos += 1;
                while pos < len && !is_blank(chars[pos]) && chars[pos] != '>' && chars[pos] != '/' {
                    pos += 1;
                }
                if pos == len {
                    return Err(VaultError::BadArchive("unterminated opening tag".into()));
                }
                let name: String = chars[start + 1..pos].iter().collect();
                tokens.push(Token::OpenStart(name));
            }
            '/' if chars.get(pos + 1) == Some(&'>') => {
                tokens.push(Token::SelfClose);
                pos += 2;
            }
            '>' => {
                tokens.push(Token::End);
                pos += 1;
            }
            '"' => {
                let start = pos;
                pos += 1;
                while pos < len && chars[pos] != '"' {
                    pos += 1;
                }
                if pos == len {
                    return Err(VaultError::BadArchive("unterminated quoted attribute value".into()));
                }
                let value: String = chars[start + 1..pos].iter().collect();
                tokens.push(Token::AttrValue(value));
                pos += 1;
            }
            _ => {
                let start = pos;
                while pos < len && chars[pos] != '=' {
                    if chars[pos] == '>' || chars[pos] == '<' {
                        return Err(VaultError::BadArchive("attribute badly formatted".into()));
                    }
                    pos += 1;
                }
                if pos == len {
                    return Err(VaultError::BadArchive("attribute name missing '='".into()));
                }
                let name: String = chars[start..pos].iter().collect();
                tokens.push(Token::AttrName(name));
                pos += 1;
            }
        }
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------

struct OpenElement {
    tag: Tag,
    attrs: Vec<(String, String)>,
    children: Vec<Document>,
}

/// Parse archive text into a validated document tree.
///
/// Unknown tags, unknown or duplicate attributes, missing required
/// attributes, mismatched open/close tags, and trailing content after the
/// root element all fail with [`VaultError::BadArchive`].
pub fn parse(input: &str) -> Result<Document, VaultError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(VaultError::BadArchive("empty document".into()));
    }

    let mut root: Option<Document> = None;
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut i = 0usize;

    let attach = |doc: Document, stack: &mut Vec<OpenElement>, root: &mut Option<Document>| -> Result<(), VaultError> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(doc);
                Ok(())
            }
            None => {
                if root.is_some() {
                    return Err(VaultError::BadArchive(
                        "unexpected content after the root element".into(),
                    ));
                }
                *root = Some(doc);
                Ok(())
            }
        }
    };

    while i < tokens.len() {
        match &tokens[i] {
            Token::Close(name) => {
                let tag = Tag::from_name(name)
                    .ok_or_else(|| VaultError::BadArchive(format!("unknown tag '{name}'")))?;
                let open = stack
                    .pop()
                    .ok_or_else(|| VaultError::BadArchive(format!("unexpected closing tag '{name}'")))?;
                if open.tag != tag {
                    return Err(VaultError::BadArchive(format!(
                        "expected closing tag '{}' but got '{}'",
                        open.tag.name(),
                        name
                    )));
                }
                let doc = Document::new(open.tag, open.attrs, open.children);
                attach(doc, &mut stack, &mut root)?;
                i += 1;
            }
            Token::OpenStart(name) => {
                let tag = Tag::from_name(name)
                    .ok_or_else(|| VaultError::BadArchive(format!("unknown tag '{name}'")))?;
                i += 1;
                let mut attrs: Vec<(String, String)> = Vec::new();
                let mut self_closed = false;

                loop {
                    match tokens.get(i) {
                        Some(Token::End) => {
                            i += 1;
                            break;
                        }
                        Some(Token::SelfClose) => {
                            self_closed = true;
                            i += 1;
                            break;
                        }
                        Some(Token::AttrName(attr_name)) => {
                            if !tag.required_attrs().contains(&attr_name.as_str()) {
                                return Err(VaultError::BadArchive(format!(
                                    "unknown attribute '{attr_name}' for tag '{}'",
                                    tag.name()
                                )));
                            }
                            if attrs.iter().any(|(k, _)| k == attr_name) {
                                return Err(VaultError::BadArchive(format!(
                                    "duplicate attribute '{attr_name}' for tag '{}'",
                                    tag.name()
                                )));
                            }
                            i += 1;
                            match tokens.get(i) {
                                Some(Token::AttrValue(value)) => {
                                    attrs.push((attr_name.clone(), value.clone()));
                                    i += 1;
                                }
                                _ => {
                                    return Err(VaultError::BadArchive(format!(
                                        "missing value for attribute '{attr_name}'"
                                    )))
                                }
                            }
                        }
                        _ => {
                            return Err(VaultError::BadArchive(format!(
                                "malformed opening tag '{}'",
                                tag.name()
                            )))
                        }
                    }
                }

                for required in tag.required_attrs() {
                    if !attrs.iter().any(|(k, _)| k == required) {
                        return Err(VaultError::BadArchive(format!(
                            "missing required attribute '{required}' for tag '{}'",
                            tag.name()
                        )));
                    }
                }

                if self_closed != tag.is_self_closing() {
                    return Err(VaultError::BadArchive(format!(
                        "tag '{}' {} be self-closing",
                        tag.name(),
                        if tag.is_self_closing() { "must" } else { "must not" }
                    )));
                }

                if self_closed {
                    attach(Document::new(tag, attrs, Vec::new()), &mut stack, &mut root)?;
                } else {
                    stack.push(OpenElement { tag, attrs, children: Vec::new() });
                }
            }
            other => {
                return Err(VaultError::BadArchive(format!("unexpected token {other:?}")));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(VaultError::BadArchive(format!(
            "missing closing tag for '{}'",
            open.tag.name()
        )));
    }

    root.ok_or_else(|| VaultError::BadArchive("missing root element".into()))
}

// ---------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------

/// Serialize a document tree back to archive text, tab-indented one level
/// per depth, matching the original writer's layout exactly.
pub fn write(doc: &Document) -> String {
    let mut out = String::new();
    write_node(doc, 0, &mut out);
    out
}

fn write_node(doc: &Document, indent: usize, out: &mut String) {
    let pad = "\t".repeat(indent);
    out.push_str(&pad);
    out.push('<');
    out.push_str(doc.tag.name());
    for (key, value) in &doc.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    if doc.tag.is_self_closing() {
        out.push_str("/>\n");
    } else {
        out.push_str(">\n");
        for child in &doc.children {
            write_node(child, indent + 1, out);
        }
        out.push_str(&pad);
        out.push_str("</");
        out.push_str(doc.tag.name());
        out.push_str(">\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_vault() {
        let text = "<vault name=\"v\">\n\t<file name=\"a.txt\" data=\"aGVsbG8=\"/>\n</vault>\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.tag, Tag::Vault);
        assert_eq!(doc.attr("name"), "v");
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.children[0].tag, Tag::File);
        assert_eq!(doc.children[0].attr("name"), "a.txt");
    }

    #[test]
    fn round_trips_through_writer() {
        let doc = Document::new(
            Tag::Vault,
            vec![("name".into(), "v".into())],
            vec![
                Document::new(Tag::File, vec![("name".into(), "a".into()), ("data".into(), "YQ==".into())], vec![]),
                Document::new(
                    Tag::Directory,
                    vec![("name".into(), "sub".into())],
                    vec![Document::new(Tag::File, vec![("name".into(), "b".into()), ("data".into(), "Yg==".into())], vec![])],
                ),
            ],
        );
        let text = write(&doc);
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn rejects_unknown_tag() {
        let text = "<vault name=\"x\"><link name=\"l\"/></vault>";
        assert!(matches!(parse(text), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn rejects_unknown_attribute() {
        let text = "<vault name=\"x\" extra=\"y\"></vault>";
        assert!(matches!(parse(text), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn rejects_duplicate_attribute() {
        let text = "<vault name=\"x\" name=\"y\"></vault>";
        assert!(matches!(parse(text), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn rejects_missing_required_attribute() {
        let text = "<file/>";
        assert!(matches!(parse(text), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn rejects_mismatched_close() {
        let text = "<vault name=\"x\"></directory>";
        assert!(matches!(parse(text), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn rejects_trailing_content() {
        let text = "<vault name=\"x\"></vault><vault name=\"y\"></vault>";
        assert!(matches!(parse(text), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(parse(""), Err(VaultError::BadArchive(_))));
    }

    #[test]
    fn self_closing_envelope_as_root() {
        let text = "<compressed originalSize=\"5\" data=\"AAAA\"/>";
        let doc = parse(text).unwrap();
        assert_eq!(doc.tag, Tag::Compressed);
        assert_eq!(doc.attr("originalSize"), "5");
    }
}
