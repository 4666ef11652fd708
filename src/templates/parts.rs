//! Recognition of the archive members that carry template text.
//!
//! Only these names are ever opened for substitution; everything else in the
//! container (media, relationships, manifests) is copied through verbatim.

/// A text-bearing part of an office document archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplatePart {
    /// `word/document.xml`
    DocumentBody,
    /// `word/header.xml`, `word/header1.xml`, ...
    Header,
    /// `word/footer.xml`, `word/footer1.xml`, ...
    Footer,
    /// OpenDocument `content.xml`
    OdfContent,
    /// OpenDocument `styles.xml`
    OdfStyles,
}

impl TemplatePart {
    /// Classifies a member name, ignoring ASCII case. The whole name must
    /// match; a part nested under another directory is not recognized.
    pub fn classify(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "word/document.xml" => Some(TemplatePart::DocumentBody),
            "content.xml" => Some(TemplatePart::OdfContent),
            "styles.xml" => Some(TemplatePart::OdfStyles),
            _ if is_numbered(&name, "word/header") => Some(TemplatePart::Header),
            _ if is_numbered(&name, "word/footer") => Some(TemplatePart::Footer),
            _ => None,
        }
    }
}

/// `<prefix><digits>*.xml`
fn is_numbered(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|number| number.bytes().all(|b| b.is_ascii_digit()))
}
