//! Tag file parsers.
//!
//! Both parsers are pure: they turn a file's bytes into a [`TagMap`]
//! fragment and leave it to the caller to decide which map receives it.

use crate::store::TagMap;
use lingua_core::{Element, MarkupError};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const TAG_ELEMENT: &str = "Tag";
const NAME_ATTRIBUTE: &str = "name";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `<Tag name="...">value</Tag>` entries under the root element.
    Markup,
    /// One `name value` pair per line.
    Legacy,
}

impl SourceFormat {
    /// Picks the parser for a file.
    ///
    /// Any name containing `.xml` counts as markup, so `foo.xml.txt` or
    /// `foo.xmlbackup` are read as markup too.
    pub fn from_file_name(name: &str) -> Self {
        if name.contains(".xml") {
            Self::Markup
        } else {
            Self::Legacy
        }
    }

    pub fn parse(self, bytes: &[u8]) -> Result<TagMap, MarkupError> {
        match self {
            Self::Markup => parse_markup(bytes),
            Self::Legacy => Ok(parse_legacy(bytes)),
        }
    }
}

/// Reads every root-level `Tag` element. A tag without a `name` attribute is
/// recorded under the empty name.
pub fn parse_markup(bytes: &[u8]) -> Result<TagMap, MarkupError> {
    let root = Element::from_bytes(bytes)?;
    Ok(root
        .children_named(TAG_ELEMENT)
        .map(|tag| {
            (
                tag.attribute(NAME_ATTRIBUTE).unwrap_or_default().to_string(),
                tag.content().to_string(),
            )
        })
        .collect())
}

/// Reads `name<space|tab>value` lines.
///
/// The name ends at the first space or tab and the value is everything after
/// that single separator, verbatim. A line without a separator maps its name
/// to the empty string. A leading UTF-8 BOM and a trailing `\r` are dropped.
pub fn parse_legacy(bytes: &[u8]) -> TagMap {
    let mut tags = TagMap::new();
    for line in bytes.split(|&b| b == b'\n') {
        let line = line.strip_prefix(&UTF8_BOM).unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            continue;
        }

        let line = String::from_utf8_lossy(line);
        match line.find([' ', '\t']) {
            Some(pos) => tags.insert(line[..pos].to_string(), line[pos + 1..].to_string()),
            None => tags.insert(line.into_owned(), String::new()),
        };
    }
    tags
}
