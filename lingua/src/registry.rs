//! Language packs and the registration markup that declares them.

use lingua_core::Element;
use std::collections::BTreeMap;

pub const LANGUAGE_ELEMENT: &str = "Language";
const INFO_ELEMENT: &str = "Info";
const SOURCE_ELEMENT: &str = "Source";
const DEFAULT_ATTRIBUTE: &str = "default";
const NAME_ATTRIBUTE: &str = "name";

/// Ordered source files per language name.
#[derive(Debug, Default, Clone)]
pub struct LanguagePackRegistry {
    packs: BTreeMap<String, Vec<String>>,
}

impl LanguagePackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `file` to the pack of `language`, creating the pack if needed.
    pub fn add_source(&mut self, language: &str, file: &str) {
        self.packs
            .entry(language.to_string())
            .or_default()
            .push(file.to_string());
    }

    pub fn sources(&self, language: &str) -> Option<&[String]> {
        self.packs.get(language).map(Vec::as_slice)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.packs.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

/// One `Source` entry of a registration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDecl {
    /// Under an `Info` without a name: loaded straight into the user tags.
    User(String),
    /// Under a named `Info`: appended to that language's pack.
    Language { language: String, file: String },
}

/// Everything a registration file declares, in document order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackDeclarations {
    pub default_language: Option<String>,
    pub sources: Vec<SourceDecl>,
}

/// Walks the `Language` children of `root`.
///
/// A later `default` attribute replaces an earlier one, and an empty value
/// clears it. Unknown elements are skipped.
pub fn read_declarations(root: &Element) -> PackDeclarations {
    let mut declarations = PackDeclarations::default();

    for language in root.children_named(LANGUAGE_ELEMENT) {
        if let Some(default) = language.attribute(DEFAULT_ATTRIBUTE) {
            declarations.default_language = Some(default.to_string()).filter(|d| !d.is_empty());
        }

        for info in language.children_named(INFO_ELEMENT) {
            let name = info.attribute(NAME_ATTRIBUTE).unwrap_or_default();
            for source in info.children_named(SOURCE_ELEMENT) {
                let file = source.content().to_string();
                declarations.sources.push(if name.is_empty() {
                    SourceDecl::User(file)
                } else {
                    SourceDecl::Language {
                        language: name.to_string(),
                        file,
                    }
                });
            }
        }
    }

    declarations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keeps_order() {
        let mut registry = LanguagePackRegistry::new();
        registry.add_source("Russian", "ru.xml");
        registry.add_source("English", "en.xml");
        registry.add_source("English", "en_extra.txt");

        assert_eq!(
            registry.sources("English").unwrap(),
            &["en.xml".to_string(), "en_extra.txt".to_string()]
        );
        assert!(registry.contains("Russian"));
        assert!(registry.sources("German").is_none());
        assert_eq!(registry.languages().count(), 2);
    }

    #[test]
    fn test_read_declarations() {
        let root = Element::parse(
            r#"<MyGUI type="Language">
                <Language default="English">
                    <Info name="English">
                        <Source>en.xml</Source>
                        <Source>en_extra.txt</Source>
                    </Info>
                    <Info>
                        <Source>user.txt</Source>
                    </Info>
                    <Unknown><Source>ignored.txt</Source></Unknown>
                </Language>
                <Language>
                    <Info name="Russian"><Source>ru.xml</Source></Info>
                </Language>
            </MyGUI>"#,
        )
        .unwrap();

        let declarations = read_declarations(&root);
        assert_eq!(declarations.default_language.as_deref(), Some("English"));
        assert_eq!(
            declarations.sources,
            vec![
                SourceDecl::Language {
                    language: "English".into(),
                    file: "en.xml".into()
                },
                SourceDecl::Language {
                    language: "English".into(),
                    file: "en_extra.txt".into()
                },
                SourceDecl::User("user.txt".into()),
                SourceDecl::Language {
                    language: "Russian".into(),
                    file: "ru.xml".into()
                },
            ]
        );
    }

    #[test]
    fn test_empty_default_is_absent() {
        let root = Element::parse(
            r#"<Root>
                <Language default="English"/>
                <Language default=""/>
            </Root>"#,
        )
        .unwrap();
        assert_eq!(read_declarations(&root).default_language, None);

        let root = Element::parse("<Root><Other/></Root>").unwrap();
        assert_eq!(read_declarations(&root), PackDeclarations::default());
    }
}
