use std::collections::HashMap;

pub type TagMap = HashMap<String, String>;

/// Which of the two tag maps a load targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagScope {
    /// Tags of the active language, rebuilt on every switch.
    Language,
    /// Overrides supplied by the application, kept across switches.
    User,
}

/// The active-language tags and the user overrides.
///
/// Lookups consult the user overrides first.
#[derive(Debug, Default, Clone)]
pub struct TagStore {
    language: TagMap,
    user: TagMap,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.user
            .get(tag)
            .or_else(|| self.language.get(tag))
            .map(String::as_str)
    }

    /// Merges a parsed fragment into the chosen map; later values win.
    pub fn merge(&mut self, scope: TagScope, fragment: TagMap) {
        self.map_mut(scope).extend(fragment);
    }

    pub fn set_language_tags(&mut self, tags: TagMap) {
        self.language = tags;
    }

    pub fn clear_language_tags(&mut self) {
        self.language.clear();
    }

    pub fn add_user_tag(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.user.insert(tag.into(), value.into());
    }

    pub fn clear_user_tags(&mut self) {
        self.user.clear();
    }

    pub fn language_tags(&self) -> &TagMap {
        &self.language
    }

    pub fn user_tags(&self) -> &TagMap {
        &self.user
    }

    fn map_mut(&mut self, scope: TagScope) -> &mut TagMap {
        match scope {
            TagScope::Language => &mut self.language,
            TagScope::User => &mut self.user,
        }
    }
}
