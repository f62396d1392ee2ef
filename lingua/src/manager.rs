use crate::error::LinguaError;
use crate::format::SourceFormat;
use crate::registry::{LANGUAGE_ELEMENT, LanguagePackRegistry, SourceDecl, read_declarations};
use crate::resolver::TagResolver;
use crate::resource::{TagHandlerRegistry, read_source};
use crate::store::{TagScope, TagStore};
use anyhow::Context;
use lingua_core::{Element, StreamSource};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

pub type LanguageChangedListener = Box<dyn FnMut(&str)>;
pub type UnresolvedTagHandler = Box<dyn FnMut(&str) -> Option<String>>;
pub type SharedLanguageManager = Rc<RefCell<LanguageManager>>;

/// Handle returned by [`LanguageManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registry of language packs plus the tag maps they fill.
///
/// Everything runs on the calling thread. Listeners and the unresolved-tag
/// handler are called while the manager is mutably borrowed, so they must not
/// reach back into a shared manager.
pub struct LanguageManager {
    source: Box<dyn StreamSource>,
    registry: LanguagePackRegistry,
    tags: TagStore,
    current: String,
    resolver: TagResolver,
    listeners: Vec<(ListenerId, LanguageChangedListener)>,
    next_listener: u64,
    unresolved: Option<UnresolvedTagHandler>,
    attached: bool,
}

impl fmt::Debug for LanguageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageManager")
            .field("registry", &self.registry)
            .field("tags", &self.tags)
            .field("current", &self.current)
            .field("resolver", &self.resolver)
            .field("listeners", &self.listeners.len())
            .field("unresolved", &self.unresolved.is_some())
            .field("attached", &self.attached)
            .finish()
    }
}

impl LanguageManager {
    pub fn new(source: impl StreamSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            registry: LanguagePackRegistry::new(),
            tags: TagStore::new(),
            current: String::new(),
            resolver: TagResolver::default(),
            listeners: Vec::new(),
            next_listener: 0,
            unresolved: None,
            attached: false,
        }
    }

    /// Sets the pass bound of [`resolve`](Self::resolve); 0 means unbounded.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.resolver = TagResolver::new(max_passes);
        self
    }

    pub fn into_shared(self) -> SharedLanguageManager {
        Rc::new(RefCell::new(self))
    }

    /// Registers the `Language` load handler with `registry`.
    ///
    /// The handler holds a weak reference and fails once the manager is gone
    /// or while it is already borrowed. Attaching a manager that is borrowed
    /// elsewhere is logged and skipped.
    pub fn attach(manager: &SharedLanguageManager, registry: &mut dyn TagHandlerRegistry) {
        let Ok(mut this) = manager.try_borrow_mut() else {
            warn!("LanguageManager is already borrowed, not attaching");
            return;
        };
        if this.attached {
            warn!("LanguageManager is already attached");
            return;
        }
        info!("* Initialise: LanguageManager");

        let weak = Rc::downgrade(manager);
        registry.register_handler(
            LANGUAGE_ELEMENT,
            Box::new(move |root: &Element, file: &str| {
                let manager = weak.upgrade().context("language manager was dropped")?;
                let mut manager = manager
                    .try_borrow_mut()
                    .context("language manager is already borrowed")?;
                debug!("loading language registration '{}'", file);
                manager.ingest_markup(root);
                Ok(())
            }),
        );

        this.attached = true;
        info!("LanguageManager successfully initialized");
    }

    /// Removes the handler installed by [`attach`](Self::attach).
    pub fn detach(&mut self, registry: &mut dyn TagHandlerRegistry) {
        if !self.attached {
            warn!("LanguageManager is not attached");
            return;
        }
        info!("* Shutdown: LanguageManager");
        registry.unregister_handler(LANGUAGE_ELEMENT);
        self.attached = false;
        info!("LanguageManager successfully shutdown");
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Applies a registration document.
    ///
    /// Named sources extend their language pack and are hot-loaded when they
    /// belong to the active language. Anonymous sources go straight into the
    /// user tags. Afterwards the document's `default` language is activated;
    /// without one, listeners are notified if anything was hot-loaded.
    pub fn ingest_markup(&mut self, root: &Element) {
        let declarations = read_declarations(root);
        let mut changed = false;

        for declaration in &declarations.sources {
            match declaration {
                SourceDecl::User(file) => {
                    changed |= self.load_language(file, TagScope::User).is_ok();
                }
                SourceDecl::Language { language, file } => {
                    self.registry.add_source(language, file);
                    if *language == self.current {
                        // failures are logged by load_language
                        let _ = self.load_language(file, TagScope::Language);
                        changed = true;
                    }
                }
            }
        }

        if let Some(default) = &declarations.default_language {
            // an unknown default is logged and leaves the state untouched
            let _ = self.set_current_language(default);
        } else if changed {
            self.notify_language_changed();
        }
    }

    /// Reads a registration file through the manager's source and ingests it.
    pub fn load_registration(&mut self, file: &str) -> Result<(), LinguaError> {
        let bytes = read_source(&*self.source, file).inspect_err(|e| error!("{}", e))?;
        let root = Element::from_bytes(&bytes).map_err(|source| {
            error!("malformed markup in '{}': {}", file, source);
            LinguaError::Markup {
                file: file.to_string(),
                source,
            }
        })?;
        self.ingest_markup(&root);
        Ok(())
    }

    /// Loads one tag file into the language or user map.
    ///
    /// A missing or unreadable file is an error. A malformed markup file is
    /// logged and contributes no tags.
    pub fn load_language(&mut self, file: &str, scope: TagScope) -> Result<(), LinguaError> {
        let bytes = read_source(&*self.source, file).inspect_err(|e| error!("{}", e))?;

        match SourceFormat::from_file_name(file).parse(&bytes) {
            Ok(fragment) => {
                debug!("loaded {} tags from '{}' into {:?}", fragment.len(), file, scope);
                self.tags.merge(scope, fragment);
            }
            Err(e) => warn!("malformed markup in '{}': {}", file, e),
        }
        Ok(())
    }

    pub fn load_user_tags(&mut self, file: &str) -> Result<(), LinguaError> {
        self.load_language(file, TagScope::User)
    }

    /// Switches to a registered language.
    ///
    /// An unknown name changes nothing. Otherwise the language tags are
    /// rebuilt from the pack's files in registration order and listeners are
    /// notified once.
    pub fn set_current_language(&mut self, name: &str) -> Result<(), LinguaError> {
        let Some(files) = self.registry.sources(name).map(<[String]>::to_vec) else {
            error!("Language '{}' is not found", name);
            return Err(LinguaError::LanguageNotFound(name.to_string()));
        };

        self.tags.clear_language_tags();
        self.current = name.to_string();
        for file in &files {
            // failures are logged by load_language
            let _ = self.load_language(file, TagScope::Language);
        }

        info!("language switched to '{}'", name);
        self.notify_language_changed();
        Ok(())
    }

    /// Pass bound applied by [`resolve`](Self::resolve).
    pub fn max_passes(&self) -> usize {
        self.resolver.max_passes()
    }

    pub fn current_language(&self) -> &str {
        &self.current
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.registry.languages()
    }

    /// Value of `tag`, or `tag` itself when nothing defines it.
    pub fn tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tags.lookup(tag).unwrap_or(tag)
    }

    /// Replaces every `#{tag}` in `line`, including references produced by
    /// replacements.
    pub fn resolve(&mut self, line: &str) -> String {
        let tags = &self.tags;
        let unresolved = &mut self.unresolved;
        self.resolver.resolve(line, move |tag| {
            tags.lookup(tag).map(Cow::Borrowed).or_else(|| {
                unresolved
                    .as_mut()
                    .and_then(|handler| handler(tag))
                    .map(Cow::Owned)
            })
        })
    }

    pub fn add_user_tag(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.tags.add_user_tag(tag, value);
    }

    pub fn clear_user_tags(&mut self) {
        self.tags.clear_user_tags();
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn registry(&self) -> &LanguagePackRegistry {
        &self.registry
    }

    /// Called with the new language name after every switch.
    pub fn subscribe(&mut self, listener: impl FnMut(&str) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Consulted for tags found in neither map. Returning `None` leaves the
    /// reference escaped as `##{tag}`.
    pub fn set_unresolved_tag_handler(&mut self, handler: impl FnMut(&str) -> Option<String> + 'static) {
        self.unresolved = Some(Box::new(handler));
    }

    pub fn clear_unresolved_tag_handler(&mut self) {
        self.unresolved = None;
    }

    fn notify_language_changed(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_file("en.xml", br#"<MyGUI><Tag name="hi">Hello</Tag><Tag name="ok">OK</Tag></MyGUI>"#.as_slice())
            .with_file("en_extra.txt", b"ok Okay\nbye Goodbye\n".as_slice())
            .with_file("ru.txt", "hi Привет\n".as_bytes())
            .with_file("broken.xml", b"<MyGUI><Tag name=\"x\">".as_slice())
    }

    fn manager() -> LanguageManager {
        let mut manager = LanguageManager::new(source());
        manager.registry.add_source("English", "en.xml");
        manager.registry.add_source("English", "en_extra.txt");
        manager.registry.add_source("Russian", "ru.txt");
        manager
    }

    #[test]
    fn test_switch_loads_files_in_order() {
        let mut manager = manager();
        manager.set_current_language("English").unwrap();
        assert_eq!(manager.current_language(), "English");
        assert_eq!(manager.tag("hi"), "Hello");
        assert_eq!(manager.tag("ok"), "Okay");
        assert_eq!(manager.tag("bye"), "Goodbye");
    }

    #[test]
    fn test_switch_clears_previous_language() {
        let mut manager = manager();
        manager.set_current_language("English").unwrap();
        manager.set_current_language("Russian").unwrap();
        assert_eq!(manager.tag("hi"), "Привет");
        assert_eq!(manager.tag("bye"), "bye");
    }

    #[test]
    fn test_unknown_language_is_a_no_op() {
        let mut manager = manager();
        manager.set_current_language("English").unwrap();
        manager.add_user_tag("user", "value");
        let language_before = manager.tags().language_tags().clone();

        let err = manager.set_current_language("Klingon").unwrap_err();
        assert!(matches!(err, LinguaError::LanguageNotFound(name) if name == "Klingon"));
        assert_eq!(manager.current_language(), "English");
        assert_eq!(manager.tags().language_tags(), &language_before);
        assert_eq!(manager.tag("user"), "value");
    }

    #[test]
    fn test_load_language_errors() {
        let mut manager = manager();
        assert!(matches!(
            manager.load_language("missing.txt", TagScope::User),
            Err(LinguaError::SourceNotFound(_))
        ));
        // found but malformed: no tags, no error
        manager.load_language("broken.xml", TagScope::Language).unwrap();
        assert!(manager.tags().language_tags().is_empty());
    }

    #[test]
    fn test_listeners_fire_once_per_switch() {
        let mut manager = manager();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = manager.subscribe(move |name| sink.borrow_mut().push(name.to_string()));

        manager.set_current_language("English").unwrap();
        let _ = manager.set_current_language("Klingon");
        manager.set_current_language("Russian").unwrap();
        assert_eq!(*seen.borrow(), vec!["English", "Russian"]);

        assert!(manager.unsubscribe(id));
        assert!(!manager.unsubscribe(id));
        manager.set_current_language("English").unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_resolve_with_unresolved_handler() {
        let mut manager = manager();
        manager.set_current_language("English").unwrap();
        assert_eq!(manager.resolve("#{hi} #{who}"), "Hello ##{who}");

        manager.set_unresolved_tag_handler(|tag| (tag == "who").then(|| "#{bye}".to_string()));
        assert_eq!(manager.resolve("#{hi} #{who}"), "Hello Goodbye");
        assert_eq!(manager.resolve("#{nobody}"), "##{nobody}");

        manager.clear_unresolved_tag_handler();
        assert_eq!(manager.resolve("#{who}"), "##{who}");
    }

    #[test]
    fn test_user_tags_survive_switch_and_win() {
        let mut manager = manager();
        manager.add_user_tag("hi", "Yo");
        manager.set_current_language("English").unwrap();
        assert_eq!(manager.resolve("#{hi}"), "Yo");
        manager.set_current_language("Russian").unwrap();
        assert_eq!(manager.tag("hi"), "Yo");

        manager.clear_user_tags();
        assert_eq!(manager.tag("hi"), "Привет");
    }
}
