//! Dispatch of resource files to per-type load handlers.

use crate::error::LinguaError;
use lingua_core::{Element, StreamSource};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;

const TYPE_ATTRIBUTE: &str = "type";

/// Called with the root element of a resource file and the file's name.
pub type LoadHandler = Box<dyn FnMut(&Element, &str) -> anyhow::Result<()>>;

/// Somewhere a load handler can be installed for a resource type.
pub trait TagHandlerRegistry {
    /// Installs `handler` for `name`, replacing any previous one.
    fn register_handler(&mut self, name: &str, handler: LoadHandler);

    /// Returns `false` when nothing was registered under `name`.
    fn unregister_handler(&mut self, name: &str) -> bool;
}

/// Parses resource files and hands each root to the handler registered for
/// its `type` attribute, or for the root element name when `type` is absent.
#[derive(Default)]
pub struct ResourceRegistry {
    handlers: HashMap<String, LoadHandler>,
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TagHandlerRegistry for ResourceRegistry {
    fn register_handler(&mut self, name: &str, handler: LoadHandler) {
        self.handlers.insert(name.to_string(), handler);
    }

    fn unregister_handler(&mut self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn load(&mut self, source: &dyn StreamSource, file: &str) -> Result<(), LinguaError> {
        let bytes = read_source(source, file)?;
        let root = Element::from_bytes(&bytes).map_err(|source| LinguaError::Markup {
            file: file.to_string(),
            source,
        })?;
        self.load_element(&root, file)
    }

    pub fn load_element(&mut self, root: &Element, file: &str) -> Result<(), LinguaError> {
        let kind = root.attribute(TYPE_ATTRIBUTE).unwrap_or(root.name());
        let handler = self
            .handlers
            .get_mut(kind)
            .ok_or_else(|| LinguaError::NoHandler(kind.to_string()))?;
        handler(root, file)?;
        Ok(())
    }
}

/// Reads a whole file from `source`; the stream is closed before returning.
pub(crate) fn read_source(source: &dyn StreamSource, file: &str) -> Result<Vec<u8>, LinguaError> {
    let mut stream = source
        .open(file)
        .ok_or_else(|| LinguaError::SourceNotFound(file.to_string()))?;
    let mut bytes = Vec::new();
    stream.read_to_end(&mut bytes).map_err(|source| LinguaError::Io {
        file: file.to_string(),
        source,
    })?;
    Ok(bytes)
}
