//! Language packs and `#{tag}` substitution for UI strings.
//!
//! ```
//! use lingua::{LanguageManager, MemorySource};
//!
//! let source = MemorySource::new()
//!     .with_file("languages.xml", br#"<MyGUI type="Language">
//!         <Language default="English">
//!             <Info name="English"><Source>en.xml</Source></Info>
//!         </Language>
//!     </MyGUI>"#.as_slice())
//!     .with_file("en.xml", br#"<MyGUI><Tag name="hi">Hello</Tag></MyGUI>"#.as_slice());
//!
//! let mut manager = LanguageManager::new(source);
//! manager.load_registration("languages.xml").unwrap();
//! assert_eq!(manager.resolve("#{hi}, world"), "Hello, world");
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod manager;
pub mod registry;
pub mod resolver;
pub mod resource;
pub mod store;

pub use config::LinguaConfig;
pub use error::LinguaError;
pub use format::SourceFormat;
pub use manager::{LanguageManager, ListenerId, SharedLanguageManager};
pub use registry::LanguagePackRegistry;
pub use resolver::TagResolver;
pub use resource::{LoadHandler, ResourceRegistry, TagHandlerRegistry};
pub use store::{TagMap, TagScope, TagStore};

pub use lingua_core::{DirSource, Element, MemorySource, StreamSource};
