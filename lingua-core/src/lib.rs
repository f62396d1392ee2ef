pub mod markup;
pub mod stream;
pub mod yaml;

pub use markup::{Element, MarkupError};
pub use stream::{DirSource, MemorySource, StreamSource};
pub use yaml::ConfigError;
