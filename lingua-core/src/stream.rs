//! 按文件名解析数据流
//!
//! [`StreamSource`] 把文件标识映射为字节流。找不到时返回 `None`，
//! 由调用方决定如何记录与降级。

use log::debug;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;

/// 文件名到字节流的解析器
pub trait StreamSource {
    /// 打开指定文件，不存在时返回 `None`
    fn open(&self, name: &str) -> Option<Box<dyn Read + '_>>;
}

impl<T: StreamSource + ?Sized> StreamSource for Box<T> {
    fn open(&self, name: &str) -> Option<Box<dyn Read + '_>> {
        (**self).open(name)
    }
}

impl<T: StreamSource + ?Sized> StreamSource for &T {
    fn open(&self, name: &str) -> Option<Box<dyn Read + '_>> {
        (**self).open(name)
    }
}

/// 基于文件系统的数据源
///
/// 按添加顺序依次在各个根目录下查找，第一个命中的文件生效。
#[derive(Debug, Clone, Default)]
pub struct DirSource {
    roots: Vec<PathBuf>,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    /// 追加一个搜索根目录
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl FromIterator<PathBuf> for DirSource {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            roots: iter.into_iter().collect(),
        }
    }
}

impl StreamSource for DirSource {
    fn open(&self, name: &str) -> Option<Box<dyn Read + '_>> {
        self.roots.iter().find_map(|root| {
            let path = root.join(name);
            match File::open(&path) {
                Ok(file) => Some(Box::new(file) as Box<dyn Read>),
                Err(e) => {
                    debug!("{} not readable: {}", path.display(), e);
                    None
                }
            }
        })
    }
}

/// 内存数据源，常用于测试与 `embed_sources!` 嵌入的资源
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Cow<'static, [u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加或替换一个文件
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Cow<'static, [u8]>>) {
        self.files.insert(name.into(), data.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Cow<'static, [u8]>>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl StreamSource for MemorySource {
    fn open(&self, name: &str) -> Option<Box<dyn Read + '_>> {
        self.files
            .get(name)
            .map(|data| Box::new(Cursor::new(data.as_ref())) as Box<dyn Read>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_all(source: &dyn StreamSource, name: &str) -> Option<String> {
        let mut text = String::new();
        source.open(name)?.read_to_string(&mut text).ok()?;
        Some(text)
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new()
            .with_file("static.txt", b"static".as_slice())
            .with_file("owned.txt", b"owned".to_vec());

        assert_eq!(read_all(&source, "static.txt").as_deref(), Some("static"));
        assert_eq!(read_all(&source, "owned.txt").as_deref(), Some("owned"));
        assert!(source.open("missing.txt").is_none());
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_dir_source_search_order() {
        let base = std::env::temp_dir().join(format!(
            "lingua_core_stream_test_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let first = base.join("first");
        let second = base.join("second");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(first.join("shared.txt"), "first").unwrap();
        fs::write(second.join("shared.txt"), "second").unwrap();
        fs::write(second.join("only.txt"), "only").unwrap();

        let source = DirSource::new(&first).with_root(&second);
        assert_eq!(read_all(&source, "shared.txt").as_deref(), Some("first"));
        assert_eq!(read_all(&source, "only.txt").as_deref(), Some("only"));
        assert!(source.open("nope.txt").is_none());

        let boxed: Box<dyn StreamSource> = Box::new(source);
        assert_eq!(read_all(&boxed, "only.txt").as_deref(), Some("only"));

        let _ = fs::remove_dir_all(&base);
    }
}
