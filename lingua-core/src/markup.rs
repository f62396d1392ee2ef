//! 只读标记树
//!
//! 将 XML 文档解析为自有的 [`Element`] 树，供语言包注册文件与标签文件读取。
//! 只保留元素、属性、子元素与文本内容，注释和处理指令会被丢弃。

use thiserror::Error;

const UTF8_BOM: char = '\u{feff}';

/// 标记解析错误
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("XML syntax error: {0}")]
    Syntax(#[from] roxmltree::Error),
}

/// 标记树中的一个元素
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    content: String,
}

impl Element {
    /// 解析文档并返回根元素
    pub fn parse(text: &str) -> Result<Self, MarkupError> {
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self::from_node(doc.root_element()))
    }

    /// 从原始字节解析，要求 UTF-8 编码
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MarkupError> {
        Self::parse(std::str::from_utf8(bytes)?)
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();

        let mut children = Vec::new();
        let mut content = String::new();
        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_node(child));
            } else if child.is_text() {
                content.push_str(child.text().unwrap_or_default());
            }
        }

        Self {
            name: node.tag_name().name().to_string(),
            attributes,
            children,
            content: content.trim().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 查找属性值，不存在时返回 `None`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// 按文档顺序枚举指定名称的直接子元素
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// 元素的文本内容（直接文本子节点拼接后去除首尾空白）
    pub fn content(&self) -> &str {
        &self.content
    }
}
