//! CAD文档数据模型
//!
//! 只保存渲染需要的内容：模型空间实体、块定义、图层表和文字样式表。

use cadconv_core::entity::Entity;
use cadconv_core::math::Point2;
use cadconv_core::properties::{ColorRef, LineWeight};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 图层
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub color: ColorRef,
    pub line_weight: LineWeight,
    /// 图层是否打开
    pub visible: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: ColorRef::Index(7),
            line_weight: LineWeight::Default,
            visible: true,
        }
    }

    pub fn with_color(mut self, color: ColorRef) -> Self {
        self.color = color;
        self
    }
}

/// 块定义
#[derive(Debug, Clone)]
pub struct Block {
    pub name: String,
    pub base_point: Point2,
    pub entities: Vec<Entity>,
}

/// 文字样式
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub name: String,
    /// 字体文件名（如 `malgun.ttf`）
    pub font: String,
}

impl TextStyle {
    pub fn new(name: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font: font.into(),
        }
    }
}

/// CAD文档
#[derive(Debug, Default)]
pub struct Document {
    /// 模型空间实体（保持文件中的顺序）
    entities: Vec<Entity>,

    /// 块定义，键为大写块名
    blocks: HashMap<String, Block>,

    /// 图层表，键为大写图层名
    layers: HashMap<String, Layer>,

    /// 文字样式表
    styles: Vec<TextStyle>,

    /// 来源文件路径
    file_path: Option<PathBuf>,
}

impl Document {
    /// 创建新文档
    pub fn new() -> Self {
        Self::default()
    }

    /// 从文件加载（目前只支持 `.dxf`，扩展名不区分大小写）
    pub fn open(path: impl AsRef<Path>) -> Result<Self, crate::FileError> {
        let path = path.as_ref();

        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("dxf") => crate::dxf_io::import(path),
            _ => Err(crate::FileError::InvalidFormat(format!(
                "Unknown file extension: {}",
                path.display()
            ))),
        }
    }

    /// 添加模型空间实体
    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// 模型空间实体
    pub fn modelspace(&self) -> &[Entity] {
        &self.entities
    }

    /// 按 DXF 类型名查询模型空间实体（不区分大小写）
    pub fn query<'a>(&'a self, types: &'a [&'a str]) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .iter()
            .filter(move |e| types.iter().any(|t| t.eq_ignore_ascii_case(e.dxftype())))
    }

    /// 按 DXF 类型名查询模型空间实体（可变）
    pub fn query_mut<'a>(
        &'a mut self,
        types: &'a [&'a str],
    ) -> impl Iterator<Item = &'a mut Entity> + 'a {
        self.entities
            .iter_mut()
            .filter(move |e| types.iter().any(|t| t.eq_ignore_ascii_case(e.dxftype())))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.insert(layer.name.to_ascii_uppercase(), layer);
    }

    /// 按名称获取图层（不区分大小写）
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(&name.to_ascii_uppercase())
    }

    pub fn add_block(&mut self, block: Block) {
        self.blocks.insert(block.name.to_ascii_uppercase(), block);
    }

    /// 按名称获取块定义（不区分大小写）
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(&name.to_ascii_uppercase())
    }

    pub fn styles(&self) -> &[TextStyle] {
        &self.styles
    }

    /// 文字样式是否存在（不区分大小写）
    pub fn has_style(&self, name: &str) -> bool {
        self.styles.iter().any(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn style(&self, name: &str) -> Option<&TextStyle> {
        self.styles.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// 注册文字样式；同名样式已存在时不做修改并返回 false
    pub fn register_style(&mut self, style: TextStyle) -> bool {
        if self.has_style(&style.name) {
            return false;
        }
        self.styles.push(style);
        true
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: impl AsRef<Path>) {
        self.file_path = Some(path.as_ref().to_path_buf());
    }
}
