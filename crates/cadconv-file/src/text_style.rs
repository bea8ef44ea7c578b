//! 文字样式替换
//!
//! 将模型空间中所有 TEXT/MTEXT 的样式统一为韩文字体样式，
//! 避免缺少 SHX 字体时韩文显示为乱码。

use crate::document::{Document, TextStyle};
use cadconv_core::geometry::Geometry;
use tracing::debug;

/// 韩文字体族名（同时用作样式名）
pub const KOREAN_FONT_FAMILY: &str = "Malgun Gothic";

/// 韩文字体文件名
pub const KOREAN_FONT_FILE: &str = "malgun.ttf";

/// 把模型空间文字的样式替换为 `family`，样式不存在时以 `font_file` 注册
///
/// 返回被修改的文字实体数量。块定义内的文字不受影响。
pub fn substitute_text_font(doc: &mut Document, family: &str, font_file: &str) -> usize {
    let mut changed = 0;
    for entity in doc.query_mut(&["TEXT", "MTEXT"]) {
        if let Geometry::Text(text) = &mut entity.geometry {
            text.style = family.to_string();
            changed += 1;
        }
    }

    if doc.register_style(TextStyle::new(family, font_file)) {
        debug!("Registered text style '{}' ({})", family, font_file);
    }
    changed
}

/// 使用默认韩文字体替换
pub fn apply_korean_font(doc: &mut Document) -> usize {
    substitute_text_font(doc, KOREAN_FONT_FAMILY, KOREAN_FONT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadconv_core::entity::{Entity, EntityKind};
    use cadconv_core::geometry::{BlockRef, Text};
    use cadconv_core::math::Point2;

    fn text_entity(kind: EntityKind, style: &str) -> Entity {
        Entity::new(
            kind,
            Geometry::Text(Text::new(Point2::origin(), "안녕", 1.0).with_style(style)),
        )
    }

    fn text_styles(doc: &Document) -> Vec<String> {
        doc.modelspace()
            .iter()
            .filter_map(|e| match &e.geometry {
                Geometry::Text(t) => Some(t.style.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_substitutes_all_text_styles() {
        let mut doc = Document::new();
        doc.add_entity(text_entity(EntityKind::Text, "Standard"));
        doc.add_entity(text_entity(EntityKind::MText, "ROMANS"));
        doc.add_entity(Entity::new(
            EntityKind::Insert,
            Geometry::BlockRef(BlockRef::new("A", Point2::origin())),
        ));

        assert_eq!(apply_korean_font(&mut doc), 2);
        assert!(text_styles(&doc).iter().all(|s| s == KOREAN_FONT_FAMILY));
        assert_eq!(
            doc.style(KOREAN_FONT_FAMILY).map(|s| s.font.as_str()),
            Some(KOREAN_FONT_FILE)
        );
    }

    #[test]
    fn test_existing_style_is_kept() {
        let mut doc = Document::new();
        doc.register_style(TextStyle::new("Malgun Gothic", "custom.ttf"));
        doc.add_entity(text_entity(EntityKind::Text, "Standard"));

        apply_korean_font(&mut doc);
        assert_eq!(doc.styles().len(), 1);
        assert_eq!(doc.style("malgun gothic").map(|s| s.font.as_str()), Some("custom.ttf"));
    }

    #[test]
    fn test_empty_document_registers_style() {
        let mut doc = Document::new();
        assert_eq!(apply_korean_font(&mut doc), 0);
        assert!(doc.has_style(KOREAN_FONT_FAMILY));
    }
}
