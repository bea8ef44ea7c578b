//! 2D相机
//!
//! 世界坐标（Y 轴向上）到画布坐标（Y 轴向下）的视口变换。

use cadconv_core::math::{BoundingBox2, Point2};

/// 2D相机
#[derive(Debug, Clone)]
pub struct Camera2D {
    /// 相机中心位置（世界坐标）
    pub center: Point2,

    /// 缩放级别（设备单位/世界单位）
    pub zoom: f64,

    /// 视口宽度（设备单位）
    pub viewport_width: f64,

    /// 视口高度（设备单位）
    pub viewport_height: f64,

    /// 最小缩放
    pub min_zoom: f64,

    /// 最大缩放
    pub max_zoom: f64,
}

impl Camera2D {
    /// 创建新的相机
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            center: Point2::origin(),
            zoom: 1.0,
            viewport_width,
            viewport_height,
            min_zoom: 1e-9,
            max_zoom: 1e9,
        }
    }

    /// 缩放到指定区域（等比例，居中）
    ///
    /// `margin` 为每边留白占区域尺寸的比例。
    pub fn zoom_to_fit(&mut self, bbox: &BoundingBox2, margin: f64) {
        let extent = bbox.width().max(bbox.height());
        let padding = if extent > 0.0 { extent * margin } else { 1.0 };
        let width = bbox.width() + padding * 2.0;
        let height = bbox.height() + padding * 2.0;

        let zoom_x = self.viewport_width / width;
        let zoom_y = self.viewport_height / height;

        self.zoom = zoom_x.min(zoom_y).clamp(self.min_zoom, self.max_zoom);
        self.center = bbox.center();
    }

    /// 世界坐标转屏幕坐标
    pub fn world_to_screen(&self, world: Point2) -> Point2 {
        let x = (world.x - self.center.x) * self.zoom + self.viewport_width / 2.0;
        let y = self.viewport_height / 2.0 - (world.y - self.center.y) * self.zoom;
        Point2::new(x, y)
    }
}
