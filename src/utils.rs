use egui::{Pos2, Rect};

pub struct AppUtils;

impl AppUtils {
    // 计算点到线段的最短距离
    pub fn point_to_line_segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
        let ab = b - a;
        let ap = p - a;
        let ab_sq = ab.length_sq();

        if ab_sq < 0.0001 {
            // a 和 b 几乎重合
            return p.distance(a);
        }

        let t = (ap.dot(ab) / ab_sq).clamp(0.0, 1.0);
        p.distance(a + t * ab)
    }

    pub fn lerp_pos(a: Pos2, b: Pos2, t: f32) -> Pos2 {
        Pos2::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y))
    }

    // 多个点的平均位置（逐分量），结果取整到像素
    pub fn mean_pixel<'a>(points: impl ExactSizeIterator<Item = &'a Pos2>) -> Option<Pos2> {
        let count = points.len();
        if count == 0 {
            return None;
        }
        let sum = points.fold(egui::Vec2::ZERO, |acc, p| acc + p.to_vec2());
        let mean = sum / count as f32;
        Some(Pos2::new(mean.x.trunc(), mean.y.trunc()))
    }

    pub fn mean(values: impl ExactSizeIterator<Item = f32>) -> Option<f32> {
        let count = values.len();
        if count == 0 {
            return None;
        }
        Some(values.sum::<f32>() / count as f32)
    }

    // 笔画线段覆盖的像素（用于栅格化），线宽为 width
    pub fn segment_pixels(a: Pos2, b: Pos2, width: f32, bounds: Rect) -> Vec<(u32, u32)> {
        let radius = width / 2.0;
        let area = Rect::from_two_pos(a, b).expand(radius).intersect(bounds);
        if !area.is_positive() {
            return Vec::new();
        }

        let mut pixels = Vec::new();
        let (x0, x1) = (area.min.x.floor() as u32, area.max.x.ceil() as u32);
        let (y0, y1) = (area.min.y.floor() as u32, area.max.y.ceil() as u32);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                if Self::point_to_line_segment_distance(center, a, b) <= radius {
                    pixels.push((x, y));
                }
            }
        }
        pixels
    }
}
