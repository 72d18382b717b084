//! Where things sit on the frame.
//!
//! Both hit-testing and drawing read their rectangles from here, so what the
//! user sees hovered is exactly what the state machine tests against. All
//! rectangles are a pure function of the frame size.

use egui::{Pos2, Rect, Vec2};

use crate::quiz::{OPTION_COUNT, OptionLetter};
use crate::tracking::FrameSize;

const MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 36.0;
const OPTIONS_TOP: f32 = 103.0;
const OPTION_PITCH: f32 = 50.0;
const OPTION_MAX_WIDTH: f32 = 360.0;
const TIMER_TOP: f32 = 323.0;
const FINISH_SIZE: Vec2 = Vec2::new(120.0, 40.0);
const FINISH_BOTTOM_GAP: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuizLayout {
    size: FrameSize,
}

impl QuizLayout {
    pub fn new(size: FrameSize) -> Self {
        Self { size }
    }

    fn row(&self, top: f32, width: f32) -> Rect {
        Rect::from_min_size(Pos2::new(MARGIN, top), Vec2::new(width, ROW_HEIGHT))
    }

    fn text_width(&self) -> f32 {
        (self.size.width as f32 - 2.0 * MARGIN).max(0.0)
    }

    /// "Question N/T" banner.
    pub fn header_box(&self) -> Rect {
        self.row(MARGIN, self.text_width().min(OPTION_MAX_WIDTH))
    }

    pub fn prompt_box(&self) -> Rect {
        self.row(MARGIN + 44.0, self.text_width())
    }

    /// Option boxes in display order (A first).
    pub fn option_boxes(&self) -> [Rect; OPTION_COUNT] {
        let width = self.text_width().min(OPTION_MAX_WIDTH);
        std::array::from_fn(|i| self.row(OPTIONS_TOP + i as f32 * OPTION_PITCH, width))
    }

    pub fn timer_box(&self) -> Rect {
        self.row(TIMER_TOP, self.text_width().min(OPTION_MAX_WIDTH))
    }

    /// The finish control: centered horizontally, near the bottom edge.
    pub fn finish_box(&self) -> Rect {
        let center_x = self.size.width as f32 / 2.0;
        let bottom = self.size.height as f32 - FINISH_BOTTOM_GAP;
        Rect::from_min_size(
            Pos2::new(center_x - FINISH_SIZE.x / 2.0, bottom - FINISH_SIZE.y),
            FINISH_SIZE,
        )
    }

    /// First option box (in display order) containing `pos`, edges inclusive.
    pub fn option_at(&self, pos: Pos2) -> Option<OptionLetter> {
        self.option_boxes()
            .iter()
            .position(|rect| rect.contains(pos))
            .and_then(OptionLetter::from_index)
    }

    pub fn finish_contains(&self, pos: Pos2) -> bool {
        self.finish_box().contains(pos)
    }
}
