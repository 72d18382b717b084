use egui::Pos2;
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::QuizConfig;
use crate::quiz::OptionLetter;
use crate::tracking::FrameSize;

// 固定长度的滑动窗口，满了以后丢弃最旧的样本
#[derive(Clone, Debug)]
pub struct RollingWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.samples.iter()
    }
}

// 笔迹序列中的一项：一个点，或者抬笔标记
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrokePoint {
    Point(Pos2),
    PenUp,
}

/// Drawn points in order, with explicit pen-up markers between strokes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokeSequence {
    items: Vec<StrokePoint>,
}

impl StrokeSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_point(&mut self, point: Pos2) {
        self.items.push(StrokePoint::Point(point));
    }

    /// Ends the current stroke. A no-op on an empty sequence or right after
    /// another pen-up.
    pub fn pen_up(&mut self) {
        if matches!(self.items.last(), Some(StrokePoint::Point(_))) {
            self.items.push(StrokePoint::PenUp);
        }
    }

    pub fn items(&self) -> &[StrokePoint] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when at least one real point was drawn.
    pub fn has_points(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, StrokePoint::Point(_)))
    }

    /// Individual strokes: maximal runs of points without a pen-up between them.
    pub fn strokes(&self) -> Vec<Vec<Pos2>> {
        self.items
            .split(|item| *item == StrokePoint::PenUp)
            .map(|run| {
                run.iter()
                    .filter_map(|item| match item {
                        StrokePoint::Point(p) => Some(*p),
                        StrokePoint::PenUp => None,
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|stroke| !stroke.is_empty())
            .collect()
    }

    /// Line segments between consecutive points of the same stroke.
    pub fn segments(&self) -> impl Iterator<Item = [Pos2; 2]> + '_ {
        self.items.windows(2).filter_map(|pair| match pair {
            [StrokePoint::Point(a), StrokePoint::Point(b)] => Some([*a, *b]),
            _ => None,
        })
    }
}

// 单道题的交互状态，题目开始时创建，题目结束时丢弃
#[derive(Clone, Debug)]
pub struct QuestionSession {
    pub started_at: Duration,                     // 题目开始时间（相对整个测验）
    pub elapsed: Duration,                        // 本题已用时间
    pub candidate_selection: Option<OptionLetter>, // 当前悬停的候选选项
    pub confirmation_start: Option<Duration>,     // 候选选项开始悬停的时间
    pub confirmed_selection: Option<OptionLetter>, // 已确认的答案
    pub finish_hover_start: Option<Duration>,     // 开始悬停完成按钮的时间
    pub finish_hovered: bool,                     // 本帧指尖是否在完成按钮上（仅影响颜色）
    pub fingertip: Option<Pos2>,                  // 本帧指尖位置
    pub smoothing_buffer: RollingWindow<Pos2>,    // 指尖平滑窗口
    pub pinch_distance_buffer: RollingWindow<f32>, // 捏合距离窗口
    pub pinching: bool,                           // 当前是否处于捏合（落笔）状态
    pub strokes: StrokeSequence,                  // 笔迹
    pub last_frame_size: Option<FrameSize>,       // 最近一次看到的画面尺寸
}

impl QuestionSession {
    pub fn new(started_at: Duration, config: &QuizConfig) -> Self {
        Self {
            started_at,
            elapsed: Duration::ZERO,
            candidate_selection: None,
            confirmation_start: None,
            confirmed_selection: None,
            finish_hover_start: None,
            finish_hovered: false,
            fingertip: None,
            smoothing_buffer: RollingWindow::new(config.smoothing_window),
            pinch_distance_buffer: RollingWindow::new(config.pinch_window),
            pinching: false,
            strokes: StrokeSequence::new(),
            last_frame_size: None,
        }
    }

    /// Remaining whole seconds on the countdown.
    pub fn seconds_left(&self, config: &QuizConfig) -> u64 {
        config
            .question_duration()
            .saturating_sub(self.elapsed)
            .as_secs()
    }
}
