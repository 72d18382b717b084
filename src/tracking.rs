//! Hand landmark model and the frame sources that produce it.
//!
//! Landmarks follow the 21-point hand model (wrist = 0, thumb tip = 4,
//! index tip = 8) with coordinates normalized to the frame, so pixel
//! positions depend on the frame size they are projected onto.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::time::Duration;

use egui::{Pos2, Vec2};
use log::{debug, warn};
use serde::Deserialize;

use crate::error::QuizError;
use crate::utils::AppUtils;

pub const LANDMARK_COUNT: usize = 21;

/// Named landmarks the quiz cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandLandmark {
    Wrist,
    ThumbTip,
    IndexFingerTip,
}

impl HandLandmark {
    pub fn index(self) -> usize {
        match self {
            Self::Wrist => 0,
            Self::ThumbTip => 4,
            Self::IndexFingerTip => 8,
        }
    }
}

/// Pixel size of a video frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// One detected hand: normalized landmark positions.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Pos2; LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Builds a landmark set, or `None` when the detector returned the wrong count.
    pub fn from_points(points: &[Pos2]) -> Option<Self> {
        let points: [Pos2; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    pub fn normalized(&self, landmark: HandLandmark) -> Pos2 {
        self.points[landmark.index()]
    }

    /// Landmark projected into pixel coordinates, truncated to whole pixels.
    pub fn pixel(&self, landmark: HandLandmark, size: FrameSize) -> Pos2 {
        let p = self.normalized(landmark);
        Pos2::new(
            (p.x * size.width as f32).trunc(),
            (p.y * size.height as f32).trunc(),
        )
    }

    pub fn fingertip(&self, size: FrameSize) -> Pos2 {
        self.pixel(HandLandmark::IndexFingerTip, size)
    }

    /// Pixel distance between the thumb tip and the index fingertip.
    pub fn pinch_distance(&self, size: FrameSize) -> f32 {
        self.pixel(HandLandmark::ThumbTip, size)
            .distance(self.fingertip(size))
    }

    /// A synthetic hand with the index tip at `tip` and the thumb tip at `thumb`,
    /// both in pixels. The remaining joints are spread between wrist and tip.
    ///
    /// Positions are stored at pixel centers so projecting them back onto the
    /// same frame size yields the whole-pixel inputs.
    pub fn synthetic(tip: Pos2, thumb: Pos2, size: FrameSize) -> Self {
        let scale = size.to_vec2().max(Vec2::splat(1.0));
        let normalize = |p: Pos2| Pos2::new((p.x + 0.5) / scale.x, (p.y + 0.5) / scale.y);
        let tip_n = normalize(tip);
        let wrist_n = normalize(tip + Vec2::new(0.0, 160.0));
        let mut points = [wrist_n; LANDMARK_COUNT];
        for (i, point) in points.iter_mut().enumerate() {
            *point = AppUtils::lerp_pos(wrist_n, tip_n, i as f32 / (LANDMARK_COUNT - 1) as f32);
        }
        points[HandLandmark::Wrist.index()] = wrist_n;
        points[HandLandmark::ThumbTip.index()] = normalize(thumb);
        points[HandLandmark::IndexFingerTip.index()] = tip_n;
        Self { points }
    }
}

/// Everything the detection collaborator reports for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInput {
    /// Monotonic time since the run started.
    pub timestamp: Duration,
    pub size: FrameSize,
    pub hand: Option<HandLandmarks>,
    /// The user asked to leave the quiz.
    pub quit: bool,
}

/// A source of tracked frames: a camera with a detector behind it, a replay, a script.
pub trait HandTracker {
    /// The next frame, or `None` once the source has stopped producing frames.
    fn next_frame(&mut self) -> Option<FrameInput>;
}

/// Scripted frames, consumed in order.
impl HandTracker for std::vec::IntoIter<FrameInput> {
    fn next_frame(&mut self) -> Option<FrameInput> {
        self.next()
    }
}

#[derive(Deserialize)]
struct ReplayLine {
    t_ms: u64,
    width: u32,
    height: u32,
    #[serde(default)]
    hand: Option<Vec<[f32; 2]>>,
    #[serde(default)]
    quit: bool,
}

/// Replays a recorded landmark stream stored as JSON lines.
pub struct ReplayTracker<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl ReplayTracker<BufReader<File>> {
    /// Opens a recording.
    ///
    /// # Errors
    ///
    /// [`QuizError::DeviceUnavailable`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, QuizError> {
        let file = File::open(path).map_err(|err| QuizError::DeviceUnavailable {
            source: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayTracker<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    fn parse_line(&self, text: &str) -> Option<FrameInput> {
        let line: ReplayLine = match serde_json::from_str(text) {
            Ok(line) => line,
            Err(err) => {
                warn!("Dropping replay line {}: {err}", self.line_number);
                return None;
            }
        };
        let hand = line.hand.and_then(|points| {
            let points: Vec<Pos2> = points.iter().map(|[x, y]| Pos2::new(*x, *y)).collect();
            let hand = HandLandmarks::from_points(&points);
            if hand.is_none() {
                debug!(
                    "Replay line {} has {} landmarks, treating as no hand",
                    self.line_number,
                    points.len()
                );
            }
            hand
        });
        Some(FrameInput {
            timestamp: Duration::from_millis(line.t_ms),
            size: FrameSize::new(line.width, line.height),
            hand,
            quit: line.quit,
        })
    }
}

impl<R: BufRead> HandTracker for ReplayTracker<R> {
    fn next_frame(&mut self) -> Option<FrameInput> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => {
                    warn!("Replay stream stopped: {err}");
                    return None;
                }
            };
            self.line_number += 1;
            if text.trim().is_empty() {
                continue;
            }
            if let Some(frame) = self.parse_line(&text) {
                return Some(frame);
            }
        }
    }
}
