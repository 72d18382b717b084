use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Tunables for one quiz run.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub question_duration_secs: f32,    // 每题时长
    pub confirm_hold_secs: f32,         // 悬停确认时长（选项和完成按钮共用）
    pub pinch_threshold_px: f32,        // 捏合判定阈值（像素）
    pub smoothing_window: usize,        // 指尖平滑窗口
    pub pinch_window: usize,            // 捏合距离平滑窗口
    pub fallback_frame_width: u32,      // 从未收到画面时使用的宽度
    pub fallback_frame_height: u32,     // 从未收到画面时使用的高度
    pub result_display_secs: f32,       // 结果页停留时长
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_duration_secs: 15.0,
            confirm_hold_secs: 1.5,
            pinch_threshold_px: 30.0,
            smoothing_window: 10,
            pinch_window: 5,
            fallback_frame_width: 640,
            fallback_frame_height: 480,
            result_display_secs: 3.0,
        }
    }
}

impl QuizConfig {
    /// Reads a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::Config`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, QuizError> {
        let text = std::fs::read_to_string(path).map_err(|err| QuizError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_toml(&text).map_err(|reason| QuizError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_toml(text: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(text).map_err(|err| err.to_string())?;
        Ok(config.sanitized())
    }

    // Windows must hold at least one sample.
    fn sanitized(mut self) -> Self {
        self.smoothing_window = self.smoothing_window.max(1);
        self.pinch_window = self.pinch_window.max(1);
        self
    }

    pub fn question_duration(&self) -> Duration {
        Duration::from_secs_f32(self.question_duration_secs.max(0.0))
    }

    pub fn confirm_hold(&self) -> Duration {
        Duration::from_secs_f32(self.confirm_hold_secs.max(0.0))
    }

    pub fn result_display(&self) -> Duration {
        Duration::from_secs_f32(self.result_display_secs.max(0.0))
    }
}
