//! Everything a run leaves on disk: the response log and the drawing images.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use egui::{Pos2, Rect};
use image::{Rgb, RgbImage};
use log::{info, warn};

use crate::error::QuizError;
use crate::quiz::OptionLetter;
use crate::state::StrokeSequence;
use crate::tracking::FrameSize;
use crate::utils::AppUtils;

pub const LOG_FILE_NAME: &str = "responses.txt";
const STROKE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const STROKE_WIDTH: f32 = 2.0;

/// Recorded answer to a multiple-choice question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct McqResponse {
    pub number: usize, // 1-based
    pub chosen: Option<OptionLetter>,
    pub correct: OptionLetter,
}

impl fmt::Display for McqResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chosen {
            Some(chosen) => write!(
                f,
                "Question {}: {chosen} (correct option is {})",
                self.number, self.correct
            ),
            None => write!(
                f,
                "Question {}: Not Attempted(correct option is {})",
                self.number, self.correct
            ),
        }
    }
}

/// Recorded answer to a drawing question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawResponse {
    pub number: usize, // 1-based
    pub image: Option<PathBuf>,
}

impl fmt::Display for DrawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.image {
            Some(path) => write!(f, "Question {}: {}", self.number, path.display()),
            None => write!(f, "Question {}: Not Attempted", self.number),
        }
    }
}

/// The one-line summary shown at the end of a run.
pub fn result_text(mcq: &[McqResponse], draw: &[DrawResponse], score: usize) -> String {
    if mcq.is_empty() && draw.is_empty() {
        "No responses recorded.".to_owned()
    } else if !mcq.is_empty() {
        format!("Your result is {score}/{}", mcq.len())
    } else {
        "Quiz Finished! Responses saved.".to_owned()
    }
}

/// Owns the responses directory for one run.
#[derive(Clone, Debug)]
pub struct ResponseStore {
    dir: PathBuf,
}

impl ResponseStore {
    /// Clears out any previous run's responses and recreates the directory.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created.
    pub fn prepare(dir: &Path) -> Result<Self, QuizError> {
        if dir.exists() {
            if let Err(err) = std::fs::remove_dir_all(dir) {
                warn!("Failed to clear {}: {err}", dir.display());
            }
        }
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }

    /// Rasterizes `strokes` onto a black canvas of the frame size and saves it
    /// as `drawing_<number>.png`.
    ///
    /// # Errors
    ///
    /// Fails if the image cannot be encoded or written.
    pub fn save_drawing(
        &self,
        number: usize,
        strokes: &StrokeSequence,
        size: FrameSize,
    ) -> Result<PathBuf, QuizError> {
        let canvas = rasterize(strokes, size);
        let path = self.dir.join(format!("drawing_{number}.png"));
        canvas.save(&path)?;
        info!("Saved drawing for question {number} to {}", path.display());
        Ok(path)
    }

    /// Writes the response log: multiple-choice lines, the score, then drawing lines.
    ///
    /// # Errors
    ///
    /// Fails if the log file cannot be written.
    pub fn write_log(
        &self,
        mcq: &[McqResponse],
        draw: &[DrawResponse],
        score: usize,
        total_mcq: usize,
    ) -> Result<PathBuf, QuizError> {
        let path = self.log_path();
        let mut out = BufWriter::new(File::create(&path)?);
        write_log_to(&mut out, mcq, draw, score, total_mcq)?;
        out.flush()?;
        info!("Wrote responses to {}", path.display());
        Ok(path)
    }
}

fn write_log_to(
    out: &mut impl Write,
    mcq: &[McqResponse],
    draw: &[DrawResponse],
    score: usize,
    total_mcq: usize,
) -> std::io::Result<()> {
    for response in mcq {
        writeln!(out, "{response}")?;
    }
    if !mcq.is_empty() {
        writeln!(out, "\nYour result is {score}/{total_mcq}\n")?;
    }
    for response in draw {
        writeln!(out, "{response}")?;
    }
    Ok(())
}

/// Draws each segment of `strokes` as a red line; nothing is drawn across a pen-up.
pub fn rasterize(strokes: &StrokeSequence, size: FrameSize) -> RgbImage {
    let mut canvas = RgbImage::new(size.width, size.height);
    let bounds = Rect::from_min_size(Pos2::ZERO, size.to_vec2());
    for [a, b] in strokes.segments() {
        for (x, y) in AppUtils::segment_pixels(a, b, STROKE_WIDTH, bounds) {
            if x < size.width && y < size.height {
                canvas.put_pixel(x, y, STROKE_COLOR);
            }
        }
    }
    canvas
}
