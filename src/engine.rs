//! Runs a whole quiz: one [`QuestionSession`] per question, in order.
//!
//! [`QuizRun::on_frame`] is the single entry point for both the windowed app
//! (one call per repaint) and the headless runner (one call per replayed
//! frame). A question ends on the first of: a confirmed option, a confirmed
//! finish, the clock, or a quit request. Finishing or quitting early records
//! every question after the current one as not attempted.

use std::path::PathBuf;

use log::{info, warn};

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::interaction::InteractionEvent;
use crate::quiz::Question;
use crate::responses::{self, DrawResponse, McqResponse, ResponseStore};
use crate::state::QuestionSession;
use crate::tracking::{FrameInput, FrameSize, HandTracker};

/// How a question ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionEnd {
    Answered,
    Finished,
    TimedOut,
    Quit,
}

impl QuestionEnd {
    fn ends_run(self) -> bool {
        matches!(self, Self::Finished | Self::Quit)
    }
}

/// Final result of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizOutcome {
    pub score: usize,
    pub total_mcq: usize,
    pub summary: String,
    pub log_path: PathBuf,
    pub finished_early: bool,
}

pub struct QuizRun {
    questions: Vec<Question>,
    config: QuizConfig,
    store: ResponseStore,
    current: usize,
    session: Option<QuestionSession>,
    last_frame_size: Option<FrameSize>,
    score: usize,
    mcq_responses: Vec<McqResponse>,
    draw_responses: Vec<DrawResponse>,
    finished_early: bool,
    outcome: Option<QuizOutcome>,
}

impl QuizRun {
    pub fn new(questions: Vec<Question>, config: QuizConfig, store: ResponseStore) -> Self {
        Self {
            questions,
            config,
            store,
            current: 0,
            session: None,
            last_frame_size: None,
            score: 0,
            mcq_responses: Vec::new(),
            draw_responses: Vec::new(),
            finished_early: false,
            outcome: None,
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Zero-based index and definition of the question in progress.
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        if self.outcome.is_some() {
            return None;
        }
        self.questions.get(self.current).map(|q| (self.current, q))
    }

    pub fn session(&self) -> Option<&QuestionSession> {
        self.session.as_ref()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    /// Feeds one tracked frame to the question in progress.
    ///
    /// # Errors
    ///
    /// Fails only when a response cannot be written to disk.
    pub fn on_frame(&mut self, frame: &FrameInput) -> Result<InteractionEvent, QuizError> {
        let Some(question) = self.questions.get(self.current) else {
            return Ok(InteractionEvent::None);
        };
        if self.outcome.is_some() {
            return Ok(InteractionEvent::None);
        }

        self.last_frame_size = Some(frame.size);
        let session = self.session.get_or_insert_with(|| {
            info!(
                "Question {}/{} started",
                self.current + 1,
                self.questions.len()
            );
            QuestionSession::new(frame.timestamp, &self.config)
        });
        let event = session.advance(question, frame, &self.config);

        let end = match event {
            InteractionEvent::OptionConfirmed(_) => Some(QuestionEnd::Answered),
            InteractionEvent::FinishConfirmed => Some(QuestionEnd::Finished),
            InteractionEvent::Timeout => Some(QuestionEnd::TimedOut),
            InteractionEvent::None if frame.quit => Some(QuestionEnd::Quit),
            InteractionEvent::None => None,
        };
        if let Some(end) = end {
            self.end_question(end)?;
        }
        // Quit also wins when the same frame ended the question another way.
        if frame.quit && !self.is_complete() {
            self.end_question(QuestionEnd::Quit)?;
        }
        Ok(event)
    }

    /// The frame source stopped: every remaining question ends by the clock.
    ///
    /// # Errors
    ///
    /// Fails only when a response cannot be written to disk.
    pub fn source_stopped(&mut self) -> Result<(), QuizError> {
        while !self.is_complete() {
            if let Some(session) = self.session.as_mut() {
                session.expire();
            }
            self.end_question(QuestionEnd::TimedOut)?;
        }
        Ok(())
    }

    /// Drives the run from `tracker` until every question has ended.
    ///
    /// # Errors
    ///
    /// Fails only when a response cannot be written to disk.
    pub fn run_to_end(&mut self, tracker: &mut impl HandTracker) -> Result<QuizOutcome, QuizError> {
        while !self.is_complete() {
            match tracker.next_frame() {
                Some(frame) => {
                    self.on_frame(&frame)?;
                }
                None => {
                    warn!("Frame source stopped before the quiz ended");
                    self.source_stopped()?;
                }
            }
        }
        self.complete()
    }

    fn end_question(&mut self, end: QuestionEnd) -> Result<(), QuizError> {
        let session = self
            .session
            .take()
            .unwrap_or_else(|| QuestionSession::new(Default::default(), &self.config));
        let number = self.current + 1;
        info!("Question {number} ended: {end:?}");

        match self.questions.get(self.current) {
            Some(Question::MultipleChoice { answer, .. }) => {
                let chosen = session.confirmed_selection;
                if chosen == Some(*answer) {
                    self.score += 1;
                }
                self.mcq_responses.push(McqResponse {
                    number,
                    chosen,
                    correct: *answer,
                });
            }
            Some(Question::Drawing { .. }) => {
                let image = if session.strokes.has_points() {
                    let size = session
                        .last_frame_size
                        .or(self.last_frame_size)
                        .unwrap_or_else(|| self.fallback_size());
                    Some(self.store.save_drawing(number, &session.strokes, size)?)
                } else {
                    None
                };
                self.draw_responses.push(DrawResponse { number, image });
            }
            None => {}
        }

        if end.ends_run() {
            self.finished_early = true;
            self.record_unseen(self.current + 1);
            self.current = self.questions.len();
        } else {
            self.current += 1;
        }

        if self.current >= self.questions.len() {
            self.complete()?;
        }
        Ok(())
    }

    /// Records questions `from..` as not attempted without running them.
    fn record_unseen(&mut self, from: usize) {
        for (index, question) in self.questions.iter().enumerate().skip(from) {
            let number = index + 1;
            match question {
                Question::MultipleChoice { answer, .. } => self.mcq_responses.push(McqResponse {
                    number,
                    chosen: None,
                    correct: *answer,
                }),
                Question::Drawing { .. } => {
                    self.draw_responses.push(DrawResponse { number, image: None });
                }
            }
        }
        if from < self.questions.len() {
            info!(
                "Recorded questions {}..={} as not attempted",
                from + 1,
                self.questions.len()
            );
        }
    }

    fn fallback_size(&self) -> FrameSize {
        FrameSize::new(
            self.config.fallback_frame_width,
            self.config.fallback_frame_height,
        )
    }

    /// Writes the response log once and returns the outcome.
    fn complete(&mut self) -> Result<QuizOutcome, QuizError> {
        if let Some(outcome) = &self.outcome {
            return Ok(outcome.clone());
        }
        let total_mcq = self
            .questions
            .iter()
            .filter(|q| q.is_multiple_choice())
            .count();
        let log_path = self.store.write_log(
            &self.mcq_responses,
            &self.draw_responses,
            self.score,
            total_mcq,
        )?;
        let outcome = QuizOutcome {
            score: self.score,
            total_mcq,
            summary: responses::result_text(&self.mcq_responses, &self.draw_responses, self.score),
            log_path,
            finished_early: self.finished_early,
        };
        info!("{}", outcome.summary);
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::QuizLayout;
    use crate::quiz::OptionLetter;
    use crate::tracking::HandLandmarks;
    use egui::Pos2;
    use std::time::Duration;

    const SIZE: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    fn quiz(kinds: &str) -> Vec<Question> {
        kinds
            .chars()
            .map(|kind| match kind {
                'm' => Question::MultipleChoice {
                    prompt: "Pick B".to_owned(),
                    options: ["w", "x", "y", "z"].map(str::to_owned),
                    answer: OptionLetter::B,
                },
                _ => Question::Drawing {
                    prompt: "Draw".to_owned(),
                },
            })
            .collect()
    }

    fn new_run(questions: Vec<Question>) -> (tempfile::TempDir, QuizRun) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ResponseStore::prepare(&dir.path().join("responses")).expect("prepare");
        (dir, QuizRun::new(questions, QuizConfig::default(), store))
    }

    fn at(ms: u64, tip: Option<Pos2>) -> FrameInput {
        FrameInput {
            timestamp: Duration::from_millis(ms),
            size: SIZE,
            hand: tip.map(|tip| HandLandmarks::synthetic(tip, tip + egui::vec2(-80.0, 40.0), SIZE)),
            quit: false,
        }
    }

    fn hold(run: &mut QuizRun, start_ms: u64, tip: Pos2) -> InteractionEvent {
        let mut last = InteractionEvent::None;
        for t in (start_ms..=start_ms + 1600).step_by(100) {
            last = run.on_frame(&at(t, Some(tip))).expect("frame");
            if last.is_terminal() {
                break;
            }
        }
        last
    }

    fn log_of(run: &QuizRun) -> String {
        let outcome = run.outcome().expect("complete");
        std::fs::read_to_string(&outcome.log_path).expect("log")
    }

    fn finish_center() -> Pos2 {
        QuizLayout::new(SIZE).finish_box().center()
    }

    #[test]
    fn confirmed_answers_score_and_advance() {
        let (_dir, mut run) = new_run(quiz("mm"));
        let boxes = QuizLayout::new(SIZE).option_boxes();
        assert_eq!(
            hold(&mut run, 0, boxes[1].center()),
            InteractionEvent::OptionConfirmed(OptionLetter::B)
        );
        assert_eq!(run.current_question().map(|(i, _)| i), Some(1));
        assert_eq!(
            hold(&mut run, 5000, boxes[0].center()),
            InteractionEvent::OptionConfirmed(OptionLetter::A)
        );
        let outcome = run.outcome().expect("complete").clone();
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.summary, "Your result is 1/2");
        assert_eq!(
            log_of(&run),
            "Question 1: B (correct option is B)\n\
             Question 2: A (correct option is B)\n\
             \n\
             Your result is 1/2\n\n"
        );
    }

    #[test]
    fn timeout_records_not_attempted_even_with_a_candidate() {
        let (_dir, mut run) = new_run(quiz("m"));
        let b = QuizLayout::new(SIZE).option_boxes()[1].center();
        run.on_frame(&at(0, Some(b))).expect("frame");
        run.on_frame(&at(1000, Some(Pos2::new(600.0, 20.0)))).expect("frame");
        run.on_frame(&at(14_000, Some(b))).expect("frame");
        let event = run.on_frame(&at(15_000, Some(b))).expect("frame");
        assert_eq!(event, InteractionEvent::Timeout);
        assert!(log_of(&run).starts_with("Question 1: Not Attempted(correct option is B)\n"));
    }

    #[test]
    fn question_clock_starts_at_its_first_frame() {
        let (_dir, mut run) = new_run(quiz("mm"));
        run.on_frame(&at(0, None)).expect("frame");
        run.on_frame(&at(15_000, None)).expect("frame");
        assert_eq!(run.current_question().map(|(i, _)| i), Some(1));
        run.on_frame(&at(15_040, None)).expect("frame");
        assert_eq!(run.on_frame(&at(29_000, None)).expect("frame"), InteractionEvent::None);
        assert_eq!(run.on_frame(&at(30_040, None)).expect("frame"), InteractionEvent::Timeout);
        assert!(run.is_complete());
    }

    #[test]
    fn finishing_early_records_every_later_question() {
        for (total, finish_at) in [(5, 1), (5, 3), (2, 0)] {
            let kinds: String = "mdmdm".chars().take(total).collect();
            let (_dir, mut run) = new_run(quiz(&kinds));
            let mut t = 0;
            for _ in 0..finish_at {
                run.on_frame(&at(t, None)).expect("frame");
                t += 15_000;
                run.on_frame(&at(t, None)).expect("frame");
                t += 40;
            }
            assert_eq!(hold(&mut run, t, finish_center()), InteractionEvent::FinishConfirmed);
            assert!(run.is_complete());

            let log = log_of(&run);
            let numbers: Vec<usize> = log
                .lines()
                .filter_map(|line| line.strip_prefix("Question "))
                .filter_map(|rest| rest.split(':').next()?.parse().ok())
                .collect();
            let mut sorted = numbers.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (1..=total).collect::<Vec<_>>(), "{log}");
        }
    }

    #[test]
    fn finishing_on_the_last_question_adds_nothing() {
        let (_dir, mut run) = new_run(quiz("md"));
        run.on_frame(&at(0, None)).expect("frame");
        run.on_frame(&at(15_000, None)).expect("frame");
        assert_eq!(hold(&mut run, 15_040, finish_center()), InteractionEvent::FinishConfirmed);
        assert_eq!(
            log_of(&run),
            "Question 1: Not Attempted(correct option is B)\n\
             \n\
             Your result is 0/1\n\
             \n\
             Question 2: Not Attempted\n"
        );
        assert!(run.outcome().expect("complete").finished_early);
    }

    #[test]
    fn quit_ends_the_run_like_finish() {
        let (_dir, mut run) = new_run(quiz("mdm"));
        let mut frame = at(0, None);
        frame.quit = true;
        run.on_frame(&frame).expect("frame");
        assert!(run.is_complete());
        assert_eq!(log_of(&run).lines().filter(|l| l.contains("Not Attempted")).count(), 3);
    }

    #[test]
    fn stopped_source_times_out_everything_left() {
        let (_dir, mut run) = new_run(quiz("dmd"));
        let outcome = run
            .run_to_end(&mut vec![at(0, None), at(40, None)].into_iter())
            .expect("run");
        assert_eq!(outcome.score, 0);
        assert!(!outcome.finished_early);
        assert_eq!(
            log_of(&run),
            "Question 2: Not Attempted(correct option is B)\n\
             \n\
             Your result is 0/1\n\
             \n\
             Question 1: Not Attempted\n\
             Question 3: Not Attempted\n"
        );
    }

    #[test]
    fn frames_after_completion_are_ignored() {
        let (_dir, mut run) = new_run(quiz("m"));
        run.source_stopped().expect("stop");
        assert!(run.is_complete());
        assert_eq!(run.on_frame(&at(0, None)).expect("frame"), InteractionEvent::None);
        assert_eq!(run.current_question(), None);
    }
}
