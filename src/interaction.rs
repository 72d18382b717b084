//! Per-question gesture handling.
//!
//! [`QuestionSession::advance`] is called once per frame. It turns the tracked
//! fingertip into hover-and-hold selections, pinch-drawn strokes and the
//! hold-to-finish gesture, and reports at most one event per frame.
//!
//! Frames without a hand change nothing: a detector that drops the hand for a
//! frame or two does not cost the user their hold progress.

use std::time::Duration;

use log::debug;

use crate::config::QuizConfig;
use crate::layout::QuizLayout;
use crate::quiz::{OptionLetter, Question};
use crate::state::QuestionSession;
use crate::tracking::{FrameInput, FrameSize, HandLandmarks};
use crate::utils::AppUtils;

/// Outcome of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
    None,
    OptionConfirmed(OptionLetter),
    FinishConfirmed,
    Timeout,
}

impl InteractionEvent {
    /// Whether this event ends the question.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::None)
    }
}

fn held_long_enough(start: Option<Duration>, now: Duration, hold: Duration) -> bool {
    start.is_some_and(|start| now.saturating_sub(start) >= hold)
}

impl QuestionSession {
    /// Advances the session by one frame.
    pub fn advance(
        &mut self,
        question: &Question,
        frame: &FrameInput,
        config: &QuizConfig,
    ) -> InteractionEvent {
        self.elapsed = frame.timestamp.saturating_sub(self.started_at);
        self.last_frame_size = Some(frame.size);
        if self.elapsed >= config.question_duration() {
            return self.expire();
        }

        self.finish_hovered = false;
        self.fingertip = None;
        let Some(hand) = frame.hand.as_ref() else {
            return InteractionEvent::None;
        };

        let layout = QuizLayout::new(frame.size);
        let tip = hand.fingertip(frame.size);
        self.fingertip = Some(tip);

        if self.track_finish(&layout, tip, config.confirm_hold()) {
            debug!("Finish held at {:?}", self.elapsed);
            return InteractionEvent::FinishConfirmed;
        }

        match question {
            Question::MultipleChoice { .. } => self.track_selection(&layout, tip, config.confirm_hold()),
            Question::Drawing { .. } => {
                self.track_drawing(hand, frame.size, tip, config.pinch_threshold_px);
                InteractionEvent::None
            }
        }
    }

    /// Ends the question by the clock. Also used when the frame source stops.
    pub fn expire(&mut self) -> InteractionEvent {
        self.candidate_selection = None;
        self.confirmation_start = None;
        InteractionEvent::Timeout
    }

    fn track_finish(&mut self, layout: &QuizLayout, tip: egui::Pos2, hold: Duration) -> bool {
        if !layout.finish_contains(tip) {
            self.finish_hover_start = None;
            return false;
        }
        self.finish_hovered = true;
        match self.finish_hover_start {
            None => {
                self.finish_hover_start = Some(self.elapsed);
                false
            }
            start => held_long_enough(start, self.elapsed, hold),
        }
    }

    fn track_selection(
        &mut self,
        layout: &QuizLayout,
        tip: egui::Pos2,
        hold: Duration,
    ) -> InteractionEvent {
        let Some(hovered) = layout.option_at(tip) else {
            self.candidate_selection = None;
            self.confirmation_start = None;
            return InteractionEvent::None;
        };

        if self.candidate_selection == Some(hovered) {
            if held_long_enough(self.confirmation_start, self.elapsed, hold) {
                debug!("Option {hovered} confirmed at {:?}", self.elapsed);
                self.confirmed_selection = Some(hovered);
                return InteractionEvent::OptionConfirmed(hovered);
            }
        } else {
            debug!("Hovering option {hovered}");
            self.candidate_selection = Some(hovered);
            self.confirmation_start = Some(self.elapsed);
        }
        InteractionEvent::None
    }

    fn track_drawing(
        &mut self,
        hand: &HandLandmarks,
        size: FrameSize,
        tip: egui::Pos2,
        threshold: f32,
    ) {
        self.pinch_distance_buffer.push(hand.pinch_distance(size));
        let pinching = AppUtils::mean(self.pinch_distance_buffer.iter().copied())
            .is_some_and(|mean| mean < threshold);
        if pinching != self.pinching {
            debug!("Pinch {}", if pinching { "down" } else { "up" });
            self.pinching = pinching;
        }

        if pinching {
            self.smoothing_buffer.push(tip);
            if self.smoothing_buffer.is_full() {
                if let Some(point) = AppUtils::mean_pixel(self.smoothing_buffer.iter()) {
                    self.strokes.push_point(point);
                }
            }
        } else {
            self.smoothing_buffer.clear();
            self.strokes.pen_up();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StrokePoint;
    use egui::Pos2;

    const SIZE: FrameSize = FrameSize {
        width: 640,
        height: 480,
    };

    fn mcq() -> Question {
        Question::MultipleChoice {
            prompt: "2+2?".to_owned(),
            options: ["1", "2", "3", "4"].map(str::to_owned),
            answer: OptionLetter::D,
        }
    }

    fn drawing() -> Question {
        Question::Drawing {
            prompt: "Sketch a circle".to_owned(),
        }
    }

    fn layout() -> QuizLayout {
        QuizLayout::new(SIZE)
    }

    fn option_center(letter: OptionLetter) -> Pos2 {
        layout().option_boxes()[letter.index()].center().floor()
    }

    fn pointing(ms: u64, tip: Pos2) -> FrameInput {
        // Thumb far from the tip: not pinching.
        let hand = HandLandmarks::synthetic(tip, tip + egui::vec2(-80.0, 40.0), SIZE);
        FrameInput {
            timestamp: Duration::from_millis(ms),
            size: SIZE,
            hand: Some(hand),
            quit: false,
        }
    }

    fn pinching(ms: u64, tip: Pos2) -> FrameInput {
        let hand = HandLandmarks::synthetic(tip, tip + egui::vec2(3.0, 4.0), SIZE);
        FrameInput {
            timestamp: Duration::from_millis(ms),
            size: SIZE,
            hand: Some(hand),
            quit: false,
        }
    }

    fn no_hand(ms: u64) -> FrameInput {
        FrameInput {
            timestamp: Duration::from_millis(ms),
            size: SIZE,
            hand: None,
            quit: false,
        }
    }

    fn run(question: &Question, frames: &[FrameInput]) -> (QuestionSession, Vec<InteractionEvent>) {
        let config = QuizConfig::default();
        let mut session = QuestionSession::new(Duration::ZERO, &config);
        let events = frames
            .iter()
            .map(|frame| session.advance(question, frame, &config))
            .filter(|event| event.is_terminal())
            .collect();
        (session, events)
    }

    #[test]
    fn holding_an_option_confirms_it_once() {
        let d = option_center(OptionLetter::D);
        let frames: Vec<_> = (0..=40).map(|i| pointing(i * 50, d)).collect();
        let config = QuizConfig::default();
        let mut session = QuestionSession::new(Duration::ZERO, &config);
        let mut confirmed_at = None;
        for frame in &frames {
            if session.advance(&mcq(), frame, &config) != InteractionEvent::None {
                confirmed_at = Some(frame.timestamp);
                break;
            }
        }
        assert_eq!(confirmed_at, Some(Duration::from_millis(1500)));
        assert_eq!(session.confirmed_selection, Some(OptionLetter::D));
    }

    #[test]
    fn first_hover_frame_only_starts_the_timer() {
        let d = option_center(OptionLetter::D);
        let (session, events) = run(&mcq(), &[pointing(1000, d)]);
        assert!(events.is_empty());
        assert_eq!(session.candidate_selection, Some(OptionLetter::D));
        assert_eq!(session.confirmation_start, Some(Duration::from_millis(1000)));
    }

    #[test]
    fn moving_to_another_option_restarts_the_hold() {
        let a = option_center(OptionLetter::A);
        let b = option_center(OptionLetter::B);
        let frames = [
            pointing(0, a),
            pointing(1000, a),
            pointing(1400, b),
            pointing(1600, a),
            pointing(2900, a),
        ];
        let (session, events) = run(&mcq(), &frames);
        assert!(events.is_empty(), "{events:?}");
        assert_eq!(session.candidate_selection, Some(OptionLetter::A));
        assert_eq!(session.confirmation_start, Some(Duration::from_millis(1600)));
    }

    #[test]
    fn leaving_all_options_clears_the_candidate() {
        let a = option_center(OptionLetter::A);
        let (session, events) = run(&mcq(), &[pointing(0, a), pointing(100, Pos2::new(600.0, 20.0))]);
        assert!(events.is_empty());
        assert_eq!(session.candidate_selection, None);
        assert_eq!(session.confirmation_start, None);
    }

    #[test]
    fn a_dropped_detection_frame_keeps_hold_progress() {
        let c = option_center(OptionLetter::C);
        let frames = [pointing(0, c), no_hand(800), pointing(1500, c)];
        let (session, events) = run(&mcq(), &frames);
        assert_eq!(events, vec![InteractionEvent::OptionConfirmed(OptionLetter::C)]);
        assert_eq!(session.confirmed_selection, Some(OptionLetter::C));
    }

    #[test]
    fn clock_runs_out_at_fifteen_seconds() {
        let (session, events) = run(&mcq(), &[no_hand(0), no_hand(14_999), no_hand(15_000)]);
        assert_eq!(events, vec![InteractionEvent::Timeout]);
        assert_eq!(session.confirmed_selection, None);
    }

    #[test]
    fn holding_finish_confirms_it() {
        let finish = layout().finish_box().center();
        let (session, events) = run(&mcq(), &[pointing(0, finish), pointing(700, finish), pointing(1500, finish)]);
        assert_eq!(events, vec![InteractionEvent::FinishConfirmed]);
        assert!(session.finish_hovered);
    }

    #[test]
    fn leaving_finish_resets_its_hold() {
        let finish = layout().finish_box().center();
        let frames = [
            pointing(0, finish),
            pointing(1000, Pos2::new(20.0, 460.0)),
            pointing(1200, finish),
            pointing(2600, finish),
        ];
        let (session, events) = run(&drawing(), &frames);
        assert!(events.is_empty());
        assert_eq!(session.finish_hover_start, Some(Duration::from_millis(1200)));
    }

    #[test]
    fn pinch_points_are_smoothed_over_a_full_window() {
        let frames: Vec<_> = (0..12)
            .map(|i| pinching(i * 30, Pos2::new(100.0 + i as f32, 200.0)))
            .collect();
        let (session, _) = run(&drawing(), &frames);
        // Windows 0..10, 1..11, 2..12 → means 104.5, 105.5, 106.5.
        assert_eq!(
            session.strokes.items(),
            &[
                StrokePoint::Point(Pos2::new(104.0, 200.0)),
                StrokePoint::Point(Pos2::new(105.0, 200.0)),
                StrokePoint::Point(Pos2::new(106.0, 200.0)),
            ]
        );
    }

    #[test]
    fn pinch_release_pinch_makes_two_strokes() {
        let mut frames = Vec::new();
        let mut t = 0;
        let mut push = |frame: fn(u64, Pos2) -> FrameInput, tip: Pos2, count: usize| {
            for _ in 0..count {
                frames.push(frame(t, tip));
                t += 30;
            }
        };
        push(pinching, Pos2::new(100.0, 200.0), 12);
        push(pointing, Pos2::new(150.0, 200.0), 8);
        push(pinching, Pos2::new(300.0, 250.0), 20);

        let (session, events) = run(&drawing(), &frames);
        assert!(events.is_empty());
        let strokes = session.strokes.strokes();
        assert_eq!(strokes.len(), 2, "{:?}", session.strokes.items());
        assert!(strokes[1].iter().all(|p| *p == Pos2::new(300.0, 250.0)));
        assert_eq!(
            session
                .strokes
                .items()
                .iter()
                .filter(|item| **item == StrokePoint::PenUp)
                .count(),
            1
        );
    }

    #[test]
    fn drawing_without_pinch_records_nothing() {
        let frames: Vec<_> = (0..20).map(|i| pointing(i * 30, Pos2::new(200.0, 200.0))).collect();
        let (session, _) = run(&drawing(), &frames);
        assert!(session.strokes.is_empty());
        assert!(!session.pinching);
    }

    #[test]
    fn hovering_options_does_nothing_on_drawing_questions() {
        let a = option_center(OptionLetter::A);
        let (session, events) = run(&drawing(), &[pointing(0, a), pointing(2000, a)]);
        assert!(events.is_empty());
        assert_eq!(session.candidate_selection, None);
    }
}
