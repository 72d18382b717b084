use crate::engine::QuizRun;
use crate::layout::QuizLayout;
use crate::quiz::{OptionLetter, Question};
use crate::state::QuestionSession;
use crate::tracking::{FrameInput, FrameSize, HandLandmarks};
use eframe::Frame;
use egui::{Align2, Color32, FontId, Painter, Rect, Stroke, Vec2, ViewportCommand};
use log::error;
use std::time::Instant;

// 颜色（与题目、选项、计时器、完成按钮对应）
const PANEL_COLOR: Color32 = Color32::from_rgb(249, 182, 255);
const OPTION_COLOR: Color32 = Color32::from_rgb(144, 238, 144);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(230, 216, 173);
const TIMER_COLOR: Color32 = Color32::from_rgb(193, 182, 255);
const FINISH_COLOR: Color32 = Color32::from_rgb(152, 251, 152);
const INK_COLOR: Color32 = Color32::from_rgb(255, 0, 0);
const BACKGROUND_COLOR: Color32 = Color32::from_rgb(20, 20, 20);
const BOX_ALPHA: f32 = 0.6;

// 鼠标模拟的手：不按键时拇指离开指尖，按住左键时捏合
const THUMB_OFFSET: Vec2 = Vec2::new(-80.0, 40.0);
const PINCH_OFFSET: Vec2 = Vec2::new(3.0, 4.0);

/// Stands in for camera + hand detector: the pointer is the index fingertip,
/// holding the primary button pinches.
struct PointerHand;

impl PointerHand {
    fn sample(ctx: &egui::Context, frame_rect: Rect, started: Instant) -> FrameInput {
        let size = FrameSize::new(
            frame_rect.width().max(1.0) as u32,
            frame_rect.height().max(1.0) as u32,
        );
        let (hover, pinching, quit) = ctx.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.primary_down(),
                i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape),
            )
        });
        let hand = hover
            .filter(|pos| frame_rect.contains(*pos))
            .map(|pos| {
                let tip = (pos - frame_rect.min).to_pos2().floor();
                let thumb = tip + if pinching { PINCH_OFFSET } else { THUMB_OFFSET };
                HandLandmarks::synthetic(tip, thumb, size)
            });
        FrameInput {
            timestamp: started.elapsed(),
            size,
            hand,
            quit,
        }
    }
}

pub struct App {
    run: QuizRun,
    started: Instant,
    result_shown_at: Option<Instant>,
    error: Option<String>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, run: QuizRun) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        Self {
            run,
            started: Instant::now(),
            result_shown_at: None,
            error: None,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let frame_rect = ctx.available_rect();

        if self.error.is_none() && !self.run.is_complete() {
            let input = PointerHand::sample(ctx, frame_rect, self.started);
            if let Err(err) = self.run.on_frame(&input) {
                error!("Could not record response: {err}");
                self.error = Some(err.to_string());
            }
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(BACKGROUND_COLOR))
            .show(ctx, |ui| {
                let painter = ui.painter();
                if let Some(message) = &self.error {
                    render_message(painter, frame_rect, message, Color32::LIGHT_RED);
                } else if let Some(outcome) = self.run.outcome() {
                    render_message(painter, frame_rect, &outcome.summary, TIMER_COLOR);
                } else {
                    self.render_question(painter, frame_rect);
                }
            });

        if self.run.is_complete() {
            let shown_at = *self.result_shown_at.get_or_insert_with(Instant::now);
            if shown_at.elapsed() >= self.run.config().result_display() {
                ctx.send_viewport_cmd(ViewportCommand::Close);
            }
        }

        // 摄像头式的逐帧循环：每帧都重绘
        ctx.request_repaint();
    }
}

impl App {
    fn render_question(&self, painter: &Painter, frame_rect: Rect) {
        let (Some((index, question)), Some(session)) =
            (self.run.current_question(), self.run.session())
        else {
            return;
        };
        let layout = QuizLayout::new(FrameSize::new(
            frame_rect.width().max(1.0) as u32,
            frame_rect.height().max(1.0) as u32,
        ));
        let origin = frame_rect.min.to_vec2();
        let config = self.run.config();

        text_box(
            painter,
            layout.header_box().translate(origin),
            &format!("Question {}/{}", index + 1, self.run.total_questions()),
            PANEL_COLOR,
        );
        text_box(
            painter,
            layout.prompt_box().translate(origin),
            question.prompt(),
            PANEL_COLOR,
        );

        if let Question::MultipleChoice { options, .. } = question {
            for (rect, (letter, option)) in layout
                .option_boxes()
                .iter()
                .zip(OptionLetter::ALL.iter().zip(options))
            {
                let color = if session.candidate_selection == Some(*letter) {
                    HIGHLIGHT_COLOR
                } else {
                    OPTION_COLOR
                };
                text_box(painter, rect.translate(origin), &format!(" {option}"), color);
            }
        }

        render_strokes(painter, session, origin);

        text_box(
            painter,
            layout.timer_box().translate(origin),
            &format!("Time Left: {} sec", session.seconds_left(config)),
            TIMER_COLOR,
        );
        let finish_color = if session.finish_hovered {
            HIGHLIGHT_COLOR
        } else {
            FINISH_COLOR
        };
        text_box(
            painter,
            layout.finish_box().translate(origin),
            "Finish",
            finish_color,
        );

        if let Some(tip) = session.fingertip {
            let color = if session.pinching {
                INK_COLOR
            } else {
                Color32::WHITE
            };
            painter.circle_filled(tip + origin, 6.0, color);
            painter.circle_stroke(tip + origin, 6.0, Stroke::new(2.0, Color32::BLACK));
        }
    }
}

fn text_box(painter: &Painter, rect: Rect, text: &str, background: Color32) {
    painter.rect_filled(rect, 4.0, background.gamma_multiply(BOX_ALPHA));
    painter.text(
        rect.left_center() + Vec2::new(10.0, 0.0),
        Align2::LEFT_CENTER,
        text,
        FontId::proportional(20.0),
        Color32::WHITE,
    );
}

fn render_strokes(painter: &Painter, session: &QuestionSession, origin: Vec2) {
    for [a, b] in session.strokes.segments() {
        painter.line_segment([a + origin, b + origin], Stroke::new(2.0, INK_COLOR));
    }
}

fn render_message(painter: &Painter, frame_rect: Rect, message: &str, background: Color32) {
    let galley = painter.layout_no_wrap(
        message.to_owned(),
        FontId::proportional(28.0),
        Color32::WHITE,
    );
    let text_rect = Align2::CENTER_CENTER.anchor_size(frame_rect.center(), galley.size());
    painter.rect_filled(
        text_rect.expand(10.0),
        4.0,
        background.gamma_multiply(BOX_ALPHA),
    );
    painter.galley(text_rect.min, galley, Color32::WHITE);
}
