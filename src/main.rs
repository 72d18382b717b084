#![warn(clippy::all, rust_2018_idioms)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use gesture_quiz::responses::ResponseStore;
use gesture_quiz::tracking::ReplayTracker;
use gesture_quiz::{App, QuizConfig, QuizError, QuizRun};

#[derive(Parser, Debug)]
#[command(name = "gesture-quiz", about = "Hand-gesture controlled quiz")]
struct Cli {
    /// Quiz definition file
    #[arg(long, default_value = "quiz.txt")]
    quiz: PathBuf,

    /// Directory for the response log and drawings (cleared on start)
    #[arg(long, default_value = "responses")]
    responses: PathBuf,

    /// TOML file overriding timings and thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run headless over a recorded landmark stream (JSON lines) instead of the window
    #[arg(long)]
    replay: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => QuizConfig::load(path)?,
        None => QuizConfig::default(),
    };
    let questions = gesture_quiz::quiz::load_questions(&cli.quiz)?;

    // Open the frame source before touching the responses directory.
    let replay = cli
        .replay
        .as_deref()
        .map(ReplayTracker::open)
        .transpose()?;

    let store = ResponseStore::prepare(&cli.responses)?;
    let mut quiz = QuizRun::new(questions, config, store);

    match replay {
        Some(mut tracker) => {
            let outcome = quiz.run_to_end(&mut tracker)?;
            println!("{}", outcome.summary);
            println!("Responses saved to {}", outcome.log_path.display());
        }
        None => {
            log::info!("Starting quiz window, press Q to quit");
            let native_options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([640.0, 480.0])
                    .with_title("Gesture Quiz"),
                ..Default::default()
            };
            eframe::run_native(
                "Gesture Quiz",
                native_options,
                Box::new(|cc| Ok(Box::new(App::new(cc, quiz)))),
            )
            .map_err(|err| anyhow::anyhow!("display error: {err}"))
            .context("the quiz window failed")?;
        }
    }
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<QuizError>() {
        Some(QuizError::DeviceUnavailable { .. }) => {
            eprintln!("Camera Error: {err}");
            eprintln!(
                "Please check that the frame source is connected and not used by another application."
            );
        }
        Some(QuizError::QuizDefinition { .. } | QuizError::NoQuestions { .. }) => {
            eprintln!("Quiz Error: {err}");
            eprintln!("Please make sure the quiz file exists and is well formed.");
        }
        Some(QuizError::Config { .. }) => {
            eprintln!("Config Error: {err}");
        }
        _ => {
            eprintln!("An unexpected error occurred: {err:#}");
            eprintln!("Please check your setup and try again.");
        }
    }
}
