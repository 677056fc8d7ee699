use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent};
use crossterm::terminal;
use tracing::debug;

use quiz_forge::clients::{ClientType, FlexibleClient};
use quiz_forge::config::Settings;
use quiz_forge::extract::{ContentInput, Extractors, Upload};
use quiz_forge::grading::{QuizReport, Verdict};
use quiz_forge::interceptors::FileInterceptor;
use quiz_forge::notice::{Notice, NoticeLevel};
use quiz_forge::{
    Difficulty, HttpQuizGenerator, LocalQuizGenerator, QuestionType, QuizConfig, QuizError,
    QuizGateway, QuizGenerator, QuizSession, Stage,
};

#[derive(Parser)]
#[command(author, version, about = "Generate a quiz from your notes and take it in the terminal", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    QUIZ_ENDPOINT          URL of an HTTP generation service (skips the built-in gateway)
    QUIZ_ENDPOINT_KEY      Bearer token for QUIZ_ENDPOINT
    QUIZ_CLIENT            Model backend for the built-in gateway (gateway|claude|deepseek|mock)
    QUIZ_GATEWAY_API_KEY   API key for the hosted AI gateway
    ANTHROPIC_API_KEY      API key for Claude
    DEEPSEEK_API_KEY       API key for DeepSeek
    QUIZ_TRANSCRIPT_DIR    Save prompts and model responses here
    PDFTOTEXT              PDF text extraction program [default: pdftotext]

QUIZ COMMANDS:
    <answer>   Record an answer and move on (letters or numbers pick options)
    <Enter>    Move on, keeping the recorded answer
    <          Previous question
    :back      Back to configuration (discards this quiz)")]
struct Args {
    /// Read quiz content from a file (.txt, .md, .pdf, images)
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Use this text as quiz content
    #[arg(long)]
    text: Option<String>,

    /// Question type: mcq, true-false, one-word, brief, long-answer
    #[arg(short = 't', long = "type", default_value = "mcq")]
    question_type: QuestionType,

    /// Difficulty: easy, medium, hard
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// Number of questions (3-20)
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(3..=20))]
    count: u8,

    /// Generation service URL [default: $QUIZ_ENDPOINT, else the built-in gateway]
    #[arg(long)]
    endpoint: Option<String>,

    /// Model backend for the built-in gateway [default: $QUIZ_CLIENT, else auto-detect]
    #[arg(short, long)]
    client: Option<ClientType>,

    /// Save prompts and model responses to this directory
    #[arg(long)]
    transcripts: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so RUST_LOG in .env is seen
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();
    let settings = Settings::from_env();
    let config = QuizConfig::new(args.question_type, args.difficulty, args.count)?;
    let generator = build_generator(&args, &settings)?;
    let extractors = match &settings.pdftotext {
        Some(program) => Extractors::with_pdf_program(program.clone()),
        None => Extractors::default(),
    };

    let mut pending = match (&args.file, &args.text) {
        (Some(path), _) => Some(ContentInput::Upload(
            Upload::from_path(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?,
        )),
        (None, Some(text)) => Some(ContentInput::Text(text.clone())),
        (None, None) => None,
    };

    let mut session = QuizSession::new();
    loop {
        match session.stage() {
            Stage::Input => {
                let input = match pending.take() {
                    Some(input) => input,
                    None => match prompt_for_content().await? {
                        Some(input) => input,
                        None => return Ok(()),
                    },
                };
                let name = match &input {
                    ContentInput::Upload(upload) => Some(upload.name.clone()),
                    ContentInput::Text(_) => None,
                };
                let content = match extractors.acquire(input).await {
                    Ok(content) => content,
                    Err(e) => {
                        show(&Notice::from_error(&e));
                        continue;
                    }
                };
                if let Some(name) = name {
                    show(&Notice::file_processed(&name));
                }
                if let Err(e) = session.submit_content(content) {
                    show(&Notice::from_error(&QuizError::from(e)));
                }
            }
            Stage::Config => {
                session.configure(config)?;
                println!(
                    "\nGenerating {} {} questions ({})...",
                    config.question_count(),
                    config.question_type(),
                    config.difficulty()
                );
                match session.generate(generator.as_ref()).await {
                    Ok(count) => show(&Notice::generated(count)),
                    Err(e) => {
                        show(&Notice::from_error(&e));
                        if !confirm("Try again? (y/N): ") {
                            return Ok(());
                        }
                    }
                }
            }
            Stage::Taking => {
                if !take_question(&mut session)? {
                    return Ok(());
                }
            }
            Stage::Results => {
                if let Some(report) = session.report() {
                    print_report(&report);
                }
                if !confirm("\nCreate a new quiz? (y/N): ") {
                    return Ok(());
                }
                session.reset();
            }
        }
    }
}

fn build_generator(args: &Args, settings: &Settings) -> anyhow::Result<Box<dyn QuizGenerator>> {
    if let Some(endpoint) = args.endpoint.clone().or_else(|| settings.endpoint.clone()) {
        let mut generator = HttpQuizGenerator::new(endpoint);
        if let Some(key) = &settings.endpoint_key {
            generator = generator.with_api_key(key.clone());
        }
        return Ok(Box::new(generator));
    }

    let client_type = match (args.client, &settings.client) {
        (Some(client_type), _) => client_type,
        (None, Some(name)) => name.parse()?,
        (None, None) => ClientType::detect(),
    };
    if client_type == ClientType::Mock {
        eprintln!("No API key found; using the built-in sample quiz (set QUIZ_CLIENT to choose a backend).");
    }
    debug!(client = %client_type, "Using built-in gateway");

    let mut gateway = QuizGateway::new(FlexibleClient::from_type(client_type)?);
    if let Some(dir) = args.transcripts.clone().or_else(|| settings.transcript_dir.clone()) {
        gateway = gateway.with_interceptor(Arc::new(FileInterceptor::new(dir)));
    }
    Ok(Box::new(LocalQuizGenerator::new(gateway)))
}

/// Ask for content on stdin. `None` when stdin is closed.
async fn prompt_for_content() -> anyhow::Result<Option<ContentInput>> {
    println!("\nPaste your content and finish with an empty line, or enter a file path:");
    let mut lines = Vec::new();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() && !lines.is_empty() {
            break;
        }
        lines.push(line);
    }
    if lines.is_empty() {
        return Ok(None);
    }

    if let [single] = lines.as_slice() {
        let path = Path::new(single.trim());
        if path.is_file() {
            return Ok(Some(ContentInput::Upload(Upload::from_path(path).await?)));
        }
    }
    Ok(Some(ContentInput::Text(lines.join("\n"))))
}

/// Ask the current question. `false` when stdin is closed.
fn take_question(session: &mut QuizSession) -> anyhow::Result<bool> {
    let Some(question) = session.current_question().cloned() else {
        return Ok(true);
    };
    let total = session.questions().len();
    let index = session.current_index();

    println!(
        "\n[{:>3.0}%] Question {} of {} · {} answered · {}",
        session.progress().unwrap_or(0.0) * 100.0,
        index + 1,
        total,
        session.answered_count(),
        question.question_type
    );
    println!("{}", question.question);
    match question.question_type {
        QuestionType::Mcq => {
            for option in question.options() {
                println!("  {}", option);
            }
        }
        QuestionType::TrueFalse => println!("  (T)rue / (F)alse"),
        _ => {}
    }
    if let Some(answer) = session.current_answer() {
        println!("  current answer: {}", answer);
    }

    let action = if session.is_last_question() { "complete" } else { "next" };
    let input = read_line(&format!("answer ({}): ", action))?;
    let Some(input) = input else {
        return Ok(false);
    };

    match input.trim() {
        "<" => session.previous()?,
        ":back" => session.back()?,
        "" => {
            if let Err(e) = session.next() {
                println!("{}", e);
            }
        }
        typed => {
            session.record_answer(question.resolve_answer(typed))?;
            session.next()?;
        }
    }
    Ok(true)
}

fn print_report(report: &QuizReport) {
    println!("\n{}", report.headline());
    println!("Score: {}%  ({})", report.score.percentage, report.summary());
    println!("\nReview your answers:");
    for review in &report.reviews {
        let mark = match review.verdict {
            Verdict::Correct => "✔",
            Verdict::Incorrect => "✘",
            Verdict::Ungraded => "·",
        };
        println!("\n{} Question {}: {}", mark, review.index + 1, review.question);
        println!("  Your answer: {}", review.answer_display());
        if review.shows_correct_answer() {
            println!("  Correct answer: {}", review.correct_answer);
        }
        if !review.explanation.is_empty() {
            println!("  Explanation: {}", review.explanation);
        }
    }
}

fn show(notice: &Notice) {
    match notice.level {
        NoticeLevel::Error => eprintln!("\n✘ {}", notice),
        NoticeLevel::Success => println!("\n✔ {}", notice),
        NoticeLevel::Info => println!("\n{}", notice),
    }
}

fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input))
}

/// Yes/no question. Uses single keystroke detection with fallback to Enter.
fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    let _ = io::stdout().flush();

    if let Ok(answer) = read_single_key() {
        println!("{}", if answer { "y" } else { "n" });
        return answer;
    }

    matches!(read_line(""), Ok(Some(input)) if input.trim().eq_ignore_ascii_case("y"))
}

fn read_single_key() -> io::Result<bool> {
    terminal::enable_raw_mode()?;

    let result = match event::poll(Duration::from_secs(60)) {
        Ok(true) => match event::read() {
            Ok(TermEvent::Key(KeyEvent { code: KeyCode::Char('y' | 'Y'), .. })) => Ok(true),
            Ok(_) => Ok(false),
            Err(e) => Err(e),
        },
        // Timeout defaults to no
        Ok(false) => Ok(false),
        Err(e) => Err(e),
    };

    terminal::disable_raw_mode()?;
    result
}
