use std::fmt;
use std::sync::Arc;

use lesson_core::LessonPlan;
use lesson_core::model::{ProgressUpdate, TopicId};
use services::{Clock, LessonPlanService, SilentSoundPlayer};
use storage::{ProgressGateway, Storage};

const DEFAULT_DB_URL: &str = "sqlite://dev.sqlite3";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidTopicId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidTopicId { raw } => write!(f, "invalid topic id: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- progress                  [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- mark-read <topic-id>      [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- mark-studied <topic-id>   [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LEARN_DB_URL, LEARN_LOG (tracing filter, default {DEFAULT_LOG_FILTER})");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Progress,
    MarkRead(TopicId),
    MarkStudied(TopicId),
}

struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("LEARN_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut command = Command::Progress;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => return Ok(None),
                "progress" => command = Command::Progress,
                "mark-read" => {
                    command = Command::MarkRead(parse_topic_id(&mut args, "mark-read")?);
                }
                "mark-studied" => {
                    command = Command::MarkStudied(parse_topic_id(&mut args, "mark-studied")?);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self { db_url, command }))
    }
}

fn parse_topic_id(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<TopicId, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidTopicId { raw: raw.clone() })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LEARN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| format!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn print_progress(service: &mut LessonPlanService) {
    println!("{}", service.language_name());
    let topics: Vec<(TopicId, String)> = service
        .list_topics()
        .iter()
        .map(|topic| (topic.id(), topic.title().to_owned()))
        .collect();

    for (id, title) in topics {
        let progress = service.get_progress(id).await;
        let high_score = progress
            .quiz_high_score
            .map_or_else(|| "-".to_owned(), |score| score.to_string());
        println!(
            "  [{id}] {title}: lesson read={} flashcards studied={} quiz passed={} high score={high_score}",
            progress.lesson_read, progress.flashcard_studied, progress.quiz_passed,
        );
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).inspect_err(|e| {
        eprintln!("{e}");
        print_usage();
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_tracing()?;

    // Open + migrate SQLite in the binary glue so core/services stay storage-agnostic.
    prepare_sqlite_file(&args.db_url)?;
    let storage = Storage::sqlite(&args.db_url).await?;
    tracing::debug!(db_url = %args.db_url, "storage ready");

    let mut service = LessonPlanService::new(
        Clock::default_clock(),
        LessonPlan::french()?,
        ProgressGateway::new(Arc::clone(&storage.kv)),
        Arc::new(SilentSoundPlayer),
    );

    let update = match args.command {
        Command::Progress => None,
        Command::MarkRead(id) => Some((id, ProgressUpdate::SetLessonRead(true))),
        Command::MarkStudied(id) => Some((id, ProgressUpdate::SetFlashcardStudied(true))),
    };

    if let Some((id, update)) = update {
        if service.get_topic(id).is_none() {
            tracing::warn!(topic_id = %id, "topic is not in the catalog; ignoring");
        } else {
            service.update_progress(id, update).await;
        }
    }

    print_progress(&mut service).await;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
