use std::fmt;

use explorers_core::model::GameKind;
use services::{AppServices, Clock};
use tracing::debug;

mod terminal;

/// Recent games shown by `history`.
const HISTORY_LIMIT: u32 = 10;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownGame { raw: String },
    InvalidScore { raw: String },
    InvalidSound { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires {what}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownGame { raw } => write!(
                f,
                "unknown game: {raw} (expected comparison, ordering or composition)"
            ),
            ArgsError::InvalidScore { raw } => write!(f, "invalid score value: {raw}"),
            ArgsError::InvalidSound { raw } => write!(f, "invalid sound value: {raw} (on|off)"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
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
    eprintln!("  explorers play <comparison|ordering|composition> [options]");
    eprintln!("  explorers progress                      [options]");
    eprintln!("  explorers name <player name>            [options]");
    eprintln!("  explorers reset [<game> [<score>]]      [options]");
    eprintln!("  explorers sound <on|off>                [options]");
    eprintln!("  explorers history [<game>]              [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   default sqlite://explorers.sqlite3");
    eprintln!("  --seed <u64>        deterministic rounds");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXPLORERS_DB_URL, EXPLORERS_SEED, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play(GameKind),
    Progress,
    Name(String),
    Reset { game: Option<GameKind>, value: u32 },
    Sound(bool),
    History(Option<GameKind>),
    Help,
}

#[derive(Debug)]
struct Args {
    command: Command,
    db_url: String,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("EXPLORERS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://explorers.sqlite3".into(), normalize_sqlite_url);
        let mut seed = std::env::var("EXPLORERS_SEED")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok());

        let mut positional = Vec::new();
        let mut help = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    let parsed = value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => help = true,
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let command = if help {
            Command::Help
        } else {
            parse_command(positional)?
        };
        Ok(Self {
            command,
            db_url,
            seed,
        })
    }
}

fn parse_command(positional: Vec<String>) -> Result<Command, ArgsError> {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return Ok(Command::Help);
    };

    let command = match name.as_str() {
        "help" => Command::Help,
        "progress" => Command::Progress,
        "play" => {
            let raw = words.next().ok_or(ArgsError::MissingArgument {
                command: "play",
                what: "a game",
            })?;
            Command::Play(parse_game(raw)?)
        }
        "name" => {
            let name = words.by_ref().collect::<Vec<_>>().join(" ");
            if name.trim().is_empty() {
                return Err(ArgsError::MissingArgument {
                    command: "name",
                    what: "a player name",
                });
            }
            Command::Name(name)
        }
        "reset" => {
            let game = words.next().map(parse_game).transpose()?;
            let value = match words.next() {
                Some(raw) => raw
                    .parse::<u32>()
                    .map_err(|_| ArgsError::InvalidScore { raw: raw.clone() })?,
                None => 0,
            };
            Command::Reset { game, value }
        }
        "sound" => {
            let raw = words.next().ok_or(ArgsError::MissingArgument {
                command: "sound",
                what: "on or off",
            })?;
            let enabled = match raw.as_str() {
                "on" | "true" => true,
                "off" | "false" => false,
                _ => return Err(ArgsError::InvalidSound { raw }),
            };
            Command::Sound(enabled)
        }
        "history" => Command::History(words.next().map(parse_game).transpose()?),
        _ => return Err(ArgsError::UnknownArg(name)),
    };

    match words.next() {
        Some(extra) => Err(ArgsError::UnknownArg(extra)),
        None => Ok(command),
    }
}

fn parse_game(raw: String) -> Result<GameKind, ArgsError> {
    raw.parse().map_err(|_| ArgsError::UnknownGame { raw })
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    debug!(db_url = %args.db_url, seed = ?args.seed, "opening storage");
    let services = AppServices::new_sqlite(&args.db_url, Clock::default(), args.seed).await?;
    let progress = services.progress();

    match args.command {
        Command::Play(game) => terminal::play(&services, game).await?,
        Command::Progress => {
            let current = progress.current().await;
            println!("{}", current.greeting());
            for game in GameKind::ALL {
                println!("  {:<16} best {}", game.title(), current.best_score(game));
            }
            println!("  {:<16} {}", "Total", current.scores().total());
            println!(
                "  {:<16} {}",
                "Sound",
                if current.sound_enabled() { "on" } else { "off" }
            );
        }
        Command::Name(name) => {
            let updated = progress.set_player_name(&name).await?;
            println!("{}", updated.greeting());
        }
        Command::Reset { game: Some(game), value } => {
            progress.reset_progress_score(game, value).await?;
            println!("{} best score set to {value}", game.title());
        }
        Command::Reset { game: None, .. } => {
            progress.reset_all_progress().await?;
            println!("All best scores reset");
        }
        Command::Sound(enabled) => {
            progress.set_sound_enabled(enabled).await?;
            println!("Sound {}", if enabled { "on" } else { "off" });
        }
        Command::History(game) => {
            let items = services.history().recent(game, HISTORY_LIMIT).await?;
            if items.is_empty() {
                println!("No games played yet");
            }
            for item in items {
                println!(
                    "  {}  {:<16} score {:>3}  answered {:>3}  reached {}",
                    item.completed_at.format("%Y-%m-%d %H:%M"),
                    item.game.title(),
                    item.score,
                    item.questions_answered,
                    item.highest_level.info(item.game).title,
                );
            }
        }
        Command::Help => print_usage(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
