//! lectio: a local-first devotional reading planner.
//!
//! The plan walks the Pauline epistles two chapters a day. Day `n` is a pure
//! function of the curriculum table, so every device computes the same
//! schedule without coordination; only the reader's own state is stored.
//!
//! # Architecture
//!
//! ## One flat keyspace
//!
//! Everything persisted (identity pointer, progress, status ledger, archive,
//! journals, generated-content cache) lives in a single string keyspace
//! behind [`core::store::KeyValueStore`]. Per-user records are prefixed with
//! `"{user}_"`; the content cache is global and disposable.
//!
//! ## The thin waist
//!
//! SQLite access routes through [`core::broker::DbBroker`] for process-wide
//! serialization and per-operation tracing.
//!
//! ## Subsystems (plugins)
//!
//! - `progress`: last completed day
//! - `status`: good/ok/bad per day, with toggle semantics
//! - `archive`: completed readings, with quota recovery
//! - `content`: generated study material and its cache
//! - `devotional`: the completion flow
//! - `backup`: export and restore of one user's keys
//! - `stats`: dashboard figures
//! - `journal`: diary entries and mission plans
//!
//! # Examples
//!
//! ```bash
//! lectio login grace
//! lectio today
//! lectio complete --note "Grace before works."
//! lectio status toggle 1 ok
//! lectio backup --out grace.json
//! ```

mod cli;
pub mod core;
pub mod plugins;

use crate::cli::{ArchiveCommand, Cli, Command, CompleteCli, StatusCommand};
use crate::core::config::LectioConfig;
use crate::core::curriculum::{Curriculum, Locale};
use crate::core::error::LectioError;
use crate::core::namespace::UserId;
use crate::core::output;
use crate::core::service::LectioService;
use crate::core::{error, logging};
use crate::plugins::archive::ArchiveId;
use crate::plugins::content::{self, ContentBundle};
use crate::plugins::devotional::{CompletedReading, ReadingMode};

use clap::Parser;
use colored::Colorize;
use std::fs;

pub fn run() -> Result<(), error::LectioError> {
    let cli = Cli::parse();
    let mut config = LectioConfig::load(cli.config.as_deref())?;
    if let Some(locale) = cli.locale {
        config.reading.locale = locale;
    }
    logging::init(&config.log);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(dispatch(cli.command, &config))
}

fn require_user(user: Option<UserId>) -> Result<UserId, LectioError> {
    user.ok_or_else(|| {
        LectioError::NotFound("no active user; run `lectio login <name>` first".to_string())
    })
}

async fn dispatch(command: Command, config: &LectioConfig) -> Result<(), LectioError> {
    let service = LectioService::from_config(config)?;
    let locale = config.reading.locale;
    let plan = Curriculum::pauline();

    match command {
        Command::Login { name } => {
            let user = service.login(&name).await?;
            let next = service.progress(&user).await.saturating_add(1);
            println!("{} {}", "Logged in as".green(), user.as_str().bold());
            println!("Next reading: day {next}");
        }
        Command::Logout => {
            service.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => match service.current_user().await {
            Some(user) => println!("{user}"),
            None => println!("{}", "(anonymous)".dimmed()),
        },
        Command::Today => {
            let user = service.current_user().await;
            let day = match &user {
                Some(user) => service.progress(user).await.saturating_add(1),
                None => 1,
            };
            let reading = plan.reading_for_day(i64::from(day), locale);
            println!("{} {}", format!("Day {day}").cyan().bold(), reading.reference(locale));
            if let Some(cached) = content::get_cached(service.store(), &reading.reference(locale))? {
                println!("{}", output::compact_line(&cached.summary, 120).dimmed());
            }
        }
        Command::Day { n } => {
            let reading = plan.reading_for_day(n, locale);
            println!("{} {}", format!("Day {}", n.max(1)).cyan().bold(), reading.reference(locale));
        }
        Command::Schedule => {
            let user = service.current_user().await;
            let statuses = service.statuses(user.as_ref()).await;
            for item in plan.full_schedule(locale) {
                let mark = output::status_mark(statuses.get(&item.day).copied());
                println!("{:>3}  {}  {}", item.day, mark, item.reading);
            }
        }
        Command::Complete(args) => complete(&service, plan, locale, args).await?,
        Command::Status(status_cli) => {
            let user = service.current_user().await;
            match status_cli.command {
                StatusCommand::List => {
                    let statuses = service.statuses(user.as_ref()).await;
                    if statuses.is_empty() {
                        println!("{}", "No statuses recorded".dimmed());
                    }
                    for (day, status) in statuses {
                        println!("{day:>3}  {}", output::status_mark(Some(status)));
                    }
                }
                StatusCommand::Toggle { day, status } => {
                    let now = service.toggle_status(user.as_ref(), day, status).await?;
                    println!("Day {day}: {}", output::status_mark(now));
                }
            }
        }
        Command::Archive(archive_cli) => {
            let user = service.current_user().await;
            let archived = service.archive(user.as_ref()).await;
            match archive_cli.command {
                ArchiveCommand::List => {
                    let mut rows: Vec<_> = archived.iter().collect();
                    rows.sort_by(|a, b| b.1.saved_at().cmp(&a.1.saved_at()));
                    if rows.is_empty() {
                        println!("{}", "Archive is empty".dimmed());
                    }
                    for (id, reading) in rows {
                        println!(
                            "{:<24} {}  {}",
                            id.to_string().cyan(),
                            reading.reading_reference.bold(),
                            reading.date_saved.dimmed()
                        );
                    }
                }
                ArchiveCommand::Show { id } => {
                    let id = ArchiveId::parse(&id);
                    let reading = archived
                        .get(&id)
                        .ok_or_else(|| LectioError::NotFound(format!("archived reading '{id}'")))?;
                    println!("{}", reading.reading_reference.bold());
                    println!("{}\n", reading.date_saved.dimmed());
                    println!("{}\n", reading.passage);
                    if !reading.meditation_guide.is_empty() {
                        println!("{}\n{}\n", "Meditation".cyan(), reading.meditation_guide);
                    }
                    if !reading.context.is_empty() {
                        println!("{}\n{}\n", "Context".cyan(), reading.context);
                    }
                    if !reading.intention.is_empty() {
                        println!("{}\n{}", "Intention".cyan(), reading.intention);
                    }
                }
            }
        }
        Command::Stats { format } => {
            let user = service.current_user().await;
            let stats = service.dashboard(user.as_ref(), plan, locale).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!(
                    "{} {}%   {} {}",
                    "Completion".bold(),
                    stats.completion_rate,
                    "Level".bold(),
                    stats.level.label(locale)
                );
                println!(
                    "good {}  ok {}  bad {}  archived {}",
                    stats.good.to_string().green(),
                    stats.ok.to_string().yellow(),
                    stats.bad.to_string().red(),
                    stats.archived
                );
                for book in &stats.books {
                    println!(
                        "{:<16} {} {:>3}%",
                        book.name,
                        output::percent_bar(book.percent, 20),
                        book.percent
                    );
                }
            }
        }
        Command::Backup { out } => {
            let user = require_user(service.current_user().await)?;
            let document = service.backup(&user).await?;
            match out {
                Some(path) => {
                    fs::write(&path, document)?;
                    println!("Backup written to {}", path.display());
                }
                None => println!("{document}"),
            }
        }
        Command::Restore { file, user } => {
            let user = match user {
                Some(name) => UserId::new(&name)?,
                None => require_user(service.current_user().await)?,
            };
            let document = fs::read_to_string(&file)?;
            if !service.restore(&user, &document).await {
                return Err(LectioError::MalformedBackup(format!(
                    "could not restore {}",
                    file.display()
                )));
            }
            println!("{} {}", "Restored data for".green(), user.as_str().bold());
        }
    }
    Ok(())
}

fn offline_guide(locale: Locale) -> &'static str {
    match locale {
        Locale::Ko => "본문을 천천히 읽고 마음에 남는 한 구절을 적어 보세요.",
        Locale::En => "Read the passage slowly and write down one phrase that stays with you.",
    }
}

// Without a generator the archived record keeps whatever was cached for the
// reference, or a bare record carrying the reader's note.
async fn complete(
    service: &LectioService,
    plan: &Curriculum,
    locale: Locale,
    args: CompleteCli,
) -> Result<(), LectioError> {
    let user = service.current_user().await;

    let (mode, reading) = match (args.book, args.chapter) {
        (Some(book), Some(chapter)) => (
            ReadingMode::Manual,
            plan.manual_reading(book, chapter, locale)?,
        ),
        _ => {
            let day = match (args.day, &user) {
                (Some(0), _) => {
                    return Err(LectioError::ValidationError(
                        "days start at 1".to_string(),
                    ));
                }
                (Some(day), _) => day,
                (None, Some(user)) => service.progress(user).await.saturating_add(1),
                (None, None) => 1,
            };
            (
                ReadingMode::Sequential(day),
                plan.reading_for_day(i64::from(day), locale),
            )
        }
    };
    let reference = reading.reference(locale);

    let mut bundle = match content::get_cached(service.store(), &reference) {
        Ok(Some(bundle)) => bundle,
        _ => ContentBundle {
            passage: reference.clone(),
            pre_reading_questions: Vec::new(),
            meditation_guide: offline_guide(locale).to_string(),
            context: String::new(),
            intention: String::new(),
            image_prompt: String::new(),
            summary: String::new(),
            image: None,
        },
    };
    if let Some(note) = args.note {
        bundle.intention = note;
    }

    let completed = CompletedReading {
        mode,
        reference: reference.clone(),
        content: bundle,
    };
    let id = service.complete_reading(user.as_ref(), &completed).await?;
    println!("{} {} ({})", "Archived".green(), reference.bold(), id);

    if let (ReadingMode::Sequential(day), Some(user)) = (mode, &user) {
        let next = service.proceed(user, day).await?;
        println!("Next reading: day {next}");
    }
    Ok(())
}
