mod config;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use course_core::model::{CourseContent, LessonId, Username, create_course_content};
use services::{AppServices, Clock};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, prepare_sqlite_file};

#[derive(Parser, Debug)]
#[command(name = "learn")]
#[command(about = "Course content numbering, completion tracking and CMS webhook ingestion")]
#[command(version)]
struct Cli {
    /// SQLite database URL or path
    #[arg(long, global = true, env = "LEARN_DB_URL")]
    db: Option<String>,

    /// Log filter directives, e.g. `services=debug`
    #[arg(long, global = true, env = "LEARN_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Renumber a course content JSON file and print the result
    Number { file: PathBuf },
    /// Print a student's progress through a course
    Completion {
        #[arg(long)]
        course: String,
        #[arg(long)]
        user: String,
    },
    /// Mark a lesson as completed and print the updated progress
    Complete {
        #[arg(long)]
        course: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        lesson: String,
    },
    /// Process a CMS webhook payload file
    Webhook { file: PathBuf },
    /// List stored courses
    Courses {
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
}

fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_services(config: &Config) -> Result<AppServices, Box<dyn std::error::Error>> {
    // Open + migrate SQLite here so core/services stay free of filesystem concerns.
    prepare_sqlite_file(&config.db_url)?;
    debug!(db_url = %config.db_url, "opening database");
    Ok(AppServices::new_sqlite(&config.db_url, Clock::System).await?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.db, cli.log)?;

    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Number { file } => {
            let content: CourseContent = serde_json::from_value(read_json(&file)?)?;
            print_json(&create_course_content(content))
        }
        Command::Completion { course, user } => {
            let app = open_services(&config).await?;
            let progress = app
                .completions()
                .course_completion(&Username::new(user), &course)
                .await?;
            print_json(&progress)
        }
        Command::Complete {
            course,
            user,
            lesson,
        } => {
            let app = open_services(&config).await?;
            let progress = app
                .completions()
                .mark_as_completed(&Username::new(user), &course, &LessonId::new(lesson))
                .await?;
            print_json(&progress)
        }
        Command::Webhook { file } => {
            let payload = read_json(&file)?;
            let app = open_services(&config).await?;
            let result = app.webhooks().process_notification(&payload).await?;
            info!(operation = ?result.operation, "webhook processed");
            print_json(&result)
        }
        Command::Courses { limit } => {
            let app = open_services(&config).await?;
            for course in app.courses().list_courses(limit).await? {
                println!("{}\t{}\t{}", course.id(), course.slug(), course.title());
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // Printed once here; lower layers only return errors.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
