use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use spark_app_core::FilePersistence;
use spark_cli::profiles::{self, ProfileUpdate};
use spark_cli::{commands, CliRecordKind};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an agent result blob and print the record with its stats
    Parse {
        #[arg(value_enum)]
        kind: CliRecordKind,
        file: Utf8PathBuf,
    },
    /// Check a text blob against the section convention
    Validate {
        #[arg(value_enum)]
        kind: CliRecordKind,
        file: Utf8PathBuf,
    },
    /// Fold recorded stream frames (one JSON object per line) into a transcript
    Replay {
        frames: Utf8PathBuf,
        #[arg(long, default_value = "Replayed plan")]
        goal: String,
    },
    /// Run a live plan against the planning server
    Plan {
        #[arg(short, long)]
        goal: String,
        #[arg(long, env = "SPARK_SERVER_URL")]
        server: Option<String>,
        #[arg(long, help = "Give up after this many seconds")]
        timeout_secs: Option<u64>,
    },
    /// Manage the saved student profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    Show,
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        graduation_year: Option<String>,
        #[arg(long, value_delimiter = ',', help = "Comma-separated course codes")]
        courses: Option<Vec<String>>,
        #[arg(long)]
        time_commitment: Option<String>,
        #[arg(long, value_delimiter = ',', help = "Comma-separated skills")]
        skills: Option<Vec<String>>,
        #[arg(long)]
        career_goal: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long, help = "Default planning server URL")]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Parse { kind, file } => {
            commands::cmd_parse(kind, file)?;
        }
        Commands::Validate { kind, file } => {
            let report = commands::cmd_validate(kind, file)?;
            if !report.is_valid() {
                std::process::exit(1);
            }
        }
        Commands::Replay { frames, goal } => {
            commands::cmd_replay(frames, goal)?;
        }
        Commands::Plan {
            goal,
            server,
            timeout_secs,
        } => {
            commands::cmd_plan(
                goal,
                server,
                FilePersistence::new(),
                timeout_secs.map(Duration::from_secs),
            )
            .await?;
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Show => profiles::handle_show()?,
            ProfileCommands::Set {
                name,
                major,
                year,
                graduation_year,
                courses,
                time_commitment,
                skills,
                career_goal,
                bio,
                server,
            } => profiles::handle_set(ProfileUpdate {
                name,
                major,
                student_year: year,
                graduation_year,
                courses_taken: courses,
                time_commitment,
                skills,
                career_goal,
                bio,
                server_url: server,
            })?,
        },
    }

    Ok(())
}
