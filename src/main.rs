//! vigil - Workout session tracker
//!
//! Log sets, rest between them, answer trivia while you wait.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use vigil::api::BackendClient;
use vigil::config::Config;
use vigil::db::{self, Database, draft::EXERCISES_KEY};
use vigil::exercises::{Catalog, Preset};
use vigil::logging;
use vigil::session::WorkoutSession;
use vigil::timer::{
    Intensity, Phase, TimerDriver, TimerEvent, driver::DEFAULT_PERIOD, format_for_display,
};
use vigil::trivia::TriviaDeck;
use vigil::tui::App;

const QUIZ_SECS: u32 = 45;

#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about = "Workout tracker with rest timer and trivia")]
struct Cli {
    /// Backend base URL (overrides VIGIL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// SQLite file for the workout draft (overrides VIGIL_DB_PATH)
    #[arg(long, global = true)]
    db: Option<String>,

    /// User id sent with saved workouts (overrides VIGIL_USER_ID)
    #[arg(long, global = true)]
    user_id: Option<i64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the workout screen
    Workout {
        /// Start from a backend template (Push=2, Pull=1, Legs=3)
        #[arg(short, long, conflicts_with_all = ["preset", "fresh"])]
        template: Option<i64>,

        /// Start from a built-in preset (push, pull, legs)
        #[arg(short, long, value_parser = parse_preset, conflicts_with = "fresh")]
        preset: Option<Preset>,

        /// Ignore the stored draft
        #[arg(long)]
        fresh: bool,
    },

    /// List exercises from the backend catalog
    Catalog {
        /// Filter by muscle group
        #[arg(short, long)]
        muscle: Option<String>,
    },

    /// Preview the session a template would seed
    Template {
        id: i64,
    },

    /// Run a rest countdown in the terminal
    Rest {
        /// Rest length in seconds
        #[arg(required_unless_present = "intensity", conflicts_with = "intensity")]
        seconds: Option<u32>,

        /// Preset length: normal (90s), intermediate (120s), intense (180s)
        #[arg(short, long, value_parser = parse_intensity)]
        intensity: Option<Intensity>,
    },

    /// Answer one trivia question
    Quiz,
}

fn parse_preset(s: &str) -> Result<Preset, String> {
    Preset::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Preset::all().iter().map(|p| p.name()).collect();
        format!("unknown preset {:?}, expected one of {}", s, names.join(", "))
    })
}

fn parse_intensity(s: &str) -> Result<Intensity, String> {
    Intensity::parse(s).ok_or_else(|| {
        let names: Vec<&str> = Intensity::all().iter().map(|i| i.name()).collect();
        format!("unknown intensity {:?}, expected one of {}", s, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.db {
        config.db_path = path;
    }
    if let Some(id) = cli.user_id {
        config.user_id = id;
    }

    let command = cli.command.unwrap_or(Commands::Workout {
        template: None,
        preset: None,
        fresh: false,
    });

    // the workout screen owns the terminal, so it logs to a file
    let _guard = match command {
        Commands::Workout { .. } => Some(logging::init_file(Path::new(&config.log_dir))),
        _ => {
            logging::init_stderr();
            None
        }
    };

    let client = BackendClient::new(&config.api_url, config.http_timeout)?;

    match command {
        Commands::Workout { template, preset, fresh } => {
            run_workout(&config, client, template, preset, fresh).await?;
        }

        Commands::Catalog { muscle } => {
            let catalog = Catalog::new(client.fetch_catalog().await?);
            let entries = match &muscle {
                Some(group) => catalog.by_muscle_group(group),
                None => catalog.entries().iter().collect(),
            };
            println!("Exercises:");
            println!("{:-<60}", "");
            for e in entries {
                println!("{:>4} | {:28} | {}", e.id, e.name, e.muscle_group);
            }
        }

        Commands::Template { id } => {
            let rows = client.fetch_template(id).await?;
            let catalog = fetch_catalog_or_empty(&client).await;
            let session = WorkoutSession::from_template(&rows, &catalog).with_workout_id(id);
            print_session(&session);
        }

        Commands::Rest { seconds, intensity } => {
            let secs = intensity.map(|i| i.rest_secs()).or(seconds).unwrap_or_default();
            run_rest(secs).await?;
        }

        Commands::Quiz => {
            let deck = TriviaDeck::new(client.fetch_quizzes().await?);
            run_quiz(&deck).await?;
        }
    }

    Ok(())
}

async fn fetch_catalog_or_empty(client: &BackendClient) -> Catalog {
    match client.fetch_catalog().await {
        Ok(entries) => Catalog::new(entries),
        Err(e) => {
            warn!(error = %e, "catalog unavailable");
            Catalog::default()
        }
    }
}

async fn run_workout(
    config: &Config,
    client: BackendClient,
    template: Option<i64>,
    preset: Option<Preset>,
    fresh: bool,
) -> Result<()> {
    let mut db = Database::open(&config.db_path)?;

    // the screen still works without catalog or trivia
    let catalog = fetch_catalog_or_empty(&client).await;
    let deck = match client.fetch_quizzes().await {
        Ok(questions) => TriviaDeck::new(questions),
        Err(e) => {
            warn!(error = %e, "quizzes unavailable");
            TriviaDeck::default()
        }
    };
    info!(questions = deck.len(), "trivia loaded");

    let session = if let Some(id) = template {
        let rows = client.fetch_template(id).await?;
        WorkoutSession::from_template(&rows, &catalog)
            .with_workout_id(id)
            .with_name(&format!("Template {}", id), "")
    } else if let Some(preset) = preset {
        WorkoutSession::from_preset(preset)
    } else if fresh {
        WorkoutSession::empty()
    } else {
        match db::load_draft(&mut db)? {
            Some(draft) => {
                let stored_at = db.updated_at(EXERCISES_KEY)?.unwrap_or_default();
                info!(stored_at = %stored_at, exercises = draft.len(), "resuming draft");
                draft
            }
            None => WorkoutSession::empty(),
        }
    };

    info!(exercises = session.len(), "workout screen opened");
    let (outcome, result) = App::new(session, catalog, deck, client, config.user_id).run();

    // keep the session before reporting a terminal failure
    db::store_outcome(&mut db, &outcome.session, outcome.saved)?;
    info!(saved = outcome.saved, exercises = outcome.session.len(), "workout screen closed");
    result
}

fn print_session(session: &WorkoutSession) {
    println!("{}", session.name());
    println!("{:-<50}", "");
    for ex in session.exercises() {
        println!(
            "{:28} | {} sets | rest {}",
            ex.name,
            ex.sets.len(),
            format_for_display(f64::from(ex.default_rest_secs))
        );
    }
}

async fn run_rest(seconds: u32) -> Result<()> {
    let (mut timer, mut events) = TimerDriver::new(DEFAULT_PERIOD);
    timer.start(seconds, None)?;
    let mut redraw = tokio::time::interval(Duration::from_millis(500));

    loop {
        tokio::select! {
            Some(TimerEvent::Expired { .. }) = events.recv() => {
                println!("\r00:00  Rest over!");
                return Ok(());
            }
            _ = redraw.tick() => {
                let snap = timer.snapshot();
                if snap.phase == Phase::Running {
                    print!("\r{}  ", format_for_display(snap.remaining_secs));
                    std::io::stdout().flush()?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                timer.cancel();
                println!("\rRest cancelled");
                return Ok(());
            }
        }
    }
}

async fn run_quiz(deck: &TriviaDeck) -> Result<()> {
    let mut round = deck.next_round()?;
    println!("{}", round.question().question);
    for (i, option) in round.options().iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
    println!("You have {} seconds.", QUIZ_SECS);

    let (mut timer, mut events) = TimerDriver::new(DEFAULT_PERIOD);
    timer.start(QUIZ_SECS, None)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(TimerEvent::Expired { .. }) = events.recv() => {
                println!("Time's up! The answer was {}", round.question().correct_answer);
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    bail!("no answer given");
                };
                if let Some(outcome) = round.record_input(&line) {
                    timer.cancel();
                    println!("{}", outcome.feedback());
                    return Ok(());
                }
                println!("Not one of the options, answer with 1-{} or the option text.", round.options().len());
            }
        }
    }
}
