use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_room::{
    create_router, AppState, CompletionObserver, Config, ConsoleSpeech, HttpInterviewApi,
    HttpResultStore, InterviewError, MediaTracks, NatsStatusFeed, ScorePresenter, TurnController,
    TurnEvent, TurnOutcome,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "interview-room", about = "AI-moderated interview calls")]
struct Cli {
    /// Config file path, without extension
    #[arg(long, default_value = "config/interview-room")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API for a browser front end
    Serve,

    /// Take an interview in the terminal
    Interview {
        /// Candidate email
        #[arg(long)]
        email: String,

        /// Job role to interview for
        #[arg(long)]
        role: String,
    },

    /// Show the score report of a finished interview
    Results {
        /// Candidate email
        #[arg(long)]
        candidate: String,

        /// Also print the transcript
        #[arg(long)]
        transcript: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Interview { email, role } => interview(cfg, &email, &role).await,
        Command::Results {
            candidate,
            transcript,
        } => results(cfg, &candidate, transcript).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let api = HttpInterviewApi::new(&cfg.interview.api_url, cfg.interview.request_timeout())?;
    let feed = NatsStatusFeed::connect(&cfg.nats.url, &cfg.nats.status_subject_prefix).await?;
    let store = HttpResultStore::new(&cfg.store.base_url, cfg.interview.request_timeout())?;

    let state = AppState::new(Arc::new(api), Arc::new(feed), Arc::new(store));
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn interview(cfg: Config, email: &str, role: &str) -> Result<()> {
    let api = HttpInterviewApi::new(&cfg.interview.api_url, cfg.interview.request_timeout())?;
    let feed = NatsStatusFeed::connect(&cfg.nats.url, &cfg.nats.status_subject_prefix).await?;

    let controller = Arc::new(TurnController::new(
        email,
        role,
        Arc::new(api),
        Arc::new(ConsoleSpeech::new(cfg.speech.words_per_minute)),
        Arc::new(MediaTracks::new()),
    ));

    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let TurnEvent::Notice(notice) = event {
                println!("  ({})", notice);
            }
        }
    });

    let subscription = CompletionObserver::spawn(&feed, Arc::clone(&controller)).await?;

    controller.begin().await?;
    println!("Type your answer and press Enter. /retry resends a failed answer, /end hangs up.");

    let mut ended = controller.ended_signal();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !*ended.borrow() {
        tokio::select! {
            _ = ended.changed() => break,
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read answer")? else {
                    controller.end_call().await;
                    break;
                };

                let answer = match line.trim() {
                    "" => continue,
                    "/end" => {
                        controller.end_call().await;
                        break;
                    }
                    "/retry" => match controller.pending_answer().await {
                        Some(pending) => pending,
                        None => {
                            println!("  (nothing to retry)");
                            continue;
                        }
                    },
                    answer => answer.to_string(),
                };

                match controller.submit_answer(&answer).await {
                    Ok(TurnOutcome::NextQuestion(_)) => {}
                    Ok(TurnOutcome::Completed) | Err(InterviewError::StaleResultIgnored) => break,
                    Err(e) if e.is_recoverable() => warn!("{}", e),
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    subscription.cancel().await;

    let transcript = controller.transcript().await;
    println!("\nInterview over, {} messages recorded.", transcript.len());
    Ok(())
}

async fn results(cfg: Config, candidate: &str, show_transcript: bool) -> Result<()> {
    let store = HttpResultStore::new(&cfg.store.base_url, cfg.interview.request_timeout())?;
    let presenter = ScorePresenter::new(Arc::new(store));

    let report = presenter.present(candidate).await?;

    println!("Interview result for {} ({})", report.candidate, report.role);
    println!("Overall: {}% - {}", report.overall, report.tier);
    println!("  Technical Knowledge  {}%", report.technical_score);
    println!("  Posture              {}%", report.posture_percent);
    println!("  Eye Contact          {}%", report.eye_percent);
    println!();
    println!("Posture {}/10: {}", report.posture_score, report.posture_feedback);
    println!("Eye contact {}/10: {}", report.eye_score, report.eye_feedback);

    if show_transcript {
        println!();
        if report.transcript.is_empty() {
            println!("No transcript available");
        } else {
            print!("{}", report.transcript.to_text());
        }
    }

    Ok(())
}
