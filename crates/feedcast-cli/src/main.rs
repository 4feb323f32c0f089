//! The orchestrator CLI binary: wires every external-boundary
//! implementation into a `PipelineDeps` bundle and runs a chosen subset of
//! the six phases against it.

use std::collections::BTreeSet;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use feedcast_ai::OpenAiCompatibleClient;
use feedcast_artifacts::GitHubArtifactHost;
use feedcast_audio::{FfmpegChunker, HttpAudioDownloader, WhisperCliTranscriber};
use feedcast_common::error::ErrorKind;
use feedcast_common::Config;
use feedcast_feed::HttpFeedFetcher;
use feedcast_pipeline::{PhaseLimits, PhaseName, PipelineDeps, RunContext};
use feedcast_tts::HttpTtsClient;

#[derive(Parser)]
#[command(name = "feedcast-cli", about = "Feedcast pipeline orchestrator")]
struct Cli {
    /// Emit structured JSON logs instead of human-readable ones.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the six-phase pipeline (or a named subset).
    Run {
        /// Restrict the run to these phases, in their fixed relative
        /// order. Repeatable. Defaults to all six.
        #[arg(long = "phase", value_enum)]
        phases: Vec<PhaseArg>,

        /// Caps the number of episodes/digests each phase processes this
        /// run. Applied uniformly to every
        /// phase's own limit.
        #[arg(long)]
        limit: Option<i64>,

        /// Report what would happen without writing, uploading, or
        /// deleting anything.
        #[arg(long)]
        dry_run: bool,

        /// Log at DEBUG instead of INFO.
        #[arg(long)]
        verbose: bool,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum PhaseArg {
    Discovery,
    Audio,
    Digest,
    Tts,
    Publishing,
    Retention,
}

impl From<PhaseArg> for PhaseName {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Discovery => PhaseName::Discovery,
            PhaseArg::Audio => PhaseName::Audio,
            PhaseArg::Digest => PhaseName::Digest,
            PhaseArg::Tts => PhaseName::Tts,
            PhaseArg::Publishing => PhaseName::Publishing,
            PhaseArg::Retention => PhaseName::Retention,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if matches!(cli.command, Command::Run { verbose: true, .. }) {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e:#}");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    let Command::Run { phases, limit, dry_run, verbose } = cli.command;

    let config = Config::from_env();

    let pool = match PgPoolOptions::new().max_connections(10).connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to database");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = feedcast_store::migrate(&pool).await {
        tracing::error!(error = %e, "failed to run migrations");
        return ExitCode::from(2);
    }

    let settings = match feedcast_store::load_settings(&pool).await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "configuration incomplete");
            return ExitCode::from(2);
        }
    };

    let staging_dir = std::env::temp_dir().join("feedcast-staging");
    if let Err(e) = tokio::fs::create_dir_all(&staging_dir).await {
        tracing::error!(error = %e, path = %staging_dir.display(), "failed to create staging directory");
        return ExitCode::from(1);
    }

    let limits = PhaseLimits {
        discovery: limit,
        audio: limit,
        digest: limit,
        tts: limit,
        publishing: limit,
    };

    let ctx = RunContext {
        pool,
        settings,
        dry_run,
        verbose,
        limits,
        staging_dir,
    };

    let ai_client = Arc::new(OpenAiCompatibleClient::new(config.llm_api_key.clone(), config.llm_base_url.clone()));
    let deps = PipelineDeps {
        feed_fetcher: Arc::new(HttpFeedFetcher::new()),
        audio_downloader: Arc::new(HttpAudioDownloader::new()),
        audio_chunker: Arc::new(FfmpegChunker::new()),
        transcriber: Arc::new(WhisperCliTranscriber::new(config.whisper_model_path.clone())),
        content_scorer: ai_client.clone(),
        script_generator: ai_client.clone(),
        metadata_generator: ai_client,
        tts_client: Arc::new(HttpTtsClient::new(config.tts_api_key.clone(), config.tts_base_url.clone())),
        artifact_host: Arc::new(GitHubArtifactHost::new(
            config.artifact_host_token.clone(),
            config.artifact_host_base_url.clone(),
            config.artifact_host_owner_repo.clone(),
        )),
    };

    let requested: BTreeSet<PhaseName> = if phases.is_empty() {
        PhaseName::ALL.into_iter().collect()
    } else {
        phases.into_iter().map(PhaseName::from).collect()
    };

    let reports = feedcast_pipeline::run(&ctx, &deps, &requested).await;

    // Config-missing outranks external-service-outage outranks a plain
    // phase failure, should more than one phase abort in a single run.
    fn priority(code: u8) -> u8 {
        match code {
            2 => 0,
            3 => 1,
            _ => 2,
        }
    }

    let mut worst_code: Option<u8> = None;
    for report in &reports {
        tracing::info!(
            phase = %report.phase,
            counts = ?report.counts,
            item_errors = report.errors.len(),
            aborted = report.aborted,
            "phase report"
        );
        for failure in &report.errors {
            tracing::warn!(phase = %report.phase, identity = %failure.identity, reason = %failure.reason, "item failed");
        }

        if report.aborted {
            let code = match report.aborted_kind {
                Some(ErrorKind::ConfigMissing) => 2,
                Some(ErrorKind::Transient) => 3,
                _ => 1,
            };
            worst_code = Some(match worst_code {
                Some(current) if priority(current) <= priority(code) => current,
                _ => code,
            });
        }
    }

    match worst_code {
        Some(code) => ExitCode::from(code),
        None => ExitCode::SUCCESS,
    }
}
