use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use station_weather_collector::config::Config;
use station_weather_collector::db::{self, ComparisonStore, ForecastStore, MemoryStore, ObservationStore, PgStore};
use station_weather_collector::layouts::PageLayouts;
use station_weather_collector::page_source::HttpPageSource;
use station_weather_collector::pipeline::{Pipeline, PipelineSettings, RunSummary};
use station_weather_collector::time_normalizer;

#[derive(Parser, Debug)]
#[command(name = "station-weather-collector")]
#[command(about = "Scrape two weather stations and the hourly forecast into Postgres", long_about = None)]
struct Cli {
    /// Observation date to collect (YYYY-MM-DD), defaults to yesterday
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Skip the station observation phase
    #[arg(long)]
    skip_observations: bool,

    /// Skip the forecast phase
    #[arg(long)]
    skip_forecast: bool,

    /// Scrape into memory only; nothing is written to the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,station_weather_collector=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(summary) => {
                info!("All data collection complete: {:?}", summary);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to start application: {}", e);
                ExitCode::FAILURE
            }
        },
        _ = shutdown_signal() => {
            info!("Shutting down gracefully...");
            ExitCode::SUCCESS
        }
    }
}

#[instrument]
async fn run(cli: Cli) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    info!("Starting station weather collector with config: {:?}", config);

    let layouts = match &config.layout_file {
        Some(path) => PageLayouts::load(path)?,
        None => PageLayouts::default(),
    };

    let mut settings = PipelineSettings::from_config(&config, layouts);
    settings.skip_observations = cli.skip_observations;
    settings.skip_forecast = cli.skip_forecast;

    let source = HttpPageSource::new()
        .with_user_agent(config.user_agent.clone())
        .with_render_endpoint(config.render_endpoint.clone())
        .with_poll_interval(config.render_poll_interval());

    let today = time_normalizer::today();
    let observation_date = cli.date.unwrap_or_else(time_normalizer::yesterday);

    if cli.dry_run {
        info!("Dry run: collected data is kept in memory only");
        let store = MemoryStore::new();
        return Ok(execute(source, store, settings, observation_date, today).await);
    }

    let pool = db::connect(config.database_url()?, config.db_max_connections).await?;
    db::init_schema(&pool).await?;
    info!("Database tables created or ensured.");

    let store = PgStore::new(pool);
    Ok(execute(source, store, settings, observation_date, today).await)
}

async fn execute<S>(
    source: HttpPageSource,
    store: S,
    settings: PipelineSettings,
    observation_date: NaiveDate,
    today: NaiveDate,
) -> RunSummary
where
    S: ObservationStore + ForecastStore + ComparisonStore + Clone,
{
    Pipeline::new(source, store, settings)
        .run(observation_date, today)
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
