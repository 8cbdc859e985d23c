//! Log in every configured test user before the suite runs

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use suite_auth::{
    HttpLoginClient, LoginService, LoginSummary, SharedConfig, SuiteConfig, SuiteSettings,
    TokenStore,
};
use tracing::{error, info};

/// Suite credential bootstrap
#[derive(Parser)]
#[clap(name = "suite-login")]
#[clap(about = "Authenticate the configured test roster against the login service")]
struct Cli {
    /// Environment definitions and user roster
    #[clap(long, default_value = "config/environment.json")]
    config: PathBuf,

    /// Parallel login tuning
    #[clap(long, default_value = "config/shared-config.json")]
    shared_config: PathBuf,

    /// Target environment (defaults to TEST_ENV, then "local")
    #[clap(long)]
    env: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let suite = SuiteConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let shared = SharedConfig::from_file(&cli.shared_config)
        .with_context(|| format!("loading {}", cli.shared_config.display()))?;
    let settings = SuiteSettings::new(suite, SuiteSettings::resolve_environment(cli.env))?;

    info!("Environment: {}", settings.environment());
    info!("Login service: {}", settings.login_service_url());

    let store = Arc::new(TokenStore::new());
    let outcome = run(&settings, &shared, Arc::clone(&store)).await;
    store.destroy();

    if let Err(e) = &outcome {
        error!("Failed to set up test environment: {:#}", e);
    }
    outcome
}

async fn run(
    settings: &SuiteSettings,
    shared: &SharedConfig,
    store: Arc<TokenStore>,
) -> Result<()> {
    let login_settings = shared.parallel_login.to_settings()?;
    let client = HttpLoginClient::new(settings.login_service_url(), Arc::clone(&store))?;
    let service = LoginService::new(settings.roster(), login_settings, Arc::new(client), store);

    info!("Users in roster: {}", service.roster().len());
    let result = service.login_all_users().await;

    let summary = LoginSummary::collect(service.roster(), service.store());
    info!("Login Status Summary:\n{}", summary);

    let report = result.context("batch login failed")?;
    info!(
        "All users logged in successfully ({} logged in, {} skipped, {} batches)",
        report.logged_in.len(),
        report.skipped.len(),
        report.batches
    );
    Ok(())
}
