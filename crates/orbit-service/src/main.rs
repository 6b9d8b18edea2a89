//! Main entry point for the orbit custody service.
//!
//! Loads configuration, wires the configured backends into the engine, and
//! runs the job loop until interrupted. Long-lived clients (RPC gateway,
//! ledger backend, manager key) are built once here and injected into the
//! components that use them.

use clap::Parser;
use orbit_account::AccountService;
use orbit_chain::{
	ChainInterface, ConfirmationInterface, PubsubConfirmationListener, RpcChainGateway,
	SubmissionEngine,
};
use orbit_codec::ProgramCodec;
use orbit_config::Config;
use orbit_core::{ChannelTrigger, DepositHandler, Engine, JobFeed, JobWorker, StatusHandler};
use orbit_ledger::LedgerService;
use orbit_notify::NotificationService;
use orbit_order::{DepositValidator, JobAdmission, PipelineBuilder, UniverseSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Command-line arguments for the orbit service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(args.log_level.to_string()));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.engine.id);

	// The feed is the in-process stand-in for the jobs table's change
	// stream; it must stay alive for the engine to receive events.
	let (engine, _feed) = build_engine(&config)?;

	tracing::info!("Starting engine");
	engine.run().await?;
	tracing::info!("Stopped");

	Ok(())
}

/// Wires the configured implementations into an engine.
fn build_engine(config: &Config) -> Result<(Engine, JobFeed), Box<dyn std::error::Error>> {
	// Ledger backend, selected and validated by name.
	let ledger_section = config.ledger.primary_section();
	let ledger_factory = orbit_ledger::get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.ledger.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| format!("unknown ledger implementation: {}", config.ledger.primary))?;
	let ledger_backend = ledger_factory(&ledger_section)?;
	ledger_backend.config_schema().validate(&ledger_section)?;
	let ledger = Arc::new(LedgerService::new(ledger_backend));

	// Notification backend.
	let notify_section = config.notification.primary_section();
	let notify_factory = orbit_notify::get_all_implementations()
		.into_iter()
		.find(|(name, _)| *name == config.notification.primary)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			format!(
				"unknown notification implementation: {}",
				config.notification.primary
			)
		})?;
	let notify_backend = notify_factory(&notify_section)?;
	notify_backend.config_schema().validate(&notify_section)?;
	let notifier = Arc::new(NotificationService::new(
		notify_backend,
		config.notification.topic.clone(),
	));

	// Manager key, chain clients, codec.
	let account = Arc::new(AccountService::from_secret(&config.manager.secret)?);
	let chain: Arc<dyn ChainInterface> = Arc::new(RpcChainGateway::new(
		&config.chain.primary_http_url,
		&config.chain.backup_http_url,
	));
	let confirmation: Arc<dyn ConfirmationInterface> = Arc::new(PubsubConfirmationListener::new(
		config.chain.ws_url.clone(),
	));
	let submission = SubmissionEngine::new(
		Arc::clone(&chain),
		config.submission.max_attempts,
		Duration::from_millis(config.submission.retry_delay_ms),
	);

	let program_id = config.program.program_id()?;
	let codec = Arc::new(ProgramCodec::new(program_id));
	let universe = Arc::new(UniverseSource::new(
		Arc::clone(&chain),
		config.program.universe_address()?,
	));

	// Components.
	let validator = DepositValidator::new(
		program_id,
		config.program.universe_address()?,
		config.program.treasury_address()?,
	);
	let builder = PipelineBuilder::new(Arc::clone(&codec), account.address());
	let admission = JobAdmission::new(
		Arc::clone(&ledger),
		Arc::clone(&universe),
		Arc::clone(&notifier),
	);
	let worker = Arc::new(JobWorker::new(
		Arc::clone(&ledger),
		Arc::clone(&chain),
		submission,
		Arc::clone(&confirmation),
		account,
		builder,
		Arc::clone(&notifier),
	));
	let deposits = DepositHandler::new(
		Arc::clone(&chain),
		Arc::clone(&confirmation),
		Arc::clone(&ledger),
		validator,
		universe,
	);
	let status = StatusHandler::new(Arc::clone(&ledger));

	let (trigger, feed) = ChannelTrigger::new();
	let engine = Engine::new(deposits, admission, status, worker, Box::new(trigger));

	Ok((engine, feed))
}
