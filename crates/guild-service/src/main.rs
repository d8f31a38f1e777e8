//! Command-line driver for the guild payment system.
//!
//! Loads a configuration file, builds the payment orchestrator from the
//! configured wallet and settlement implementations, and runs one command.
//! Command output is printed to stdout as pretty JSON; logs go to stderr.

use clap::{Parser, Subcommand};
use guild_config::Config;
use guild_content::service::DEFAULT_LEVEL;
use guild_content::ContentService;
use guild_types::PaymentRequest;
use serde_json::json;
use std::path::PathBuf;

mod factory_registry;

use factory_registry::build_orchestrator_from_config;

/// Command-line arguments for the guild service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Check a payment request without submitting it
	Validate {
		#[arg(long)]
		amount: String,
		#[arg(long)]
		recipient: String,
	},
	/// Submit a payment and wait for confirmations
	Pay {
		/// Amount in whole tokens, e.g. 10.50
		#[arg(long)]
		amount: String,
		#[arg(long)]
		recipient: String,
		#[arg(long)]
		description: Option<String>,
	},
	/// Show the connected wallet's token balance
	Balance,
	/// Generate a micro-skill guide
	Guide {
		#[arg(long)]
		topic: String,
		#[arg(long, default_value = DEFAULT_LEVEL)]
		level: String,
	},
	/// Recommend online earning opportunities
	Recommend {
		#[arg(long, value_delimiter = ',')]
		skills: Vec<String>,
		#[arg(long, value_delimiter = ',')]
		interests: Vec<String>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.guild.id);

	let output = run(args.command, &config).await?;
	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

async fn run(
	command: Command,
	config: &Config,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
	match command {
		Command::Validate { amount, recipient } => {
			let orchestrator = build_orchestrator_from_config(config)?;
			let error = orchestrator
				.validate(&PaymentRequest::new(amount, recipient))
				.map(|e| e.to_string());
			Ok(json!({ "valid": error.is_none(), "error": error }))
		},
		Command::Pay {
			amount,
			recipient,
			description,
		} => {
			let orchestrator = build_orchestrator_from_config(config)?;
			let mut request = PaymentRequest::new(amount, recipient);
			if let Some(description) = description {
				request = request.with_description(description);
			}

			let result = orchestrator.submit(&request).await;
			let status = orchestrator.status().snapshot().await;
			tracing::debug!(is_loading = status.is_loading, "Payment finished");
			Ok(json!({ "result": result, "status": status }))
		},
		Command::Balance => {
			let orchestrator = build_orchestrator_from_config(config)?;
			Ok(json!({
				"connected": orchestrator.is_connected(),
				"token": config.payment.token_address,
				"balance": orchestrator.usdc_balance().await,
			}))
		},
		Command::Guide { topic, level } => {
			let content = content_service(config)?;
			let guide = content.generate_micro_skill_content(&topic, &level).await;
			Ok(json!({ "topic": topic, "level": level, "content": guide }))
		},
		Command::Recommend { skills, interests } => {
			let content = content_service(config)?;
			let recommendations = content
				.generate_personalized_recommendations(&skills, &interests)
				.await;
			Ok(json!({ "recommendations": recommendations }))
		},
	}
}

fn content_service(config: &Config) -> Result<ContentService, Box<dyn std::error::Error>> {
	let content_config = config
		.content
		.as_ref()
		.ok_or("No [content] section in configuration")?;
	Ok(ContentService::from_config(content_config)?)
}
