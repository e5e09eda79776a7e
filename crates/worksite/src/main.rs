//! `worksite` - CLI for the worksite registry
//!
//! This binary runs the HTTP API and offers a few local inspection commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use worksite::cli::{Cli, Command, ConfigCommand, StatsCommand};
use worksite::{init_logging, server, Config, Registry, RegistryDefaults};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Serve(serve_cmd) => {
            serve_cmd.apply(&mut config);
            config.validate()?;
            server::run(&config).await?;
        }
        Command::Stats(stats_cmd) => handle_stats(&config, &stats_cmd)?,
        Command::Config(config_cmd) => handle_config(&config, config_cmd)?,
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let registry = Registry::with_seed_data(RegistryDefaults::from(&config.registry))?;
    let stats = registry.stats();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Worksite statistics (demo data)");
        println!("-------------------------------");
        println!("Sites:               {}", stats.total_sites);
        println!("Incidents:           {}", stats.total_incidents);
        println!("Resolved:            {}%", stats.resolved_percentage);
        println!("Critical incidents:  {}", stats.critical_incidents);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:                 {}", config.server.host);
                println!("  Port:                 {}", config.server.port);
                println!();
                println!("[CORS]");
                for origin in &config.cors.allowed_origins {
                    println!("  Allowed origin:       {origin}");
                }
                println!();
                println!("[Registry]");
                println!("  Seed demo data:       {}", config.registry.seed_demo_data);
                println!(
                    "  Default status:       {}",
                    config.registry.default_incident_status
                );
                println!(
                    "  Default risk score:   {}",
                    config.registry.default_risk_score
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("Configuration error in {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
