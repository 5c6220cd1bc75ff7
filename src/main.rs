// Procwatch - Host and Service Monitoring Agent
// Main entry point

use anyhow::Result;
use clap::Parser;
use procwatch::config::{Config, RuleConfig};
use procwatch::event::{Action, LogAction, WebhookAction};
use procwatch::init::{ManagerRegistry, SystemdManager};
use procwatch::monitor::{Checkable, Host, Service};
use procwatch::rules::{Op, Rule};
use procwatch::scheduler::Scheduler;
use procwatch::version::build_info;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "procwatch")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single monitoring cycle and exit
    #[arg(long)]
    once: bool,

    /// Show version information
    #[arg(short = 'V', long)]
    version: bool,

    /// Show detailed build information
    #[arg(long)]
    build_info: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle version flag
    if cli.version {
        println!("{}", build_info().format_display());
        return Ok(());
    }

    // Handle build info flag
    if cli.build_info {
        println!("{}", build_info().format_display());
        println!("\n{}", build_info().format_build_info());
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .init();

    tracing::info!("Procwatch starting");

    let config = Config::load(cli.config.map(std::path::PathBuf::from))?;
    run_agent(config, cli.once).await
}

async fn run_agent(config: Config, once: bool) -> Result<()> {
    let managers = Arc::new(build_registry().await);
    if managers.is_empty() && !config.services.is_empty() {
        anyhow::bail!("No init system available; cannot monitor services");
    }

    let entities = build_entities(&config)?;
    tracing::info!(
        "Watching the host and {} service(s) every {}s",
        entities.len() - 1,
        config.cycle_secs
    );

    let scheduler = Scheduler::new(
        entities,
        managers,
        config.proc_root.clone(),
        Duration::from_secs(config.cycle_secs),
    );

    // One-time resolution; unresolvable services are reported and skipped
    scheduler.resolve_all().await;

    if once {
        scheduler.run_cycle().await;
    } else {
        scheduler.run().await;
    }
    Ok(())
}

/// System bus first, then the session bus. A bus that cannot be reached
/// becomes an absent slot so registry order stays stable for resolution.
async fn build_registry() -> ManagerRegistry {
    let mut registry = ManagerRegistry::new();

    match SystemdManager::system().await {
        Ok(manager) => {
            registry.register(Arc::new(manager));
        }
        Err(e) => {
            tracing::warn!("System bus unavailable: {}", e);
            registry.register_absent();
        }
    }

    match SystemdManager::session().await {
        Ok(manager) => {
            registry.register(Arc::new(manager));
        }
        Err(e) => {
            tracing::debug!("Session bus unavailable: {}", e);
            registry.register_absent();
        }
    }

    registry
}

fn build_entities(config: &Config) -> Result<Vec<Checkable>> {
    let webhook = config.alert_webhook.as_deref();
    let mut entities = Vec::new();

    let host_rules = build_rules(&config.host.rules, webhook)?;
    let host_params = merge_owner(&config.host.parameters, config.host.owner.as_deref());
    entities.push(Checkable::from(Host::new(host_params, host_rules)));

    for svc in &config.services {
        let rules = build_rules(&svc.rules, webhook)?;
        let params = merge_owner(&svc.parameters, svc.owner.as_deref());
        let handler = default_handler(webhook);
        entities.push(Checkable::from(Service::new(&svc.name, params, rules, handler)));
    }

    Ok(entities)
}

fn merge_owner(parameters: &HashMap<String, String>, owner: Option<&str>) -> HashMap<String, String> {
    let mut params = parameters.clone();
    if let Some(owner) = owner {
        params.insert("owner".to_string(), owner.to_string());
    }
    params
}

fn build_rules(configs: &[RuleConfig], webhook: Option<&str>) -> Result<Vec<Rule>> {
    configs
        .iter()
        .map(|rc| {
            let op = Op::parse(&rc.op)?;
            let actions = if rc.actions.is_empty() {
                vec![action_named("log", webhook)?]
            } else {
                rc.actions
                    .iter()
                    .map(|name| action_named(name, webhook))
                    .collect::<Result<Vec<_>>>()?
            };
            Ok(Rule::new(&rc.metric, &rc.field, op, rc.threshold, rc.cycles, actions))
        })
        .collect()
}

fn action_named(name: &str, webhook: Option<&str>) -> Result<Arc<dyn Action>> {
    match name {
        "log" => Ok(Arc::new(LogAction)),
        "alert" => Ok(match webhook {
            Some(url) => Arc::new(WebhookAction::new(url)) as Arc<dyn Action>,
            None => Arc::new(LogAction),
        }),
        other => Err(anyhow::anyhow!("Unknown action '{}' in rule config", other)),
    }
}

/// Process events go to the webhook when one is configured, else the log
fn default_handler(webhook: Option<&str>) -> Arc<dyn Action> {
    match webhook {
        Some(url) => Arc::new(WebhookAction::new(url)),
        None => Arc::new(LogAction),
    }
}
