use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use alertmanager_notifier::{
    config::Config,
    dispatch,
    metrics::gather_metrics,
    provisioning::{build_notifiers, load_notifiers},
    register_builtin_notifiers, AlertState, EvalContext, EvalMatch, HttpWebhookSender, Notifier,
    NotifierRegistry, Rule, WebhookSender,
};

#[derive(Parser)]
#[command(author, version, about = "Send alert evaluations to Prometheus Alertmanager", long_about = None)]
struct Cli {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered notifier types
    Types,

    /// Send a firing test notification
    Test {
        /// Alertmanager base URL (defaults to ALERTMANAGER_URL)
        #[arg(short, long)]
        url: Option<String>,

        /// Notifier provisioning file (defaults to NOTIFIER_PROVISIONING_PATH)
        #[arg(short, long)]
        provisioning: Option<PathBuf>,

        /// Rule name sent as the alertname label
        #[arg(short, long, default_value = "Test notification")]
        rule_name: String,

        /// Rule message; lines like "key":"value" become labels
        #[arg(short, long, default_value = "Someone is testing the alert notification.")]
        message: String,

        /// Tag added to every match, as KEY=VALUE
        #[arg(short, long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,

        /// Print the metrics exposition after sending
        #[arg(long)]
        print_metrics: bool,
    },
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn test_context(rule_name: &str, message: &str, tags: &[(String, String)]) -> EvalContext {
    let rule = Rule::new(rule_name, message).with_state(AlertState::Alerting);
    let mut ctx = EvalContext::new(rule);

    for (metric, value) in [("High value", 100.0), ("Higher Value", 200.0)] {
        let mut eval_match = EvalMatch::new(metric).with_value(value);
        for (key, tag_value) in tags {
            eval_match = eval_match.with_tag(key, tag_value);
        }
        ctx.add_match(eval_match);
    }
    ctx
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_filter = format!("alertmanager_notifier={},info", cli.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .init();

    let mut registry = NotifierRegistry::new();
    register_builtin_notifiers(&mut registry);

    match cli.command {
        Commands::Types => {
            for plugin in registry.plugins() {
                println!("{}\t{}\t{}", plugin.notifier_type, plugin.name, plugin.description);
            }
        }
        Commands::Test {
            url,
            provisioning,
            rule_name,
            message,
            tags,
            print_metrics,
        } => {
            let mut config = Config::load()?;
            if url.is_some() {
                config.notifier.alertmanager_url = url;
            }
            if provisioning.is_some() {
                config.notifier.provisioning_path = provisioning;
            }

            let sender: Arc<dyn WebhookSender> = Arc::new(HttpWebhookSender::new(config.webhook.timeout())?);

            let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
            if let Some(path) = &config.notifier.provisioning_path {
                let configs = load_notifiers(path)
                    .with_context(|| format!("Failed to load notifiers from {}", path.display()))?;
                notifiers.extend(build_notifiers(&registry, &configs, sender.clone())?);
            }
            if let Some(notifier_config) = config.notifier_config() {
                notifiers.push(registry.create(&notifier_config, sender.clone())?);
            }
            if notifiers.is_empty() {
                bail!("No notifier configured; pass --url or --provisioning");
            }

            let ctx = test_context(&rule_name, &message, &tags);
            for notifier in &notifiers {
                dispatch(notifier.as_ref(), &ctx)
                    .await
                    .with_context(|| format!("Notifier '{}' failed", notifier.name()))?;
                info!("Test notification sent via '{}'", notifier.name());
            }

            if print_metrics {
                print!("{}", gather_metrics()?);
            }
        }
    }

    Ok(())
}
