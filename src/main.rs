use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rocket::{routes, Build, Rocket};
use tokio::sync::mpsc::unbounded_channel;

mod config;
use config::ReviewBotConfig;

mod sink;
use sink::{log_events, EventSender};

mod webhooks;
use webhooks::github_webhook;

#[derive(Parser)]
#[clap(version = "0.1")]
struct Opts {
    /// Configuration file for reviewbot, defaults are used when omitted
    #[clap(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ReviewBotConfig> {
    let path = match path {
        Some(path) => path,
        None => return Ok(ReviewBotConfig::default()),
    };

    let config_file =
        File::open(path).with_context(|| format!("couldn't open {}:", path.display()))?;
    serde_yaml::from_reader(BufReader::new(config_file)).context("couldn't parse config file")
}

pub(crate) fn build_rocket(config: &ReviewBotConfig, sender: EventSender) -> Rocket<Build> {
    rocket::custom(config.figment())
        .mount("/", routes![github_webhook])
        .manage(sender)
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opts = Opts::parse();
    let config = load_config(opts.config.as_ref())?;

    let (sender, receiver) = unbounded_channel();
    tokio::spawn(log_events(receiver));

    let rocket = build_rocket(&config, EventSender(sender));
    rocket
        .launch()
        .await
        .map(|_| ())
        .map_err(|err| anyhow::anyhow!(err))
}
