use anyhow::Context;
use coreledger_rust::{
    stomp::{StompConfig, StompSubscriber},
    Environment,
};
use futures::StreamExt;

#[derive(serde::Deserialize, Debug)]
struct Config {
    environment: Environment,
    mq_username: String,
    mq_password: String,
    topics: Vec<String>,
}

impl Config {
    fn read() -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name("config"))
            .build()?
            .try_deserialize()
            .context("Failed to assemble the required configuration")
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Config::read()?;

    let subscriber = StompSubscriber::connect(StompConfig::new(
        config.environment,
        config.mq_username,
        config.mq_password,
    ))
    .await?;

    // Merge all the topics into a single stream of events
    let mut subscriptions = Vec::new();
    for topic in &config.topics {
        subscriptions.push(subscriber.subscribe(topic)?);
    }
    let mut events = futures::stream::select_all(subscriptions);

    tracing::info!("Waiting for events, press Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.next() => match event {
                Some(frame) => tracing::info!(
                    "{}: {}",
                    frame.header("destination").unwrap_or_default(),
                    frame.body_text()
                ),
                None => anyhow::bail!("Connection to the message broker lost"),
            },
        }
    }

    subscriber.disconnect().await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    if let Err(e) = run().await {
        tracing::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}
