//! Urban Soccer terminal driver entry point.

use std::error::Error;
use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use urbansoccer_cli::{CliConfig, ConsoleAudioOutput, ConsoleSpeech, Driver, event_logger};
use urbansoccer_client::{FileCampaignCache, HttpCampaignClient, TokenIdentity};
use urbansoccer_core::clock::SystemClock;
use urbansoccer_narration::NarrationPlayer;
use urbansoccer_session::GameEngine;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they do not interleave with the game transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::from_env()?;
    tracing::info!(
        api_url = %config.client.base_url,
        campaign_file = %config.campaign_file.display(),
        auto_play = config.auto_play,
        "Starting Urban Soccer"
    );

    let clock = Arc::new(SystemClock);
    let identity = Arc::new(TokenIdentity::new(config.api_token.clone(), clock.clone()));
    let client = Arc::new(HttpCampaignClient::new(
        config.client.clone(),
        identity.clone(),
    )?);

    let narration = NarrationPlayer::builder(Arc::new(ConsoleSpeech::stdout()))
        .remote(client.clone(), Arc::new(ConsoleAudioOutput::stdout()))
        .volume(i32::from(config.volume))
        .build();

    let engine = Arc::new(
        GameEngine::new(client, identity, narration, clock).with_auto_play(config.auto_play),
    );
    engine.subscribe(event_logger());

    let driver = Driver::new(
        engine.clone(),
        Arc::new(FileCampaignCache::new(config.campaign_file)),
    );
    driver
        .run(BufReader::new(tokio::io::stdin()), std::io::stdout())
        .await?;

    engine.dispose();
    Ok(())
}
