use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod models;
mod services;
mod utils;

use config::WizardConfig;
use services::session_service::WizardRegistry;
use services::transfer_service::RandomOutcome;

struct Handler;

pub struct BotData;

impl TypeMapKey for BotData {
    type Value = Instant;
}

pub struct WizardRegistryKey;

impl TypeMapKey for WizardRegistryKey {
    type Value = Arc<WizardRegistry>;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        debug!("Checking Discord rate limit status...");
        match ctx.http.get_current_user().await {
            Ok(_) => {
                info!("No rate limit detected - Bot is fully ready!");
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("429") || error_msg.contains("rate limit") || error_msg.contains("Ratelimited") {
                    warn!("Bot is being rate limited by Discord! Error: {}", error_msg);
                } else {
                    warn!("Failed to check rate limit status: {}", error_msg);
                }
            }
        }
    }
}

fn env_filter() -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["transfer_wizard=debug", "serenity=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("🤖 Starting transfer wizard bot...");

    let config = match WizardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    info!(
        two_factor = config.two_factor,
        success_rate = config.success_rate,
        "Wizard configured"
    );

    let token = match config::discord_token() {
        Ok(token) => token,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let registry = WizardRegistry::new(
        config.clone(),
        models::mock_accounts(),
        Box::new(RandomOutcome::new(config.success_rate)),
    );

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&token, intents).event_handler(Handler).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<BotData>(Instant::now());
        data.insert::<WizardRegistryKey>(Arc::new(registry));
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
