pub mod accounts;
pub mod help;
pub mod ping;
pub mod transfer;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, error, warn};

use crate::utils::{check_cooldown, check_global_rate_limit};

// Sub-commands a user types repeatedly while filling in one step
const COOLDOWN_EXEMPT: [&str; 4] = ["set", "otp", "status", "help"];

/// Key the cooldown is tracked under, or `None` when the command is exempt.
/// `$transfer` cools down per sub-command.
pub fn cooldown_key(command: &str, args: &[&str]) -> Option<String> {
    match command {
        "$help" => None,
        "$transfer" | "$tf" => {
            let sub = args.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if sub.is_empty() || COOLDOWN_EXEMPT.contains(&sub.as_str()) {
                None
            } else {
                Some(format!("$transfer {}", sub))
            }
        }
        other => Some(other.to_string()),
    }
}

fn is_known_command(command: &str) -> bool {
    matches!(command, "$transfer" | "$tf" | "$accounts" | "$acc" | "$help" | "$ping")
}

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    if !is_known_command(command) {
        return;
    }

    if let Err(retry_ms) = check_global_rate_limit().await {
        warn!(retry_ms, "Global rate limit hit, dropping command");
        return;
    }

    if let Some(key) = cooldown_key(command, args) {
        if let Err((remaining, should_warn)) = check_cooldown(msg.author.id.get(), &key).await {
            debug!(user_id = msg.author.id.get(), %key, remaining, "Command on cooldown");
            if should_warn {
                let _ = msg
                    .channel_id
                    .send_message(
                        ctx,
                        CreateMessage::default().embed(
                            CreateEmbed::default()
                                .title("Command Cooldown")
                                .description(format!(
                                    "⏳ Please wait {} seconds before using this command again.",
                                    remaining
                                ))
                                .color(0xffa500),
                        ),
                    )
                    .await;
            }
            return;
        }
    }

    let result = match command {
        "$transfer" | "$tf" => transfer::execute(ctx, msg, args).await,
        "$accounts" | "$acc" => accounts::execute(ctx, msg).await,
        "$help" => help::execute(ctx, msg).await,
        "$ping" => ping::execute(ctx, msg).await,
        _ => return,
    };

    if let Err(error_msg) = result {
        error!("Error executing command {}: {}", command, error_msg);

        let user_message = if error_msg.contains("429") || error_msg.contains("rate limit") {
            "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
        } else if error_msg.contains("HTTP request") {
            "⚠️ **Network Error**: Having trouble connecting to Discord. Please try again.".to_string()
        } else if error_msg.starts_with('❌') {
            error_msg
        } else if !error_msg.is_empty() {
            format!("❌ {}", error_msg)
        } else {
            "❌ An error occurred while executing the command.".to_string()
        };

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg
            .channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}
