use serenity::prelude::*;
use std::time::{Duration, Instant};

use crate::services::session_service::WizardRegistry;

pub struct PingMetrics {
    pub response_roundtrip: u64,
    pub uptime: String,
    pub open_transfers: usize,
}

/// `3725s` -> `1h 2m 5s`
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub async fn get_ping_metrics(
    ctx: &Context,
    start_time: Instant,
    registry: &WizardRegistry,
) -> PingMetrics {
    let response_roundtrip = start_time.elapsed().as_millis() as u64;

    let uptime = {
        let data = ctx.data.read().await;
        data.get::<crate::BotData>()
            .map(|started| format_uptime(started.elapsed()))
            .unwrap_or_else(|| "Unknown".to_string())
    };

    PingMetrics {
        response_roundtrip,
        uptime,
        open_transfers: registry.open_count().await,
    }
}

pub fn create_ping_embed(metrics: &PingMetrics) -> serenity::builder::CreateEmbed {
    serenity::builder::CreateEmbed::default()
        .title("Pong! 🏓")
        .field("Response Roundtrip", format!("{}ms", metrics.response_roundtrip), true)
        .field("Open Transfers", metrics.open_transfers.to_string(), true)
        .field("Uptime", &metrics.uptime, false)
        .color(0x00b0f4)
}
