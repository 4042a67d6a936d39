use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::time::Instant;

use crate::services::ping_service;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let start_time = Instant::now();

    // Send initial message to measure roundtrip
    let response = msg
        .channel_id
        .send_message(ctx, CreateMessage::default().content("📊 Calculating metrics..."))
        .await
        .map_err(|e| e.to_string())?;

    let registry = {
        let data = ctx.data.read().await;
        data.get::<crate::WizardRegistryKey>()
            .ok_or("Transfer wizard not initialized".to_string())?
            .clone()
    };
    let metrics = ping_service::get_ping_metrics(ctx, start_time, &registry).await;
    let embed = ping_service::create_ping_embed(&metrics);

    response.delete(ctx).await.map_err(|e| e.to_string())?;

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
