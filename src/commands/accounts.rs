use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::view_service;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let accounts = {
        let data = ctx.data.read().await;
        data.get::<crate::WizardRegistryKey>()
            .ok_or("Transfer wizard not initialized".to_string())?
            .accounts()
            .to_vec()
    };

    let embed = view_service::create_accounts_embed(&accounts);
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
