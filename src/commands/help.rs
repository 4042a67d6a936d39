use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Transfer Wizard Help")
        .description("Move money between your accounts and external recipients, one step at a time.")
        .color(0x00b0f4)
        .field(
            "🎯 General",
            "`$ping` - Check bot latency\n`$help` - Show this help message\n`$accounts` - List your accounts",
            false,
        )
        .field(
            "💸 Transfers",
            "`$transfer open` - Start a transfer\n\
             `$transfer set <field> <value>` - Fill in the details\n\
             `$transfer continue` - Validate and move to the next step\n\
             `$transfer help` - Every transfer action",
            false,
        )
        .field(
            "📝 Fields",
            "`fromAccount` `toAccountNumber` `recipientName` `bankName` `ifscCode` \
             `saveRecipient` `amount` `currency` `remarks` `transferType` \
             `scheduledDate` `scheduledTime` `recurringFrequency`",
            false,
        )
        .field(
            "💵 Fees",
            "Up to 1,000: free\nUp to 10,000: 2.50\nAbove 10,000: 5.00",
            false,
        )
        .field(
            "⚡ Rate Limiting",
            "2-second cooldown per transfer action\n`set`, `otp` and `status` are never throttled\nGlobal 50 requests/second limit",
            false,
        );

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
