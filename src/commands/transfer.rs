use std::sync::Arc;

use serenity::builder::{CreateAttachment, CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, info};

use crate::models::DraftField;
use crate::services::receipt_service;
use crate::services::session_service::{WizardRegistry, WizardSession};
use crate::services::view_service;
use crate::services::wizard_service::TransferWizard;
use crate::utils::errors::{SessionError, WizardError};

/// One `$transfer` sub-command
#[derive(Debug, Clone, PartialEq)]
pub enum TransferAction {
    Help,
    Open,
    Set { field: DraftField, value: String },
    Continue,
    SendOtp,
    VerifyOtp(String),
    Back,
    Confirm,
    Edit,
    Cancel,
    New,
    Close,
    Receipt,
    Status,
}

/// Parse the words after `$transfer`
pub fn parse_action(args: &[&str]) -> Result<TransferAction, String> {
    let Some((sub, rest)) = args.split_first() else {
        return Ok(TransferAction::Help);
    };

    let action = match sub.to_lowercase().as_str() {
        "help" => TransferAction::Help,
        "open" | "start" => TransferAction::Open,
        "set" => {
            let (field, value) = rest
                .split_first()
                .ok_or("❌ Usage: `$transfer set <field> <value>`")?;
            let field = field.parse::<DraftField>().map_err(|e| format!("❌ {}", e))?;
            TransferAction::Set {
                field,
                value: value.join(" "),
            }
        }
        "continue" | "next" => TransferAction::Continue,
        "otp" => match rest.first().map(|s| s.to_lowercase()) {
            Some(word) if word == "send" || word == "resend" => TransferAction::SendOtp,
            Some(_) => TransferAction::VerifyOtp(rest.join("")),
            None => return Err("❌ Usage: `$transfer otp send` or `$transfer otp <code>`".to_string()),
        },
        "back" => TransferAction::Back,
        "confirm" => TransferAction::Confirm,
        "edit" => TransferAction::Edit,
        "cancel" => TransferAction::Cancel,
        "new" => TransferAction::New,
        "close" => TransferAction::Close,
        "receipt" => TransferAction::Receipt,
        "status" => TransferAction::Status,
        other => return Err(format!("❌ Unknown transfer action `{}`. Try `$transfer help`", other)),
    };
    Ok(action)
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let action = parse_action(args)?;

    let registry = {
        let data = ctx.data.read().await;
        data.get::<crate::WizardRegistryKey>()
            .ok_or("Transfer wizard not initialized".to_string())?
            .clone()
    };
    let user_id = msg.author.id.get();
    debug!(user_id, ?action, "Transfer command");

    match action {
        TransferAction::Help => send_embed(ctx, msg, help_embed()).await,
        TransferAction::Open => {
            let wizard = registry.open(user_id).await;
            send_step(ctx, msg, &wizard).await
        }
        action => {
            let session = registry.session(user_id).await.map_err(|e| e.to_string())?;
            run_action(ctx, msg, &registry, &session, action).await
        }
    }
}

async fn run_action(
    ctx: &Context,
    msg: &Message,
    registry: &WizardRegistry,
    session: &Arc<WizardSession>,
    action: TransferAction,
) -> Result<(), String> {
    let outcome = match action {
        TransferAction::Set { field, value } => session.update_field(field, &value).await,
        TransferAction::Continue => session.proceed().await,
        TransferAction::SendOtp => session.send_otp().await,
        TransferAction::VerifyOtp(code) => {
            session
                .update_field(DraftField::OtpCode, &code)
                .await
                .map_err(|e| e.to_string())?;
            session.verify_otp().await
        }
        TransferAction::Back => session.back().await,
        TransferAction::Edit => session.edit().await,
        TransferAction::New => session.start_new_transfer().await,
        TransferAction::Status => {
            let wizard = session.snapshot().await;
            if !wizard.is_open() {
                return Err(WizardError::NotOpen.to_string());
            }
            Ok(wizard)
        }
        TransferAction::Confirm => return confirm(ctx, msg, session).await,
        TransferAction::Receipt => return send_receipt(ctx, msg, session).await,
        TransferAction::Cancel => {
            session.cancel().await.map_err(|e| format!("❌ {}", e))?;
            return send_embed(ctx, msg, closed_embed()).await;
        }
        TransferAction::Close => {
            session.close().await.map_err(|e| format!("❌ {}", e))?;
            return send_embed(ctx, msg, closed_embed()).await;
        }
        TransferAction::Help => return send_embed(ctx, msg, help_embed()).await,
        TransferAction::Open => Ok(registry.open(session.user_id()).await),
    };

    match outcome {
        Ok(wizard) => send_step(ctx, msg, &wizard).await,
        // Field errors and rejected codes are shown inline on the step itself.
        // An OTP check cut short by `back` just shows where the user is now.
        Err(SessionError::Wizard(WizardError::Validation(_)))
        | Err(SessionError::Wizard(WizardError::OtpRejected))
        | Err(SessionError::VerificationInterrupted) => {
            let wizard = session.snapshot().await;
            send_step(ctx, msg, &wizard).await
        }
        Err(e) => Err(format!("❌ {}", e)),
    }
}

async fn confirm(ctx: &Context, msg: &Message, session: &Arc<WizardSession>) -> Result<(), String> {
    let pending = session.confirm().await.map_err(|e| format!("❌ {}", e))?;
    send_step(ctx, msg, pending.wizard()).await?;

    match pending.outcome().await {
        Ok(result) => {
            info!(
                user_id = session.user_id(),
                success = result.success,
                "Transfer confirmed"
            );
            let wizard = session.snapshot().await;
            send_step(ctx, msg, &wizard).await
        }
        Err(SessionError::Superseded) => {
            let embed = CreateEmbed::default()
                .title("Transfer cancelled")
                .description("The wizard was closed before the transfer finished.")
                .color(0x808080);
            send_embed(ctx, msg, embed).await
        }
        Err(e) => Err(format!("❌ {}", e)),
    }
}

async fn send_receipt(ctx: &Context, msg: &Message, session: &WizardSession) -> Result<(), String> {
    let receipt = session.receipt().await.map_err(|e| format!("❌ {}", e))?;
    let json = receipt_service::receipt_json(&receipt).map_err(|e| format!("❌ {}", e))?;
    let file_name = receipt_service::receipt_file_name(&receipt);

    let attachment = CreateAttachment::bytes(json.into_bytes(), file_name.clone());
    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::default()
                .content("📥 Here is your transaction receipt")
                .add_file(attachment),
        )
        .await
        .map_err(|e| e.to_string())?;

    debug!(user_id = session.user_id(), %file_name, "Receipt sent");
    Ok(())
}

async fn send_step(ctx: &Context, msg: &Message, wizard: &TransferWizard) -> Result<(), String> {
    send_embed(ctx, msg, view_service::create_step_embed(wizard)).await
}

async fn send_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<(), String> {
    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn closed_embed() -> CreateEmbed {
    CreateEmbed::default()
        .title("Transfer closed")
        .description("Use `$transfer open` to start again.")
        .color(0x808080)
}

fn help_embed() -> CreateEmbed {
    CreateEmbed::default()
        .title("💸 Transfer Command")
        .description("Walk through a funds transfer step by step")
        .field(
            "Details",
            "`$transfer open` - Open the transfer wizard\n\
             `$transfer set <field> <value>` - Fill in a field\n\
             `$transfer continue` - Validate and move on",
            false,
        )
        .field(
            "Security",
            "`$transfer otp send` - Send a verification code\n\
             `$transfer otp <code>` - Verify the code\n\
             `$transfer back` - Back to the details",
            false,
        )
        .field(
            "Confirmation",
            "`$transfer confirm` - Execute the transfer\n\
             `$transfer edit` - Back to the details\n\
             `$transfer cancel` - Abandon the transfer",
            false,
        )
        .field(
            "After the transfer",
            "`$transfer receipt` - Download the receipt\n\
             `$transfer new` - Start another transfer\n\
             `$transfer close` - Close the wizard",
            false,
        )
        .field(
            "Examples",
            "`$transfer set fromAccount acc2`\n\
             `$transfer set toAccountNumber 1234 5678 90`\n\
             `$transfer set amount 500`\n\
             `$transfer set transferType scheduled`",
            false,
        )
        .color(0x00ff00)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_shows_help() {
        assert_eq!(parse_action(&[]), Ok(TransferAction::Help));
    }

    #[test]
    fn test_set_joins_value_words() {
        assert_eq!(
            parse_action(&["set", "recipient_name", "Jane", "Doe"]),
            Ok(TransferAction::Set {
                field: DraftField::RecipientName,
                value: "Jane Doe".to_string(),
            })
        );
        assert_eq!(
            parse_action(&["set", "recurringFrequency"]),
            Ok(TransferAction::Set {
                field: DraftField::RecurringFrequency,
                value: String::new(),
            })
        );
        assert!(parse_action(&["set"]).is_err());
        assert!(parse_action(&["set", "nickname", "x"]).is_err());
    }

    #[test]
    fn test_otp_actions() {
        assert_eq!(parse_action(&["otp", "send"]), Ok(TransferAction::SendOtp));
        assert_eq!(parse_action(&["OTP", "Resend"]), Ok(TransferAction::SendOtp));
        assert_eq!(
            parse_action(&["otp", "123", "456"]),
            Ok(TransferAction::VerifyOtp("123456".to_string()))
        );
        assert!(parse_action(&["otp"]).is_err());
    }

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!(parse_action(&["next"]), Ok(TransferAction::Continue));
        assert_eq!(parse_action(&["Start"]), Ok(TransferAction::Open));
        assert!(parse_action(&["withdraw"]).is_err());
    }
}
