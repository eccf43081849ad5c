//! Reply delivery with automatic retry for Telegram API operations.
//!
//! Every outgoing message or upload goes through
//! [`crate::utils::retry_telegram_operation`], so a short network hiccup
//! between the bot and Telegram does not swallow a reply.

use super::handlers::Reply;
use crate::utils::retry_telegram_operation;
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ChatId, InputFile, ParseMode};
use tracing::warn;

/// Send a text message with automatic retry on network failures.
///
/// # Errors
///
/// Returns an error after all retries are exhausted.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    parse_mode: Option<ParseMode>,
) -> Result<()> {
    retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text);
        if let Some(pm) = parse_mode {
            req = req.parse_mode(pm);
        }
        req.await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("Telegram send error: {e}"))
    })
    .await
}

/// Deliver one [`Reply`] to `chat_id`.
///
/// # Errors
///
/// Returns an error if Telegram keeps rejecting the message or upload.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: &Reply) -> Result<()> {
    match reply {
        Reply::Text(text) => send_message_resilient(bot, chat_id, text, None).await,
        Reply::Html(text) => {
            send_message_resilient(bot, chat_id, text, Some(ParseMode::Html)).await
        }
        Reply::Photo { data, file_name } => {
            retry_telegram_operation(|| async {
                let file = InputFile::memory(data.to_vec()).file_name(*file_name);
                bot.send_photo(chat_id, file)
                    .await
                    .map(|_| ())
                    .map_err(|e| anyhow::anyhow!("Telegram photo upload error: {e}"))
            })
            .await
        }
        Reply::Animation { data, file_name } => {
            retry_telegram_operation(|| async {
                let file = InputFile::memory(data.to_vec()).file_name(*file_name);
                bot.send_animation(chat_id, file)
                    .await
                    .map(|_| ())
                    .map_err(|e| anyhow::anyhow!("Telegram animation upload error: {e}"))
            })
            .await
        }
    }
}

/// Show a "working" indicator while a command runs.
///
/// Failure is only logged; the command goes on without it.
pub async fn send_chat_action_safe(bot: &Bot, chat_id: ChatId, action: ChatAction) {
    if let Err(e) = bot.send_chat_action(chat_id, action).await {
        warn!("Failed to send chat action to {}: {}", chat_id, e);
    }
}
