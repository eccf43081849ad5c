use super::commands::Command;
use super::resilient::{send_chat_action_safe, send_reply};
use crate::cataas::{CatClient, FetchError};
use crate::config::Settings;
use crate::paginate::{paginate, PageLimits, SEPARATOR};
use crate::utils::truncate_str;
use anyhow::Result;
use bytes::Bytes;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatAction;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

/// Hint appended to the tag listing
pub const TAGS_USAGE_HINT: &str =
    "Use these with any command like: <code>/cat cute</code> or <code>/cat_says Hello tag:funny</code>";

/// One outgoing message, independent of the Telegram client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text
    Text(String),
    /// Text with Telegram HTML markup
    Html(String),
    /// Still image upload
    Photo {
        /// Image bytes
        data: Bytes,
        /// File name shown to the user
        file_name: &'static str,
    },
    /// GIF upload
    Animation {
        /// GIF bytes
        data: Bytes,
        /// File name shown to the user
        file_name: &'static str,
    },
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Work out the replies for a command.
///
/// Upstream failures become text replies here. Only faults the user
/// cannot act on are returned as errors, for the caller to report.
///
/// # Errors
///
/// Returns an error if the tag listing cannot be fetched or decoded for a
/// reason other than an HTTP status.
pub async fn build_replies(
    cmd: &Command,
    client: &CatClient,
    limits: PageLimits,
) -> Result<Vec<Reply>> {
    let urls = client.urls();
    let reply = match cmd {
        Command::Start => Reply::Text(format!(
            "Hi! I fetch cats from cataas.com.\n\n{}",
            Command::descriptions()
        )),
        Command::Help => Reply::Text(Command::descriptions().to_string()),
        Command::CatTags => {
            return match client.tags().await {
                Ok(tags) => Ok(render_tag_listing(tags, limits)),
                Err(FetchError::Status(code)) => Ok(vec![Reply::Text(format!(
                    "Failed to fetch tags. Status code: {code}"
                ))]),
                Err(e) => Err(e.into()),
            };
        }
        Command::Cat(req) => photo(client, &urls.cat(req.tag.as_deref()), "cat.jpg").await,
        Command::CatGif => animation(client, &urls.cat_gif(), "cat.gif").await,
        Command::CatSays(req) => {
            let url = urls.cat_says(
                &req.text,
                req.tag.as_deref(),
                req.font_size,
                req.font_color.as_deref(),
            );
            photo(client, &url, "cat_says.jpg").await
        }
        Command::CatGifSays(req) => {
            let url = urls.cat_gif_says(
                &req.text,
                req.font_size,
                req.font_color.as_deref(),
                req.filter.as_deref(),
            );
            animation(client, &url, "cat_gif_says.gif").await
        }
    };
    Ok(vec![reply])
}

async fn photo(client: &CatClient, url: &str, file_name: &'static str) -> Reply {
    match client.image(url).await {
        Ok(data) => Reply::Photo { data, file_name },
        Err(e) => Reply::Text(format!(
            "Failed to fetch cat image after retrying. Error: {e}"
        )),
    }
}

async fn animation(client: &CatClient, url: &str, file_name: &'static str) -> Reply {
    match client.image(url).await {
        Ok(data) => Reply::Animation { data, file_name },
        Err(e) => Reply::Text(format!(
            "Failed to fetch cat GIF after retrying. Error: {e}"
        )),
    }
}

/// Room kept free in every part for its `Part i/N` header
const PART_HEADER_RESERVE: usize = 64;

/// Render the upstream tag list as one or more HTML messages.
///
/// Tags are sorted and escaped first. The single-message form is used when
/// the whole rendered message (header, listing and hint) fits the hard
/// limit; otherwise the listing is paginated into numbered parts followed
/// by the hint on its own. Every message stays within the hard limit.
#[must_use]
pub fn render_tag_listing(mut tags: Vec<String>, limits: PageLimits) -> Vec<Reply> {
    tags.retain(|tag| !tag.trim().is_empty());
    if tags.is_empty() {
        return vec![Reply::Text("No tags found.".to_string())];
    }
    tags.sort();

    let part_limits = PageLimits {
        hard_limit: limits.hard_limit,
        chunk_threshold: limits
            .effective_threshold()
            .min(limits.hard_limit.saturating_sub(PART_HEADER_RESERVE)),
    };
    let max_tag_len = part_limits.effective_threshold();
    let escaped: Vec<String> = tags
        .iter()
        .map(|tag| escape_bounded(tag, max_tag_len))
        .collect();

    let single = format!(
        "<b>Available Cat Tags:</b>\n{}\n\n{TAGS_USAGE_HINT}",
        escaped.join(SEPARATOR)
    );
    if single.chars().count() <= limits.hard_limit {
        return vec![Reply::Html(single)];
    }

    let chunks = paginate(&escaped, part_limits);
    let total = chunks.len();
    let mut replies: Vec<Reply> = chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            if i == 0 {
                format!("<b>Available Cat Tags (Part 1/{total}):</b>\n{chunk}")
            } else {
                format!("<b>Part {}/{total}:</b>\n{chunk}", i + 1)
            }
        })
        .map(Reply::Html)
        .collect();
    replies.push(Reply::Html(TAGS_USAGE_HINT.to_string()));
    replies
}

/// HTML-escape `tag`, dropping trailing characters whose escaped form would
/// push it past `max_chars`. Entities are never cut in half.
fn escape_bounded(tag: &str, max_chars: usize) -> String {
    let mut out = String::new();
    let mut len = 0;
    let mut buf = [0u8; 4];
    for c in tag.chars() {
        let raw: &str = c.encode_utf8(&mut buf);
        let piece = html_escape::encode_text(raw);
        let piece_len = piece.chars().count();
        if len + piece_len > max_chars {
            break;
        }
        out.push_str(&piece);
        len += piece_len;
    }
    out
}

/// Generic text for a fault caught at the command boundary
#[must_use]
pub fn error_reply(error: &anyhow::Error, limits: PageLimits) -> Reply {
    Reply::Text(truncate_str(
        format!("An error occurred: {error}"),
        limits.hard_limit,
    ))
}

const fn chat_action(cmd: &Command) -> Option<ChatAction> {
    match cmd {
        Command::Cat(_) | Command::CatSays(_) => Some(ChatAction::UploadPhoto),
        Command::CatGif | Command::CatGifSays(_) => Some(ChatAction::UploadVideo),
        Command::CatTags => Some(ChatAction::Typing),
        Command::Start | Command::Help => None,
    }
}

/// Run a command and deliver its replies.
///
/// Errors while building replies are answered with a generic error text.
/// If a reply cannot be delivered, the remaining ones are dropped and the
/// user gets an error text instead.
///
/// # Errors
///
/// Returns an error only if even the error text cannot be sent.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    client: Arc<CatClient>,
    settings: Arc<Settings>,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let limits = settings.page_limits();
    info!(
        "User {} in chat {} issued {:?}",
        get_user_id_safe(&msg),
        chat_id,
        cmd
    );

    if let Some(action) = chat_action(&cmd) {
        send_chat_action_safe(&bot, chat_id, action).await;
    }

    let replies = match build_replies(&cmd, &client, limits).await {
        Ok(replies) => replies,
        Err(e) => {
            error!("Command {:?} failed: {}", cmd, e);
            vec![error_reply(&e, limits)]
        }
    };

    for reply in &replies {
        if let Err(e) = send_reply(&bot, chat_id, reply).await {
            error!("Failed to deliver reply to {}: {}", chat_id, e);
            send_reply(&bot, chat_id, &error_reply(&e, limits)).await?;
            break;
        }
    }

    Ok(())
}
