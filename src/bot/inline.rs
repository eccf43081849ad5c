//! Tag autocomplete through inline queries.
//!
//! Typing `@bot ora` in any chat lists matching tags; picking one posts
//! `/cat <tag>` which the command handler then serves.

use crate::tags::{suggest, Tag, TagCache};
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{
    InlineQuery, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
    InputMessageContentText,
};
use tracing::debug;

/// Seconds Telegram may cache an answer; the tag list never changes at runtime
const INLINE_CACHE_TIME_SECS: u32 = 300;

/// Turn suggestions into inline articles that post `/cat <tag>`
#[must_use]
pub fn inline_results(tags: &[Tag]) -> Vec<InlineQueryResult> {
    tags.iter()
        .enumerate()
        .map(|(i, tag)| {
            let command = format!("/cat {tag}");
            let content = InputMessageContent::Text(InputMessageContentText::new(command.clone()));
            InlineQueryResult::Article(
                InlineQueryResultArticle::new(format!("tag-{i}"), tag.clone(), content)
                    .description(command),
            )
        })
        .collect()
}

/// Answer an inline query with tag suggestions.
///
/// # Errors
///
/// Returns an error if Telegram rejects the answer.
pub async fn handle_inline_query(bot: Bot, q: InlineQuery, cache: Arc<TagCache>) -> Result<()> {
    let query = q.query.trim();
    let suggestions = suggest(&cache, query);
    debug!(
        "Inline query {:?} from {} matched {} tags",
        query,
        q.from.id,
        suggestions.len()
    );

    bot.answer_inline_query(q.id.clone(), inline_results(&suggestions))
        .cache_time(INLINE_CACHE_TIME_SECS)
        .await?;
    Ok(())
}
