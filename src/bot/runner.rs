use super::commands::{usage_reply, Command};
use super::handlers;
use super::inline;
use super::resilient::send_message_resilient;
use crate::cataas::CatClient;
use crate::config::Settings;
use crate::tags::TagCache;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{InlineQuery, Me};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Run the Telegram bot until Ctrl-C.
pub async fn run_bot(
    settings: Arc<Settings>,
    tag_cache: Arc<TagCache>,
    cat_client: Arc<CatClient>,
) {
    let bot = Bot::new(settings.telegram_token.clone());
    register_commands(&bot).await;

    let handler = setup_handler();

    info!("Bot is ready to serve cats!");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![settings, tag_cache, cat_client])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Publish the command list so clients can offer it in the `/` menu
async fn register_commands(bot: &Bot) {
    let commands = Command::bot_commands();
    match bot.set_my_commands(commands.clone()).await {
        Ok(_) => info!("Registered {} bot commands.", commands.len()),
        Err(e) => warn!("Failed to register bot commands: {}", e),
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_inline_query().endpoint(handle_inline_query))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                // Our commands with arguments that did not parse
                .branch(
                    dptree::filter(|msg: Message| msg.text().is_some())
                        .endpoint(handle_unparsed),
                ),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    client: Arc<CatClient>,
    settings: Arc<Settings>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = handlers::handle_command(bot, msg, cmd, client, settings).await {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_inline_query(
    bot: Bot,
    q: InlineQuery,
    cache: Arc<TagCache>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = inline::handle_inline_query(bot, q, cache).await {
        error!("Inline query error: {}", e);
    }
    respond(())
}

async fn handle_unparsed(bot: Bot, msg: Message, me: Me) -> Result<(), teloxide::RequestError> {
    let Some(reply) = msg.text().and_then(|text| usage_reply(text, me.username())) else {
        return respond(());
    };

    if let Err(e) = send_message_resilient(&bot, msg.chat.id, &reply, None).await {
        error!("Failed to send usage to {}: {}", msg.chat.id, e);
    }
    respond(())
}
