//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, ReplyParameters};

use super::types::{HandlerDeps, HandlerError};
use crate::core::messages;
use crate::telegram::bot::{is_command, is_supported_reference, Command};
use crate::telegram::sink::TelegramSink;
use crate::telegram::Bot;

/// Creates the dispatcher schema for the bot.
///
/// Known commands are matched first. Other commands are dropped; any other
/// text message goes to the link handler.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(message_handler(deps))
}

fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);
            match cmd {
                Command::Start => {
                    bot.send_message(msg.chat.id, messages::START).await?;
                }
            }
            Ok(())
        },
    ))
}

fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some_and(|text| !is_command(text)))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default().trim().to_string();
                let reply = ReplyParameters::new(msg.id);

                if !is_supported_reference(&text) {
                    bot.send_message(msg.chat.id, messages::SEND_YOUTUBE_LINK)
                        .reply_parameters(reply)
                        .await?;
                    return Ok(());
                }

                log::info!("📥 Link from chat {}: {}", msg.chat.id, text);
                bot.send_message(msg.chat.id, messages::DOWNLOADING)
                    .reply_parameters(reply)
                    .await?;

                let sink = TelegramSink::new(bot.clone(), msg.chat.id, msg.id);
                // The supervisor logs the outcome; the dispatcher moves on while the request waits for a permit.
                deps.supervisor.spawn(text, sink);
                Ok(())
            }
        })
}
