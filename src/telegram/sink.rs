//! Delivery into a Telegram chat, replying to the request message.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};

use crate::core::error::AppError;
use crate::download::sink::{AudioCaption, DeliverySink};
use crate::telegram::Bot;

#[derive(Clone)]
pub struct TelegramSink {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
}

impl TelegramSink {
    pub fn new(bot: Bot, chat_id: ChatId, reply_to: MessageId) -> Self {
        Self { bot, chat_id, reply_to }
    }
}

#[async_trait]
impl DeliverySink for TelegramSink {
    async fn notify(&self, text: &str) -> Result<(), AppError> {
        self.bot
            .send_message(self.chat_id, text)
            .reply_parameters(ReplyParameters::new(self.reply_to))
            .await?;
        Ok(())
    }

    async fn deliver_audio(&self, path: &Path, caption: &AudioCaption) -> Result<(), AppError> {
        let mut request = self
            .bot
            .send_audio(self.chat_id, InputFile::file(path))
            .title(caption.title.clone())
            .reply_parameters(ReplyParameters::new(self.reply_to));
        if let Some(performer) = &caption.performer {
            request = request.performer(performer.clone());
        }
        request.await?;

        log::info!("📤 Sent '{}' to chat {}", caption.title, self.chat_id);
        Ok(())
    }
}
