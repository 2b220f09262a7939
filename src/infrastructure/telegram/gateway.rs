use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::{ApiError, RequestError};

use crate::domain::entities::ChatIdentity;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{ChatSurface, NotificationGateway, Screen};

/// Outbound side of the bot. Every request waits on a shared limiter so
/// bursts (admin broadcasts, reminder passes) stay under the platform cap.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
    throttle: Arc<DefaultDirectRateLimiter>,
}

impl TelegramGateway {
    pub fn new(bot: Bot, messages_per_second: u32) -> Self {
        let rate = NonZeroU32::new(messages_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            bot,
            throttle: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    async fn send_screen(&self, chat: ChatIdentity, screen: Screen) -> DomainResult<Message> {
        self.throttle.until_ready().await;

        let request = self.bot.send_message(ChatId(chat), screen.text.clone());
        let sent = match keyboard(&screen) {
            Some(markup) => request.reply_markup(markup).await,
            None => request.await,
        };
        sent.map_err(|e| delivery_error(chat, e))
    }
}

#[async_trait]
impl NotificationGateway for TelegramGateway {
    async fn send(&self, identity: ChatIdentity, text: &str) -> DomainResult<()> {
        self.send_screen(identity, Screen::text(text)).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatSurface for TelegramGateway {
    async fn present(&self, chat: ChatIdentity, screen: Screen) -> DomainResult<i32> {
        let message = self.send_screen(chat, screen).await?;
        Ok(message.id.0)
    }

    async fn replace(&self, chat: ChatIdentity, message_id: i32, screen: Screen) -> DomainResult<()> {
        self.throttle.until_ready().await;

        let request = self
            .bot
            .edit_message_text(ChatId(chat), MessageId(message_id), screen.text.clone());
        let edited = match keyboard(&screen) {
            Some(markup) => request.reply_markup(markup).await,
            None => request.await,
        };

        match edited {
            Ok(_) => Ok(()),
            // Same content re-rendered, e.g. a double tap on a page button
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(delivery_error(chat, e)),
        }
    }
}

fn keyboard(screen: &Screen) -> Option<InlineKeyboardMarkup> {
    if screen.buttons.is_empty() {
        return None;
    }

    let rows: Vec<Vec<InlineKeyboardButton>> = screen
        .buttons
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(button.label.clone(), button.payload.clone())
                })
                .collect()
        })
        .collect();
    Some(InlineKeyboardMarkup::new(rows))
}

fn delivery_error(chat: ChatIdentity, error: RequestError) -> DomainError {
    DomainError::Persistence(format!("Telegram delivery to {} failed: {}", chat, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Button;

    #[test]
    fn test_plain_screen_has_no_keyboard() {
        assert!(keyboard(&Screen::text("hello")).is_none());
    }

    #[test]
    fn test_keyboard_keeps_row_layout() {
        let screen = Screen::text("menu")
            .with_row(vec![Button::new("A", "a"), Button::new("B", "b")])
            .with_button(Button::new("C", "c"));

        let markup = keyboard(&screen).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "C");
    }
}
