use teloxide::prelude::*;
use teloxide::types::User;
use teloxide::utils::command::BotCommands;

use crate::application::flows::{ChatRouter, Command, EventKind, EventSender, InboundEvent};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum BotCommand {
    #[command(description = "open the main menu")]
    Start,
    #[command(description = "admin panel")]
    Admin,
    #[command(description = "drop the current form")]
    Reset,
    #[command(description = "your bookings")]
    MyBookings,
    #[command(description = "all slots per specialist (admin)")]
    Slots,
    #[command(description = "show help")]
    Help,
}

impl From<BotCommand> for Command {
    fn from(command: BotCommand) -> Self {
        match command {
            BotCommand::Start => Command::Start,
            BotCommand::Admin => Command::Admin,
            BotCommand::Reset => Command::Reset,
            BotCommand::MyBookings => Command::MyBookings,
            BotCommand::Slots => Command::Slots,
            BotCommand::Help => Command::Help,
        }
    }
}

/// Long-polls updates until ctrl-c. Updates from one chat are handled in
/// order; different chats run concurrently.
pub async fn run(bot: Bot, router: ChatRouter) {
    if let Err(e) = bot.set_my_commands(BotCommand::bot_commands()).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<BotCommand>()
                .endpoint(on_command),
        )
        .branch(Update::filter_callback_query().endpoint(on_callback))
        .branch(Update::filter_message().endpoint(on_message));

    tracing::info!("Starting Telegram dispatcher");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_command(msg: Message, command: BotCommand, router: ChatRouter) -> HandlerResult {
    if let Some(sender) = msg.from.as_ref().map(event_sender) {
        router
            .handle(InboundEvent {
                chat: msg.chat.id.0,
                sender,
                kind: EventKind::Command(command.into()),
            })
            .await;
    }
    Ok(())
}

async fn on_callback(bot: Bot, query: CallbackQuery, router: ChatRouter) -> HandlerResult {
    // Stops the client-side spinner; the real answer is a message edit
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        tracing::debug!("Failed to answer callback query: {}", e);
    }

    let (Some(data), Some(message)) = (query.data.clone(), query.message.as_ref()) else {
        return Ok(());
    };

    router
        .handle(InboundEvent {
            chat: message.chat().id.0,
            sender: event_sender(&query.from),
            kind: EventKind::Callback {
                data,
                message_id: message.id().0,
            },
        })
        .await;
    Ok(())
}

async fn on_message(msg: Message, router: ChatRouter) -> HandlerResult {
    let (Some(text), Some(sender)) = (msg.text(), msg.from.as_ref().map(event_sender)) else {
        return Ok(());
    };

    router
        .handle(InboundEvent {
            chat: msg.chat.id.0,
            sender,
            kind: EventKind::Text(text.to_string()),
        })
        .await;
    Ok(())
}

fn event_sender(user: &User) -> EventSender {
    EventSender {
        identity: user.id.0 as i64,
        display_name: user.full_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse_lowercase() {
        assert_eq!(
            BotCommand::parse("/mybookings", "slotdesk_bot").unwrap(),
            BotCommand::MyBookings
        );
        assert_eq!(
            Command::from(BotCommand::parse("/reset", "slotdesk_bot").unwrap()),
            Command::Reset
        );
        assert!(BotCommand::parse("/unknown", "slotdesk_bot").is_err());
    }
}
