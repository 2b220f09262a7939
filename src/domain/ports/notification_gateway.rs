use crate::domain::entities::ChatIdentity;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A button is a label plus the encoded callback payload it sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Outbound message content, transport agnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub text: String,
    pub buttons: Vec<Vec<Button>>,
}

impl Screen {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.buttons.push(row);
        }
        self
    }

    pub fn with_button(self, button: Button) -> Self {
        self.with_row(vec![button])
    }
}

/// Best-effort delivery of plain text to a platform identity.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, identity: ChatIdentity, text: &str) -> DomainResult<()>;
}

/// Interactive surface of a chat: send a screen or redraw one in place.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Sends a new message and returns its id.
    async fn present(&self, chat: ChatIdentity, screen: Screen) -> DomainResult<i32>;
    async fn replace(&self, chat: ChatIdentity, message_id: i32, screen: Screen) -> DomainResult<()>;
}
