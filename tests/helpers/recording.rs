use async_trait::async_trait;
use slotdesk::domain::entities::ChatIdentity;
use slotdesk::domain::errors::{DomainError, DomainResult};
use slotdesk::domain::ports::{ChatSurface, NotificationGateway, Screen};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub chat: ChatIdentity,
    pub text: String,
    pub payloads: Vec<String>,
    /// Set when an existing message was edited instead of a new one sent.
    pub edited: Option<i32>,
}

/// Captures everything sent through the notification and chat ports.
#[derive(Clone, Default)]
pub struct RecordingSurface {
    sent: Arc<Mutex<Vec<Outgoing>>>,
    failing: Arc<AtomicBool>,
    next_id: Arc<AtomicI32>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following delivery fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<Outgoing> {
        self.sent.lock().unwrap().clone()
    }

    pub fn to(&self, chat: ChatIdentity) -> Vec<Outgoing> {
        self.all().into_iter().filter(|o| o.chat == chat).collect()
    }

    pub fn texts_to(&self, chat: ChatIdentity) -> Vec<String> {
        self.to(chat).into_iter().map(|o| o.text).collect()
    }

    pub fn last_to(&self, chat: ChatIdentity) -> Option<Outgoing> {
        self.to(chat).pop()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    fn record(&self, chat: ChatIdentity, screen: &Screen, edited: Option<i32>) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::Persistence("delivery refused".to_string()));
        }
        self.sent.lock().unwrap().push(Outgoing {
            chat,
            text: screen.text.clone(),
            payloads: screen
                .buttons
                .iter()
                .flatten()
                .map(|b| b.payload.clone())
                .collect(),
            edited,
        });
        Ok(())
    }
}

#[async_trait]
impl NotificationGateway for RecordingSurface {
    async fn send(&self, identity: ChatIdentity, text: &str) -> DomainResult<()> {
        self.record(identity, &Screen::text(text), None)
    }
}

#[async_trait]
impl ChatSurface for RecordingSurface {
    async fn present(&self, chat: ChatIdentity, screen: Screen) -> DomainResult<i32> {
        self.record(chat, &screen, None)?;
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn replace(&self, chat: ChatIdentity, message_id: i32, screen: Screen) -> DomainResult<()> {
        self.record(chat, &screen, Some(message_id))
    }
}
