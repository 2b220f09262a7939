use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::form::FormState;
use super::pagination::PageCursor;
use crate::domain::entities::ChatIdentity;

/// Per-chat conversational state kept between updates.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub form: Option<FormState>,
    pub cursor: Option<PageCursor>,
    touched_at: Instant,
}

impl ChatSession {
    fn new() -> Self {
        Self {
            form: None,
            cursor: None,
            touched_at: Instant::now(),
        }
    }

    fn is_empty(&self) -> bool {
        self.form.is_none() && self.cursor.is_none()
    }
}

/// In-memory session map keyed by chat. Sessions idle for `ttl` are dropped.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<ChatIdentity, ChatSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Starts a form, returning the one it replaced, if any.
    pub async fn begin_form(&self, chat: ChatIdentity, form: FormState) -> Option<FormState> {
        let mut sessions = self.sessions.lock().await;
        let session = self.live_entry(&mut sessions, chat);
        session.touched_at = Instant::now();
        session.form.replace(form)
    }

    /// Removes the active form so a text answer can be processed.
    pub async fn take_form(&self, chat: ChatIdentity) -> Option<FormState> {
        let mut sessions = self.sessions.lock().await;
        let session = self.live_entry(&mut sessions, chat);
        session.touched_at = Instant::now();
        session.form.take()
    }

    pub async fn set_form(&self, chat: ChatIdentity, form: FormState) {
        let mut sessions = self.sessions.lock().await;
        let session = self.live_entry(&mut sessions, chat);
        session.touched_at = Instant::now();
        session.form = Some(form);
    }

    pub async fn clear_form(&self, chat: ChatIdentity) {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&chat) {
            session.form = None;
        }
    }

    pub async fn cursor(&self, chat: ChatIdentity) -> Option<PageCursor> {
        let mut sessions = self.sessions.lock().await;
        self.live_entry(&mut sessions, chat).cursor
    }

    pub async fn set_cursor(&self, chat: ChatIdentity, cursor: PageCursor) {
        let mut sessions = self.sessions.lock().await;
        let session = self.live_entry(&mut sessions, chat);
        session.touched_at = Instant::now();
        session.cursor = Some(cursor);
    }

    /// Forgets everything about the chat.
    pub async fn reset(&self, chat: ChatIdentity) {
        self.sessions.lock().await.remove(&chat);
    }

    /// Drops expired and empty sessions. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, session| session.touched_at.elapsed() < ttl && !session.is_empty());
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn live_entry<'a>(
        &self,
        sessions: &'a mut HashMap<ChatIdentity, ChatSession>,
        chat: ChatIdentity,
    ) -> &'a mut ChatSession {
        let expired = sessions
            .get(&chat)
            .map(|session| session.touched_at.elapsed() >= self.ttl)
            .unwrap_or(false);
        if expired {
            tracing::debug!("Session for chat {} expired", chat);
            sessions.remove(&chat);
        }
        sessions.entry(chat).or_insert_with(ChatSession::new)
    }
}
