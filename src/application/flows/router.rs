use std::sync::Arc;

use super::callback::CallbackAction;
use super::form::{FormEffect, FormState, Transition};
use super::menus;
use super::pagination::{
    paginate, CursorKind, PageCursor, MY_SLOTS_PAGE_SIZE, SLOT_PICKER_PAGE_SIZE,
};
use super::session_store::SessionStore;
use crate::application::services::{
    BookingEngine, DirectoryService, FeedbackService, SlotStore, StatsService, UserService,
};
use crate::domain::entities::{ChatIdentity, Slot, Specialist, User};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{AlertSink, Button, ChatSurface, Screen, Severity};
use crate::shared::utils::datetime::format_slot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSender {
    pub identity: ChatIdentity,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Admin,
    Reset,
    MyBookings,
    Slots,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command(Command),
    /// Raw button payload plus the message the button is attached to.
    Callback { data: String, message_id: i32 },
    Text(String),
}

/// Transport-neutral inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub chat: ChatIdentity,
    pub sender: EventSender,
    pub kind: EventKind,
}

impl EventKind {
    fn describe(&self) -> String {
        match self {
            EventKind::Command(command) => format!("command {:?}", command),
            EventKind::Callback { data, .. } => format!("button '{}'", data),
            EventKind::Text(_) => "text message".to_string(),
        }
    }

    /// Button offered next to a conflict message.
    fn retry_action(&self) -> CallbackAction {
        match self {
            EventKind::Callback { data, .. } if data.starts_with("pick:") => CallbackAction::Book,
            _ => CallbackAction::Menu,
        }
    }
}

/// Application services the router drives.
#[derive(Clone)]
pub struct ChatServices {
    pub users: UserService,
    pub directory: DirectoryService,
    pub slots: SlotStore,
    pub bookings: BookingEngine,
    pub feedback: FeedbackService,
    pub stats: StatsService,
}

/// Resolves which handler owns an inbound event and runs it.
#[derive(Clone)]
pub struct ChatRouter {
    services: ChatServices,
    sessions: SessionStore,
    surface: Arc<dyn ChatSurface>,
    alerts: Arc<dyn AlertSink>,
}

impl ChatRouter {
    pub fn new(
        services: ChatServices,
        sessions: SessionStore,
        surface: Arc<dyn ChatSurface>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            services,
            sessions,
            surface,
            alerts,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Never fails: errors become a reply to the chat and, unless they are
    /// plain input mistakes, an admin alert.
    pub async fn handle(&self, event: InboundEvent) {
        let chat = event.chat;
        let context = event.kind.describe();
        let retry = event.kind.retry_action();

        if let Err(error) = self.dispatch(event).await {
            self.report(chat, &context, retry, error).await;
        }
    }

    async fn dispatch(&self, event: InboundEvent) -> DomainResult<()> {
        let user = self
            .services
            .users
            .register(event.sender.identity, &event.sender.display_name)
            .await?;
        let chat = event.chat;

        match event.kind {
            EventKind::Command(command) => self.on_command(chat, &user, command).await,
            EventKind::Callback { data, message_id } => match data.parse::<CallbackAction>() {
                Ok(action) => self.on_callback(chat, &user, action, message_id).await,
                Err(e) => {
                    tracing::debug!(chat, payload = %data, error = %e, "Unparseable callback");
                    self.say(chat, menus::STALE_BUTTON).await
                }
            },
            EventKind::Text(text) => self.on_text(chat, &user, &text).await,
        }
    }

    async fn report(
        &self,
        chat: ChatIdentity,
        context: &str,
        retry: CallbackAction,
        error: DomainError,
    ) {
        let mut screen = Screen::text(error.user_message());
        if matches!(error, DomainError::Conflict(_)) {
            screen = screen.with_button(Button::new("🔄 Try again", retry.encode()));
        }
        if let Err(e) = self.surface.present(chat, screen).await {
            tracing::warn!(chat, error = %e, "Cannot deliver error reply");
        }

        if !error.is_alertable() {
            tracing::debug!(chat, context, error = %error, "Rejected input");
            return;
        }

        let severity = match error {
            DomainError::Persistence(_) => {
                tracing::error!(chat, context, error = %error, "Handler failed");
                Severity::Error
            }
            _ => {
                tracing::warn!(chat, context, error = %error, "Handler refused");
                Severity::Warning
            }
        };
        self.alerts
            .alert(
                severity,
                &format!("Chat {}: {} failed: {}", chat, context, error),
            )
            .await;
    }

    async fn on_command(&self, chat: ChatIdentity, user: &User, command: Command) -> DomainResult<()> {
        match command {
            Command::Start => self.show_main_menu(chat, user, None).await,
            Command::Help => self.say(chat, menus::HELP_TEXT).await,
            Command::Reset => {
                self.sessions.reset(chat).await;
                self.say(chat, "🔄 Session reset.").await?;
                self.show_main_menu(chat, user, None).await
            }
            Command::MyBookings => self.show_my_bookings(chat, user, None).await,
            Command::Admin => self.show_admin_panel(chat, user, None).await,
            Command::Slots => {
                require_admin(user)?;
                let specialists = self.services.directory.list_specialists().await?;
                if specialists.is_empty() {
                    return self.say(chat, "There are no specialists yet.").await;
                }
                for specialist in &specialists {
                    let slots = self.services.slots.list_all(specialist.id).await?;
                    self.say(chat, &menus::all_slots(specialist, &slots)).await?;
                }
                Ok(())
            }
        }
    }

    async fn on_callback(
        &self,
        chat: ChatIdentity,
        user: &User,
        action: CallbackAction,
        message_id: i32,
    ) -> DomainResult<()> {
        let origin = Some(message_id);

        match action {
            CallbackAction::Menu => self.show_main_menu(chat, user, origin).await,
            CallbackAction::Book => {
                let specialists = self.services.directory.list_specialists().await?;
                let screen = menus::specialist_picker("Choose a specialist:", &specialists, |id| {
                    CallbackAction::PickSpecialist { specialist: id }
                });
                self.show(chat, origin, screen).await.map(|_| ())
            }
            CallbackAction::PickSpecialist { specialist } => {
                let services = self.services.directory.list_services(specialist).await?;
                self.show(chat, origin, menus::service_picker(specialist, &services))
                    .await
                    .map(|_| ())
            }
            CallbackAction::PickService {
                specialist,
                service,
            } => {
                self.render_slot_picker(chat, specialist, service, 0, origin)
                    .await
            }
            CallbackAction::SlotPage {
                specialist,
                service,
                page,
            } => {
                self.render_slot_picker(chat, specialist, service, page, origin)
                    .await
            }
            CallbackAction::PickSlot { slot } => {
                let booking = self.services.bookings.reserve(user.id, slot).await?;
                let screen = Screen::text(format!(
                    "📅 Booking #{}: {} with {}",
                    booking.booking_id,
                    format_slot(&booking.at),
                    booking.specialist_name
                ))
                .with_button(Button::new("📋 My bookings", CallbackAction::MyBookings.encode()));
                self.show(chat, origin, screen).await.map(|_| ())
            }
            CallbackAction::MyBookings => self.show_my_bookings(chat, user, origin).await,
            CallbackAction::CancelBooking { booking } => {
                self.services.bookings.cancel(booking, user.id).await?;
                self.show_my_bookings(chat, user, origin).await
            }
            CallbackAction::MySlots { page } => {
                let specialist = self.require_specialist(user).await?;
                self.render_my_slots(chat, specialist.id, page, origin).await
            }
            CallbackAction::MyClients => {
                let specialist = self.require_specialist(user).await?;
                let clients = self
                    .services
                    .bookings
                    .bookings_for_specialist(specialist.id)
                    .await?;
                self.show(chat, origin, menus::my_clients(&clients))
                    .await
                    .map(|_| ())
            }
            CallbackAction::Feedback => {
                self.start_form(chat, FormState::AwaitingFeedbackText { user: user.id })
                    .await
            }
            CallbackAction::AdminPanel => self.show_admin_panel(chat, user, origin).await,
            CallbackAction::AddSpecialist => {
                require_admin(user)?;
                self.start_form(chat, FormState::onboarding()).await
            }
            CallbackAction::AddService => {
                require_admin(user)?;
                self.pick_specialist_for(chat, origin, "Add a service for:", |id| {
                    CallbackAction::AddServiceFor { specialist: id }
                })
                .await
            }
            CallbackAction::AddServiceFor { specialist } => {
                require_admin(user)?;
                self.services.directory.get_specialist(specialist).await?;
                self.start_form(chat, FormState::AwaitingServiceName { specialist })
                    .await
            }
            CallbackAction::AddSlot => {
                require_admin(user)?;
                self.pick_specialist_for(chat, origin, "Add a slot for:", |id| {
                    CallbackAction::AddSlotFor { specialist: id }
                })
                .await
            }
            CallbackAction::AddSlotFor { specialist } => {
                require_admin(user)?;
                self.services.directory.get_specialist(specialist).await?;
                self.start_form(chat, FormState::AwaitingSlotDateTime { specialist })
                    .await
            }
            CallbackAction::EditServices => {
                require_admin(user)?;
                self.pick_specialist_for(chat, origin, "Rename services of:", |id| {
                    CallbackAction::EditServicesFor { specialist: id }
                })
                .await
            }
            CallbackAction::EditServicesFor { specialist } => {
                require_admin(user)?;
                let services = self.services.directory.list_services(specialist).await?;
                if services.is_empty() {
                    return self.say(chat, "This specialist has no services yet.").await;
                }
                let services = services.into_iter().map(|s| (s.id, s.name)).collect();
                self.start_form(
                    chat,
                    FormState::AwaitingRename {
                        specialist,
                        services,
                        index: 0,
                    },
                )
                .await
            }
            CallbackAction::EditSlot { slot } => {
                let slot = self.authorize_slot(user, slot).await?;
                if !slot.is_mutable() {
                    return Err(DomainError::Conflict("this slot is already booked".to_string()));
                }
                self.start_form(chat, FormState::AwaitingSlotReschedule { slot: slot.id })
                    .await
            }
            CallbackAction::DeleteSlot { slot } => {
                let slot = self.authorize_slot(user, slot).await?;
                if !self.services.slots.delete(slot.id).await? {
                    return Err(DomainError::Conflict("this slot is already booked".to_string()));
                }
                self.say(chat, &format!("🗑 Slot {} deleted.", format_slot(&slot.at)))
                    .await?;
                self.refresh_my_slots(chat).await
            }
            CallbackAction::ReplyFeedback { request } => {
                require_admin(user)?;
                self.start_form(chat, FormState::AwaitingFeedbackReply { request })
                    .await
            }
            CallbackAction::CloseFeedback { request } => {
                require_admin(user)?;
                let closed = self.services.feedback.close(request).await?;
                self.show(
                    chat,
                    origin,
                    Screen::text(format!("✅ Request #{} closed.", closed.id)),
                )
                .await
                .map(|_| ())
            }
            CallbackAction::Stats => {
                require_admin(user)?;
                let stats = self.services.stats.collect().await?;
                self.show(chat, origin, menus::stats(&stats)).await.map(|_| ())
            }
        }
    }

    /// Feeds free text to the chat's active form.
    async fn on_text(&self, chat: ChatIdentity, user: &User, text: &str) -> DomainResult<()> {
        let Some(form) = self.sessions.take_form(chat).await else {
            return self.say(chat, menus::NO_FORM_HINT).await;
        };
        tracing::debug!(chat, user_id = user.id, form = form.title(), "Form answer");

        match form.advance(text) {
            Transition::Next(next) => {
                self.sessions.set_form(chat, next.state).await;
                self.say(chat, &next.prompt).await
            }
            Transition::Retry { state, error } => {
                let reply = format!("{}\n{}", error.user_message(), state.prompt());
                self.sessions.set_form(chat, state).await;
                self.say(chat, &reply).await
            }
            Transition::Commit {
                effect,
                retry,
                then,
            } => match self.commit(chat, effect).await {
                Ok(confirmation) => {
                    if let Some(confirmation) = confirmation {
                        self.say(chat, &confirmation).await?;
                    }
                    if let Some(next) = then {
                        self.sessions.set_form(chat, next.state).await;
                        self.say(chat, &next.prompt).await?;
                    }
                    Ok(())
                }
                Err(error @ DomainError::Validation(_)) => {
                    let reply = format!("{}\n{}", error.user_message(), retry.prompt());
                    self.sessions.set_form(chat, retry).await;
                    self.say(chat, &reply).await
                }
                // the form was taken above, so it is already gone
                Err(error) => Err(error),
            },
        }
    }

    async fn commit(&self, chat: ChatIdentity, effect: FormEffect) -> DomainResult<Option<String>> {
        let confirmation = match effect {
            FormEffect::VerifyIdentity(identity) => {
                self.services.directory.ensure_onboardable(identity).await?;
                None
            }
            FormEffect::OnboardSpecialist(new) => {
                let name = new.name.clone();
                self.services.directory.onboard(new).await?;
                Some(format!("✅ Specialist {} added.", name))
            }
            FormEffect::AddService { specialist, name } => {
                let service = self.services.directory.add_service(specialist, &name).await?;
                Some(format!("✅ Service \"{}\" added.", service.name))
            }
            FormEffect::AddSlot { specialist, at } => {
                let slot = self.services.slots.create(specialist, at).await?;
                Some(format!("✅ Slot {} added.", format_slot(&slot.at)))
            }
            FormEffect::RenameService { service, name } => {
                let name = self.services.directory.rename_service(service, &name).await?;
                Some(format!("✅ Renamed to \"{}\".", name))
            }
            FormEffect::RescheduleSlot { slot, at } => {
                if !self.services.slots.update(slot, at).await? {
                    return Err(DomainError::Conflict(
                        "the slot was booked in the meantime".to_string(),
                    ));
                }
                self.refresh_my_slots(chat).await?;
                Some(format!("✅ Slot moved to {}.", format_slot(&at)))
            }
            FormEffect::SubmitFeedback { user, text } => {
                let request = self.services.feedback.submit(user, &text).await?;
                Some(format!(
                    "✅ Your message #{} was sent to the administrator.",
                    request.id
                ))
            }
            FormEffect::ReplyFeedback { request, text } => {
                self.services.feedback.respond(request, &text).await?;
                Some(format!("✅ Reply to request #{} sent.", request))
            }
        };
        Ok(confirmation)
    }

    async fn start_form(&self, chat: ChatIdentity, form: FormState) -> DomainResult<()> {
        let prompt = form.prompt();
        if let Some(previous) = self.sessions.begin_form(chat, form).await {
            self.say(
                chat,
                &format!("The unfinished {} was discarded.", previous.title()),
            )
            .await?;
        }
        self.say(chat, &prompt).await
    }

    async fn show_main_menu(
        &self,
        chat: ChatIdentity,
        user: &User,
        origin: Option<i32>,
    ) -> DomainResult<()> {
        let is_specialist = self
            .services
            .directory
            .specialist_for_user(user.id)
            .await?
            .is_some();
        self.show(chat, origin, menus::main_menu(user, is_specialist))
            .await
            .map(|_| ())
    }

    async fn show_my_bookings(
        &self,
        chat: ChatIdentity,
        user: &User,
        origin: Option<i32>,
    ) -> DomainResult<()> {
        let bookings = self.services.bookings.bookings_for_user(user.id).await?;
        self.show(chat, origin, menus::my_bookings(&bookings))
            .await
            .map(|_| ())
    }

    /// Panel plus one card per open feedback request.
    async fn show_admin_panel(
        &self,
        chat: ChatIdentity,
        user: &User,
        origin: Option<i32>,
    ) -> DomainResult<()> {
        require_admin(user)?;
        self.show(chat, origin, menus::admin_panel()).await?;

        for request in self.services.feedback.list_active().await? {
            let author = match self.services.users.get_user(request.user_id).await {
                Ok(author) => author.name,
                Err(_) => format!("user #{}", request.user_id),
            };
            self.surface
                .present(chat, menus::feedback_card(&request, &author))
                .await?;
        }
        Ok(())
    }

    async fn pick_specialist_for(
        &self,
        chat: ChatIdentity,
        origin: Option<i32>,
        title: &str,
        action: impl Fn(i64) -> CallbackAction,
    ) -> DomainResult<()> {
        let specialists = self.services.directory.list_specialists().await?;
        self.show(chat, origin, menus::specialist_picker(title, &specialists, action))
            .await
            .map(|_| ())
    }

    async fn render_slot_picker(
        &self,
        chat: ChatIdentity,
        specialist: i64,
        service: i64,
        page: usize,
        origin: Option<i32>,
    ) -> DomainResult<()> {
        let free = self.services.slots.list_free_future(specialist).await?;
        let page = paginate(&free, SLOT_PICKER_PAGE_SIZE, page);
        let screen = menus::slot_picker(&page, specialist, service);
        self.show_page(
            chat,
            CursorKind::SlotPicker {
                specialist,
                service,
            },
            page.index,
            screen,
            origin,
        )
        .await
    }

    async fn render_my_slots(
        &self,
        chat: ChatIdentity,
        specialist: i64,
        page: usize,
        origin: Option<i32>,
    ) -> DomainResult<()> {
        let slots = self.services.slots.list_future(specialist).await?;
        let page = paginate(&slots, MY_SLOTS_PAGE_SIZE, page);
        let screen = menus::my_slots(&page);
        self.show_page(
            chat,
            CursorKind::MySlots { specialist },
            page.index,
            screen,
            origin,
        )
        .await
    }

    /// Redraws the cached "my slots" page after one of its slots changed.
    async fn refresh_my_slots(&self, chat: ChatIdentity) -> DomainResult<()> {
        match self.sessions.cursor(chat).await {
            Some(PageCursor {
                kind: CursorKind::MySlots { specialist },
                page,
                ..
            }) => self.render_my_slots(chat, specialist, page, None).await,
            _ => Ok(()),
        }
    }

    /// Edits the clicked message, else the cached one for this list, else sends a new one.
    async fn show_page(
        &self,
        chat: ChatIdentity,
        kind: CursorKind,
        page: usize,
        screen: Screen,
        origin: Option<i32>,
    ) -> DomainResult<()> {
        let cached = self
            .sessions
            .cursor(chat)
            .await
            .filter(|cursor| cursor.kind == kind)
            .map(|cursor| cursor.message_id);

        let message_id = self.show(chat, origin.or(cached), screen).await?;
        self.sessions
            .set_cursor(
                chat,
                PageCursor {
                    kind,
                    page,
                    message_id,
                },
            )
            .await;
        Ok(())
    }

    async fn show(
        &self,
        chat: ChatIdentity,
        target: Option<i32>,
        screen: Screen,
    ) -> DomainResult<i32> {
        if let Some(message_id) = target {
            match self.surface.replace(chat, message_id, screen.clone()).await {
                Ok(()) => return Ok(message_id),
                Err(e) => {
                    tracing::debug!(chat, message_id, error = %e, "Cannot edit message, sending a new one")
                }
            }
        }
        self.surface.present(chat, screen).await
    }

    async fn say(&self, chat: ChatIdentity, text: &str) -> DomainResult<()> {
        self.surface.present(chat, Screen::text(text)).await.map(|_| ())
    }

    async fn require_specialist(&self, user: &User) -> DomainResult<Specialist> {
        self.services
            .directory
            .specialist_for_user(user.id)
            .await?
            .ok_or_else(|| DomainError::Ownership("only specialists have slots".to_string()))
    }

    /// The slot's own specialist or any admin.
    async fn authorize_slot(&self, user: &User, slot_id: i64) -> DomainResult<Slot> {
        let slot = self.services.slots.get(slot_id).await?;
        if user.is_admin() {
            return Ok(slot);
        }
        match self.services.directory.specialist_for_user(user.id).await? {
            Some(specialist) if specialist.id == slot.specialist_id => Ok(slot),
            _ => Err(DomainError::Ownership(format!(
                "slot #{} belongs to another specialist",
                slot_id
            ))),
        }
    }
}

fn require_admin(user: &User) -> DomainResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Ownership("admin only".to_string()))
    }
}
