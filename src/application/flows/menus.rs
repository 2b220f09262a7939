use super::callback::CallbackAction;
use super::pagination::Page;
use crate::domain::entities::{
    BookingDetails, FeedbackRequest, Service, Slot, SpecialistProfile, User,
};
use crate::domain::ports::{Button, Screen, SystemStats};
use crate::shared::utils::datetime::format_slot;

pub const HELP_TEXT: &str = "Commands:\n\
/start - main menu\n\
/mybookings - your bookings\n\
/reset - drop the current form and start over\n\
/help - this message";

pub const NO_FORM_HINT: &str = "I did not expect a message here. Send /start to open the menu.";

pub const STALE_BUTTON: &str = "This button is no longer valid. Please send /start again.";

fn button(label: impl Into<String>, action: CallbackAction) -> Button {
    Button::new(label, action.encode())
}

fn back_to_menu() -> Vec<Button> {
    vec![button("⬅️ Main menu", CallbackAction::Menu)]
}

pub fn main_menu(user: &User, is_specialist: bool) -> Screen {
    let mut screen = Screen::text(format!("Hello, {}! What would you like to do?", user.name))
        .with_button(button("📅 Book a slot", CallbackAction::Book))
        .with_button(button("📋 My bookings", CallbackAction::MyBookings))
        .with_button(button("✉️ Contact the administrator", CallbackAction::Feedback));

    if is_specialist {
        screen = screen.with_row(vec![
            button("🗓 My slots", CallbackAction::MySlots { page: 0 }),
            button("👥 My clients", CallbackAction::MyClients),
        ]);
    }
    if user.is_admin() {
        screen = screen.with_button(button("🛠 Admin panel", CallbackAction::AdminPanel));
    }
    screen
}

pub fn admin_panel() -> Screen {
    Screen::text("Admin panel")
        .with_button(button("➕ Add specialist", CallbackAction::AddSpecialist))
        .with_row(vec![
            button("➕ Add service", CallbackAction::AddService),
            button("➕ Add slot", CallbackAction::AddSlot),
        ])
        .with_button(button("✏️ Rename services", CallbackAction::EditServices))
        .with_button(button("📊 Statistics", CallbackAction::Stats))
        .with_row(back_to_menu())
}

/// Specialist list where each button maps to `action(specialist_id)`.
pub fn specialist_picker(
    title: &str,
    specialists: &[SpecialistProfile],
    action: impl Fn(i64) -> CallbackAction,
) -> Screen {
    if specialists.is_empty() {
        return Screen::text("There are no specialists yet.").with_row(back_to_menu());
    }

    specialists
        .iter()
        .fold(Screen::text(title), |screen, specialist| {
            screen.with_button(button(
                format!("{} ({})", specialist.name, specialist.specialization),
                action(specialist.id),
            ))
        })
        .with_row(back_to_menu())
}

pub fn service_picker(specialist_id: i64, services: &[Service]) -> Screen {
    if services.is_empty() {
        return Screen::text("This specialist has no services yet.").with_row(back_to_menu());
    }

    services
        .iter()
        .fold(Screen::text("Choose a service:"), |screen, service| {
            screen.with_button(button(
                service.name.clone(),
                CallbackAction::PickService {
                    specialist: specialist_id,
                    service: service.id,
                },
            ))
        })
        .with_row(vec![button("⬅️ Back", CallbackAction::Book)])
}

pub fn slot_picker(page: &Page<'_, Slot>, specialist: i64, service: i64) -> Screen {
    if page.items.is_empty() {
        return Screen::text("No free slots are available right now.").with_row(back_to_menu());
    }

    let screen = page.items.iter().fold(
        Screen::text(format!("Choose a time ({}):", page.label())),
        |screen, slot| {
            screen.with_button(button(
                format_slot(&slot.at),
                CallbackAction::PickSlot { slot: slot.id },
            ))
        },
    );

    let goto = |page: usize| CallbackAction::SlotPage {
        specialist,
        service,
        page,
    };
    screen
        .with_row(navigation(page, goto))
        .with_row(back_to_menu())
}

pub fn my_slots(page: &Page<'_, Slot>) -> Screen {
    if page.items.is_empty() {
        return Screen::text("You have no upcoming slots.").with_row(back_to_menu());
    }

    let mut text = format!("Your slots ({}):", page.label());
    let mut screen = Screen::default();
    for slot in page.items {
        let at = format_slot(&slot.at);
        if slot.is_booked {
            text.push_str(&format!("\n🔒 {} booked", at));
        } else {
            text.push_str(&format!("\n🟢 {} free", at));
            screen = screen.with_row(vec![
                button(format!("✏️ {}", at), CallbackAction::EditSlot { slot: slot.id }),
                button("🗑", CallbackAction::DeleteSlot { slot: slot.id }),
            ]);
        }
    }
    screen.text = text;

    screen
        .with_row(navigation(page, |page| CallbackAction::MySlots { page }))
        .with_row(back_to_menu())
}

fn navigation<T>(page: &Page<'_, T>, goto: impl Fn(usize) -> CallbackAction) -> Vec<Button> {
    let mut row = Vec::new();
    if page.has_previous() {
        row.push(button("◀️", goto(page.index - 1)));
    }
    if page.has_next() {
        row.push(button("▶️", goto(page.index + 1)));
    }
    row
}

pub fn my_bookings(bookings: &[BookingDetails]) -> Screen {
    if bookings.is_empty() {
        return Screen::text("You have no bookings.").with_row(back_to_menu());
    }

    bookings
        .iter()
        .fold(Screen::text("Your bookings:"), |screen, booking| {
            screen.with_button(button(
                format!(
                    "❌ {} {} {}",
                    format_slot(&booking.at),
                    booking.specialist_name,
                    booking.specialization
                ),
                CallbackAction::CancelBooking {
                    booking: booking.booking_id,
                },
            ))
        })
        .with_row(back_to_menu())
}

pub fn my_clients(bookings: &[BookingDetails]) -> Screen {
    if bookings.is_empty() {
        return Screen::text("Nobody has booked you yet.").with_row(back_to_menu());
    }

    let lines: Vec<String> = bookings
        .iter()
        .map(|booking| format!("{} {}", format_slot(&booking.at), booking.client_name))
        .collect();
    Screen::text(format!("Your clients:\n{}", lines.join("\n"))).with_row(back_to_menu())
}

pub fn stats(stats: &SystemStats) -> Screen {
    Screen::text(format!(
        "📊 Statistics\n\
         Specialists: {}\n\
         Clients: {}\n\
         Live bookings: {}\n\
         Bookings today: {}\n\
         Booked slots: {}\n\
         Free slots: {}",
        stats.specialists,
        stats.clients,
        stats.live_bookings,
        stats.bookings_today,
        stats.booked_slots,
        stats.free_slots
    ))
    .with_button(button("⬅️ Admin panel", CallbackAction::AdminPanel))
}

pub fn feedback_card(request: &FeedbackRequest, author: &str) -> Screen {
    let mut text = format!(
        "✉️ Request #{} from {} [{}]\n{}",
        request.id,
        author,
        request.status.as_str(),
        request.message
    );
    if let Some(response) = &request.admin_response {
        text.push_str(&format!("\n\nReply: {}", response));
    }

    Screen::text(text).with_row(vec![
        button("💬 Reply", CallbackAction::ReplyFeedback { request: request.id }),
        button("✅ Close", CallbackAction::CloseFeedback { request: request.id }),
    ])
}

/// Plain listing used by /slots.
pub fn all_slots(specialist: &SpecialistProfile, slots: &[Slot]) -> String {
    let mut text = format!("{} ({}):", specialist.name, specialist.specialization);
    if slots.is_empty() {
        text.push_str("\nno slots");
    }
    for slot in slots {
        let mark = if slot.is_booked { "🔒" } else { "🟢" };
        text.push_str(&format!("\n{} {}", mark, format_slot(&slot.at)));
    }
    text
}
