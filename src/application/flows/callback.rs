use std::fmt;
use std::str::FromStr;

/// Everything an inline button can ask for. The wire form is short enough
/// for the 64-byte callback payload limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Menu,
    Book,
    PickSpecialist { specialist: i64 },
    PickService { specialist: i64, service: i64 },
    SlotPage { specialist: i64, service: i64, page: usize },
    PickSlot { slot: i64 },
    MyBookings,
    CancelBooking { booking: i64 },
    MySlots { page: usize },
    MyClients,
    Feedback,
    AdminPanel,
    AddSpecialist,
    AddService,
    AddServiceFor { specialist: i64 },
    AddSlot,
    AddSlotFor { specialist: i64 },
    EditServices,
    EditServicesFor { specialist: i64 },
    EditSlot { slot: i64 },
    DeleteSlot { slot: i64 },
    ReplyFeedback { request: i64 },
    CloseFeedback { request: i64 },
    Stats,
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        use CallbackAction::*;

        match *self {
            Menu => "menu".to_string(),
            Book => "book".to_string(),
            PickSpecialist { specialist } => format!("spec:{}", specialist),
            PickService {
                specialist,
                service,
            } => format!("svc:{}:{}", specialist, service),
            SlotPage {
                specialist,
                service,
                page,
            } => format!("page:{}:{}:{}", page, specialist, service),
            PickSlot { slot } => format!("pick:{}", slot),
            MyBookings => "mybookings".to_string(),
            CancelBooking { booking } => format!("cancel:{}", booking),
            MySlots { page } => format!("myslots:{}", page),
            MyClients => "clients".to_string(),
            Feedback => "feedback".to_string(),
            AdminPanel => "admin".to_string(),
            AddSpecialist => "admin:addspec".to_string(),
            AddService => "admin:addsvc".to_string(),
            AddServiceFor { specialist } => format!("svcfor:{}", specialist),
            AddSlot => "admin:addslot".to_string(),
            AddSlotFor { specialist } => format!("slotfor:{}", specialist),
            EditServices => "admin:editsvc".to_string(),
            EditServicesFor { specialist } => format!("editsvcfor:{}", specialist),
            EditSlot { slot } => format!("editslot:{}", slot),
            DeleteSlot { slot } => format!("delslot:{}", slot),
            ReplyFeedback { request } => format!("reply:{}", request),
            CloseFeedback { request } => format!("close:{}", request),
            Stats => "admin:stats".to_string(),
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn id<T: FromStr>(part: &str, payload: &str) -> Result<T, String> {
    part.parse()
        .map_err(|_| format!("Invalid callback payload: {}", payload))
}

impl FromStr for CallbackAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use CallbackAction::*;

        let parts: Vec<&str> = s.split(':').collect();
        let action = match parts.as_slice() {
            ["menu"] => Menu,
            ["book"] => Book,
            ["spec", a] => PickSpecialist {
                specialist: id(a, s)?,
            },
            ["svc", a, b] => PickService {
                specialist: id(a, s)?,
                service: id(b, s)?,
            },
            ["page", p, a, b] => SlotPage {
                page: id(p, s)?,
                specialist: id(a, s)?,
                service: id(b, s)?,
            },
            ["pick", a] => PickSlot { slot: id(a, s)? },
            ["mybookings"] => MyBookings,
            ["cancel", a] => CancelBooking { booking: id(a, s)? },
            ["myslots"] => MySlots { page: 0 },
            ["myslots", p] => MySlots { page: id(p, s)? },
            ["clients"] => MyClients,
            ["feedback"] => Feedback,
            ["admin"] => AdminPanel,
            ["admin", "addspec"] => AddSpecialist,
            ["admin", "addsvc"] => AddService,
            ["admin", "addslot"] => AddSlot,
            ["admin", "editsvc"] => EditServices,
            ["admin", "stats"] => Stats,
            ["svcfor", a] => AddServiceFor {
                specialist: id(a, s)?,
            },
            ["slotfor", a] => AddSlotFor {
                specialist: id(a, s)?,
            },
            ["editsvcfor", a] => EditServicesFor {
                specialist: id(a, s)?,
            },
            ["editslot", a] => EditSlot { slot: id(a, s)? },
            ["delslot", a] => DeleteSlot { slot: id(a, s)? },
            ["reply", a] => ReplyFeedback { request: id(a, s)? },
            ["close", a] => CloseFeedback { request: id(a, s)? },
            _ => return Err(format!("Unknown callback payload: {}", s)),
        };
        Ok(action)
    }
}
