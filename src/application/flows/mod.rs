pub mod callback;
pub mod form;
pub mod menus;
pub mod pagination;
pub mod router;
pub mod session_store;

pub use callback::CallbackAction;
pub use form::{FormEffect, FormState, Transition};
pub use pagination::{paginate, Page, PageCursor};
pub use router::{ChatRouter, ChatServices, Command, EventKind, EventSender, InboundEvent};
pub use session_store::SessionStore;
