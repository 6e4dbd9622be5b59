//! Domain services. Each returns a [`ResponseEnvelope`] for every outcome and
//! delegates the generic plumbing to a shared [`resource::ResourceOps`].
//!
//! [`ResponseEnvelope`]: repairdesk_core::envelope::ResponseEnvelope

pub mod resource;
pub mod ticket;
pub mod user;

pub use resource::ResourceOps;
pub use ticket::TicketService;
pub use user::UserService;
