//! Outbound mail
//!
//! A small transport abstraction so the notification code does not care
//! whether messages go to an HTTP mail API or only to the log.

mod transport;

pub use transport::{transport_from_config, MailError, MailTransport, Mailbox, OutgoingMail};
