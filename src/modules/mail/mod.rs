//! Outbound email.
//!
//! Producers build an [`EmailMessage`] and hand it to a [`Mailer`]. The log
//! backend is meant for development; the HTTP backend posts JSON to a mail
//! delivery API.

mod http_mailer;
mod mailer;

pub use http_mailer::HttpMailer;
pub use mailer::{build_mailer, EmailMessage, LogMailer, Mailer};
