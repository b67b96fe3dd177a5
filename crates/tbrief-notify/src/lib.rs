//! Notification delivery.
//!
//! The [`Notifier`] trait is the seam the monitor dispatches through;
//! [`TelegramNotifier`] is the Bot API implementation. Messages are sent
//! with Markdown formatting and retried once as plain text when the Bot
//! API rejects the markup, since AI-generated summaries routinely contain
//! characters Telegram's Markdown parser chokes on.

pub mod error;
pub mod message;
pub mod telegram;

pub use error::{NotifyError, NotifyResult};
pub use message::{briefing_message, video_summary_message};
pub use telegram::{Notifier, TelegramConfig, TelegramNotifier};
