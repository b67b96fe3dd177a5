//! Request handlers.

pub mod health;
pub mod monitor;
pub mod notifications;
pub mod settings;
pub mod subscriptions;
pub mod summaries;

pub use health::*;
pub use monitor::*;
pub use notifications::*;
pub use settings::*;
pub use subscriptions::*;
pub use summaries::*;
