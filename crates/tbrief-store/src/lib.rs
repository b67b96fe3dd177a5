//! Persistence layer for the TubeBrief backend.
//!
//! This crate provides:
//! - Repository traits for subscriptions, the video cache, summaries,
//!   the notification ledger and user settings
//! - A JSON-file backend for single-node deployments
//! - A Supabase (PostgREST) backend for hosted deployments

pub mod error;
pub mod file;
pub mod repo;
pub mod supabase;

pub use error::{StoreError, StoreResult};
pub use repo::{
    NotificationLogRepository, SettingsRepository, Stores, SubscriptionRepository,
    SummaryRepository, VideoCacheRepository,
};
pub use supabase::{SupabaseClient, SupabaseConfig};
