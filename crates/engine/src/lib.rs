//! Formcraft Engine library.
//!
//! This crate contains all server-side code for Formcraft.
//!
//! ## Structure
//!
//! - `repositories/` - Saved-form access over the key-value port
//! - `use_cases/` - Form builder and fill-in sessions
//! - `stores/` - In-memory runtime state (open builder drafts)
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod repositories;
pub mod stores;
pub mod use_cases;

pub use app::App;
