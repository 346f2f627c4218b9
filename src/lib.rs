//! # Uttar
//!
//! Client-side state sync for the Uttar Q&A platform: question likes,
//! comment likes and bookmarks that update instantly and reconcile with the
//! server afterwards.
//!
//! ## Architecture
//!
//! ```text
//! toggle → Mutator → Coordinator → API → Reconcile → Registry
//! ```
//!
//! - [`sync`]: registry, optimistic mutator, reconciliation, request coordinator
//! - [`api`]: typed toggle endpoints over reqwest
//! - [`app`]: session context, route guard, error types
//! - [`store`]: session persistence
//!
//! ## Quick Start
//!
//! ```bash
//! # Store a token issued by the web login
//! uttar login --token "$TOKEN" --username asha
//!
//! # Like question 42 (currently 5 likes), clicking three times fast
//! uttar toggle question-like 42 --count 5 --clicks 3
//!
//! # Where would /admin/tags lead?
//! uttar open /admin/tags
//! ```

/// Toggle endpoint boundary.
///
/// - [`ToggleApi`](api::ToggleApi): async trait the coordinator sends through
/// - [`HttpToggleApi`](api::HttpToggleApi): reqwest-based implementation
/// - [`ToggleResponse`](api::ToggleResponse): response schema, validated on arrival
pub mod api;

/// Application context, session lifecycle, route guard and error handling.
pub mod app;

/// Command-line interface using clap.
///
/// - `login`, `logout`, `whoami` - session management
/// - `open <route>` - check the route guard
/// - `toggle <kind> <id>` - like or bookmark through the sync engine
pub mod cli;

/// Configuration loaded from `~/.config/uttar/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`ToggleTarget`](domain::ToggleTarget): perceived like/bookmark state
/// - [`Session`](domain::Session) and [`Role`](domain::Role)
pub mod domain;

/// Session persistence.
///
/// - [`SessionStore`](store::SessionStore): storage trait
/// - [`FileSessionStore`](store::FileSessionStore): JSON file under the data dir
pub mod store;

/// Optimistic toggle synchronization.
pub mod sync;
