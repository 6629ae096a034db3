//! Worker event tools.
//!
//! Each tool delivers one lifecycle or functional event to the worker.

pub mod events;
pub mod fetch;
pub mod lifecycle;

pub use events::{
    NotificationClickParams, SwPushParams, SwSyncParams, notification_click_impl, push_impl, sync_impl,
};
pub use fetch::{SwFetchParams, fetch_impl};
pub use lifecycle::{activate_impl, install_impl, status_impl};
