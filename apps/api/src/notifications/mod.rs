// Notifications: template rendering, the per-user inbox, deadline bridging
// and retention cleanup.

pub mod handlers;
pub mod service;
pub mod templates;
