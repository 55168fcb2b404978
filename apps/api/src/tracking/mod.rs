// Time tracking: project progress, deadline alerts and the overdue sweep.

pub mod handlers;
pub mod progress;
pub mod service;
