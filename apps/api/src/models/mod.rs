pub mod notification;
pub mod project;
