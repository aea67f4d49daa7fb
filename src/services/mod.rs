pub mod ai;
pub mod auth;
pub mod booking;
pub mod calendar;
pub mod email;
pub mod media;
pub mod notifications;
pub mod quote;
