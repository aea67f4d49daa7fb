pub mod admin;
pub mod auth;
pub mod booking;
pub mod chat;
pub mod content;
pub mod health;
pub mod media;
pub mod public;
pub mod theme;

use axum::extract::FromRequest;

use crate::errors::AppError;

/// `Json` extractor whose rejections use the application's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
