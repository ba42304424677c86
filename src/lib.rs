//! Image studio - ask about, edit, or enhance an image with Gemini
//!
//! Turns an uploaded image, an operation mode and an optional prompt into a
//! single Gemini `generateContent` call, and extracts a typed text or image
//! result from the response.

pub mod ai;
pub mod app;
pub mod codec;
pub mod error;
pub mod extract;
pub mod models;
pub mod prompts;
pub mod request;

pub use error::{Error, Result};
