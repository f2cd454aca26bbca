//! Data models for student service entities.
//!
//! This module contains the wire and domain types exchanged with the
//! student records API:
//!
//! - `Student`: roster record, also the subject of an authenticated session
//! - `AuthResponse`: token pair + student returned by the login endpoint
//! - `Message`, `SendMessageResponse`: messaging types

pub mod message;
pub mod student;

pub use message::{Message, SendMessageResponse};
pub use student::{AuthResponse, Student};
