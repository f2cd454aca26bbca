//! Core library for CampusDesk, a terminal admin panel for the student
//! records API.
//!
//! This crate holds everything that is independent of the terminal UI:
//!
//! - `auth`: session manager, persisted session store, credential store
//! - `api`: REST client for the student service gateway
//! - `models`: wire and domain types
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
