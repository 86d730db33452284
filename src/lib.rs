//! bunko — two small console programs sharing one crate.
//!
//! - `bunko-chat`: an interactive chat client for OpenAI-compatible
//!   completion endpoints, with per-turn and running token totals.
//! - `bunko-library`: an in-memory library desk — books, members, loans,
//!   fines — behind a numbered text menu.
//!
//! Both are single-threaded console programs with no persistence; shared
//! concerns (config, logging, errors) live here in the library crate.

pub mod chat;
pub mod config;
pub mod error;
pub mod library;
pub mod llm;
pub mod logger;
