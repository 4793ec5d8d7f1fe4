//! Core domain types
//!
//! These types describe one generation attempt as the client sees it. They are
//! shared between the HTTP client (which produces them) and the session
//! controller (which owns them for the lifetime of a session).

pub mod generation;
pub mod presenter;
pub mod status;
