//! Lipsync Core
//!
//! Core types and abstractions for the lip-sync studio client.
//!
//! This crate contains:
//! - Domain types: generation requests, submission results, status snapshots
//! - The status classifier that normalizes provider status strings
//! - DTOs: wire shapes exchanged with the studio backend

pub mod domain;
pub mod dto;
