//! Data Transfer Objects for the studio backend API
//!
//! DTOs mirror the JSON bodies of the backend routes. Conversions into domain
//! types live next to each DTO.

pub mod generation;
pub mod status;
