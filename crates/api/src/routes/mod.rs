//! API Route Handlers

pub mod home;
pub mod performance;
pub mod predictions;
