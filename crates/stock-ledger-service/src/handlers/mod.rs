//! HTTP request handlers.

pub mod events;
pub mod health;
pub mod movements;
pub mod purge;
pub mod rebuild;
pub mod reservations;
pub mod sales;
