//! Core business logic - framework-agnostic operations used by the HTTP layer.
//!
//! Every function takes a database connection and returns [`crate::errors::Result`];
//! none of them know about requests, headers or status codes.

pub mod cart;
pub mod catalog;
pub mod category;
pub mod dining_table;
pub mod menu;
pub mod order;
pub mod repository;
pub mod reservation;
pub mod seed;
pub mod user;
