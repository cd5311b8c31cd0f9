//! Multi-room chat relay server library.
//! This crate exposes internal modules for integration testing.
//! The binary entry point is in main.rs.

pub mod accounts;
pub mod archive;
pub mod config;
pub mod db;
pub mod hub;
pub mod rooms;
pub mod routes;
pub mod state;
pub mod ws;
