//! Account store: create and verify user identities.
//! A narrow collaborator surface — the relay core never touches it.

pub mod routes;
pub mod store;
