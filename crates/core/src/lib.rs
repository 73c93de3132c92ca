//! Domain types and ports shared by the trivia and drinks APIs.
//!
//! Nothing in here knows about HTTP or SQL: handlers live in the server
//! crate and talk to persistence through the traits in [`ports::store`].

pub mod domain;
pub mod infra;
pub mod ports;
