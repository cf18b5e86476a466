#![forbid(unsafe_code)]

//! Post Aid terminal shell.
//!
//! A line-oriented front end over the `postaid` crates: residents grouped
//! by building with chosung search, a database table, the delivery route
//! editor, and the morning weather briefing.
//!
//! The binary wires configuration, the resident store and the network
//! collaborators into an [`app::AppModel`] and drives it with
//! [`postaid::Program`].

pub mod app;
pub mod cli;
pub mod config;
pub mod input;
pub mod view;
