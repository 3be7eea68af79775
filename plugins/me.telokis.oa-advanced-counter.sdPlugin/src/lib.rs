//! Advanced Counter plugin: a key/dial counter mirrored onto its title and an optional file.

pub mod action;
pub mod counter;
pub mod handler;
