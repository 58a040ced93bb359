//! Mesh vetter primitives
//!
//! Vetters inspect a cluster and report their findings as [`Note`]s. This crate holds the note
//! record shared by every vetter and the protocol conventions a mesh applies to service port names.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod note;
pub mod protocol;

pub use self::{
    note::{Note, NoteLevel},
    protocol::{is_supported_port_name, Protocol},
};
