#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::cast_possible_truncation)]

pub mod args;
pub mod auth;
pub mod channel;
pub mod conversations;
pub mod diff;
pub mod directory;
pub mod errors;
pub mod render;
pub mod settings;
pub mod snapshot;
pub mod sync;
pub mod terminal;
pub mod timestamp;
pub mod webhook;
