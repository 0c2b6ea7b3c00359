//! Scheduled-upload operations: reads in `read`, status/field writes in `write`.

mod read;
mod write;

pub use write::INTERRUPTED_MESSAGE;
