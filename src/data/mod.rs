//! Corpus storage and CSV I/O

mod types;

pub use types::Corpus;
