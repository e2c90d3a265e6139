// # Built-in Sources
//
// Sources that ship with the core library.

pub mod file;

pub use file::{FileSource, FileSourceFactory};
