//! Independent re-parsing of audio files.
//!
//! The verifier trusts a [`MetadataReader`], never the exit code of the tool
//! that wrote the file.

mod reader;
mod traits;

pub use reader::ToolMetadataReader;
pub use traits::MetadataReader;
