//! Command composition for the wrapped tools.
//!
//! A [`CommandBuilder`] collects typed arguments (paths, options, effects,
//! tag edits) and composes them into a [`Command`]: a program plus an argument
//! vector serialized in the tool's fixed group order. Paths are always single
//! argv elements; nothing is ever interpolated into a shell string.
//!
//! # Example
//!
//! ```ignore
//! use soundsmith_core::command::{CommandBuilder, Tool};
//!
//! let mut metaflac = CommandBuilder::for_tool(Tool::Metaflac);
//! metaflac
//!     .input("/music/track.flac")
//!     .add_tag("artist", "Foo")
//!     .add_tag("artist", "Bar");
//!
//! let command = metaflac.compose()?;
//! assert_eq!(command.argv(), ["--set-tag=ARTIST=Foo", "--set-tag=ARTIST=Bar", "/music/track.flac"]);
//! ```

mod builder;
mod tool;
mod types;

pub use builder::CommandBuilder;
pub use tool::{Arity, OptionSpec, Tool};
pub use types::{ArgGroup, Command, TagOperation};
