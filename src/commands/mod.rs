// ABOUTME: Command implementations for each syncdb subcommand
// ABOUTME: Exports dump, import, sync, and the inspection commands

pub mod dump;
pub mod import;
pub mod inspect;
pub mod sync;

pub use dump::dump;
pub use import::import;
pub use inspect::{staging_path, tables};
pub use sync::sync;
