//! Clockwork file helpers.
//!
//! Opens a working directory, lists its files recursively, reads and writes
//! them as text or JSON, and formats byte sizes for display. Independent of
//! the engine; the studio uses it for timer presets.
//!
//! ```rust,ignore
//! let dir = clockwork_fs::open_directory("presets")?;
//! for entry in &dir.files {
//!     println!("{} ({})", entry.path, clockwork_fs::format_size(entry.size));
//! }
//! ```

pub mod entry;
pub mod error;
pub mod size;

pub use entry::{
    create_file, files_in, open_directory, read_file, read_file_json, write_file, write_file_json,
    Directory, FileEntry,
};
pub use error::FsError;
pub use size::format_size;

pub type Result<T> = std::result::Result<T, FsError>;
