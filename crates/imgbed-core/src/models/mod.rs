//! Domain models

pub mod source_file;

pub use source_file::{format_file_size, mime_type_for_name, SourceFile};
