pub mod json_file;

pub use json_file::JsonFileWriter;

use crate::model::{HostingServiceRecord, StorageError};

/// Persists the records of a finished run. Called once, at the end.
pub trait ResultWriter {
    fn write(&self, records: &[HostingServiceRecord]) -> Result<(), StorageError>;
}
