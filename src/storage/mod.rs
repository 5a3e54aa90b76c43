mod temp_store;

pub use temp_store::{StoredUpload, TempFileStore};
