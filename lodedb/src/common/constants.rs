// path constants
pub const IN_MEMORY_PATH: &str = ":memory:";
pub const COLLECTIONS_DIR: &str = "collections";
pub const INDEXES_DIR: &str = "indexes";
pub const DOCUMENT_FILE_EXTENSION: &str = "json";
pub const INDEX_FILE_EXTENSION: &str = "idx";

// field path constants
pub const FIELD_SEPARATOR: char = '.';
