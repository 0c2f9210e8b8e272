//! In-memory caches
//!
//! Currently a single-document page cache keyed on the source file's
//! modification time.

mod page;

pub use page::{CachedDocument, PageCache};
