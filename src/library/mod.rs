//! Ingested books and their persistence.
//!
//! * [`BookRecord`] — a chunked text, its title and the reader's position.
//! * [`RecordStore`] — keyed storage trait.
//! * [`JsonBookStore`] — one JSON file per book under
//!   [`AppPaths::books_dir`](crate::config::AppPaths::books_dir).

pub mod book;
pub mod store;

pub use book::{next_book_id, BookRecord};
pub use store::{JsonBookStore, RecordStore, StoreError};
