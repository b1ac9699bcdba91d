pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fallback;
pub mod importer;
pub mod loader;
pub mod post;
pub mod session;
pub mod storage;

pub use cache::{CacheEntry, PostCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{config_dir, BlogConfig, PLACEHOLDER_DOCUMENT_URL};
pub use error::{ImportError, StoreError};
pub use fallback::builtin_posts;
pub use importer::{DocumentImporter, PostImporter};
pub use loader::{load_posts, LoadOutcome, PostSource, LOAD_ERROR_MESSAGE};
pub use post::{Comment, Post, Reaction};
pub use session::BlogSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
