use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, PostCache};
use crate::clock::Clock;
use crate::error::ImportError;
use crate::importer::PostImporter;
use crate::post::Post;

pub const LOAD_ERROR_MESSAGE: &str =
    "Could not load posts. Please check the document URL or try again later.";

/// Where the session's post list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSource {
    FreshCache,
    Imported,
    StaleCache,
    Fallback,
}

/// Steps tried in order by [`load_posts`] before the fallback list.
/// The first one that yields posts wins.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    FreshCache,
    Import,
    StaleCache,
}

const STRATEGIES: [Strategy; 3] = [Strategy::FreshCache, Strategy::Import, Strategy::StaleCache];

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub posts: Vec<Post>,
    pub source: PostSource,
    /// User-facing message, set only when the import failed and nothing cached could stand in.
    pub error: Option<String>,
    /// Whether the outcome was written to the cache.
    pub persisted: bool,
}

/// Runs one load cycle: fresh cache, then import, then stale cache, then the fallback list.
pub async fn load_posts<I: PostImporter>(
    importer: &I,
    cache: &PostCache,
    clock: &dyn Clock,
    fallback: &[Post],
) -> LoadOutcome {
    let cached = cache.read();
    let mut import_error: Option<ImportError> = None;

    for strategy in STRATEGIES {
        match strategy {
            Strategy::FreshCache => {
                let Some(entry) = &cached else { continue };
                let now = clock.now();
                if entry.value.is_empty() || !entry.is_fresh(now, cache.staleness_window()) {
                    info!(
                        age_minutes = entry.age(now).num_minutes(),
                        posts = entry.value.len(),
                        "cached posts are stale or empty"
                    );
                    continue;
                }
                debug!(posts = entry.value.len(), "using fresh cached posts");
                return LoadOutcome {
                    posts: entry.value.clone(),
                    source: PostSource::FreshCache,
                    error: None,
                    persisted: false,
                };
            }
            Strategy::Import => match importer.import().await {
                Ok(posts) if !posts.is_empty() => {
                    let entry = CacheEntry::new(posts, clock.now());
                    let persisted = cache.write(&entry).is_ok();
                    return LoadOutcome {
                        posts: entry.value,
                        source: PostSource::Imported,
                        error: None,
                        persisted,
                    };
                }
                // An empty import never overwrites the cache.
                Ok(_) => warn!("import returned no posts"),
                Err(e) => {
                    warn!(error = %e, "failed to import posts");
                    import_error = Some(e);
                }
            },
            Strategy::StaleCache => {
                // Age no longer matters once the import has come up empty.
                let Some(entry) = &cached else { continue };
                if entry.value.is_empty() {
                    continue;
                }
                info!(posts = entry.value.len(), "falling back to stale cached posts");
                return LoadOutcome {
                    posts: entry.value.clone(),
                    source: PostSource::StaleCache,
                    error: None,
                    persisted: false,
                };
            }
        }
    }

    // A failed import is only surfaced when nothing cached could stand in.
    info!(posts = fallback.len(), "falling back to built-in posts");
    LoadOutcome {
        posts: fallback.to_vec(),
        source: PostSource::Fallback,
        error: import_error.map(|_| LOAD_ERROR_MESSAGE.to_owned()),
        persisted: false,
    }
}
