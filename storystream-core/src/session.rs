use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::PostCache;
use crate::clock::Clock;
use crate::importer::PostImporter;
use crate::loader::{load_posts, LoadOutcome, PostSource};
use crate::post::{Comment, Post};

/// The post list for one run of the app, plus the interactions that change it.
pub struct BlogSession {
    posts: Vec<Post>,
    source: PostSource,
    error: Option<String>,
    cache: PostCache,
    clock: Arc<dyn Clock>,
}

impl BlogSession {
    /// Runs the load cycle and keeps whatever it produced.
    pub async fn start<I: PostImporter>(
        importer: &I,
        cache: PostCache,
        clock: Arc<dyn Clock>,
        fallback: &[Post],
    ) -> Self {
        let outcome = load_posts(importer, &cache, clock.as_ref(), fallback).await;
        Self::from_outcome(outcome, cache, clock)
    }

    pub fn from_outcome(outcome: LoadOutcome, cache: PostCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts: outcome.posts,
            source: outcome.source,
            error: outcome.error,
            cache,
            clock,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn source(&self) -> PostSource {
        self.source
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Appends a comment to `post_id`. Returns false if no such post exists.
    pub fn add_comment(&mut self, post_id: &str, text: &str, author: &str) -> bool {
        let now = self.clock.now();
        self.update_post(post_id, |post| {
            post.with_comment(Comment::new(&post.id, author, text, now))
        })
    }

    /// Counts one `emoji` reaction on `post_id`. Returns false if no such post exists.
    pub fn add_reaction(&mut self, post_id: &str, emoji: &str) -> bool {
        self.update_post(post_id, |post| post.with_reaction(emoji))
    }

    fn update_post(&mut self, post_id: &str, update: impl Fn(&Post) -> Post) -> bool {
        if self.find(post_id).is_none() {
            debug!(post_id, "ignoring interaction on unknown post");
            return false;
        }
        self.posts = self
            .posts
            .iter()
            .map(|post| if post.id == post_id { update(post) } else { post.clone() })
            .collect();
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(e) = self
            .cache
            .write_preserving_timestamp(&self.posts, self.clock.now())
        {
            warn!(error = %e, "failed to persist posts after interaction");
        }
    }
}
