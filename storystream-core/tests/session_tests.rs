use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use storystream_core::{
    BlogSession, CacheEntry, FixedClock, ImportError, MemoryStore, Post, PostCache, PostImporter,
    PostSource, Reaction,
};

struct CountingImporter {
    posts: Vec<Post>,
    calls: AtomicUsize,
}

impl PostImporter for CountingImporter {
    async fn import(&self) -> Result<Vec<Post>, ImportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.posts.clone())
    }
}

fn post(id: &str) -> Post {
    Post {
        id: id.into(),
        title: id.to_uppercase(),
        author: "Org".into(),
        date: "March 10, 2024".into(),
        excerpt: String::new(),
        content: "<p>body</p>".into(),
        featured_image: None,
        comments: Vec::new(),
        reactions: Vec::new(),
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

async fn session_with(posts: Vec<Post>) -> (BlogSession, PostCache, Arc<FixedClock>) {
    let store = Arc::new(MemoryStore::new());
    let cache = PostCache::new(store, "posts", Duration::hours(24));
    let clock = Arc::new(FixedClock::new(t0()));
    let importer = CountingImporter {
        posts,
        calls: AtomicUsize::new(0),
    };
    let session = BlogSession::start(&importer, cache.clone(), clock.clone(), &[]).await;
    (session, cache, clock)
}

#[tokio::test]
async fn repeated_reaction_increments_a_single_entry() {
    let (mut session, _, _) = session_with(vec![post("a")]).await;

    assert!(session.add_reaction("a", "👍"));
    assert!(session.add_reaction("a", "👍"));

    let a = session.find("a").unwrap();
    assert_eq!(
        a.reactions,
        vec![Reaction {
            emoji: "👍".into(),
            count: 2
        }]
    );
}

#[tokio::test]
async fn different_emojis_get_separate_entries() {
    let (mut session, _, _) = session_with(vec![post("a")]).await;

    session.add_reaction("a", "👍");
    session.add_reaction("a", "🎉");
    session.add_reaction("a", "👍");

    let a = session.find("a").unwrap();
    assert_eq!(a.reactions.len(), 2);
    assert_eq!(a.reactions[0].emoji, "👍");
    assert_eq!(a.reaction_count("👍"), 2);
    assert_eq!(a.reaction_count("🎉"), 1);
    assert_eq!(a.reaction_count("😢"), 0);
}

#[tokio::test]
async fn comments_append_to_the_target_post_only() {
    let (mut session, _, clock) = session_with(vec![post("a"), post("b")]).await;

    assert!(session.add_comment("a", "first", "Ana"));
    clock.advance(Duration::seconds(5));
    assert!(session.add_comment("a", "second", "Bia"));

    let a = session.find("a").unwrap();
    let texts: Vec<_> = a.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(a.comments[0].author, "Ana");
    assert_eq!(a.comments[0].id, format!("ca-{}", t0().timestamp_millis()));
    assert_eq!(a.comments[1].timestamp, t0() + Duration::seconds(5));
    assert!(session.find("b").unwrap().comments.is_empty());
}

#[tokio::test]
async fn unknown_post_is_ignored_and_not_persisted() {
    let (mut session, cache, clock) = session_with(vec![post("a")]).await;
    clock.advance(Duration::hours(1));
    let before = cache.read();

    assert!(!session.add_comment("missing", "text", "Ana"));
    assert!(!session.add_reaction("missing", "👍"));

    assert_eq!(session.posts(), &[post("a")]);
    assert_eq!(cache.read(), before);
}

#[tokio::test]
async fn interactions_persist_posts_but_keep_the_import_timestamp() {
    let (mut session, cache, clock) = session_with(vec![post("a")]).await;
    assert_eq!(session.source(), PostSource::Imported);
    assert_eq!(cache.read().unwrap().written_at, t0());

    clock.advance(Duration::hours(3));
    session.add_reaction("a", "❤️");
    session.add_comment("a", "hello", "Ana");

    let stored = cache.read().expect("cache present");
    assert_eq!(stored.written_at, t0());
    assert_eq!(stored.value, session.posts());
    assert_eq!(stored.value[0].reaction_count("❤️"), 1);
    assert_eq!(stored.value[0].comments.len(), 1);
}

#[tokio::test]
async fn interaction_after_fallback_load_stamps_now() {
    let store = Arc::new(MemoryStore::new());
    let cache = PostCache::new(store, "posts", Duration::hours(24));
    let clock = Arc::new(FixedClock::new(t0()));
    let importer = CountingImporter {
        posts: Vec::new(),
        calls: AtomicUsize::new(0),
    };
    let fallback = vec![post("builtin")];
    let mut session = BlogSession::start(&importer, cache.clone(), clock.clone(), &fallback).await;
    assert_eq!(session.source(), PostSource::Fallback);
    assert!(cache.read().is_none());

    clock.advance(Duration::minutes(10));
    session.add_reaction("builtin", "🎉");

    let stored = cache.read().expect("interaction persisted");
    assert_eq!(stored.written_at, t0() + Duration::minutes(10));
}

#[tokio::test]
async fn session_started_from_fresh_cache_keeps_cached_posts() {
    let store = Arc::new(MemoryStore::new());
    let cache = PostCache::new(store, "posts", Duration::hours(24));
    let written_at = t0() - Duration::hours(2);
    cache
        .write(&CacheEntry::new(vec![post("cached")], written_at))
        .unwrap();
    let clock = Arc::new(FixedClock::new(t0()));
    let importer = CountingImporter {
        posts: vec![post("imported")],
        calls: AtomicUsize::new(0),
    };

    let mut session = BlogSession::start(&importer, cache.clone(), clock, &[]).await;

    assert_eq!(importer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(session.source(), PostSource::FreshCache);
    assert_eq!(session.error(), None);
    session.add_comment("cached", "hi", "Ana");
    assert_eq!(cache.read().unwrap().written_at, written_at);
}
