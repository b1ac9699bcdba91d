mod app;

use std::sync::Arc;

use eframe::{egui, NativeOptions};
use reqwest::{redirect, ClientBuilder};
use storystream_core::importer::format_long_date;
use storystream_core::{
    builtin_posts, config_dir, BlogConfig, BlogSession, Clock, DocumentImporter, FileStore,
    PostCache, SystemClock,
};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::BlogApp;

fn main() -> eframe::Result<()> {
    init_tracing();

    let runtime = Runtime::new().expect("failed to initialise Tokio runtime");
    let config = load_config();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(5))
        .user_agent("StoryStream/0.1")
        .timeout(config.request_timeout())
        .build()
        .expect("failed to build HTTP client");

    let fallback = builtin_posts(
        &config.author_name,
        &format_long_date(clock.now()),
        config.excerpt_length,
    );
    let store = Arc::new(FileStore::new(config_dir()));
    let cache = PostCache::new(store, config.storage_key.clone(), config.staleness_window());
    let importer = DocumentImporter::new(client, config, clock.clone(), fallback.clone());

    // One load cycle in the background; the window shows a loading state until it lands.
    let (session_tx, session_rx) = mpsc::channel(1);
    runtime.spawn(async move {
        let session = BlogSession::start(&importer, cache, clock, &fallback).await;
        info!(posts = session.posts().len(), source = ?session.source(), "posts loaded");
        let _ = session_tx.send(session).await;
    });

    eframe::run_native(
        "StoryStream",
        NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([820.0, 860.0])
                .with_min_inner_size([560.0, 480.0]),
            ..Default::default()
        },
        Box::new(move |cc| {
            install_emoji_friendly_fonts(&cc.egui_ctx);
            Box::new(BlogApp::new(session_rx))
        }),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config() -> BlogConfig {
    let path = config_dir().join("config.json");
    if path.exists() {
        BlogConfig::from_file(&path)
    } else {
        info!(path = %path.display(), "no config file, using defaults");
        BlogConfig::default()
    }
}

/// Appends system emoji/symbol fonts as fallbacks so reaction buttons render.
fn install_emoji_friendly_fonts(ctx: &egui::Context) {
    const CANDIDATES: [&str; 4] = [
        "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
        "/usr/share/fonts/truetype/noto/NotoEmoji-Regular.ttf",
        "/usr/share/fonts/opentype/noto/NotoSansSymbols2-Regular.otf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    ];

    let mut fonts = egui::FontDefinitions::default();
    let mut added = 0usize;
    for path in CANDIDATES {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        let name = format!("fallback-{added}");
        fonts
            .font_data
            .insert(name.clone(), egui::FontData::from_owned(bytes));
        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push(name.clone());
        }
        added += 1;
    }

    if added > 0 {
        ctx.set_fonts(fonts);
    }
}
