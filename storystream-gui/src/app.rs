use std::collections::HashMap;

use chrono::Local;
use egui::{Color32, RichText};
use storystream_core::{BlogSession, Comment, Post};
use tokio::sync::mpsc;

const EMOJI_OPTIONS: [&str; 6] = ["👍", "❤️", "😂", "😮", "😢", "🎉"];

const ACCENT: Color32 = Color32::from_rgb(126, 34, 206);
const MUTED: Color32 = Color32::from_rgb(100, 116, 139);
const ERROR: Color32 = Color32::from_rgb(220, 38, 38);

// Wrap width, in characters, for post bodies rendered as text.
const CONTENT_WIDTH: usize = 90;

/// Per-card UI state: expansion and the comment form.
#[derive(Debug, Default)]
struct CardState {
    expanded: bool,
    author: String,
    text: String,
    form_error: Option<String>,
    rendered: Option<String>,
}

enum Action {
    React { post_id: String, emoji: &'static str },
    Comment { post_id: String, text: String, author: String },
}

pub struct BlogApp {
    /// `None` until the background load delivers the session.
    session: Option<BlogSession>,
    pending: mpsc::Receiver<BlogSession>,
    cards: HashMap<String, CardState>,
}

impl BlogApp {
    pub fn new(pending: mpsc::Receiver<BlogSession>) -> Self {
        Self {
            session: None,
            pending,
            cards: HashMap::new(),
        }
    }

    fn refresh_session(&mut self) {
        if self.session.is_none() {
            if let Ok(session) = self.pending.try_recv() {
                self.session = Some(session);
            }
        }
    }

    fn draw_navbar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("navbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("StoryStream").strong().size(22.0).color(ACCENT));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label("Contact");
                    ui.label("About");
                    ui.label("Home");
                });
            });
        });
    }

    fn draw_footer(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let year = Local::now().format("%Y");
                ui.small(format!("© {year} StoryStream. All rights reserved."));
            });
        });
    }

    fn draw_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("Comitê Respeita Nóis")
                    .size(30.0)
                    .strong(),
            );
            ui.label(
                RichText::new(
                    "A space to welcome and listen to colleagues who faced disrespect \
                     or discomfort at work.",
                )
                .color(MUTED),
            );
        });
        ui.add_space(12.0);
    }

    fn draw_loading(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.spinner();
            ui.label(RichText::new("Loading posts...").color(MUTED));
        });
    }

    fn draw_error(&self, ui: &mut egui::Ui, session: &BlogSession) {
        if let Some(error) = session.error() {
            egui::Frame::group(ui.style())
                .fill(Color32::from_rgb(254, 226, 226))
                .show(ui, |ui| {
                    ui.colored_label(ERROR, RichText::new("Error Loading Content:").strong());
                    ui.colored_label(ERROR, error);
                });
            ui.add_space(8.0);
        }
    }

    fn draw_posts(&mut self, ui: &mut egui::Ui) -> Vec<Action> {
        let mut actions = Vec::new();
        let Some(session) = &self.session else {
            self.draw_loading(ui);
            return actions;
        };
        self.draw_error(ui, session);

        if session.posts().is_empty() {
            if session.error().is_none() {
                ui.label(
                    RichText::new(
                        "No blog posts available at the moment. If you've configured a document URL, \
                         make sure it is published and uses top-level headings for posts.",
                    )
                    .color(MUTED),
                );
            }
            return actions;
        }

        for post in session.posts() {
            let card = self.cards.entry(post.id.clone()).or_default();
            egui::Frame::group(ui.style())
                .rounding(8.0)
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    draw_card(ui, post, card, &mut actions);
                });
            ui.add_space(10.0);
        }
        actions
    }

    fn apply(&mut self, action: Action) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match action {
            Action::React { post_id, emoji } => {
                session.add_reaction(&post_id, emoji);
            }
            Action::Comment {
                post_id,
                text,
                author,
            } => {
                session.add_comment(&post_id, &text, &author);
            }
        }
    }
}

fn draw_card(ui: &mut egui::Ui, post: &Post, card: &mut CardState, actions: &mut Vec<Action>) {
    ui.label(RichText::new(&post.title).size(22.0).strong().color(ACCENT));
    ui.label(RichText::new(format!("By {} | {}", post.author, post.date)).small().color(MUTED));
    if let Some(image) = &post.featured_image {
        ui.hyperlink_to("Featured image", image);
    }
    ui.add_space(4.0);
    ui.label(&post.excerpt);
    ui.add_space(6.0);

    if !card.expanded {
        if ui.link("Read More ›").clicked() {
            card.expanded = true;
        }
        return;
    }

    let rendered = card
        .rendered
        .get_or_insert_with(|| html2text::from_read(post.content.as_bytes(), CONTENT_WIDTH));
    ui.separator();
    ui.label(rendered.as_str());
    ui.add_space(8.0);

    ui.horizontal_wrapped(|ui| {
        ui.label(RichText::new("React:").color(MUTED));
        for emoji in EMOJI_OPTIONS {
            let count = post.reaction_count(emoji);
            let label = if count > 0 {
                format!("{emoji} {count}")
            } else {
                emoji.to_owned()
            };
            if ui.button(label).on_hover_text(format!("React with {emoji}")).clicked() {
                actions.push(Action::React {
                    post_id: post.id.clone(),
                    emoji,
                });
            }
        }
    });

    ui.separator();
    draw_comments(ui, &post.comments);
    draw_comment_form(ui, post, card, actions);

    ui.add_space(6.0);
    if ui.link("Show Less ˄").clicked() {
        card.expanded = false;
    }
}

fn draw_comments(ui: &mut egui::Ui, comments: &[Comment]) {
    if comments.is_empty() {
        ui.label(RichText::new("No comments yet. Be the first to comment!").italics().color(MUTED));
        return;
    }
    ui.label(RichText::new(format!("Comments ({})", comments.len())).strong());
    for comment in comments {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(&comment.author).strong().color(ACCENT));
                let when = comment.timestamp.with_timezone(&Local).format("%x %X");
                ui.label(RichText::new(when.to_string()).small().color(MUTED));
            });
            ui.label(&comment.text);
        });
    }
}

fn draw_comment_form(ui: &mut egui::Ui, post: &Post, card: &mut CardState, actions: &mut Vec<Action>) {
    ui.add_space(8.0);
    ui.label(RichText::new("Leave a Comment").strong());
    if let Some(error) = &card.form_error {
        ui.colored_label(ERROR, error);
    }
    ui.add(egui::TextEdit::singleline(&mut card.author).hint_text("Enter your name"));
    ui.add(
        egui::TextEdit::multiline(&mut card.text)
            .desired_rows(4)
            .hint_text("Write your comment here..."),
    );
    if ui.button("Post Comment").clicked() {
        if card.text.trim().is_empty() || card.author.trim().is_empty() {
            card.form_error = Some("Both name and comment text are required.".to_owned());
        } else {
            card.form_error = None;
            actions.push(Action::Comment {
                post_id: post.id.clone(),
                text: std::mem::take(&mut card.text),
                author: card.author.clone(),
            });
        }
    }
}

impl eframe::App for BlogApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_session();
        if self.session.is_none() {
            // Keep polling until the load finishes.
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.draw_navbar(ctx);
        self.draw_footer(ctx);

        let actions = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_header(ui);
                        self.draw_posts(ui)
                    })
                    .inner
            })
            .inner;

        for action in actions {
            self.apply(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use storystream_core::{
        builtin_posts, FixedClock, LoadOutcome, MemoryStore, PostCache, PostSource,
    };

    use super::*;

    fn session() -> BlogSession {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()));
        let cache = PostCache::new(Arc::new(MemoryStore::new()), "posts", chrono::Duration::hours(24));
        let outcome = LoadOutcome {
            posts: builtin_posts("Org", "March 10, 2024", 150),
            source: PostSource::Fallback,
            error: None,
            persisted: false,
        };
        BlogSession::from_outcome(outcome, cache, clock)
    }

    #[test]
    fn app_stays_loading_until_session_arrives() {
        let (tx, rx) = mpsc::channel(1);
        let mut app = BlogApp::new(rx);

        app.refresh_session();
        assert!(app.session.is_none());
        // Interactions while loading are dropped.
        app.apply(Action::React {
            post_id: "builtin-welcome".to_owned(),
            emoji: "👍",
        });

        tx.try_send(session()).unwrap();
        app.refresh_session();
        let loaded = app.session.as_ref().unwrap();
        assert_eq!(loaded.posts()[0].id, "builtin-welcome");
        assert_eq!(loaded.posts()[0].reaction_count("👍"), 0);

        app.apply(Action::React {
            post_id: "builtin-welcome".to_owned(),
            emoji: "👍",
        });
        assert_eq!(app.session.as_ref().unwrap().posts()[0].reaction_count("👍"), 1);
    }
}
