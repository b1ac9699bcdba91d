use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::clock::Clock;
use crate::config::BlogConfig;
use crate::error::ImportError;
use crate::post::Post;

const HEADING_TAG: &str = "h1";
const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// The parts of a markup element the sectioning walk needs.
pub trait MarkupNode: Sized {
    fn tag_name(&self) -> &str;
    fn text_content(&self) -> String;
    fn outer_html(&self) -> String;
    fn child_elements(&self) -> Vec<Self>;
}

impl<'a> MarkupNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn outer_html(&self) -> String {
        self.html()
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }
}

/// A heading and the markup that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position among all headings of the document, skipped ones included.
    pub ordinal: usize,
    pub heading: String,
    pub content: String,
}

/// Splits a tree into one section per heading, in document order.
///
/// A section's content is the outer markup of every sibling after the heading,
/// up to the next heading sibling or the end of the parent.
pub fn split_sections<N: MarkupNode>(root: &N) -> Vec<Section> {
    let mut sections = Vec::new();
    collect_sections(root, &mut sections);
    sections
}

fn collect_sections<N: MarkupNode>(node: &N, out: &mut Vec<Section>) {
    let children = node.child_elements();
    for (i, child) in children.iter().enumerate() {
        if is_heading(child) {
            let content = children[i + 1..]
                .iter()
                .take_while(|sibling| !is_heading(*sibling))
                .map(|sibling| sibling.outer_html())
                .collect::<String>();
            out.push(Section {
                ordinal: out.len(),
                heading: child.text_content(),
                content,
            });
        } else {
            collect_sections(child, out);
        }
    }
}

fn is_heading<N: MarkupNode>(node: &N) -> bool {
    node.tag_name().eq_ignore_ascii_case(HEADING_TAG)
}

/// Lower-cased title with whitespace runs replaced by `-`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Plain text of `content`, cut to `limit` characters with a trailing `...`.
pub fn excerpt(content: &str, limit: usize) -> String {
    let fragment = Html::parse_fragment(content);
    let text: String = fragment.root_element().text().collect();
    if text.chars().count() > limit {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        text
    }
}

/// e.g. `October 26, 2023`, in the local time zone.
pub fn format_long_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%B %-d, %Y").to_string()
}

/// Fields shared by every post produced from one import.
#[derive(Debug, Clone, Copy)]
pub struct PostMeta<'a> {
    pub author: &'a str,
    pub date: &'a str,
    pub excerpt_length: usize,
}

impl PostMeta<'_> {
    fn post(&self, id: String, title: String, content: String) -> Post {
        Post {
            id,
            title,
            author: self.author.to_owned(),
            date: self.date.to_owned(),
            excerpt: excerpt(&content, self.excerpt_length),
            content,
            featured_image: None,
            comments: Vec::new(),
            reactions: Vec::new(),
        }
    }
}

fn selector(css: &str) -> Result<Selector, ImportError> {
    Selector::parse(css).map_err(|e| ImportError::Parse(format!("selector {css}: {e:?}")))
}

/// Turns a rendered document into posts, one per top-level heading.
///
/// A document without any heading but with a non-empty body becomes a single post.
pub fn posts_from_html(html: &str, meta: &PostMeta<'_>) -> Result<Vec<Post>, ImportError> {
    let document = Html::parse_document(html);
    let sections = split_sections(&document.root_element());

    let mut posts = Vec::with_capacity(sections.len());
    for section in &sections {
        let heading = section.heading.trim();
        // Checked before the placeholder title, so a blank heading with content is kept.
        if heading.is_empty() && section.content.trim().is_empty() {
            debug!(ordinal = section.ordinal, "skipping empty section");
            continue;
        }
        let title = if heading.is_empty() {
            format!("Post {}", section.ordinal + 1)
        } else {
            heading.to_owned()
        };
        // The ordinal keeps ids of repeated titles apart.
        let id = format!("gdoc-post-{}-{}", slugify(&title), section.ordinal);
        posts.push(meta.post(id, title, section.content.clone()));
    }

    // Headings that were all skipped still count as headings; only a heading-free
    // document falls back to the whole body.
    if sections.is_empty() {
        let body_selector = selector("body")?;
        let body_html = document
            .select(&body_selector)
            .next()
            .map(|body| body.inner_html())
            .unwrap_or_default();
        if !body_html.trim().is_empty() {
            warn!("no headings found in document, importing the whole body as one post");
            let title_selector = selector("title")?;
            let title = document
                .select(&title_selector)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_owned())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_DOCUMENT.to_owned());
            let id = format!("gdoc-post-single-{}", slugify(&title));
            posts.push(meta.post(id, title, body_html));
        }
    }

    Ok(posts)
}

/// Source of a fresh post list.
pub trait PostImporter {
    fn import(&self) -> impl Future<Output = Result<Vec<Post>, ImportError>>;
}

pub struct DocumentImporter {
    client: Client,
    config: BlogConfig,
    clock: Arc<dyn Clock>,
    fallback: Vec<Post>,
}

impl DocumentImporter {
    pub fn new(client: Client, config: BlogConfig, clock: Arc<dyn Clock>, fallback: Vec<Post>) -> Self {
        Self {
            client,
            config,
            clock,
            fallback,
        }
    }

    /// Fetches the configured document once and splits it into posts.
    ///
    /// Without a configured URL this returns the fallback list and makes no request.
    pub async fn import_posts(&self) -> Result<Vec<Post>, ImportError> {
        let Some(raw_url) = self.config.import_url() else {
            info!("document url not configured, using built-in posts");
            return Ok(self.fallback.clone());
        };
        let url = Url::parse(raw_url).map_err(|source| ImportError::InvalidUrl {
            url: raw_url.to_owned(),
            source,
        })?;

        info!(url = %url, "fetching document");
        let response = self
            .client
            .get(url.clone())
            .timeout(self.config.request_timeout())
            .send()
            .await?;
        let status = response.status();
        debug!(url = %url, status = %status, "document response");
        if !status.is_success() {
            return Err(ImportError::Retrieval {
                status: status.as_u16(),
            });
        }
        let html = response.text().await?;

        let date = format_long_date(self.clock.now());
        let meta = PostMeta {
            author: &self.config.author_name,
            date: &date,
            excerpt_length: self.config.excerpt_length,
        };
        let posts = posts_from_html(&html, &meta)?;
        info!(url = %url, posts = posts.len(), "imported posts from document");
        Ok(posts)
    }
}

impl PostImporter for DocumentImporter {
    async fn import(&self) -> Result<Vec<Post>, ImportError> {
        self.import_posts().await
    }
}
