use crate::importer::excerpt;
use crate::post::Post;

const WELCOME_CONTENT: &str = "<p>Welcome! Posts are imported from a published document.</p>\
<p>Set <code>document_url</code> in the configuration file to the published address of your document. \
Every top-level heading in the document becomes a post, and everything under it becomes the post body.</p>";

/// Built-in posts shown when nothing else can be loaded.
pub fn builtin_posts(author: &str, date: &str, excerpt_length: usize) -> Vec<Post> {
    vec![Post {
        id: "builtin-welcome".to_owned(),
        title: "Welcome to StoryStream".to_owned(),
        author: author.to_owned(),
        date: date.to_owned(),
        excerpt: excerpt(WELCOME_CONTENT, excerpt_length),
        content: WELCOME_CONTENT.to_owned(),
        featured_image: None,
        comments: Vec::new(),
        reactions: Vec::new(),
    }]
}
