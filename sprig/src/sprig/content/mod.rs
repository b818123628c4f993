pub mod frontmatter;
pub mod markdown;
pub mod page;
pub mod walker;

pub use frontmatter::FrontMatter;
pub use markdown::render_markdown;
pub use walker::{ContentWalker, WalkOutcome, WalkPolicy};
