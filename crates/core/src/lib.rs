pub mod clone;
pub mod css;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod output;
pub mod resource;

pub use clone::{CloneOptions, Cloner};
pub use error::{CloneError, CloneResult};
pub use output::ClonedNode;

/// Parse an HTML string and clone its document element with the default
/// collaborators. This is the quickest way to a static replica.
pub async fn snapshot_html(html: &str, options: &CloneOptions) -> CloneResult<ClonedNode> {
    let root = dom::parse_html(html);
    Cloner::default().clone_root(&root, options).await
}
