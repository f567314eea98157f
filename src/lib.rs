//! # docweave
//!
//! Turns a directory of structured markup sources into a navigable,
//! embeddable document set.
//!
//! An external documentation compiler (sphinx-build with its JSON builder)
//! does the markup parsing and emits one JSON artifact per page: title,
//! HTML body, table-of-contents fragment, and navigation links. docweave
//! consumes those artifacts and produces the final page models:
//!
//! - parses each body into a mutable HTML tree and runs a chain of
//!   pluggable [`Transformer`]s over it (Bootstrap markup normalization,
//!   image inlining)
//! - strips the synthetic outer list the compiler wraps around every
//!   table of contents
//! - rewrites every hyperlink and navigation link through a host-supplied
//!   [`LinkRewriter`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use docweave::{BootstrapTransformer, ImageEmbedTransformer, ProjectGenerator};
//!
//! let mut generator = ProjectGenerator::new("sphinx-build", "config/sphinx")?;
//! generator.add_transformer(Box::new(BootstrapTransformer::new()));
//! generator.add_transformer(Box::new(ImageEmbedTransformer::new()));
//!
//! let project = generator.generate("docs/")?;
//! for page in &project {
//!     println!("{} -> {}", page.path(), page.title());
//! }
//! # Ok::<(), docweave::Error>(())
//! ```
//!
//! ## Rewriting links
//!
//! Hosts map compiler-emitted hrefs onto their own routing scheme. The
//! rewriter receives the full page set and the current page with every
//! call:
//!
//! ```no_run
//! use docweave::{ProjectGenerator, RewriteContext};
//!
//! # let mut generator = ProjectGenerator::new("sphinx-build", "config")?;
//! generator.set_link_rewriter(Box::new(|href: &str, ctx: &RewriteContext<'_>| {
//!     match ctx.resolve(href) {
//!         Some(link) => format!("/docs/{}", link.path),
//!         None => href.to_string(),
//!     }
//! }));
//! # Ok::<(), docweave::Error>(())
//! ```

pub mod dom;
mod error;
mod generator;
pub mod model;
mod preprocess;
mod rewrite;
pub mod toc;
pub mod transform;
pub(crate) mod util;

pub use error::{Error, Result};
pub use generator::ProjectGenerator;
pub use model::{NavLink, Page, Project};
pub use preprocess::PreProcessor;
pub use rewrite::{LinkRewriter, ResolvedLink, RewriteContext};
pub use transform::{BootstrapTransformer, ImageEmbedTransformer, PathAware, Transformer};
