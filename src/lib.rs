//! Bidirectional reflow of structured content across fixed-size pages.
//!
//! Content lives in a [Tree] of containers, leaves and text runs; each page is a
//! container whose subtree is the part of the document shown on that page. When a
//! page overflows, [reflow::Reflower::reflow_forward] moves its trailing content onto
//! the next page, and when a page has room, [reflow::Reflower::reflow_backward] pulls
//! content back. Measurement is up to the host, which answers yes/no questions about
//! the pages through oracles (or a [PageMeasure] for a whole [Document]).

mod document;
pub use document::*;

mod error;
pub use error::*;

mod lineage;
pub use lineage::{ensure_tag, find_continuation, LineageTag};

mod options;
pub use options::*;

/// Forward and backward reflow between adjacent pages, and the scheduling around it
pub mod reflow;

mod tree;
pub use tree::*;
