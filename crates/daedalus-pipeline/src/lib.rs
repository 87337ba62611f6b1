//! # Daedalus Pipeline
//!
//! Pipeline assembly and execution for the Daedalus framework.
//!
//! For each declared operation the [`Pipeline`] compiles the optional
//! feature objects from the operation's descriptor into one ordered step
//! chain and executes it as a single router handler:
//!
//! ```text
//! additional steps → attach_documents → response_check → request_validation
//!     → coercion → defaults → consumes middleware → security → handler
//! ```
//!
//! Steps run strictly sequentially. Any step may short-circuit by raising a
//! terminal failure or writing a response; nothing after the failing step
//! runs, including the terminal handler.
//!
//! ## Ordering note
//!
//! Coercion deliberately runs AFTER request validation, and the coerced
//! result is not re-validated. This mirrors the bound contract exactly; see
//! the repository design notes before "fixing" it.

#![doc(html_root_url = "https://docs.rs/daedalus-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;
pub mod stages;

// Re-export main types at crate root
pub use pipeline::{ConsumesRegistry, Pipeline};
