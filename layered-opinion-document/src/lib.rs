//! Document and span model for layered-opinion.
//!
//! This crate holds the annotated input a pipeline hands to the opinion
//! engine, and the spans that point back into it.
//!
//! ## Core Types
//!
//! - [`Document`] / [`Sentence`] - Parallel token, POS and lemma layers plus parse renderings
//! - [`TokenSpan`] - `[start, end)` token range inside one sentence, checked on construction
//! - [`SpanLink`] - Typed edge from an anchor to a target span
//!
//! ## Example
//!
//! ```
//! use layered_opinion_document::{Document, Sentence, TokenSpan};
//!
//! let sentence = Sentence::from_whitespace(
//!     "I love it",
//!     "PRP VBP PRP",
//!     "I love it",
//!     "(ROOT (S (NP (PRP I)) (VP (VBP love) (NP (PRP it)))))",
//!     "nsubj(love-2, I-1)\ndobj(love-2, it-3)",
//! )
//! .unwrap();
//! let doc = Document::new(vec![sentence]);
//!
//! let span = TokenSpan::new(&doc, 0, 1, 3).unwrap();
//! assert_eq!(span.text(), "love it");
//! assert!(TokenSpan::new(&doc, 0, 2, 4).is_err());
//! ```

mod document;
mod span;
mod span_link;

pub use document::{Document, DocumentError, Sentence};

pub use span::{OutOfRangeError, OutOfRangeReason, TokenSpan};

pub use span_link::{SpanLink, TokenSpanLink};
