//! Stages behind the two session events.
//!
//! ```text
//! upload:   input ──▶ extract        (path/URL → bytes → page texts)
//! question: answer                   (document text + question → reply)
//! ```
//!
//! 1. [`input`]   — read a local file or download a URL, check the `%PDF` signature
//! 2. [`extract`] — open the bytes with pdfium and pull each page's text;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`answer`]  — build the two-message request and make the single
//!    chat-completion call; the only stage with LLM network I/O

pub mod answer;
pub mod extract;
pub mod input;
