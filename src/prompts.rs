//! System prompt for answering questions about an uploaded PDF.
//!
//! The document text is embedded verbatim in the system message on every
//! question; there is no chunking or retrieval step. Callers can override the
//! instruction block via [`crate::config::ChatConfig::system_prompt`], but the
//! document text is always placed in front of it unchanged.

/// Reply the model is told to give when the answer is not in the document.
pub const NOT_FOUND_REPLY: &str = "I cannot find information about this in the provided PDF.";

/// Fixed instructions that follow the document text.
pub const DEFAULT_INSTRUCTIONS: &str = r#"Only answer questions based on the information provided in the PDF above.
If the answer cannot be found in the PDF content, respond with "I cannot find information about this in the provided PDF."
Be concise and accurate in your responses."#;

/// Build the system message for a question.
///
/// Layout: a one-line role statement, the full document text, then the
/// instruction block (`instructions` or [`DEFAULT_INSTRUCTIONS`]).
pub fn document_system_prompt(document_text: &str, instructions: Option<&str>) -> String {
    format!(
        "You are a helpful assistant that answers questions based only on the provided PDF content.\n\
Here's the content from the PDF:\n\
{}\n\n\
{}",
        document_text,
        instructions.unwrap_or(DEFAULT_INSTRUCTIONS)
    )
}
