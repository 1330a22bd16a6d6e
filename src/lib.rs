//! chatlens - chat screenshot analysis and reply suggestion service.
//!
//! Takes a screenshot of a conversation plus a short instruction, derives
//! the textual content of the image (either with a vision-capable model or
//! by delegating to an OCR service), and generates a suggested reply with a
//! second completion call. Exposed over HTTP and as one-shot CLI commands.

pub mod cli;
pub mod config;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod server;
