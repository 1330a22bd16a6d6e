//! Delegated OCR integration.
//!
//! Text recognition is not performed in-process. The pipeline posts the
//! uploaded image to an external OCR microservice and reads the recognized
//! text out of its JSON reply. The [`OcrProvider`] trait is the seam tests
//! use to substitute scripted services.

mod client;

pub use client::{OcrClient, OcrConfig, OcrError, OcrProvider};
