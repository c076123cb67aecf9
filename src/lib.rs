//! Signboard interpretation service: preprocess an uploaded signboard photo,
//! recognize its text with an external OCR engine, translate the result and
//! attach a keyword-based guidance string.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod guidance;
pub mod preprocessing;
pub mod recognition;
pub mod server;
pub mod translate;
