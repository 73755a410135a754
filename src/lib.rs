#![forbid(unsafe_code)]
//! Context-tree localization lookup for Rust.
//!
//! Loads `I18N` XML documents into a tree of [`Localizer`] nodes and resolves
//! language-neutral keys into localized strings. A lookup that misses on a
//! context falls back to the enclosing contexts and finally to the key itself,
//! so untranslated text always renders in the source language.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use localetree::{LoadOptions, Localizer};
//!
//! let root = Localizer::with_language("fr-CA");
//! root.load_file("ui.i18n.xml", LoadOptions::default())?;
//! root.load_file("ui.overrides.i18n.xml", LoadOptions::default())?;
//!
//! let dialog = root.context("dialogs.save");
//! println!("{}", dialog.localize("Save changes?"));
//! println!("{}", dialog.localize_format("{0} files selected", &[&3])?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Language fallback
//!
//! Each `Value` in a document carries a `lang` attribute. A node targeting
//! `fr-ca` stores the `fr-ca` value when present, otherwise the `fr` value,
//! otherwise nothing, in which case lookups continue up the context tree.
//!
//! # Sharing
//!
//! Every handle into a tree keeps the whole tree alive and is `Send + Sync`,
//! so a tree loaded at startup can be cloned into request threads.

pub mod document;
pub mod error;
pub mod escape;
pub mod format;
pub mod language;
pub mod loader;
pub mod localizer;
pub mod options;
pub mod traits;

// Re-export most used types for easy consumption
pub use crate::{
    document::{Document, Element},
    error::Error,
    format::FormatError,
    language::{LanguageMatch, TargetLanguage},
    localizer::Localizer,
    options::LoadOptions,
    traits::Parser,
};
