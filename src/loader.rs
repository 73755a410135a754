//! Populates a [`Localizer`] tree from an `I18N` [`Document`].
//!
//! ```xml
//! <I18N>
//!   <Entry>
//!     <Key>neutral text</Key>
//!     <Value lang="en-us">English value</Value>
//!     <Value lang="es">Spanish value</Value>
//!   </Entry>
//!   <Context id="menu.file">
//!     <Entry>...</Entry>
//!   </Context>
//! </I18N>
//! ```
//!
//! Loading stops at the first structural problem. Entries written before the
//! failure stay in the tree.

use tracing::{debug, trace};

use crate::{
    document::{Document, Element},
    error::Error,
    escape,
    language::{LanguageMatch, TargetLanguage},
    localizer::Localizer,
};

pub const ROOT_TAG: &str = "I18N";
pub const ENTRY_TAG: &str = "Entry";
pub const CONTEXT_TAG: &str = "Context";
pub const KEY_TAG: &str = "Key";
pub const VALUE_TAG: &str = "Value";
pub const LANG_ATTR: &str = "lang";
pub const ID_ATTR: &str = "id";

#[derive(Debug, Default)]
struct LoadStats {
    entries: usize,
    skipped: usize,
    contexts: usize,
}

/// Loads `document` into `node`. Without `merge` the node is cleared first.
pub fn load_document(node: &Localizer, document: &Document, merge: bool) -> Result<(), Error> {
    let language = node.target_language();
    if !language.is_set() {
        return Err(Error::configuration_error(
            "target language must be set before loading a document",
        ));
    }

    let root = &document.root;
    if root.name != ROOT_TAG {
        return Err(Error::parse_error(
            root.line,
            format!("expected <{}> root element, found <{}>", ROOT_TAG, root.name),
        ));
    }

    if !merge {
        debug!(
            contexts = node.context_ids().len(),
            entries = node.len(),
            "clearing localizer before load"
        );
        node.clear();
    }

    let mut stats = LoadStats::default();
    load_elements(node, root, &mut stats)?;

    debug!(
        language = %language,
        merge,
        entries = stats.entries,
        skipped = stats.skipped,
        contexts = stats.contexts,
        "loaded I18N document"
    );
    Ok(())
}

fn load_elements(node: &Localizer, element: &Element, stats: &mut LoadStats) -> Result<(), Error> {
    let language = node.target_language();
    if !language.is_set() {
        return Err(Error::configuration_error(format!(
            "context at line {} has no target language",
            element.line
        )));
    }

    for child in &element.children {
        match child.name.as_str() {
            ENTRY_TAG => {
                if load_entry(node, child, &language)? {
                    stats.entries += 1;
                } else {
                    stats.skipped += 1;
                }
            }
            CONTEXT_TAG => {
                load_context(node, child, stats)?;
                stats.contexts += 1;
            }
            other => {
                return Err(Error::parse_error(
                    child.line,
                    format!(
                        "unexpected <{}> element, expected <{}> or <{}>",
                        other, ENTRY_TAG, CONTEXT_TAG
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Returns `false` when no `Value` matched the target language and nothing
/// was written.
fn load_entry(node: &Localizer, entry: &Element, language: &TargetLanguage) -> Result<bool, Error> {
    let mut key: Option<String> = None;
    let mut full: Option<String> = None;
    let mut primary: Option<String> = None;

    for child in &entry.children {
        match child.name.as_str() {
            KEY_TAG => {
                if key.is_some() {
                    return Err(Error::parse_error(child.line, "too many Key elements"));
                }
                key = Some(escape::decode(&child.text).into_owned());
            }
            VALUE_TAG => {
                let lang = child.attribute(LANG_ATTR).ok_or_else(|| {
                    Error::parse_error(child.line, "Value element is missing the 'lang' attribute")
                })?;
                let slot = match language.classify(lang) {
                    LanguageMatch::Full => &mut full,
                    LanguageMatch::Primary => &mut primary,
                    LanguageMatch::None => {
                        trace!(lang, line = child.line, "ignoring value for another language");
                        continue;
                    }
                };
                if slot.is_some() {
                    return Err(Error::parse_error(
                        child.line,
                        "too many Value elements with the same lang attribute",
                    ));
                }
                *slot = Some(escape::decode(&child.text).into_owned());
            }
            _ => {}
        }
    }

    let key = key
        .ok_or_else(|| Error::parse_error(entry.line, "Entry element has no Key element"))?;

    match full.or(primary) {
        Some(value) => {
            node.insert(key, value);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn load_context(node: &Localizer, element: &Element, stats: &mut LoadStats) -> Result<(), Error> {
    let id = element.attribute(ID_ATTR).ok_or_else(|| {
        Error::parse_error(element.line, "Context element is missing the 'id' attribute")
    })?;
    let context = node.context(id);
    load_elements(&context, element, stats)
}
