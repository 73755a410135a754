//! The context tree that resolves neutral keys to localized strings.
//!
//! All nodes of one tree live in a shared arena. A [`Localizer`] is a handle
//! to one node: the shared tree plus the node's index. Each node owns its
//! localizations and the indices of its nested contexts and records the index
//! of the node that created it. Lookups that miss on a node continue on its
//! parent and finally fall back to the key itself.
//!
//! Every handle keeps the whole tree alive, so a context handle still falls
//! back to its ancestors after the root handle has been dropped. Handles are
//! `Send + Sync`; lookups take a shared lock and loads take an exclusive one.

use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    io::BufRead,
    path::Path,
    sync::Arc,
};

use parking_lot::RwLock;
use tracing::trace;
use unic_langid::LanguageIdentifier;

use crate::{
    document::Document,
    error::Error,
    format::{self, FormatError},
    language::TargetLanguage,
    loader,
    options::LoadOptions,
    traits::Parser,
};

/// A node in the localization context tree.
///
/// Cloning a `Localizer` clones the handle, not the node: both values refer to
/// the same localizations and contexts.
///
/// # Example
///
/// ```rust
/// use localetree::{Localizer, LoadOptions};
///
/// let root = Localizer::with_language("es-MX");
/// root.load_str(
///     r#"<I18N>
///          <Entry><Key>Open</Key><Value lang="es">Abrir</Value></Entry>
///          <Context id="menu.file">
///            <Entry><Key>Close</Key><Value lang="es-mx">Cerrar</Value></Entry>
///          </Context>
///        </I18N>"#,
///     LoadOptions::default(),
/// )?;
///
/// let file_menu = root.context("menu.file");
/// assert_eq!(file_menu.localize("Close"), "Cerrar");
/// assert_eq!(file_menu.localize("Open"), "Abrir");
/// assert_eq!(file_menu.localize("Quit"), "Quit");
/// # Ok::<(), localetree::Error>(())
/// ```
#[derive(Clone)]
pub struct Localizer {
    tree: Arc<RwLock<Tree>>,
    id: usize,
}

/// Node arena. Nodes are never removed, so indices stay valid for the
/// lifetime of the tree; a cleared node's former children become unreachable
/// from it but keep their own parent index.
struct Tree {
    nodes: Vec<Node>,
}

#[derive(Default)]
struct Node {
    localizations: HashMap<String, String>,
    contexts: HashMap<String, usize>,
    parent: Option<usize>,
    language: TargetLanguage,
}

const ROOT: usize = 0;

impl Tree {
    /// Index of the child `segment` of `id`, created with the parent's
    /// current language when missing.
    fn child(&mut self, id: usize, segment: &str) -> usize {
        if let Some(&child) = self.nodes[id].contexts.get(segment) {
            return child;
        }

        let child = self.nodes.len();
        let language = self.nodes[id].language.clone();
        self.nodes.push(Node {
            parent: Some(id),
            language,
            ..Default::default()
        });
        self.nodes[id].contexts.insert(segment.to_string(), child);
        trace!(context = segment, "created context");
        child
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Localizer {
            tree: Arc::new(RwLock::new(Tree {
                nodes: vec![Node::default()],
            })),
            id: ROOT,
        }
    }
}

impl Localizer {
    /// Creates a root node with no target language.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root node targeting `tag`.
    pub fn with_language(tag: &str) -> Self {
        let localizer = Self::new();
        localizer.set_target_language(tag);
        localizer
    }

    /// Creates a root node targeting a parsed `unic-langid` identifier.
    pub fn with_language_identifier(identifier: &LanguageIdentifier) -> Self {
        let localizer = Self::new();
        localizer.tree.write().nodes[ROOT].language = TargetLanguage::from(identifier);
        localizer
    }

    fn handle(&self, id: usize) -> Localizer {
        Localizer {
            tree: Arc::clone(&self.tree),
            id,
        }
    }

    /// Sets the language this node loads values for.
    ///
    /// Only this node changes; contexts created earlier keep the language they
    /// were created with, contexts created later inherit the new one.
    pub fn set_target_language(&self, tag: &str) -> &Self {
        self.tree.write().nodes[self.id].language = TargetLanguage::parse(tag);
        self
    }

    /// The language this node loads values for.
    pub fn target_language(&self) -> TargetLanguage {
        self.tree.read().nodes[self.id].language.clone()
    }

    /// Resolves `key` on this node, then on each ancestor, and returns the key
    /// itself when no node has a localization for it.
    pub fn localize(&self, key: &str) -> String {
        self.resolve(key).unwrap_or_else(|| key.to_string())
    }

    /// Resolves `key` like [`Localizer::localize`] and uses the result as a
    /// composite format template for `args`.
    pub fn localize_format(&self, key: &str, args: &[&dyn Display]) -> Result<String, FormatError> {
        format::format(&self.localize(key), args)
    }

    /// Localizes every key, preserving order.
    pub fn localize_all<S: AsRef<str>>(&self, keys: &[S]) -> Vec<String> {
        let tree = self.tree.read();
        keys.iter()
            .map(|key| {
                let key = key.as_ref();
                resolve_in(&tree, self.id, key).unwrap_or_else(|| key.to_string())
            })
            .collect()
    }

    fn resolve(&self, key: &str) -> Option<String> {
        resolve_in(&self.tree.read(), self.id, key)
    }

    /// Returns the node addressed by a dot-separated context path, creating
    /// missing nodes along the way.
    ///
    /// Each segment is trimmed; empty segments are ordinary context ids.
    pub fn context(&self, dotted_id: &str) -> Localizer {
        let mut tree = self.tree.write();
        let mut current = self.id;
        for segment in dotted_id.split('.').map(str::trim) {
            current = tree.child(current, segment);
        }
        drop(tree);
        self.handle(current)
    }

    /// Like [`Localizer::context`] but never creates nodes.
    pub fn find_context(&self, dotted_id: &str) -> Option<Localizer> {
        let tree = self.tree.read();
        let mut current = self.id;
        for segment in dotted_id.split('.').map(str::trim) {
            current = *tree.nodes[current].contexts.get(segment)?;
        }
        Some(self.handle(current))
    }

    /// The node this one was created from, `None` for a root.
    pub fn parent(&self) -> Option<Localizer> {
        let parent = self.tree.read().nodes[self.id].parent;
        parent.map(|id| self.handle(id))
    }

    /// Returns `true` when both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Localizer) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }

    /// The localization stored on this node, without falling back to parents.
    pub fn get(&self, key: &str) -> Option<String> {
        self.tree.read().nodes[self.id].localizations.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.tree.read().nodes[self.id]
            .localizations
            .contains_key(key)
    }

    /// Stores a localization on this node, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.tree.write().nodes[self.id]
            .localizations
            .insert(key.into(), value.into())
    }

    /// Number of localizations stored on this node.
    pub fn len(&self) -> usize {
        self.tree.read().nodes[self.id].localizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().nodes[self.id].localizations.is_empty()
    }

    /// Keys stored on this node, sorted.
    pub fn keys(&self) -> Vec<String> {
        let tree = self.tree.read();
        let mut keys: Vec<String> = tree.nodes[self.id].localizations.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Ids of the direct child contexts, sorted.
    pub fn context_ids(&self) -> Vec<String> {
        let tree = self.tree.read();
        let mut ids: Vec<String> = tree.nodes[self.id].contexts.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Removes all localizations and child contexts from this node.
    ///
    /// Handles to former children stay usable but are no longer reachable from
    /// this node.
    pub fn clear(&self) {
        let mut tree = self.tree.write();
        let node = &mut tree.nodes[self.id];
        node.localizations.clear();
        node.contexts.clear();
    }

    /// Loads a document, merging it into the existing tree.
    pub fn load(&self, document: &Document) -> Result<(), Error> {
        self.load_with(document, LoadOptions::default())
    }

    /// Loads a parsed document with explicit options.
    pub fn load_with(&self, document: &Document, options: LoadOptions) -> Result<(), Error> {
        loader::load_document(self, document, options.merge)
    }

    /// Parses and loads an `I18N` document held in memory.
    pub fn load_str(&self, xml: &str, options: LoadOptions) -> Result<(), Error> {
        self.load_with(&Document::from_str(xml)?, options)
    }

    /// Parses and loads an `I18N` document from any reader.
    pub fn load_reader<R: BufRead>(&self, reader: R, options: LoadOptions) -> Result<(), Error> {
        self.load_with(&Document::from_reader(reader)?, options)
    }

    /// Reads and loads an `I18N` document file, decoding UTF-16 by its BOM.
    pub fn load_file<P: AsRef<Path>>(&self, path: P, options: LoadOptions) -> Result<(), Error> {
        self.load_with(&Document::read_from(path)?, options)
    }
}

fn resolve_in(tree: &Tree, mut id: usize, key: &str) -> Option<String> {
    loop {
        let node = &tree.nodes[id];
        if let Some(value) = node.localizations.get(key) {
            return Some(value.clone());
        }
        id = node.parent?;
    }
}

impl Debug for Localizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.tree.read();
        let node = &tree.nodes[self.id];
        f.debug_struct("Localizer")
            .field("language", &node.language.full())
            .field("localizations", &node.localizations.len())
            .field("contexts", &node.contexts.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_passes_through() {
        let root = Localizer::new();
        assert_eq!(root.localize("unknown.key"), "unknown.key");
        assert_eq!(root.localize(""), "");
    }

    #[test]
    fn test_fallback_to_parent() {
        let root = Localizer::with_language("es");
        root.insert("hello", "Hola");
        let greet = root.context("greet");
        assert_eq!(greet.localize("hello"), "Hola");

        greet.insert("hello", "¡Hola!");
        assert_eq!(greet.localize("hello"), "¡Hola!");
        assert_eq!(root.localize("hello"), "Hola");
    }

    #[test]
    fn test_fallback_through_several_levels() {
        let root = Localizer::new();
        root.insert("a", "root-a");
        root.insert("b", "root-b");
        let middle = root.context("m");
        middle.insert("b", "middle-b");
        let leaf = root.context("m.leaf");
        leaf.insert("c", "leaf-c");

        assert_eq!(leaf.localize("a"), "root-a");
        assert_eq!(leaf.localize("b"), "middle-b");
        assert_eq!(leaf.localize("c"), "leaf-c");
        assert_eq!(leaf.localize("d"), "d");
    }

    #[test]
    fn test_context_is_idempotent() {
        let root = Localizer::new();
        let first = root.context("a.b.c");
        let second = root.context("a.b.c");
        let stepwise = root.context("a").context("b").context("c");
        assert!(first.ptr_eq(&second));
        assert!(first.ptr_eq(&stepwise));
        assert_eq!(root.context_ids(), vec!["a"]);
    }

    #[test]
    fn test_context_segments_are_trimmed() {
        let root = Localizer::new();
        let spaced = root.context(" menu . file ");
        assert!(spaced.ptr_eq(&root.context("menu.file")));
    }

    #[test]
    fn test_empty_segments_are_literal_ids() {
        let root = Localizer::new();
        let leading = root.context(".a");
        assert_eq!(root.context_ids(), vec![""]);
        assert!(leading.ptr_eq(&root.context("").context("a")));

        let trailing = root.context("b.");
        assert_eq!(trailing.parent().unwrap().context_ids(), vec![""]);
    }

    #[test]
    fn test_key_and_context_namespaces_are_independent() {
        let root = Localizer::new();
        root.insert("menu", "Menú");
        let menu = root.context("menu");
        assert_eq!(root.localize("menu"), "Menú");
        assert!(menu.is_empty());
    }

    #[test]
    fn test_children_copy_language_at_creation() {
        let root = Localizer::with_language("en-US");
        let early = root.context("early");
        root.set_target_language("fr-CA");
        let late = root.context("late");

        assert_eq!(early.target_language().full(), "en-us");
        assert_eq!(late.target_language().full(), "fr-ca");
        assert_eq!(late.target_language().primary(), Some("fr"));
    }

    #[test]
    fn test_set_target_language_chains() {
        let root = Localizer::new();
        let language = root.set_target_language("DE-at").target_language();
        assert_eq!(language.full(), "de-at");
        assert_eq!(language.primary(), Some("de"));
    }

    #[test]
    fn test_with_language_identifier() {
        let id: LanguageIdentifier = "en-GB".parse().unwrap();
        let root = Localizer::with_language_identifier(&id);
        assert_eq!(root.target_language().full(), "en-gb");
    }

    #[test]
    fn test_find_context_does_not_create() {
        let root = Localizer::new();
        assert!(root.find_context("a.b").is_none());
        assert!(root.context_ids().is_empty());

        let created = root.context("a.b");
        assert!(root.find_context("a.b").unwrap().ptr_eq(&created));
    }

    #[test]
    fn test_clear_orphans_children() {
        let root = Localizer::new();
        root.insert("k", "v");
        let child = root.context("c");
        child.insert("x", "y");

        root.clear();
        assert!(root.is_empty());
        assert!(root.context_ids().is_empty());

        // The orphaned child keeps its data and its parent link.
        assert_eq!(child.localize("x"), "y");
        assert!(child.parent().unwrap().ptr_eq(&root));
        assert!(!root.context("c").ptr_eq(&child));
    }

    #[test]
    fn test_localize_all() {
        let root = Localizer::new();
        root.insert("a", "A");
        assert_eq!(root.localize_all(&["a", "b", "a"]), vec!["A", "b", "A"]);
        assert!(root.localize_all::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_localize_format() {
        let root = Localizer::new();
        root.insert("{0} files", "{0} archivos");
        assert_eq!(
            root.localize_format("{0} files", &[&3]).unwrap(),
            "3 archivos"
        );
        // Unresolved keys are used as the template themselves.
        assert_eq!(
            root.localize_format("{0} of {1}", &[&1, &2]).unwrap(),
            "1 of 2"
        );
        assert!(root.localize_format("{1}", &[&"only one"]).is_err());
    }

    #[test]
    fn test_inspection_helpers() {
        let root = Localizer::new();
        assert_eq!(root.insert("b", "1"), None);
        assert_eq!(root.insert("a", "2"), None);
        assert_eq!(root.insert("b", "3"), Some("1".to_string()));
        assert_eq!(root.len(), 2);
        assert_eq!(root.keys(), vec!["a", "b"]);
        assert_eq!(root.get("b"), Some("3".to_string()));
        assert!(root.contains_key("a"));

        let child = root.context("c");
        assert_eq!(child.get("a"), None);
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_debug_does_not_recurse_into_parent() {
        let root = Localizer::with_language("en");
        let child = root.context("menu");
        let debug = format!("{:?}", child);
        assert!(debug.contains("Localizer"));
        assert!(debug.contains("\"en\""));
    }

    #[test]
    fn test_child_falls_back_after_root_is_dropped() {
        fn menu_context() -> Localizer {
            let root = Localizer::with_language("es");
            root.insert("Open", "Abrir");
            root.context("menu")
        }

        let menu = menu_context();
        assert_eq!(menu.localize("Open"), "Abrir");
        assert_eq!(menu.parent().unwrap().localize("Open"), "Abrir");
    }

    #[test]
    fn test_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Localizer>();
    }

    #[test]
    fn test_trees_are_independent() {
        let first = Localizer::with_language("en");
        let second = Localizer::with_language("en");
        first.insert("k", "first");
        assert_eq!(second.localize("k"), "k");
        assert!(!first.ptr_eq(&second));
        assert!(!first.context("a").ptr_eq(&second.context("a")));
    }
}
