//! Tag registry: classifier sets, handler table, and alias resolution.
//!
//! A [`TagRegistry`] is plain configuration. It is built once, before any
//! scanning, and the [`Builder`](crate::builder::Builder) only reads from it —
//! constructing a fresh registry per run (or per test) avoids any cross-run
//! leakage.
//!
//! All registration methods take space-separated name lists, so
//! `register_boolean_handler("static abstract readonly")` installs three tags.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use crate::builder::Context;
use crate::events::Tag;

/// Handler invoked for a tag occurrence: `(context, text, name, block)`.
///
/// Handlers receive the mutable build context explicitly — they create
/// entities, move the cursor, and write into the current target's `data` map.
pub type TagHandler = Rc<dyn Fn(&mut Context, &str, &str, &[Tag])>;

/// Registry misconfiguration, surfaced when a broken binding actually fires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An alias fired but its target tag was never registered.
    #[error("alias `{alias}` points at unregistered tag `{target}`")]
    UnresolvedAlias { alias: String, target: String },
    /// Alias resolution revisited a name it already followed.
    #[error("alias cycle while resolving `{alias}`")]
    AliasCycle { alias: String },
}

enum TagBinding {
    Handler(TagHandler),
    /// Forwards to another tag name, resolved at dispatch time so aliases may
    /// be registered before their targets.
    Alias(String),
}

/// Write-once-then-read-only tag configuration.
///
/// Three independent mappings: which tag names classify a block as a type,
/// which classify it as a member, and what each tag does when it fires.
/// Classifier membership and handler presence are independent — a classifier
/// without a handler never classifies anything.
#[derive(Default)]
pub struct TagRegistry {
    type_tags: HashSet<String>,
    member_tags: HashSet<String>,
    tags: HashMap<String, TagBinding>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark each name as a type classifier, e.g. `"class mixin struct"`.
    pub fn register_type_classifiers(&mut self, names: &str) {
        for name in names.split_whitespace() {
            self.type_tags.insert(name.to_string());
        }
    }

    /// Mark each name as a member classifier, e.g. `"method property event"`.
    pub fn register_member_classifiers(&mut self, names: &str) {
        for name in names.split_whitespace() {
            self.member_tags.insert(name.to_string());
        }
    }

    /// Install `handler` for each name. Later registration overwrites earlier.
    pub fn register_handler<F>(&mut self, names: &str, handler: F)
    where
        F: Fn(&mut Context, &str, &str, &[Tag]) + 'static,
    {
        let handler: TagHandler = Rc::new(handler);
        for name in names.split_whitespace() {
            self.tags
                .insert(name.to_string(), TagBinding::Handler(handler.clone()));
        }
    }

    /// Install a handler that sets `target.data[name] = true`, ignoring text.
    pub fn register_boolean_handler(&mut self, names: &str) {
        self.register_handler(names, |ctx, _text, name, _block| {
            if let Some(mut target) = ctx.target_mut() {
                target.data_mut().insert(name.to_string(), Value::Bool(true));
            }
        });
    }

    /// Install a handler that sets `target.data[name]` to the verbatim text.
    pub fn register_string_handler(&mut self, names: &str) {
        self.register_handler(names, |ctx, text, name, _block| {
            if let Some(mut target) = ctx.target_mut() {
                target
                    .data_mut()
                    .insert(name.to_string(), Value::String(text.to_string()));
            }
        });
    }

    /// Register aliases: each pair maps space-separated `from` names to a
    /// canonical `to` name. The forwarded handler receives the canonical name.
    pub fn register_aliases<'a>(&mut self, aliases: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (from_names, to_name) in aliases {
            for name in from_names.split_whitespace() {
                self.tags
                    .insert(name.to_string(), TagBinding::Alias(to_name.to_string()));
            }
        }
    }

    pub fn is_type_classifier(&self, name: &str) -> bool {
        self.type_tags.contains(name)
    }

    pub fn is_member_classifier(&self, name: &str) -> bool {
        self.member_tags.contains(name)
    }

    pub fn is_classifier(&self, name: &str) -> bool {
        self.is_type_classifier(name) || self.is_member_classifier(name)
    }

    /// Look up the handler for `name`, following alias links.
    ///
    /// Returns the canonical tag name alongside the handler so alias firing is
    /// indistinguishable from firing the target tag directly. `Ok(None)` means
    /// the name is simply unregistered; an alias whose chain dead-ends is a
    /// configuration error.
    pub fn resolve(&self, name: &str) -> Result<Option<(String, TagHandler)>, RegistryError> {
        let mut seen = HashSet::new();
        let mut current = name;

        loop {
            if !seen.insert(current.to_string()) {
                return Err(RegistryError::AliasCycle {
                    alias: name.to_string(),
                });
            }
            match self.tags.get(current) {
                Some(TagBinding::Handler(handler)) => {
                    return Ok(Some((current.to_string(), handler.clone())));
                }
                Some(TagBinding::Alias(target)) => current = target,
                None if current == name => return Ok(None),
                None => {
                    return Err(RegistryError::UnresolvedAlias {
                        alias: name.to_string(),
                        target: current.to_string(),
                    });
                }
            }
        }
    }
}
