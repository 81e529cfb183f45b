//! Default tag vocabulary.
//!
//! The engine itself has no built-in tags; everything is registry
//! configuration. This module ships the stock JSDoc-style vocabulary so a
//! scanner can be wired up without writing handlers by hand:
//!
//! - type tags: `class`, `mixin`, `struct`, `namespace`
//! - member tags: `method`, `property`, `event`, `constructor`, `field`
//! - structured tags: `param`, `return`, `example`
//! - plain string/bool tags and a few aliases (`returns`, `prop`, `func`, ...)
//!
//! Integrators that need a different vocabulary build their own
//! [`TagRegistry`] instead, or extend this one before handing it to the
//! builder.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::model::{Member, Type};
use crate::registry::TagRegistry;

/// Leading `{Type1/Type2}` annotation on `param`, `return`, and inline
/// `property` tags.
static TYPE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\{([^{}]+)\}\s*").unwrap());

/// Build a registry with the full default vocabulary installed.
pub fn default_registry() -> TagRegistry {
    let mut registry = TagRegistry::new();

    registry.register_type_classifiers("class mixin struct namespace");
    registry.register_member_classifiers("method property event constructor field");

    // `@class ui.widgets.Button`: the dotted prefix names the namespace,
    // creating any missing links in the chain.
    registry.register_handler("class mixin struct", |ctx, text, name, _block| {
        let full_name = text.trim();
        let (ns_name, type_name) = match full_name.rsplit_once('.') {
            Some((ns, ty)) => (Some(ns), ty),
            None => (None, full_name),
        };
        let ns = match ns_name {
            Some(ns_name) => ctx.model.get_or_create_namespace(ns_name),
            None => ctx.current_namespace(),
        };
        let mut ty = Type::new(name, type_name);
        if ns_name.is_some() {
            ty.data
                .insert("fullName".into(), Value::String(full_name.to_string()));
        }
        let id = ctx.model.add_type(ns, ty);
        ctx.enter_type(id);
    });

    // `@namespace ui.widgets`: enters the namespace and makes it the target,
    // so the block's desc and derived summary land on the namespace.
    registry.register_handler("namespace", |ctx, text, _name, _block| {
        let id = ctx.model.get_or_create_namespace(text.trim());
        ctx.enter_namespace(id);
    });

    // Plain members: the first token of the text is the member name; a bare
    // `@constructor` names itself after the tag.
    registry.register_handler("method event constructor field", |ctx, text, name, _block| {
        let Some(ty) = ctx.current_type() else {
            return;
        };
        let member_name = text.split_whitespace().next().unwrap_or(name);
        let mut member = Member::new(member_name);
        member
            .data
            .insert("type".into(), Value::String(name.to_string()));
        let id = ctx.model.add_member(ty, member);
        ctx.enter_member(id);
    });

    // `@property {String} title The tooltip title.` — inline shorthand, also
    // valid inside a class's own doc block (dual classification).
    registry.register_handler("property", |ctx, text, name, _block| {
        let Some(ty) = ctx.current_type() else {
            return;
        };
        let (types, rest) = split_type_prefix(text);
        let (member_name, desc) = match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (rest, ""),
        };
        let mut member = Member::new(if member_name.is_empty() { name } else { member_name });
        member
            .data
            .insert("type".into(), Value::String(name.to_string()));
        if let Some(types) = types {
            member.data.insert("types".into(), Value::Array(types));
        }
        if !desc.is_empty() {
            member
                .data
                .insert("desc".into(), Value::String(desc.to_string()));
        }
        let id = ctx.model.add_member(ty, member);
        ctx.enter_member(id);
    });

    registry.register_handler("param", |ctx, text, _name, _block| {
        let Some(mut target) = ctx.target_mut() else {
            return;
        };
        let param = parse_param(text);
        let params = target
            .data_mut()
            .entry("params")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = params {
            items.push(param);
        }
    });

    registry.register_handler("return", |ctx, text, _name, _block| {
        let Some(mut target) = ctx.target_mut() else {
            return;
        };
        let (types, desc) = split_type_prefix(text);
        let mut ret = Map::new();
        if let Some(types) = types {
            ret.insert("types".into(), Value::Array(types));
        }
        let desc = desc.trim();
        if !desc.is_empty() {
            ret.insert("desc".into(), Value::String(desc.to_string()));
        }
        target.data_mut().insert("return".into(), Value::Object(ret));
    });

    registry.register_handler("example", |ctx, text, _name, _block| {
        let Some(mut target) = ctx.target_mut() else {
            return;
        };
        let examples = target
            .data_mut()
            .entry("examples")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = examples {
            items.push(Value::String(text.to_string()));
        }
    });

    // Free-text description, fed both by the implicit leading-text tag and by
    // explicit `@desc` tags; multiple occurrences accumulate.
    registry.register_handler("desc", |ctx, text, _name, _block| {
        if let Some(mut target) = ctx.target_mut() {
            append_desc(target.data_mut(), text);
        }
    });

    registry.register_string_handler("version author since deprecated extends access");
    registry.register_boolean_handler("static abstract global readonly private protected public final");

    registry.register_aliases([
        ("returns", "return"),
        ("prop", "property"),
        ("func fn", "method"),
        ("constructs", "constructor"),
    ]);

    registry
}

/// Append description text: the first non-empty write replaces an empty
/// value, later writes join with a newline, empty text changes nothing.
fn append_desc(data: &mut Map<String, Value>, text: &str) {
    match data.get_mut("desc") {
        None => {
            data.insert("desc".into(), Value::String(text.to_string()));
        }
        Some(Value::String(existing)) => {
            if text.is_empty() {
                return;
            }
            if existing.is_empty() {
                *existing = text.to_string();
            } else {
                existing.push('\n');
                existing.push_str(text);
            }
        }
        Some(_) => {}
    }
}

/// Split an optional `{A/B}` type annotation off the front of a tag body.
fn split_type_prefix(text: &str) -> (Option<Vec<Value>>, &str) {
    match TYPE_PREFIX_REGEX.captures(text) {
        Some(caps) => {
            let types = caps[1]
                .split('/')
                .map(|t| Value::String(t.trim().to_string()))
                .collect();
            let rest = &text[caps.get(0).unwrap().end()..];
            (Some(types), rest)
        }
        None => (None, text.trim_start()),
    }
}

/// Parse a `param` body: `{Types} name desc`, with `[name]` for optional
/// parameters and `[name=default]` for defaults.
fn parse_param(text: &str) -> Value {
    let (types, rest) = split_type_prefix(text);
    let (raw_name, desc) = match rest.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (rest, ""),
    };

    let mut name = raw_name;
    let mut optional = false;
    let mut default = None;
    if let Some(inner) = raw_name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        optional = true;
        match inner.split_once('=') {
            Some((n, d)) => {
                name = n;
                default = Some(d);
            }
            None => name = inner,
        }
    }

    let mut map = Map::new();
    map.insert("name".into(), Value::String(name.to_string()));
    if let Some(types) = types {
        map.insert("types".into(), Value::Array(types));
    }
    if !desc.is_empty() {
        map.insert("desc".into(), Value::String(desc.to_string()));
    }
    if optional {
        map.insert("optional".into(), Value::Bool(true));
    }
    if let Some(default) = default {
        map.insert("default".into(), Value::String(default.to_string()));
    }
    Value::Object(map)
}
