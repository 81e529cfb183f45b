//! End-to-end pipeline tests: synthetic scanner event streams through the
//! builder, compared against full expected output trees.

use docmodel::{Builder, Member, ScanEvent, TagRegistry, Type, catalog};
use pretty_assertions::assert_eq;
use serde_json::json;

/// The smallest registry that can classify anything: one type tag, one member
/// tag, a string `param`, and an accumulating `desc`.
fn minimal_registry() -> TagRegistry {
    let mut registry = TagRegistry::new();
    registry.register_type_classifiers("class");
    registry.register_member_classifiers("method");
    registry.register_handler("class", |ctx, text, name, _block| {
        let ns = ctx.current_namespace();
        let id = ctx.model.add_type(ns, Type::new(name, text.trim()));
        ctx.enter_type(id);
    });
    registry.register_handler("method", |ctx, text, _name, _block| {
        if let Some(ty) = ctx.current_type() {
            let id = ctx.model.add_member(ty, Member::new(text.trim()));
            ctx.enter_member(id);
        }
    });
    registry.register_handler("desc", |ctx, text, _name, _block| {
        if let Some(mut target) = ctx.target_mut() {
            let data = target.data_mut();
            match data.get_mut("desc") {
                None => {
                    data.insert("desc".into(), json!(text));
                }
                Some(serde_json::Value::String(existing)) => {
                    if !text.is_empty() {
                        if existing.is_empty() {
                            *existing = text.to_string();
                        } else {
                            existing.push('\n');
                            existing.push_str(text);
                        }
                    }
                }
                Some(_) => {}
            }
        }
    });
    registry.register_string_handler("param");
    registry
}

#[test]
fn test_widget_scenario_minimal_registry() {
    let mut builder = Builder::new(minimal_registry());
    builder
        .consume(vec![
            ScanEvent::begin(""),
            ScanEvent::tag("class", "Widget"),
            ScanEvent::tag("desc", "A widget. Does things."),
            ScanEvent::end("widget.js", 2),
            ScanEvent::begin(""),
            ScanEvent::tag("method", "render"),
            ScanEvent::tag("param", "ctx"),
            ScanEvent::end("widget.js", 5),
        ])
        .unwrap();

    assert_eq!(
        builder.to_serializable(),
        json!({
            "fullName": "",
            "types": [{
                "type": "class",
                "name": "Widget",
                "summary": "A widget",
                "desc": "A widget. Does things.",
                "source": {"file": "widget.js", "line": 2},
                "members": [{
                    "name": "render",
                    "desc": "",
                    "param": "ctx",
                    "source": {"file": "widget.js", "line": 5},
                }],
            }],
            "namespaces": [],
        })
    );
    assert!(builder.diagnostics().is_empty());
}

#[test]
fn test_serialized_key_order_is_insertion_order() {
    let mut builder = Builder::new(minimal_registry());
    builder
        .consume(vec![
            ScanEvent::begin("Does things."),
            ScanEvent::tag("class", "Widget"),
            ScanEvent::end("widget.js", 2),
        ])
        .unwrap();

    // map equality ignores order, so pin the exact serialized form
    let ty = &builder.to_serializable()["types"][0];
    assert_eq!(
        serde_json::to_string(ty).unwrap(),
        r#"{"type":"class","name":"Widget","summary":"Does things","desc":"Does things.","source":{"file":"widget.js","line":2},"members":[]}"#
    );
}

#[test]
fn test_default_catalog_full_tree() {
    let mut builder = Builder::new(catalog::default_registry());
    builder
        .consume(vec![
            // not API documentation: contributes nothing
            ScanEvent::begin("Copyright (c) 2026. All rights reserved."),
            ScanEvent::end("widget.js", 1),
            ScanEvent::begin("A widget. Does things."),
            ScanEvent::tag("class", "ui.Widget"),
            ScanEvent::end("widget.js", 4),
            ScanEvent::begin("Renders the widget."),
            ScanEvent::tag("method", "render"),
            ScanEvent::tag("param", "{Object} ctx The draw context."),
            ScanEvent::tag("return", "{Boolean} True on success."),
            ScanEvent::end("widget.js", 12),
        ])
        .unwrap();

    assert_eq!(
        builder.to_serializable(),
        json!({
            "fullName": "",
            "types": [],
            "namespaces": [{
                "fullName": "ui",
                "types": [{
                    "type": "class",
                    "name": "Widget",
                    "summary": "A widget",
                    "fullName": "ui.Widget",
                    "desc": "A widget. Does things.",
                    "source": {"file": "widget.js", "line": 4},
                    "members": [{
                        "name": "render",
                        "summary": "Renders the widget",
                        "type": "method",
                        "desc": "Renders the widget.",
                        "params": [{
                            "name": "ctx",
                            "types": ["Object"],
                            "desc": "The draw context.",
                        }],
                        "return": {"types": ["Boolean"], "desc": "True on success."},
                        "source": {"file": "widget.js", "line": 12},
                    }],
                }],
                "namespaces": [],
            }],
        })
    );
}

#[test]
fn test_multiple_files_union_into_one_tree() {
    let mut builder = Builder::new(catalog::default_registry());
    builder
        .consume(vec![
            ScanEvent::begin("First."),
            ScanEvent::tag("class", "ui.Button"),
            ScanEvent::end("button.js", 2),
        ])
        .unwrap();
    builder
        .consume(vec![
            ScanEvent::begin("Second."),
            ScanEvent::tag("class", "ui.Label"),
            ScanEvent::end("label.js", 2),
        ])
        .unwrap();

    let model = builder.model();
    let root = model.namespace(model.root());
    // both files landed in the same "ui" namespace, in scan order
    assert_eq!(root.children().len(), 1);
    let ui = model.namespace(root.children()[0]);
    let names: Vec<_> = ui.types().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Button", "Label"]);
    assert_eq!(ui.types()[0].source.as_ref().unwrap().file, "button.js");
    assert_eq!(ui.types()[1].source.as_ref().unwrap().file, "label.js");
}

#[test]
fn test_unknown_tags_reported_not_fatal() {
    let mut builder = Builder::new(catalog::default_registry());
    builder
        .consume(vec![
            ScanEvent::begin("A widget."),
            ScanEvent::tag("class", "Widget"),
            ScanEvent::tag("todo", "remove in 4.0"),
            ScanEvent::end("widget.js", 3),
        ])
        .unwrap();

    assert_eq!(builder.diagnostics().len(), 1);
    assert_eq!(builder.diagnostics()[0].tag, "todo");
    // the entity was still built
    let model = builder.model();
    assert_eq!(model.namespace(model.root()).types()[0].name, "Widget");
}
