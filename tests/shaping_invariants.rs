//! Shaping Invariant Tests
//!
//! - Without a directive every declared field is emitted with its bound value
//! - exclude_unset drops exactly the fields the producer did not provide
//! - include/exclude paths reach through nested schemas and collections
//! - Directive mistakes are configuration errors, never partial output

use modelgate::binding::{RawInputs, RequestBinder};
use modelgate::schema::{FieldSpec, FieldType, SchemaRegistry, SchemaSpec};
use modelgate::shaping::{ResponseShaper, ShapeDirective, ShapeError};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .define(
            SchemaSpec::builder("Image")
                .field(FieldSpec::new("url", FieldType::Url))
                .field(FieldSpec::new("name", FieldType::String))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("Item")
                .field(FieldSpec::new("name", FieldType::String))
                .field(FieldSpec::new("description", FieldType::String).default_null())
                .field(FieldSpec::new("price", FieldType::Float).gt(0.0))
                .field(FieldSpec::new("tax", FieldType::Float).default_null())
                .field(FieldSpec::new("tags", FieldType::set(FieldType::String)).default(json!([])))
                .field(FieldSpec::new("image", FieldType::object("Image")).default_null())
                .field(
                    FieldSpec::new("gallery", FieldType::mapping(FieldType::String, FieldType::object("Image")))
                        .default(json!({})),
                )
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

fn bind_item(registry: &SchemaRegistry, body: Value) -> modelgate::binding::BoundObject {
    RequestBinder::new(registry)
        .bind("Item", &RawInputs::body_only(body))
        .unwrap()
}

// =============================================================================
// Round-trip Tests
// =============================================================================

#[test]
fn test_fully_specified_input_round_trips() {
    let registry = setup_registry();
    let body = json!({
        "name": "Foo",
        "description": "A very nice Item",
        "price": 35.4,
        "tax": 3.2,
        "tags": ["rock", "metal"],
        "image": {"url": "http://example.com/baz.jpg", "name": "The Foo live"},
        "gallery": {"front": {"url": "https://example.com/f.png", "name": "front"}}
    });
    let item = bind_item(&registry, body.clone());

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new())
        .unwrap();
    assert_eq!(out, body);
}

#[test]
fn test_set_values_are_deduplicated() {
    let registry = setup_registry();
    let item = bind_item(
        &registry,
        json!({"name": "Foo", "price": 1.5, "tags": ["a", "b", "a"]}),
    );

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().include(["tags"]))
        .unwrap();
    assert_eq!(out, json!({"tags": ["a", "b"]}));
}

// =============================================================================
// Unset Suppression Tests
// =============================================================================

#[test]
fn test_exclude_unset_example() {
    let registry = setup_registry();
    let item = bind_item(&registry, json!({"name": "Foo", "price": 35.4}));

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().exclude_unset())
        .unwrap();
    assert_eq!(out, json!({"name": "Foo", "price": 35.4}));
}

#[test]
fn test_exclude_unset_keeps_explicit_defaults() {
    let registry = setup_registry();
    let item = bind_item(
        &registry,
        json!({"name": "Baz", "description": null, "price": 50.2, "tags": []}),
    );

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().exclude_unset())
        .unwrap();
    assert_eq!(
        out,
        json!({"name": "Baz", "description": null, "price": 50.2, "tags": []})
    );
}

#[test]
fn test_exclude_unset_is_recursive() {
    let registry = setup_registry();
    let mut registry = registry;
    registry
        .define(
            SchemaSpec::builder("Labeled")
                .field(FieldSpec::new("label", FieldType::String))
                .field(FieldSpec::new("note", FieldType::String).default_null())
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("Board")
                .field(FieldSpec::new("title", FieldType::String))
                .field(FieldSpec::new("cards", FieldType::sequence(FieldType::object("Labeled"))))
                .build()
                .unwrap(),
        )
        .unwrap();

    let board = RequestBinder::new(&registry)
        .bind(
            "Board",
            &RawInputs::body_only(json!({
                "title": "todo",
                "cards": [{"label": "a"}, {"label": "b", "note": "urgent"}]
            })),
        )
        .unwrap();

    let out = ResponseShaper::new(&registry)
        .shape("Board", &board, &ShapeDirective::new().exclude_unset())
        .unwrap();
    assert_eq!(
        out,
        json!({"title": "todo", "cards": [{"label": "a"}, {"label": "b", "note": "urgent"}]})
    );
}

// =============================================================================
// Path Directive Tests
// =============================================================================

#[test]
fn test_include_nested_path() {
    let registry = setup_registry();
    let item = bind_item(
        &registry,
        json!({"name": "Foo", "price": 1.0, "image": {"url": "http://example.com/a.png", "name": "a"}}),
    );

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().include(["name", "description", "image.name"]))
        .unwrap();
    assert_eq!(out, json!({"name": "Foo", "description": null, "image": {"name": "a"}}));
}

#[test]
fn test_exclude_through_mapping_values() {
    let registry = setup_registry();
    let item = bind_item(
        &registry,
        json!({
            "name": "Foo",
            "price": 1.0,
            "gallery": {
                "front": {"url": "http://example.com/f.png", "name": "front"},
                "back": {"url": "http://example.com/b.png", "name": "back"}
            }
        }),
    );

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().exclude(["gallery.url"]).exclude_unset())
        .unwrap();
    assert_eq!(
        out,
        json!({"name": "Foo", "price": 1.0, "gallery": {"front": {"name": "front"}, "back": {"name": "back"}}})
    );
}

#[test]
fn test_null_nested_object_passes_through_include() {
    let registry = setup_registry();
    let item = bind_item(&registry, json!({"name": "Foo", "price": 1.0}));

    let out = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().include(["image.name"]))
        .unwrap();
    assert_eq!(out, json!({"image": null}));
}

// =============================================================================
// Configuration Error Tests
// =============================================================================

#[test]
fn test_include_with_exclude_rejected() {
    let registry = setup_registry();
    let item = bind_item(&registry, json!({"name": "Foo", "price": 1.0}));

    let err = ResponseShaper::new(&registry)
        .shape(
            "Item",
            &item,
            &ShapeDirective::new().include(["name"]).exclude(["price"]),
        )
        .unwrap_err();
    assert_eq!(err, ShapeError::IncludeExcludeConflict);
    assert_eq!(err.code(), "MG_SHAPE_CONFIG");
}

#[test]
fn test_double_dot_path_rejected() {
    let registry = setup_registry();
    let item = bind_item(&registry, json!({"name": "Foo", "price": 1.0}));

    let err = ResponseShaper::new(&registry)
        .shape("Item", &item, &ShapeDirective::new().include(["name", "image..name"]))
        .unwrap_err();
    assert!(matches!(err, ShapeError::InvalidPath { ref path, .. } if path == "image..name"));
}

#[test]
fn test_unknown_response_schema() {
    let registry = setup_registry();
    let item = bind_item(&registry, json!({"name": "Foo", "price": 1.0}));

    let err = ResponseShaper::new(&registry)
        .shape("Ghost", &item, &ShapeDirective::new())
        .unwrap_err();
    assert_eq!(err.code(), "MG_SCHEMA_NOT_FOUND");
}

// =============================================================================
// Raw Response Tests
// =============================================================================

#[test]
fn test_shape_raw_rejects_invalid_response() {
    let registry = setup_registry();

    let err = ResponseShaper::new(&registry)
        .shape_raw("Item", &json!({"name": "Foo", "price": -1}), &ShapeDirective::new())
        .unwrap_err();
    assert_eq!(err.code(), "MG_RESPONSE_VALIDATION");
}

#[test]
fn test_shape_raw_list() {
    let registry = setup_registry();

    let out = ResponseShaper::new(&registry)
        .shape_raw(
            "Item",
            &json!([{"name": "A", "price": 1.0}, {"name": "B", "price": 2.0, "tax": 0.1}]),
            &ShapeDirective::new().exclude_unset(),
        )
        .unwrap();
    assert_eq!(
        out,
        json!([{"name": "A", "price": 1.0}, {"name": "B", "price": 2.0, "tax": 0.1}])
    );
}

// =============================================================================
// Conversion Tests
// =============================================================================

fn setup_aliased_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .define(
            SchemaSpec::builder("Thumb")
                .field(FieldSpec::new("src", FieldType::String).alias("srcUrl"))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("ProfileIn")
                .field(FieldSpec::new("name", FieldType::String))
                .field(FieldSpec::new("secret", FieldType::String))
                .field(FieldSpec::new("nick", FieldType::String).alias("nickName").default_null())
                .field(FieldSpec::new("thumb", FieldType::object("Thumb")).default_null())
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("ProfileOut")
                .field(FieldSpec::new("name", FieldType::String))
                .field(FieldSpec::new("nick", FieldType::String).alias("nickName").default_null())
                .field(FieldSpec::new("thumb", FieldType::object("Thumb")).default_null())
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("ProfileCard")
                .field(FieldSpec::new("name", FieldType::String))
                .field(FieldSpec::new("nick", FieldType::String).alias("nickName"))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

#[test]
fn test_conversion_keeps_aliased_fields() {
    let registry = setup_aliased_registry();
    let profile = RequestBinder::new(&registry)
        .bind_json(
            "ProfileIn",
            &json!({"name": "x", "secret": "s", "nickName": "n", "thumb": {"srcUrl": "a.png"}}),
        )
        .unwrap();
    let shaper = ResponseShaper::new(&registry);

    let out = shaper.shape("ProfileOut", &profile, &ShapeDirective::new()).unwrap();
    assert_eq!(out, json!({"name": "x", "nick": "n", "thumb": {"src": "a.png"}}));

    let out = shaper
        .shape("ProfileOut", &profile, &ShapeDirective::new().exclude_unset())
        .unwrap();
    assert_eq!(out, json!({"name": "x", "nick": "n", "thumb": {"src": "a.png"}}));
}

#[test]
fn test_conversion_satisfies_required_aliased_field() {
    let registry = setup_aliased_registry();
    let profile = RequestBinder::new(&registry)
        .bind_json("ProfileIn", &json!({"name": "x", "secret": "s", "nickName": "n"}))
        .unwrap();

    let out = ResponseShaper::new(&registry)
        .shape("ProfileCard", &profile, &ShapeDirective::new())
        .unwrap();
    assert_eq!(out, json!({"name": "x", "nick": "n"}));
}
