//! Binding Invariant Tests
//!
//! - Every absent required field is reported as Missing, with no partial value
//! - Absent optional fields take their default and stay unset
//! - Numeric bounds: exclusive bounds reject the boundary, inclusive accept it
//! - Nested failures are atomic and carry element paths
//! - Query and header lookups honor aliases, repetition and case

use modelgate::binding::{BindError, ErrorKind, RawInputs, RequestBinder};
use modelgate::schema::{FieldSpec, FieldType, ParamSource, SchemaRegistry, SchemaSpec};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .define(
            SchemaSpec::builder("Item")
                .field(FieldSpec::new("name", FieldType::String))
                .field(FieldSpec::new("description", FieldType::String).default_null())
                .field(FieldSpec::new("price", FieldType::Float).gt(0.0))
                .field(FieldSpec::new("tax", FieldType::Float).default_null())
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("Offer")
                .field(FieldSpec::new("name", FieldType::String))
                .field(FieldSpec::new("items", FieldType::sequence(FieldType::object("Item"))))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("Bounds")
                .field(FieldSpec::query("inclusive", FieldType::Int).ge(0.0).le(1000.0))
                .field(FieldSpec::query("exclusive", FieldType::Float).gt(0.0).lt(10.5))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("Lookups")
                .field(FieldSpec::query("q", FieldType::String).default_null().alias("item-query"))
                .field(FieldSpec::query("tags", FieldType::sequence(FieldType::String)).default(json!(["foo", "bar"])))
                .field(FieldSpec::header("user_agent", FieldType::String).default_null())
                .field(FieldSpec::header("x_token", FieldType::sequence(FieldType::String)).default_null())
                .field(FieldSpec::header("device", FieldType::String).default_null().alias("X-Liftit-Device"))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

fn validation_errors(err: BindError) -> Vec<modelgate::binding::FieldError> {
    err.as_validation()
        .expect("expected a validation batch")
        .errors()
        .to_vec()
}

// =============================================================================
// Missing and Default Tests
// =============================================================================

#[test]
fn test_each_missing_required_field_reported() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let err = binder
        .bind("Item", &RawInputs::body_only(json!({"description": "x"})))
        .unwrap_err();
    let errors = validation_errors(err);

    let missing: Vec<&str> = errors
        .iter()
        .filter(|e| e.kind == ErrorKind::Missing)
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(missing, vec!["name", "price"]);
    assert!(errors.iter().all(|e| e.location == ParamSource::Body));
}

#[test]
fn test_defaults_filled_and_unset() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let item = binder
        .bind("Item", &RawInputs::body_only(json!({"name": "Foo", "price": 35.4})))
        .unwrap();

    assert_eq!(item.len(), 4);
    assert!(item.get("tax").unwrap().is_null());
    assert!(item.get("description").unwrap().is_null());
    let set: Vec<&str> = item.explicitly_set().collect();
    assert_eq!(set, vec!["name", "price"]);
}

#[test]
fn test_explicit_value_equal_to_default_is_set() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let item = binder
        .bind(
            "Item",
            &RawInputs::body_only(json!({"name": "Foo", "price": 1.5, "tax": null})),
        )
        .unwrap();
    assert!(item.is_set("tax"));
    assert!(!item.is_set("description"));
}

// =============================================================================
// Constraint Tests
// =============================================================================

#[test]
fn test_inclusive_bounds_accept_boundary() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    for value in ["0", "1000"] {
        let inputs = RawInputs::new()
            .with_query("inclusive", value)
            .with_query("exclusive", "5");
        assert!(binder.bind("Bounds", &inputs).is_ok(), "{} should pass", value);
    }
}

#[test]
fn test_exclusive_bounds_reject_boundary() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    for (value, constraint) in [("0", "gt"), ("10.5", "lt")] {
        let inputs = RawInputs::new()
            .with_query("inclusive", "1")
            .with_query("exclusive", value);
        let errors = validation_errors(binder.bind("Bounds", &inputs).unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location, ParamSource::Query);
        assert!(matches!(
            &errors[0].kind,
            ErrorKind::ConstraintViolation { constraint: c, .. } if c == constraint
        ));
    }
}

#[test]
fn test_gt_zero_rejects_zero_price() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let errors = validation_errors(
        binder
            .bind("Item", &RawInputs::body_only(json!({"name": "Foo", "price": 0})))
            .unwrap_err(),
    );
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, "price");
    assert_eq!(errors[0].code(), "MG_CONSTRAINT_VIOLATION");
}

// =============================================================================
// Nested Binding Tests
// =============================================================================

#[test]
fn test_nested_failure_is_atomic() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let body = json!({
        "name": "Bundle",
        "items": [
            {"name": "A", "price": 1.0},
            {"name": "B", "price": -2.0},
            {"name": "C", "price": 3.0}
        ]
    });
    let err = binder.bind("Offer", &RawInputs::body_only(body)).unwrap_err();

    let batch = err.as_validation().unwrap();
    assert_eq!(batch.len(), 1);
    assert!(batch.errors()[0].path.starts_with("items[1]"));
    assert_eq!(batch.errors()[0].path, "items[1].price");
    assert_eq!(batch.at_path("items[1]").count(), 1);
    assert_eq!(batch.at_path("items[0]").count(), 0);
}

#[test]
fn test_nested_errors_all_collected() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let body = json!({
        "name": "Bundle",
        "items": [{"price": 1.0}, "not an item", {"name": "C", "price": "free"}]
    });
    let errors = validation_errors(binder.bind("Offer", &RawInputs::body_only(body)).unwrap_err());
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["items[0].name", "items[1]", "items[2].price"]);
}

#[test]
fn test_nested_success_marks_each_level() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let body = json!({"name": "Bundle", "items": [{"name": "A", "price": 1.0, "tax": 0.5}]});
    let offer = binder.bind("Offer", &RawInputs::body_only(body)).unwrap();

    let items = offer.get("items").unwrap().as_seq().unwrap();
    let first = items[0].as_object().unwrap();
    assert!(first.is_set("tax"));
    assert!(!first.is_set("description"));
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[test]
fn test_alias_wins_over_name() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let inputs = RawInputs::new().with_query_string("q=ignored&item-query=fixedquery");
    let bound = binder.bind("Lookups", &inputs).unwrap();
    assert_eq!(bound.get_str("q"), Some("fixedquery"));
}

#[test]
fn test_repeated_query_values() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let bound = binder
        .bind("Lookups", &RawInputs::new().with_query_string("tags=a&tags=b&tags=c"))
        .unwrap();
    assert_eq!(
        bound.get("tags").unwrap().to_json(),
        json!(["a", "b", "c"])
    );

    let defaulted = binder.bind("Lookups", &RawInputs::new()).unwrap();
    assert_eq!(defaulted.get("tags").unwrap().to_json(), json!(["foo", "bar"]));
    assert!(!defaulted.is_set("tags"));
}

#[test]
fn test_scalar_query_takes_last_value() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let bound = binder
        .bind("Lookups", &RawInputs::new().with_query_string("item-query=a&item-query=b"))
        .unwrap();
    assert_eq!(bound.get_str("q"), Some("b"));
}

#[test]
fn test_headers_case_insensitive_and_converted() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);

    let inputs = RawInputs::new()
        .with_header("User-Agent", "curl/8")
        .with_header("X-Token", "foo")
        .with_header("x-token", "bar")
        .with_header("x-liftit-device", "phone");
    let bound = binder.bind("Lookups", &inputs).unwrap();

    assert_eq!(bound.get_str("user_agent"), Some("curl/8"));
    assert_eq!(bound.get("x_token").unwrap().to_json(), json!(["foo", "bar"]));
    assert_eq!(bound.get_str("device"), Some("phone"));
}

// =============================================================================
// Extra Field Tests
// =============================================================================

fn setup_strict_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .define(
            SchemaSpec::builder("Pic")
                .forbid_extra()
                .field(FieldSpec::new("url", FieldType::String))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .define(
            SchemaSpec::builder("Strict")
                .forbid_extra()
                .field(FieldSpec::new("x", FieldType::Int))
                .field(FieldSpec::new("img", FieldType::object("Pic")))
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
}

#[test]
fn test_forbidden_extras_reported_at_each_level() {
    let registry = setup_strict_registry();
    let binder = RequestBinder::new(&registry);

    let body = json!({"x": 1, "y": 2, "img": {"url": "u", "x": 3}});
    let errors = validation_errors(binder.bind("Strict", &RawInputs::body_only(body)).unwrap_err());

    let reported: Vec<(&str, &str)> = errors.iter().map(|e| (e.path.as_str(), e.code())).collect();
    assert_eq!(reported, vec![("y", "MG_EXTRA_FIELD"), ("img.x", "MG_EXTRA_FIELD")]);
    assert!(errors.iter().all(|e| e.location == ParamSource::Body));
}

#[test]
fn test_extras_aggregate_with_other_failures() {
    let registry = setup_strict_registry();
    let binder = RequestBinder::new(&registry);

    let body = json!({"y": 2, "img": {"url": "u", "x": 3}});
    let errors = validation_errors(binder.bind("Strict", &RawInputs::body_only(body)).unwrap_err());

    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["y", "x", "img.x"]);
    let kinds: Vec<&ErrorKind> = errors.iter().map(|e| &e.kind).collect();
    assert_eq!(kinds, vec![&ErrorKind::ExtraField, &ErrorKind::Missing, &ErrorKind::ExtraField]);
}

#[test]
fn test_declared_keys_accepted_under_forbid() {
    let registry = setup_strict_registry();
    let binder = RequestBinder::new(&registry);

    let body = json!({"x": 1, "img": {"url": "u"}});
    let strict = binder.bind("Strict", &RawInputs::body_only(body)).unwrap();
    assert_eq!(strict.get_i64("x"), Some(1));
}

// =============================================================================
// Mapping Key Tests
// =============================================================================

#[test]
fn test_equivalent_mapping_keys_collapse_last_wins() {
    let mut registry = SchemaRegistry::new();
    registry
        .define(
            SchemaSpec::builder("Weights")
                .field(FieldSpec::new("weights", FieldType::mapping(FieldType::Int, FieldType::Float)).max_length(1))
                .field(FieldSpec::new("label", FieldType::String).default_null())
                .build()
                .unwrap(),
        )
        .unwrap();
    let binder = RequestBinder::new(&registry);

    let body = json!({"weights": {"1": 0.5, "01": 2.0}});
    let bound = binder.bind("Weights", &RawInputs::body_only(body)).unwrap();
    assert_eq!(bound.get("weights").unwrap().to_json(), json!({"1": 2.0}));
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// Same input binds to the same value every time.
#[test]
fn test_binding_is_deterministic() {
    let registry = setup_registry();
    let binder = RequestBinder::new(&registry);
    let inputs = RawInputs::body_only(json!({"name": "Foo", "price": 2.0}));

    let first = binder.bind("Item", &inputs).unwrap();
    for _ in 0..50 {
        assert_eq!(binder.bind("Item", &inputs).unwrap(), first);
    }
}
