use serde_json::json;
use shape_guard::{
    DynSchema, ErrorCode, JsonSchemaOptions, ParseError, PathSegment, Schema, Target, Value, array, coerce,
    discriminated_union, intersection, lazy, literal, number, object, registry, string,
};

fn path(segments: &[&str]) -> Vec<PathSegment> { segments.iter().map(|s| PathSegment::from(*s)).collect() }

#[test]
fn object_reports_every_field() {
    let s = object().field("name", string().min(1)).field("age", number().int().gte(0.0));
    let err = s.parse(json!({"name": "", "age": -1})).unwrap_err();
    assert!(err.issues().len() >= 2);
    assert_eq!(err.issues()[0].path, path(&["name"]));
    assert_eq!(err.issues()[0].code, ErrorCode::TooSmall);
    assert_eq!(err.issues()[1].path, path(&["age"]));
    assert_eq!(err.issues()[1].code, ErrorCode::TooSmall);
}

#[test]
fn array_json_schema() {
    assert_eq!(
        array(number()).min(1).max(10).to_json_schema(),
        json!({"type": "array", "items": {"type": "number"}, "minItems": 1, "maxItems": 10})
    );
}

#[test]
fn intersection_missing_side() {
    let s = intersection(object().field("name", string()), object().field("age", number()));
    let err = s.parse(json!({"name": "Alice"})).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].code, ErrorCode::InvalidIntersection);
}

#[test]
fn discriminated_union_pending_status() {
    let s = discriminated_union(
        "status",
        vec![
            object().field("status", literal("success")).field("data", string()),
            object().field("status", literal("error")).field("message", string()),
        ],
    )
    .unwrap();
    let err = s.parse(json!({"status": "pending"})).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].code, ErrorCode::InvalidUnion);
    assert!(err.issues()[0].message.contains("'success'"));
    assert!(err.issues()[0].message.contains("'error'"));
}

fn tree() -> DynSchema {
    object()
        .field("label", string())
        .field("children", array(lazy(tree)))
        .id("scenario_Tree")
        .into_dyn()
}

#[test]
fn self_referential_json_schema_uses_one_definition() {
    let doc = tree().to_json_schema();
    assert_eq!(doc["$ref"], json!("#/$defs/scenario_Tree"));
    let defs = doc["$defs"].as_object().unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(
        defs["scenario_Tree"]["properties"]["children"],
        json!({"type": "array", "items": {"$ref": "#/$defs/scenario_Tree"}})
    );
    assert!(registry::has("scenario_Tree"));

    let draft07 = tree().to_json_schema_with(&JsonSchemaOptions::new().target(Target::Draft07));
    assert_eq!(draft07["$ref"], json!("#/definitions/scenario_Tree"));
}

#[test]
fn recursive_data_validates_deeply() {
    let input = json!({"label": "a", "children": [{"label": "b", "children": [{"label": 3, "children": []}]}]});
    let err = tree().parse(input).unwrap_err();
    let expected: Vec<PathSegment> =
        vec!["children".into(), 0usize.into(), "children".into(), 0usize.into(), "label".into()];
    assert_eq!(err.issues()[0].path, expected);
}

#[test]
fn signup_form_end_to_end() {
    let signup = object()
        .field("email", string().trim().to_lower_case().email())
        .field("password", string().min(8))
        .field("confirm", string())
        .field("age", coerce::number().int().gte(13.0).optional())
        .field("tags", string().array().max(3).default(Value::Array(vec![])))
        .refine_at(
            |v| v.get("password") == v.get("confirm"),
            "Passwords do not match",
            vec!["confirm".into()],
        );

    let ok = signup
        .parse(json!({"email": "  Ada@Example.COM ", "password": "hunter22", "confirm": "hunter22", "age": "36"}))
        .unwrap();
    assert_eq!(
        ok.to_json(),
        json!({"email": "ada@example.com", "password": "hunter22", "confirm": "hunter22", "age": 36, "tags": []})
    );

    let err: ParseError = signup
        .parse(json!({"email": "ada", "password": "short", "confirm": "short"}))
        .unwrap_err();
    let flat = err.flatten();
    assert_eq!(flat.field_errors["email"], vec!["Invalid email"]);
    assert_eq!(flat.field_errors["password"], vec!["String must contain at least 8 character(s)"]);
    // refinement skipped: the object already failed
    assert!(!flat.field_errors.contains_key("confirm"));

    let err = signup
        .parse(json!({"email": "a@b.co", "password": "longenough", "confirm": "different"}))
        .unwrap_err();
    assert_eq!(err.to_string(), "confirm: Passwords do not match");
}

#[test]
fn safe_parse_shape_is_success_data_or_error() {
    let s = number().positive();
    assert_eq!(serde_json::to_value(s.safe_parse(1)).unwrap(), json!({"success": true, "data": 1}));
    let failure = serde_json::to_value(s.safe_parse(-1)).unwrap();
    assert_eq!(failure["success"], json!(false));
    assert_eq!(failure["error"]["issues"][0]["code"], json!("too_small"));
    assert_eq!(failure["error"]["issues"][0]["path"], json!([]));
}
