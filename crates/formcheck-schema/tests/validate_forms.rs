//! End-to-end validation: ESTree documents in, diagnostics out.

use formcheck_core::{locate_forms, FormLocator, SyntaxNode};
use formcheck_schema::{
    DiagnosticKind, DiagnosticSink, FieldValidator, FormSchema, Level, RequiredPolicy,
    SchemaValidator, ValidatorConfig,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// ESTree builders
// ---------------------------------------------------------------------------

fn at(mut node: Value, line: u64) -> Value {
    node["loc"] = json!({"start": {"line": line, "column": 2}, "end": {"line": line, "column": 30}});
    node
}

fn string(value: &str) -> Value {
    json!({"type": "Literal", "value": value, "raw": format!("{value:?}")})
}

fn number(value: f64) -> Value {
    json!({"type": "Literal", "value": value, "raw": value.to_string()})
}

fn boolean(value: bool) -> Value {
    json!({"type": "Literal", "value": value, "raw": value.to_string()})
}

fn arrow() -> Value {
    json!({
        "type": "ArrowFunctionExpression",
        "params": [],
        "body": {"type": "BlockStatement", "body": []},
        "expression": false
    })
}

fn call(callee: &str) -> Value {
    json!({
        "type": "CallExpression",
        "callee": {"type": "Identifier", "name": callee},
        "arguments": []
    })
}

fn prop(key: &str, value: Value) -> Value {
    json!({
        "type": "Property",
        "key": {"type": "Identifier", "name": key},
        "value": value,
        "kind": "init",
        "computed": false,
        "method": false,
        "shorthand": false
    })
}

fn object(properties: Vec<Value>) -> Value {
    json!({"type": "ObjectExpression", "properties": properties})
}

fn array(elements: Vec<Value>) -> Value {
    json!({"type": "ArrayExpression", "elements": elements})
}

fn program(binding: &str, init: Value) -> Value {
    json!({
        "type": "Program",
        "sourceType": "module",
        "body": [{
            "type": "VariableDeclaration",
            "kind": "const",
            "start": 0,
            "end": 400,
            "declarations": [{
                "type": "VariableDeclarator",
                "start": 6,
                "end": 399,
                "id": {"type": "Identifier", "name": binding},
                "init": init
            }]
        }]
    })
}

fn field(id: &str, ty: Value) -> Value {
    object(vec![prop("id", string(id)), prop("type", at(ty, 7))])
}

fn reference_form(field_type: Value) -> Value {
    object(vec![
        prop("title", string("t")),
        prop(
            "steps",
            array(vec![object(vec![
                prop("name", string("s1")),
                prop("stepperCallout", boolean(true)),
                prop("fields", array(vec![field("f1", field_type)])),
            ])]),
        ),
    ])
}

fn validate_program(validator: &SchemaValidator, program: &Value) -> DiagnosticSink {
    let forms = locate_forms(program, &FormLocator::default());
    assert_eq!(forms.len(), 1, "expected exactly one form");
    let tree = forms[0].lower().unwrap();
    validator.validate(&tree)
}

fn kinds(sink: &DiagnosticSink) -> Vec<DiagnosticKind> {
    sink.iter().map(|d| d.kind).collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_reference_form_is_clean() {
    let validator = SchemaValidator::canonical().unwrap();
    let sink = validate_program(&validator, &program("form", reference_form(string("text"))));
    assert!(sink.is_empty(), "unexpected diagnostics:\n{sink}");
}

#[test]
fn test_numeric_field_type_is_invalid_type() {
    let validator = SchemaValidator::canonical().unwrap();
    let sink = validate_program(&validator, &program("form", reference_form(number(123.0))));
    assert_eq!(kinds(&sink), vec![DiagnosticKind::InvalidType]);

    let d = &sink.diagnostics()[0];
    assert_eq!(d.path.to_string(), "type");
    assert_eq!(d.level, Level::Field);
    assert_eq!(d.pointer, "steps[0].fields[0].type");
    assert_eq!(d.location.line, 7);
    assert_eq!(
        d.message,
        "property \"type\" has invalid type number; expected string,function"
    );
}

#[test]
fn test_function_field_type_is_accepted() {
    let validator = SchemaValidator::canonical().unwrap();
    let sink = validate_program(&validator, &program("form", reference_form(arrow())));
    assert!(sink.is_empty(), "unexpected diagnostics:\n{sink}");
}

#[test]
fn test_other_bindings_are_ignored() {
    let source = program("config", reference_form(number(1.0)));
    let forms = locate_forms(&source, &FormLocator::default());
    assert!(forms.is_empty());
}

#[test]
fn test_nested_fields_attributed_to_own_nodes() {
    // fieldB declares fields: [fieldC]; each carries one unknown key.
    let field_c = object(vec![prop("id", string("c")), prop("colourC", string("x"))]);
    let field_b = object(vec![
        prop("id", string("b")),
        prop("colourB", string("x")),
        prop("fields", array(vec![field_c])),
    ]);
    let field_a = object(vec![prop("id", string("a")), prop("colourA", string("x"))]);
    let group = object(vec![prop("id", string("group")), prop("fields", array(vec![field_a, field_b]))]);

    let validator = SchemaValidator::canonical().unwrap();
    let tree = formcheck_core::lower_expression(&group).unwrap();
    let sink = FieldValidator::new(&validator).validate(&tree);

    let reported: Vec<(&str, String)> = sink
        .iter()
        .map(|d| (d.pointer.as_str(), d.path.to_string()))
        .collect();
    assert_eq!(
        reported,
        vec![
            ("fields[0].colourA", "colourA".to_string()),
            ("fields[1].colourB", "colourB".to_string()),
            ("fields[1].fields[0].colourC", "colourC".to_string()),
        ]
    );
    assert!(sink.iter().all(|d| d.kind == DiagnosticKind::UnknownProperty));
}

#[test]
fn test_spread_and_call_steps_are_skipped() {
    let form = object(vec![
        prop(
            "steps",
            array(vec![
                call("buildStep"),
                json!({"type": "SpreadElement", "argument": {"type": "Identifier", "name": "shared"}}),
            ]),
        ),
    ]);
    let validator = SchemaValidator::canonical().unwrap();
    let sink = validate_program(&validator, &program("form", form));
    assert!(sink.is_empty(), "unexpected diagnostics:\n{sink}");
}

#[test]
fn test_object_steps_is_one_malformed_container() {
    let form = object(vec![prop(
        "steps",
        object(vec![prop("fields", array(vec![object(vec![prop("bogus", string("x"))])]))]),
    )]);
    let validator = SchemaValidator::canonical().unwrap();
    let sink = validate_program(&validator, &program("form", form));
    assert_eq!(kinds(&sink), vec![DiagnosticKind::MalformedContainer]);
}

#[test]
fn test_traversal_order() {
    let form = object(vec![
        prop("bogus", string("x")),
        prop(
            "steps",
            array(vec![
                object(vec![
                    prop("fields", array(vec![object(vec![prop("min", string("1"))])])),
                    prop("layout", string("triple")),
                ]),
                object(vec![prop("fields", string("none"))]),
            ]),
        ),
        prop("debug", string("yes")),
    ]);
    let validator = SchemaValidator::canonical().unwrap();
    let sink = validate_program(&validator, &program("form", form));
    let pointers: Vec<&str> = sink.iter().map(|d| d.pointer.as_str()).collect();
    assert_eq!(
        pointers,
        vec![
            "bogus",
            "debug",
            "steps[0].layout",
            "steps[0].fields[0].min",
            "steps[1].fields",
        ]
    );
    assert_eq!(
        kinds(&sink),
        vec![
            DiagnosticKind::UnknownProperty,
            DiagnosticKind::InvalidType,
            DiagnosticKind::InvalidValue,
            DiagnosticKind::InvalidType,
            DiagnosticKind::MalformedContainer,
        ]
    );
}

#[test]
fn test_custom_tables_and_required_sets() {
    let mut schema = FormSchema::new(RequiredPolicy::None).unwrap();
    schema
        .replace_table(Level::Field, ["id:string", "kind:string[\"a\",\"b\"]", "fields:array"])
        .unwrap();
    schema.set_required(Level::Field, ["id"]).unwrap();
    let validator = SchemaValidator::new(schema, ValidatorConfig::default());

    let tree = SyntaxNode::object([
        ("kind", SyntaxNode::string("c")),
        ("type", SyntaxNode::string("text")),
    ]);
    let sink = FieldValidator::new(&validator).validate(&tree);
    assert_eq!(
        kinds(&sink),
        vec![
            DiagnosticKind::MissingRequiredProperty,
            DiagnosticKind::InvalidValue,
            DiagnosticKind::UnknownProperty,
        ]
    );
}

#[test]
fn test_validator_is_shareable_across_threads() {
    let validator = std::sync::Arc::new(SchemaValidator::canonical().unwrap());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let validator = validator.clone();
            std::thread::spawn(move || {
                let tree = SyntaxNode::object([
                    ("steps", SyntaxNode::array(vec![])),
                    ("title", SyntaxNode::number(f64::from(i))),
                ]);
                validator.validate(&tree).len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
}
