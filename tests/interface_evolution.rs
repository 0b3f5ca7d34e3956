//! Interface schema and versioning tests
//!
//! Builds interface schemas the way a registry would capture them at two
//! points in time, then checks the compatibility verdicts and the version
//! identifiers derived from them.

use objwire::{
    build_interface_schema, diff_interface, instance_version, interface_hash, object_version,
    InterfaceDescriptor, ObjectVersion, OperationDescriptor, SchemaCache, TypeDescriptor as T,
    Value, VersionBump, VERSION_HASH_LENGTH,
};

/// Route the analyzer's per-decision log lines through the test harness;
/// `RUST_LOG=info cargo test` shows the bump reasoning.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn counter_v1() -> InterfaceDescriptor {
    InterfaceDescriptor::new("Counter", "A remote counter")
        .operation(
            OperationDescriptor::new("add")
                .param("amount", T::int())
                .returns(T::int()),
        )
        .operation(OperationDescriptor::new("reset"))
}

#[test]
fn identical_interfaces_need_no_bump() {
    init_logging();
    let old = build_interface_schema(&counter_v1()).unwrap();
    let new = build_interface_schema(&counter_v1()).unwrap();
    assert_eq!(diff_interface(&old, &new).unwrap(), VersionBump::None);
}

#[test]
fn added_operation_is_minor() {
    init_logging();
    let old = build_interface_schema(&counter_v1()).unwrap();
    let new = build_interface_schema(
        &counter_v1().operation(OperationDescriptor::new("peek").returns(T::int())),
    )
    .unwrap();
    assert_eq!(diff_interface(&old, &new).unwrap(), VersionBump::Minor);
}

#[test]
fn removed_operation_is_major() {
    init_logging();
    let old = build_interface_schema(
        &counter_v1().operation(OperationDescriptor::new("peek").returns(T::int())),
    )
    .unwrap();
    let new = build_interface_schema(&counter_v1()).unwrap();
    assert_eq!(diff_interface(&old, &new).unwrap(), VersionBump::Major);
}

#[test]
fn parameter_gaining_default_is_patch() {
    init_logging();
    let old = build_interface_schema(&counter_v1()).unwrap();
    let new = build_interface_schema(
        &InterfaceDescriptor::new("Counter", "A remote counter")
            .operation(
                OperationDescriptor::new("add")
                    .param_with_default("amount", T::int(), Value::Int(1))
                    .returns(T::int()),
            )
            .operation(OperationDescriptor::new("reset")),
    )
    .unwrap();
    // "amount" left the required list: existing callers keep working.
    assert_eq!(diff_interface(&old, &new).unwrap(), VersionBump::Patch);
}

#[test]
fn new_required_parameter_is_major() {
    init_logging();
    let old = build_interface_schema(&counter_v1()).unwrap();
    let new = build_interface_schema(
        &InterfaceDescriptor::new("Counter", "A remote counter")
            .operation(
                OperationDescriptor::new("add")
                    .param("amount", T::int())
                    .param("carry", T::boolean())
                    .returns(T::int()),
            )
            .operation(OperationDescriptor::new("reset")),
    )
    .unwrap();
    assert_eq!(diff_interface(&old, &new).unwrap(), VersionBump::Major);
}

#[test]
fn parameter_type_change_is_major() {
    init_logging();
    let old = build_interface_schema(&counter_v1()).unwrap();
    let new = build_interface_schema(
        &InterfaceDescriptor::new("Counter", "A remote counter")
            .operation(
                OperationDescriptor::new("add")
                    .param("amount", T::string())
                    .returns(T::int()),
            )
            .operation(OperationDescriptor::new("reset")),
    )
    .unwrap();
    assert_eq!(diff_interface(&old, &new).unwrap(), VersionBump::Major);
}

#[test]
fn interface_hash_ignores_declaration_order() {
    let a = InterfaceDescriptor::new("Store", "kv").operation(
        OperationDescriptor::new("put")
            .param("key", T::string())
            .param("value", T::record_of("Entry", vec![("a", T::int()), ("b", T::string())])),
    );
    let b = InterfaceDescriptor::new("Store", "kv").operation(
        OperationDescriptor::new("put")
            .param("key", T::string())
            .param("value", T::record_of("Entry", vec![("b", T::string()), ("a", T::int())])),
    );

    let ha = interface_hash(&build_interface_schema(&a).unwrap());
    let hb = interface_hash(&build_interface_schema(&b).unwrap());
    assert_eq!(ha, hb);
    assert_eq!(ha.as_str().len(), VERSION_HASH_LENGTH);
}

#[test]
fn interface_hash_moves_when_wire_shape_changes() {
    let old = build_interface_schema(&counter_v1()).unwrap();
    let changed = build_interface_schema(
        &InterfaceDescriptor::new("Counter", "A remote counter")
            .operation(
                OperationDescriptor::new("add")
                    .param("amount", T::float())
                    .returns(T::int()),
            )
            .operation(OperationDescriptor::new("reset")),
    )
    .unwrap();
    assert_ne!(interface_hash(&old), interface_hash(&changed));
}

#[test]
fn openapi_document_shape() {
    let schema = build_interface_schema(&counter_v1()).unwrap();
    let doc = schema.to_openapi();

    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["info"]["title"], "Counter");

    let add = &doc["paths"]["/add"]["post"];
    let request = &add["requestBody"]["content"]["application/json"]["schema"];
    assert_eq!(request["type"], "object");
    assert_eq!(request["required"][0], "amount");

    // Non-object responses are enveloped, matching the codec.
    let response = &add["responses"]["200"]["content"]["application/json"]["schema"];
    assert_eq!(response["properties"]["value"]["type"], "integer");

    // An operation with no return type still documents a 200.
    assert_eq!(doc["paths"]["/reset"]["post"]["responses"]["200"]["description"], "ok");
}

#[test]
fn version_composition_and_compatibility() {
    let schema = build_interface_schema(&counter_v1()).unwrap();

    let obj = object_version(&schema, "fn add(amount: i64) -> i64 { ... }");
    assert!(obj.logic.is_some());
    assert!(obj.state.is_none());

    let state_descriptor = T::record_of("Counter", vec![("count", T::int())]);
    let inst = instance_version(
        &schema,
        "fn add(amount: i64) -> i64 { ... }",
        &Value::record([("count", Value::Int(3))]),
        &state_descriptor,
    )
    .unwrap();

    // Same interface and logic: the instance satisfies the object constraint.
    assert!(inst.satisfies(&obj));

    // Parse back from the display form.
    let reparsed = ObjectVersion::parse(&inst.to_string()).unwrap();
    assert_eq!(reparsed, inst);

    // Different accumulated state: same object constraint still satisfied,
    // full instance constraint no longer is.
    let other = instance_version(
        &schema,
        "fn add(amount: i64) -> i64 { ... }",
        &Value::record([("count", Value::Int(4))]),
        &state_descriptor,
    )
    .unwrap();
    assert!(other.satisfies(&obj));
    assert!(!other.satisfies(&inst));
}

#[test]
fn cache_returns_the_same_tree_across_threads() {
    let cache = std::sync::Arc::new(SchemaCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            std::thread::spawn(move || cache.get_or_build(&counter_v1()).unwrap())
        })
        .collect();

    let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(cache.len(), 1);
    for schema in &schemas {
        assert_eq!(schema.as_ref(), schemas[0].as_ref());
    }
}
