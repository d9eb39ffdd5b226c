//! Integration Tests for Reactive Objects
//!
//! These tests verify that the factory, the identity registry and the
//! interception handlers work together correctly.

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use serde_json::json;

use reflex_core::object::{ObjectRef, PropertyKey, ProxyHandler, Value, MAX_LENGTH};
use reflex_core::reactive::{Change, ChangeLog, OperationKind, Runtime};
use reflex_core::{ObjectError, ObjectResult, RuntimeConfig};

fn runtime_with_log() -> (Runtime, ChangeLog) {
    let log = ChangeLog::new();
    let runtime = Runtime::builder().notifier(log.clone()).build();
    (runtime, log)
}

fn key(name: &str) -> PropertyKey {
    PropertyKey::from(name)
}

/// reactive(x) is the same wrapper every time.
#[test]
fn wrapping_is_unique() {
    let runtime = Runtime::new();
    let raw = Value::from_json(json!({"a": 1}));

    let first = runtime.reactive(raw.clone());
    let second = runtime.reactive(raw.clone());

    assert_eq!(first, second);
    assert_ne!(first, raw);
}

/// reactive(reactive(x)) is reactive(x).
#[test]
fn wrapping_is_idempotent() {
    let runtime = Runtime::new();
    let wrapper = runtime.reactive(Value::from_json(json!([1, 2])));

    assert_eq!(runtime.reactive(wrapper.clone()), wrapper);
    assert_eq!(runtime.reactive(runtime.reactive(wrapper.clone())), wrapper);
}

#[test]
fn primitives_are_not_wrapped() {
    let runtime = Runtime::new();

    for value in [Value::Undefined, Value::Null, Value::from(true), Value::from(2.5), Value::from("s")] {
        assert_eq!(runtime.reactive(value.clone()), value);
    }
    assert_eq!(runtime.registered(), 0);
}

/// Nested objects are wrapped when read through a wrapper, and only then.
#[test]
fn nested_objects_are_wrapped_lazily() {
    let runtime = Runtime::new();
    let raw = Value::from_json(json!({"a": {"b": 1}, "untouched": {"c": 2}}));
    let raw_obj = raw.as_object().unwrap();
    let wrapper = runtime.reactive(raw.clone()).into_object().unwrap();

    assert_eq!(runtime.registered(), 1);

    let nested = wrapper.get("a").unwrap();
    let raw_nested = raw_obj.get("a").unwrap();

    assert_ne!(nested, raw_nested);
    assert!(runtime.is_reactive(&nested));
    assert!(!raw_nested.as_object().unwrap().is_proxy());
    assert_eq!(runtime.to_raw(&nested), raw_nested);

    // Reading again yields the same wrapper.
    assert_eq!(wrapper.get("a").unwrap(), nested);
    assert_eq!(nested.as_object().unwrap().get("b").unwrap(), Value::from(1));

    // "untouched" was never read, so only two pairs exist.
    assert_eq!(runtime.registered(), 2);
}

#[test]
fn cycles_expand_one_read_at_a_time() {
    let runtime = Runtime::new();
    let node = ObjectRef::record();
    node.set("self", &node).unwrap();

    let wrapper = runtime.reactive_object(&node);
    let through_cycle = wrapper.get("self").unwrap();

    assert_eq!(through_cycle, Value::from(&wrapper));
    assert_eq!(runtime.registered(), 1);

    node.delete("self").unwrap();
}

/// Storing a wrapper stores its raw object.
#[test]
fn writes_store_raw_objects() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::record();
    let inner = ObjectRef::record_from([("b", 1)]);
    let wrapper = runtime.reactive_object(&raw);
    let inner_wrapper = runtime.reactive_object(&inner);

    wrapper.set("a", &inner_wrapper).unwrap();

    let stored = raw.get("a").unwrap();
    assert_eq!(stored, Value::from(&inner));
    assert!(!runtime.is_reactive(&stored));
    assert_eq!(wrapper.get("a").unwrap(), Value::from(&inner_wrapper));

    let changes = log.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].new_value, Value::from(&inner));
}

/// Writing the same object back, as raw or as wrapper, is a no-op.
#[test]
fn rewriting_the_same_object_is_silent() {
    let (runtime, log) = runtime_with_log();
    let inner = ObjectRef::record();
    let raw = ObjectRef::record_from([("a", &inner)]);
    let wrapper = runtime.reactive_object(&raw);

    let nested = wrapper.get("a").unwrap();
    wrapper.set("a", nested).unwrap();
    wrapper.set("a", &inner).unwrap();

    assert!(log.is_empty());
}

#[test]
fn same_value_write_is_silent() {
    let (runtime, log) = runtime_with_log();
    let wrapper = runtime.reactive(Value::from_json(json!({"a": 1}))).into_object().unwrap();

    wrapper.set("a", 1).unwrap();

    assert!(log.is_empty());
}

#[test]
fn changed_value_reports_one_set() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::record_from([("a", 1)]);
    let wrapper = runtime.reactive_object(&raw);

    wrapper.set("a", 2).unwrap();

    let changes = log.changes();
    assert_eq!(changes.len(), 1);
    let change = &changes[0];
    assert_eq!(change.kind, OperationKind::Set);
    assert_eq!(change.key, key("a"));
    assert_eq!(change.old_value, Some(Value::from(1)));
    assert_eq!(change.new_value, Value::from(2));
    assert!(change.target.ptr_eq(&raw));
    assert_eq!(raw.get("a").unwrap(), Value::from(2));
}

#[test]
fn push_onto_non_empty_sequence_reports_one_add() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from(["gong", "li"]);
    let wrapper = runtime.reactive_object(&raw);

    assert_eq!(wrapper.push("yuanqi").unwrap(), 3);

    assert_eq!(log.summary(), vec![(OperationKind::Add, PropertyKey::Index(2))]);
    assert_eq!(raw.length().unwrap(), 3);
    assert_eq!(raw.get(2usize).unwrap(), Value::from("yuanqi"));
}

#[test]
fn push_onto_empty_sequence_reports_one_add() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence();
    let wrapper = runtime.reactive_object(&raw);

    wrapper.push("x").unwrap();

    assert_eq!(log.summary(), vec![(OperationKind::Add, PropertyKey::Index(0))]);
    assert_eq!(raw.length().unwrap(), 1);
}

/// Forwards everything to its target, recording the key of each write.
#[derive(Default)]
struct WriteLog {
    writes: Mutex<Vec<PropertyKey>>,
}

impl ProxyHandler for WriteLog {
    fn set(&self, target: &ObjectRef, key: PropertyKey, value: Value) -> ObjectResult<()> {
        self.writes.lock().push(key.clone());
        target.set(key, value)
    }
}

/// `push` through a wrapper reaches the write trap twice (element, then
/// `length`), but only the element write is reported.
#[test]
fn push_writes_twice_and_reports_once() {
    for start in [0usize, 3] {
        let (runtime, log) = runtime_with_log();
        let raw = ObjectRef::sequence_from((0..start).map(Value::from));
        let writes = Arc::new(WriteLog::default());
        let recorded = ObjectRef::proxy(raw.clone(), writes.clone());
        let wrapper = runtime.reactive_object(&recorded);

        wrapper.push("x").unwrap();

        assert_eq!(
            *writes.writes.lock(),
            vec![PropertyKey::Index(start), PropertyKey::length()]
        );
        assert_eq!(log.summary(), vec![(OperationKind::Add, PropertyKey::Index(start))]);
        assert_eq!(raw.length().unwrap(), start + 1);
    }
}

/// The `length` write after an append is silenced by value equality, not by
/// its name: assigning a different length is reported like any other key.
#[test]
fn length_writes_are_classified_by_value() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from([1, 2, 3]);
    let wrapper = runtime.reactive_object(&raw);

    wrapper.set("length", 3).unwrap();
    assert!(log.is_empty());

    wrapper.set("length", 1).unwrap();
    let changes = log.take();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, OperationKind::Set);
    assert!(changes[0].key.is_length());
    assert_eq!(changes[0].old_value, Some(Value::from(3)));
    assert_eq!(changes[0].new_value, Value::from(1));
}

#[test]
fn writing_past_the_end_reports_only_the_element() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from([1]);
    let wrapper = runtime.reactive_object(&raw);

    wrapper.set(4usize, 5).unwrap();

    assert_eq!(log.summary(), vec![(OperationKind::Add, PropertyKey::Index(4))]);
    assert_eq!(raw.length().unwrap(), 5);
}

/// Index-like keys past the largest sequence index are ordinary names, and
/// huge lengths do not allocate.
#[test]
fn out_of_range_sequence_keys_are_safe() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from([1]);
    let wrapper = runtime.reactive_object(&raw);

    wrapper.set("18446744073709551615", 1).unwrap();
    assert_eq!(log.summary(), vec![(OperationKind::Add, key("18446744073709551615"))]);
    assert_eq!(raw.length().unwrap(), 1);
    log.clear();

    wrapper.set("length", MAX_LENGTH).unwrap();
    assert_eq!(log.summary(), vec![(OperationKind::Set, PropertyKey::length())]);
    assert_eq!(raw.length().unwrap(), MAX_LENGTH);
    log.clear();

    assert!(matches!(
        wrapper.set("length", MAX_LENGTH + 1),
        Err(ObjectError::InvalidLength { .. })
    ));
    assert!(log.is_empty());
    assert_eq!(raw.length().unwrap(), MAX_LENGTH);
}

#[test]
fn filling_a_hole_is_an_add() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from([1, 2]);
    raw.delete(0usize).unwrap();
    let wrapper = runtime.reactive_object(&raw);

    wrapper.set(0usize, 1).unwrap();

    assert_eq!(log.summary(), vec![(OperationKind::Add, PropertyKey::Index(0))]);
}

#[test]
fn pop_reports_the_length_change() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from(["a", "b"]);
    let wrapper = runtime.reactive_object(&raw);

    assert_eq!(wrapper.pop().unwrap(), Value::from("b"));

    assert_eq!(log.summary(), vec![(OperationKind::Set, PropertyKey::length())]);
    assert_eq!(raw.length().unwrap(), 1);
}

#[test]
fn pop_returns_wrapped_elements() {
    let runtime = Runtime::new();
    let element = ObjectRef::record();
    let wrapper = runtime.reactive_object(&ObjectRef::sequence_from([&element]));

    let popped = wrapper.pop().unwrap();

    assert!(runtime.is_reactive(&popped));
    assert_eq!(runtime.to_raw(&popped), Value::from(&element));
}

#[test]
fn tracker_sees_every_read() {
    let reads = Arc::new(Mutex::new(Vec::new()));
    let reads_clone = reads.clone();
    let runtime = Runtime::builder()
        .tracker(move |target: &ObjectRef, key: &PropertyKey| {
            reads_clone.lock().push((target.id(), key.clone()));
        })
        .build();
    let raw = ObjectRef::sequence_from([1]);
    let wrapper = runtime.reactive_object(&raw);

    wrapper.get(0usize).unwrap();
    wrapper.push(2).unwrap();

    let reads = reads.lock();
    assert_eq!(
        *reads,
        vec![(raw.id(), PropertyKey::Index(0)), (raw.id(), PropertyKey::length())]
    );
}

#[test]
fn host_errors_propagate_unchanged() {
    let (runtime, log) = runtime_with_log();
    let raw = ObjectRef::sequence_from([1]);
    let wrapper = runtime.reactive_object(&raw);

    assert!(matches!(wrapper.set("length", -2), Err(ObjectError::InvalidLength { .. })));

    raw.freeze();
    assert!(wrapper.is_frozen());
    assert_eq!(
        wrapper.push(2),
        Err(ObjectError::Frozen { key: PropertyKey::Index(1) })
    );
    assert!(log.is_empty());
}

#[test]
fn notifier_may_reenter_the_runtime() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let runtime_slot: Arc<Mutex<Option<Runtime>>> = Arc::new(Mutex::new(None));
    let slot_clone = runtime_slot.clone();

    let runtime = Runtime::builder()
        .notifier(move |change: &Change| {
            let runtime = slot_clone.lock().clone();
            if let Some(runtime) = runtime {
                let wrapper = runtime.reactive_object(&change.target);
                let value = wrapper.get(&change.key).unwrap();
                seen_clone.lock().push(value);
            }
        })
        .build();
    *runtime_slot.lock() = Some(runtime.clone());

    let wrapper = runtime.reactive_object(&ObjectRef::record());
    wrapper.set("a", "hello").unwrap();

    assert_eq!(*seen.lock(), vec![Value::from("hello")]);

    // Break the runtime -> notifier -> runtime cycle.
    runtime_slot.lock().take();
}

#[test]
fn wrappers_are_unique_across_threads() {
    let runtime = Runtime::new();
    let raw = ObjectRef::record();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let runtime = runtime.clone();
            let raw = raw.clone();
            thread::spawn(move || runtime.reactive_object(&raw))
        })
        .collect();

    let wrappers: Vec<ObjectRef> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for wrapper in &wrappers {
        assert!(wrapper.ptr_eq(&wrappers[0]));
    }
    assert_eq!(runtime.registered(), 1);
}

#[test]
fn json_snapshot_reads_through_wrapper() {
    let runtime = Runtime::new();
    let json = json!({"user": {"name": "li", "tags": ["a"]}});
    let wrapper = runtime.reactive(Value::from_json(json.clone()));

    assert_eq!(wrapper.to_json().unwrap(), json);
}

#[test]
fn dropped_wrappers_are_swept() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig { sweep_interval: 0, ..RuntimeConfig::default() })
        .build();
    let raw = Value::from_json(json!({"a": {}, "b": {}}));
    let wrapper = runtime.reactive(raw.clone()).into_object().unwrap();

    wrapper.get("a").unwrap();
    wrapper.get("b").unwrap();
    assert_eq!(runtime.registered(), 3);

    // Only the root wrapper is still held.
    assert_eq!(runtime.sweep(), 2);
    assert_eq!(runtime.registered(), 1);

    drop(wrapper);
    assert_eq!(runtime.sweep(), 1);
    assert_eq!(runtime.registered(), 0);
}
