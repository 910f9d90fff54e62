use std::{cell::RefCell, rc::Rc};

use crate::{Runtime, Value, parse};

use super::util::{json, native, s};

#[test]
fn reviver_transforms_values_bottom_up() {
    let rt = Runtime::new();
    let order: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&order);
    let reviver = native(move |_, _, args| {
        let Value::String(key) = &args[0] else {
            panic!("key must be a string")
        };
        seen.borrow_mut().push(key.to_string_lossy());
        Ok(args[1].clone())
    });
    let value = parse(&rt, &s(&rt, r#"{"a":{"b":1},"c":2}"#), Some(&reviver)).unwrap();
    assert_eq!(json(&rt, &value), r#"{"a":{"b":1},"c":2}"#);
    assert_eq!(*order.borrow(), vec!["b", "a", "c", ""]);
}

#[test]
fn reviver_replaces_numbers() {
    let rt = Runtime::new();
    let reviver = native(|_, _, args| match &args[1] {
        Value::Number(n) => Ok(Value::Number(n * 2.0)),
        other => Ok(other.clone()),
    });
    let value = parse(&rt, &s(&rt, r#"{"a":1,"b":[2,3]}"#), Some(&reviver)).unwrap();
    assert_eq!(json(&rt, &value), r#"{"a":2,"b":[4,6]}"#);
}

#[test]
fn reviver_returning_undefined_deletes_object_properties() {
    let rt = Runtime::new();
    let reviver = native(|rt, _, args| {
        if let Value::String(k) = &args[0] {
            if *k == rt.str_from_str("drop") {
                return Ok(Value::Undefined);
            }
        }
        Ok(args[1].clone())
    });
    let value = parse(
        &rt,
        &s(&rt, r#"{"keep":1,"drop":2,"tail":3}"#),
        Some(&reviver),
    )
    .unwrap();
    assert_eq!(json(&rt, &value), r#"{"keep":1,"tail":3}"#);
}

#[test]
fn reviver_deleting_array_elements_leaves_holes() {
    let rt = Runtime::new();
    let reviver = native(|rt, _, args| {
        if let Value::String(k) = &args[0] {
            if *k == rt.str_from_str("1") {
                return Ok(Value::Undefined);
            }
        }
        Ok(args[1].clone())
    });
    let value = parse(&rt, &s(&rt, "[10,20,30]"), Some(&reviver)).unwrap();
    let Value::Array(items) = &value else {
        panic!("expected array")
    };
    assert!(items.borrow()[1].is_undefined());
    // Holes export as null
    assert_eq!(json(&rt, &value), "[10,null,30]");
}

#[test]
fn reviver_sees_revived_children() {
    let rt = Runtime::new();
    let reviver = native(|rt, _, args| {
        if let Value::String(k) = &args[0] {
            if *k == rt.str_from_str("n") {
                return Ok(Value::Number(5.0));
            }
            if k.is_empty() {
                return Ok(args[1].clone());
            }
            if let Value::Object(obj) = &args[1] {
                // The child property must already be revived here
                let n = obj
                    .borrow()
                    .get(&crate::PropKey::from_name(&rt.str_from_str("n")));
                assert!(matches!(n, Value::Number(v) if v == 5.0));
            }
        }
        Ok(args[1].clone())
    });
    let value = parse(&rt, &s(&rt, r#"{"outer":{"n":1}}"#), Some(&reviver)).unwrap();
    assert_eq!(json(&rt, &value), r#"{"outer":{"n":5}}"#);
}

#[test]
fn reviver_verdict_on_the_root_wins() {
    let rt = Runtime::new();
    let to_nine = native(|_, _, args| {
        if let Value::String(k) = &args[0] {
            if k.is_empty() {
                return Ok(Value::Number(9.0));
            }
        }
        Ok(args[1].clone())
    });
    let value = parse(&rt, &s(&rt, r#"{"a":1}"#), Some(&to_nine)).unwrap();
    assert!(matches!(value, Value::Number(n) if n == 9.0));

    let to_undefined = native(|_, _, _| Ok(Value::Undefined));
    let value = parse(&rt, &s(&rt, "[1,2]"), Some(&to_undefined)).unwrap();
    assert!(value.is_undefined());
}

#[test]
fn non_callable_revivers_are_ignored() {
    let rt = Runtime::new();
    for reviver in [Value::Null, Value::Number(1.0), Value::Boolean(true)] {
        let value = parse(&rt, &s(&rt, r#"{"a":1}"#), Some(&reviver)).unwrap();
        assert_eq!(json(&rt, &value), r#"{"a":1}"#);
    }
}

#[test]
fn reviver_errors_propagate() {
    let rt = Runtime::new();
    let reviver = native(|_, _, _| Err(crate::Error::Type("nope".into())));
    let err = parse(&rt, &s(&rt, "[1]"), Some(&reviver)).unwrap_err();
    assert_eq!(err, crate::Error::Type("nope".into()));
}
