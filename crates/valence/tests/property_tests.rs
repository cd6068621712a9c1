//! Property dispatch across object values

use std::any::Any;
use std::sync::{Arc, OnceLock};

use pretty_assertions::assert_eq;
use valence::*;

fn eggs(yolks: &[i64]) -> Value {
    let elements: Vec<Arc<dyn ObjectElement>> = yolks
        .iter()
        .map(|&y| TestElement::new(y) as Arc<dyn ObjectElement>)
        .collect();
    Value::object_vec(&elements, None).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// A class whose properties produce vectors and mixed kinds
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct Nest {
    eggs: Vec<i64>,
    weight: f64,
}

fn nest_class() -> &'static Arc<ObjectClass> {
    static CLASS: OnceLock<Arc<ObjectClass>> = OnceLock::new();
    CLASS.get_or_init(|| {
        let class = Arc::new(ObjectClass::new("Nest", true));
        let table = vec![
            PropertySignature::new("eggs", true, ValueMask::INT).unwrap(),
            PropertySignature::new("weight", true, ValueMask::LOGICAL_EQUIV).unwrap(),
            PropertySignature::new("first", true, ValueMask::OBJECT | ValueMask::SINGLETON)
                .unwrap()
                .with_class(test_element_class())
                .unwrap(),
        ];
        class.define_properties(table, None).unwrap();
        class
    })
}

impl ObjectElement for Nest {
    fn class(&self) -> &Arc<ObjectClass> {
        nest_class()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn get_property(&self, name: &str, token: Option<Token>) -> Result<Value> {
        match name {
            "eggs" => Ok(Value::int_vec(self.eggs.iter().copied())),
            // An empty nest weighs F rather than 0.0
            "weight" if self.weight == 0.0 => Ok(Value::logical(false)),
            "weight" => Ok(Value::float(self.weight)),
            "first" => match self.eggs.first() {
                Some(&yolk) => {
                    let egg: Arc<dyn ObjectElement> = TestElement::new(yolk);
                    Ok(Value::object(&egg))
                }
                None => Ok(Value::null()),
            },
            _ => Err(ValueError::Property {
                operation: "get_property",
                property: name.to_string(),
                message: "no such property".to_string(),
                token,
            }),
        }
    }
}

fn nests() -> Value {
    let elements: Vec<Arc<dyn ObjectElement>> = vec![
        Arc::new(Nest {
            eggs: vec![1, 2],
            weight: 0.0,
        }),
        Arc::new(Nest {
            eggs: vec![],
            weight: 4.0,
        }),
        Arc::new(Nest {
            eggs: vec![3],
            weight: 2.5,
        }),
    ];
    Value::object_vec(&elements, None).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════
// Reads
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_accelerated_read() {
    let v = eggs(&[4, 5, 6]);
    assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([4, 5, 6]));

    let one = eggs(&[9]);
    let result = one.get_property_of_elements("yolk", None).unwrap();
    assert!(result.is_singleton());
    assert_eq!(result, Value::int(9));
}

#[test]
fn test_generic_read() {
    let v = eggs(&[1, 3]);
    assert_eq!(v.get_property_of_elements("half", None).unwrap(), Value::float_vec([0.5, 1.5]));
}

#[test]
fn test_read_concatenates_vectors() {
    let result = nests().get_property_of_elements("eggs", None).unwrap();
    assert_eq!(result, Value::int_vec([1, 2, 3]));
}

#[test]
fn test_read_widens_mixed_kinds() {
    let result = nests().get_property_of_elements("weight", None).unwrap();
    assert_eq!(result, Value::float_vec([0.0, 4.0, 2.5]));
}

#[test]
fn test_read_skips_null_results() {
    let result = nests().get_property_of_elements("first", None).unwrap();
    assert_eq!(result.count(), 2);
    assert_eq!(result.element_type(), "TestElement");
    assert_eq!(result.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([1, 3]));
}

#[test]
fn test_all_null_reads_as_null() {
    let result = eggs(&[1, 2]).get_property_of_elements("absent", None).unwrap();
    assert_eq!(result.kind(), ValueKind::Null);
}

#[test]
fn test_empty_receiver_reads_empty_vector() {
    let empty = Value::empty_object(test_element_class());
    let yolks = empty.get_property_of_elements("yolk", None).unwrap();
    assert_eq!(yolks.kind(), ValueKind::Int);
    assert_eq!(yolks.count(), 0);

    let tags = empty.get_property_of_elements("tag", None).unwrap();
    assert_eq!(tags.kind(), ValueKind::String);
}

#[test]
fn test_unknown_property() {
    let err = eggs(&[1]).get_property_of_elements("shell", None).unwrap_err();
    assert!(matches!(err, ValueError::Property { .. }));
}

#[test]
fn test_read_from_non_objects() {
    let err = Value::int(1).get_property_of_elements("yolk", None).unwrap_err();
    assert!(matches!(err, ValueError::TypeMismatch { .. }));

    let untyped = Value::with_capacity(ValueKind::Object, 0);
    let err = untyped.get_property_of_elements("yolk", None).unwrap_err();
    assert!(matches!(err, ValueError::Class { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
// Writes
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_write_one_value_to_all() {
    let v = eggs(&[1, 2, 3]);
    v.set_property_of_elements("yolk", &Value::int(7), None).unwrap();
    assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([7, 7, 7]));
}

#[test]
fn test_write_one_value_per_element() {
    let v = eggs(&[1, 2]);
    v.set_property_of_elements("tag", &Value::string_vec(["brown", "white"]), None)
        .unwrap();
    assert_eq!(
        v.get_property_of_elements("tag", None).unwrap(),
        Value::string_vec(["brown", "white"])
    );
}

#[test]
fn test_write_count_mismatch() {
    let v = eggs(&[1, 2, 3]);
    let err = v
        .set_property_of_elements("yolk", &Value::int_vec([1, 2]), None)
        .unwrap_err();
    assert!(matches!(err, ValueError::Property { .. }));
}

#[test]
fn test_write_checks_kind() {
    let v = eggs(&[1]);
    assert!(v.set_property_of_elements("yolk", &Value::float(2.5), None).is_err());
    assert!(v.set_property_of_elements("tag", &Value::int(2), None).is_err());
    assert!(v.set_property_of_elements("yolk", &Value::null(), None).is_err());

    // logicals widen into integer properties
    v.set_property_of_elements("yolk", &Value::logical(true), None).unwrap();
    assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int(1));
}

#[test]
fn test_write_read_only() {
    let err = eggs(&[1])
        .set_property_of_elements("half", &Value::float(1.0), None)
        .unwrap_err();
    assert!(err.to_string().contains("read-only"));
}

// ═══════════════════════════════════════════════════════════════════════
// Sorting and the class registry
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_sort_by_property() {
    let mut v = eggs(&[3, 1, 2]);
    v.get_mut(None).unwrap().sort_by_property("yolk", true, None).unwrap();
    assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([1, 2, 3]));

    v.get_mut(None).unwrap().sort_by_property("half", false, None).unwrap();
    assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([3, 2, 1]));
}

fn weighed(weights: &[f64]) -> Value {
    let elements: Vec<Arc<dyn ObjectElement>> = weights
        .iter()
        .map(|&weight| Arc::new(Nest { eggs: vec![], weight }) as Arc<dyn ObjectElement>)
        .collect();
    Value::object_vec(&elements, None).unwrap()
}

#[test]
fn test_sort_by_property_puts_nan_last() {
    let mut v = weighed(&[1.0, f64::NAN, 3.0]);
    v.get_mut(None).unwrap().sort_by_property("weight", false, None).unwrap();
    assert_eq!(
        v.get_property_of_elements("weight", None).unwrap(),
        Value::float_vec([3.0, 1.0, f64::NAN])
    );

    v.get_mut(None).unwrap().sort_by_property("weight", true, None).unwrap();
    assert_eq!(
        v.get_property_of_elements("weight", None).unwrap(),
        Value::float_vec([1.0, 3.0, f64::NAN])
    );
}

#[test]
fn test_sort_by_property_descending_is_stable() {
    let mut v = eggs(&[2, 1, 3, 2]);
    v.get_mut(None).unwrap().sort_by_property("yolk", false, None).unwrap();
    assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([3, 2, 2, 1]));
}

#[test]
fn test_registry_after_warm_up() {
    runtime::warm_up(&RuntimeContext::default()).unwrap();
    let class = global_registry().get_or_raise("TestElement", None).unwrap();
    assert!(Arc::ptr_eq(&class, test_element_class()));
    assert!(global_registry().class_names().contains(&"TestElement".to_string()));
}

#[test]
fn test_signature_description() {
    let class = test_element_class();
    let yolk = class.property("yolk").unwrap();
    assert_eq!(yolk.mask().describe(None), "integer$");
    assert!(!yolk.is_read_only());

    let first = nest_class().property("first").unwrap();
    assert_eq!(first.class_name(), Some("TestElement"));
}

#[test]
fn test_properties_keep_declaration_order() {
    let names: Vec<&str> = nest_class().properties().map(|p| p.name()).collect();
    assert_eq!(names, ["eggs", "weight", "first"]);
}
