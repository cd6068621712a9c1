//! Property reads and writes across the elements of an object value

use std::cmp::Ordering;
use std::sync::Arc;

use crate::arena;
use crate::error::{type_name, Result, ValueError};
use crate::property::{AcceleratedGetter, AcceleratedSetter, PropertySignature};
use crate::token::Token;
use crate::value::{Payload, Value, ValueData, ValueKind};

use super::{global_registry, ObjectClass, ObjectElement};

/// Sort keys read from a property, one per element.
enum SortKeys {
    Logical(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
}

impl SortKeys {
    /// Order of elements `a` and `b`. NaN keys come after every number in
    /// either direction.
    fn order(&self, a: usize, b: usize, ascending: bool) -> Ordering {
        let directed = |ordering: Ordering| if ascending { ordering } else { ordering.reverse() };
        match self {
            SortKeys::Logical(k) => directed(k[a].cmp(&k[b])),
            SortKeys::Int(k) => directed(k[a].cmp(&k[b])),
            SortKeys::Float(k) => match k[a].partial_cmp(&k[b]) {
                Some(ordering) => directed(ordering),
                None => k[a].is_nan().cmp(&k[b].is_nan()),
            },
            SortKeys::String(k) => directed(k[a].cmp(&k[b])),
        }
    }
}

/// Append every element of `part`, widening the accumulated kind along the
/// logical/integer/float ladder when elements disagree.
fn append_all(acc: &mut Option<ValueData>, part: &ValueData, capacity: usize, token: Option<Token>) -> Result<()> {
    let target = acc.get_or_insert_with(|| part.matching_vector(capacity));

    if target.kind() < part.kind() && part.kind().is_numeric() {
        let mut widened = part.matching_vector(capacity);
        for i in 0..target.count() {
            widened.push_from_index(i, target, token)?;
        }
        *target = widened;
    }

    for i in 0..part.count() {
        target.push_from_index(i, part, token)?;
    }
    Ok(())
}

fn singleton_or_vector<T>(mut values: Vec<T>, singleton: fn(T) -> Value, vector: fn(Vec<T>) -> Value) -> Value {
    if values.len() == 1 {
        if let Some(value) = values.pop() {
            return singleton(value);
        }
    }
    vector(values)
}

impl ValueData {
    fn element_class(&self, operation: &'static str, token: Option<Token>) -> Result<&Arc<ObjectClass>> {
        if self.kind() != ValueKind::Object {
            return Err(ValueError::TypeMismatch {
                operation,
                expected: "object".to_string(),
                got: type_name(self),
                token,
            });
        }
        self.class().ok_or_else(|| ValueError::Class {
            message: "object vector has no element class, so it has no properties".to_string(),
            token,
        })
    }

    fn elements(&self, token: Option<Token>) -> Result<Vec<Arc<dyn ObjectElement>>> {
        (0..self.count()).map(|i| self.object_at(i, token)).collect()
    }

    /// Read property `name` from every element.
    ///
    /// An empty receiver yields an empty vector of the property's kind.
    /// Otherwise the accelerated getter is used when the property has one;
    /// if not, each element is asked in turn, NULL results are skipped, and
    /// the rest are concatenated. All NULL results give NULL.
    pub fn get_property_of_elements(&self, name: &str, token: Option<Token>) -> Result<Value> {
        let class = self.element_class("get_property_of_elements", token)?;
        let signature = class.property_or_raise(name, token)?;
        let count = self.count();

        if count == 0 {
            return Ok(empty_result(signature));
        }

        if let Some(getter) = signature.accelerated_getter() {
            let result = self.accelerated_get(getter, token)?;
            signature.check_aggregate_result_value(&result, count, token)?;
            return Ok(result);
        }

        if count == 1 {
            let result = self.object_at(0, token)?.get_property(name, token)?;
            signature.check_result_value(&result, token)?;
            return Ok(result);
        }

        let mut acc: Option<ValueData> = None;
        let mut applicable = 0;
        for element in self.elements(token)? {
            let result = element.get_property(name, token)?;
            signature.check_result_value(&result, token)?;
            if result.kind() != ValueKind::Null {
                append_all(&mut acc, &result, count, token)?;
                applicable += 1;
            }
        }

        // Elements that answered NULL do not count toward the singleton check
        match acc {
            None => Ok(Value::null()),
            Some(data) => {
                signature.check_aggregate_result_value(&data, applicable, token)?;
                Ok(Value::new(data))
            }
        }
    }

    fn accelerated_get(&self, getter: AcceleratedGetter, token: Option<Token>) -> Result<Value> {
        let elements = self.elements(token)?;
        let attribute = |err: ValueError| err.with_token(token);

        let value = match getter {
            AcceleratedGetter::Logical(get) => singleton_or_vector(
                elements.iter().map(|e| get(&**e)).collect::<Result<_>>().map_err(attribute)?,
                Value::logical,
                Value::logical_vec,
            ),
            AcceleratedGetter::Int(get) => singleton_or_vector(
                elements.iter().map(|e| get(&**e)).collect::<Result<_>>().map_err(attribute)?,
                Value::int,
                Value::int_vec,
            ),
            AcceleratedGetter::Float(get) => singleton_or_vector(
                elements.iter().map(|e| get(&**e)).collect::<Result<_>>().map_err(attribute)?,
                Value::float,
                Value::float_vec,
            ),
            AcceleratedGetter::String(get) => singleton_or_vector(
                elements.iter().map(|e| get(&**e)).collect::<Result<_>>().map_err(attribute)?,
                Value::string,
                Value::string_vec,
            ),
            AcceleratedGetter::Object(get) => {
                let results: Vec<Arc<dyn ObjectElement>> =
                    elements.iter().map(|e| get(&**e)).collect::<Result<_>>().map_err(attribute)?;
                match results.as_slice() {
                    [single] => Value::object(single),
                    _ => Value::object_vec(&results, token)?,
                }
            }
        };
        Ok(value)
    }

    /// Assign `value` to property `name` of every element.
    ///
    /// `value` must hold one element, which every target receives, or one
    /// element per target.
    pub fn set_property_of_elements(&self, name: &str, value: &ValueData, token: Option<Token>) -> Result<()> {
        const OPERATION: &str = "set_property_of_elements";
        let class = self.element_class(OPERATION, token)?;
        let signature = class.property_or_raise(name, token)?;

        if signature.is_read_only() {
            return Err(ValueError::Property {
                operation: OPERATION,
                property: name.to_string(),
                message: format!("cannot assign to read-only property {}", name),
                token,
            });
        }
        signature.check_assigned_value(value, token)?;

        let count = self.count();
        let supplied = value.count();
        if supplied != 1 && supplied != count {
            return Err(ValueError::Property {
                operation: OPERATION,
                property: name.to_string(),
                message: format!(
                    "assignment to property {} needs 1 or {} values, got {}",
                    name, count, supplied
                ),
                token,
            });
        }

        for (i, element) in self.elements(token)?.iter().enumerate() {
            let source = if supplied == 1 { 0 } else { i };
            let element = &**element;
            let outcome = match signature.accelerated_setter() {
                Some(AcceleratedSetter::Logical(set)) => set(element, value.logical_at(source, token)?),
                Some(AcceleratedSetter::Int(set)) => set(element, value.int_at(source, token)?),
                Some(AcceleratedSetter::Float(set)) => set(element, value.float_at(source, token)?),
                Some(AcceleratedSetter::String(set)) => set(element, &value.string_at(source, token)?),
                Some(AcceleratedSetter::Object(set)) => set(element, &value.object_at(source, token)?),
                None if supplied == 1 => element.set_property(name, value, token),
                None => {
                    let element_value = value.get_value_at(source, token)?;
                    element.set_property(name, &element_value, token)
                }
            };
            outcome.map_err(|err| err.with_token(token))?;
        }
        Ok(())
    }

    /// Reorder an object vector by the value of property `name`.
    ///
    /// The property must give one logical, integer, float or string value
    /// per element, all of the same kind. The sort is stable and the shape
    /// is discarded.
    pub fn sort_by_property(&mut self, name: &str, ascending: bool, token: Option<Token>) -> Result<()> {
        const OPERATION: &str = "sort_by_property";
        if self.is_singleton() {
            return Err(ValueError::SingletonMutation {
                operation: OPERATION,
                kind: self.kind().name(),
                token,
            });
        }
        self.element_class(OPERATION, token)?;
        let count = self.count();
        if count == 0 {
            return Ok(());
        }

        let keys = self.sort_keys(name, token)?;
        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| keys.order(a, b, ascending));

        if let Payload::Object(payload) = &mut self.payload {
            if let Some(elements) = payload.elements.as_vec_mut() {
                let mut sorted = arena::acquire(count);
                sorted.extend(order.iter().map(|&i| elements[i].clone()));
                arena::release(std::mem::replace(elements, sorted));
            }
        }
        self.dims = None;
        Ok(())
    }

    fn sort_keys(&self, name: &str, token: Option<Token>) -> Result<SortKeys> {
        let mut keys: Option<SortKeys> = None;

        for i in 0..self.count() {
            let key = self.get_value_at(i, token)?.get_property_of_elements(name, token)?;
            if key.count() != 1 {
                return Err(ValueError::Property {
                    operation: "sort_by_property",
                    property: name.to_string(),
                    message: format!(
                        "sorting property {} produced {} values for one element; one value per element is required",
                        name,
                        key.count()
                    ),
                    token,
                });
            }

            let keys = keys.get_or_insert_with(|| match key.kind() {
                ValueKind::Logical => SortKeys::Logical(Vec::new()),
                ValueKind::Int => SortKeys::Int(Vec::new()),
                ValueKind::Float => SortKeys::Float(Vec::new()),
                _ => SortKeys::String(Vec::new()),
            });
            match (keys, key.kind()) {
                (SortKeys::Logical(k), ValueKind::Logical) => k.push(key.logical_at(0, token)?),
                (SortKeys::Int(k), ValueKind::Int) => k.push(key.int_at(0, token)?),
                (SortKeys::Float(k), ValueKind::Float) => k.push(key.float_at(0, token)?),
                (SortKeys::String(k), ValueKind::String) => k.push(key.string_at(0, token)?),
                _ => {
                    return Err(ValueError::Property {
                        operation: "sort_by_property",
                        property: name.to_string(),
                        message: format!(
                            "sorting property {} gave {}; a consistent logical, integer, float, or string key is required",
                            name,
                            type_name(&key)
                        ),
                        token,
                    })
                }
            }
        }

        keys.ok_or_else(|| ValueError::Property {
            operation: "sort_by_property",
            property: name.to_string(),
            message: format!("sorting property {} produced no keys", name),
            token,
        })
    }
}

/// The result of reading a property from no elements at all.
fn empty_result(signature: &PropertySignature) -> Value {
    match signature.mask().single_kind() {
        Some(ValueKind::Object) => signature
            .class_name()
            .and_then(|name| global_registry().get(name))
            .filter(|class| Some(class.id()) == signature.value_class())
            .map(|class| Value::empty_object(&class))
            .unwrap_or_else(|| Value::with_capacity(ValueKind::Object, 0)),
        Some(kind) => Value::with_capacity(kind, 0),
        None => Value::null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::TestElement;
    use pretty_assertions::assert_eq;

    fn eggs(yolks: &[i64]) -> Value {
        let elements: Vec<Arc<dyn ObjectElement>> = yolks
            .iter()
            .map(|&y| TestElement::new(y) as Arc<dyn ObjectElement>)
            .collect();
        Value::object_vec(&elements, None).unwrap()
    }

    #[test]
    fn test_accelerated_read() {
        assert_eq!(eggs(&[1, 2, 3]).get_property_of_elements("yolk", None).unwrap(), Value::int_vec([1, 2, 3]));
        let one = eggs(&[4]).get_property_of_elements("yolk", None).unwrap();
        assert!(one.is_singleton());
    }

    #[test]
    fn test_generic_read() {
        let halves = eggs(&[1, 4]).get_property_of_elements("half", None).unwrap();
        assert_eq!(halves, Value::float_vec([0.5, 2.0]));
    }

    #[test]
    fn test_null_results_collapse() {
        let absent = eggs(&[1, 2]).get_property_of_elements("absent", None).unwrap();
        assert_eq!(absent.kind(), ValueKind::Null);
    }

    #[test]
    fn test_empty_receiver() {
        let empty = Value::empty_object(crate::object::test_element_class());
        assert_eq!(empty.get_property_of_elements("yolk", None).unwrap(), Value::int_vec(Vec::new()));
    }

    #[test]
    fn test_write_broadcast_and_elementwise() {
        let v = eggs(&[1, 2, 3]);
        v.set_property_of_elements("yolk", &Value::int(9), None).unwrap();
        assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([9, 9, 9]));
        v.set_property_of_elements("yolk", &Value::logical_vec([true, false, true]), None).unwrap();
        assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([1, 0, 1]));
        assert!(v.set_property_of_elements("yolk", &Value::int_vec([1, 2]), None).is_err());
    }

    #[test]
    fn test_write_read_only() {
        let err = eggs(&[1]).set_property_of_elements("half", &Value::float(1.0), None).unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_sort_by_property() {
        let mut v = eggs(&[3, 1, 2]);
        v.get_mut(None).unwrap().sort_by_property("yolk", true, None).unwrap();
        assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([1, 2, 3]));
        v.get_mut(None).unwrap().sort_by_property("half", false, None).unwrap();
        assert_eq!(v.get_property_of_elements("yolk", None).unwrap(), Value::int_vec([3, 2, 1]));
        assert!(v.get_mut(None).unwrap().sort_by_property("absent", true, None).is_err());
    }
}
