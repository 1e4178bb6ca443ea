//! Objects are by-reference: assigning an object copies its `ObjectId`
//! handle, not its properties, so identity survives assignment (spec.md §3.3).

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::core::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

/// Per-instance state: the owning class and the ordered property bag.
/// Class structure itself (methods, constants, inheritance) lives in the
/// symbol registry, not here — this is only the mutable instance data.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub class_name: String,
    pub properties: IndexMap<String, Value>,
}

impl ObjectData {
    pub fn new(class_name: impl Into<String>) -> Self {
        ObjectData {
            class_name: class_name.into(),
            properties: IndexMap::new(),
        }
    }
}

/// Instance heap: allocates stable `ObjectId`s and owns instance data.
/// One heap per task (spec.md §5: objects are pinned to their originating
/// task unless shared explicitly through a reference/closure capture).
#[derive(Default)]
pub struct ObjectHeap {
    next_id: u64,
    instances: std::collections::HashMap<ObjectId, Rc<RefCell<ObjectData>>>,
}

impl ObjectHeap {
    pub fn new() -> Self {
        ObjectHeap {
            next_id: 1,
            instances: std::collections::HashMap::new(),
        }
    }

    pub fn allocate(&mut self, data: ObjectData) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.instances.insert(id, Rc::new(RefCell::new(data)));
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<Rc<RefCell<ObjectData>>> {
        self.instances.get(&id).cloned()
    }

    pub fn class_name(&self, id: ObjectId) -> Option<String> {
        self.instances.get(&id).map(|o| o.borrow().class_name.clone())
    }

    pub fn property_get(&self, id: ObjectId, name: &str) -> Option<Value> {
        self.instances.get(&id)?.borrow().properties.get(name).cloned()
    }

    pub fn property_set(&self, id: ObjectId, name: &str, value: Value) {
        if let Some(obj) = self.instances.get(&id) {
            obj.borrow_mut().properties.insert(name.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_preserves_identity() {
        let mut heap = ObjectHeap::new();
        let id = heap.allocate(ObjectData::new("stdClass"));
        let alias = Value::Object(id);
        let same = alias.clone();
        match (alias, same) {
            (Value::Object(a), Value::Object(b)) => assert_eq!(a, b),
            _ => panic!("expected object values"),
        }
    }

    #[test]
    fn property_write_visible_through_any_handle_copy() {
        let mut heap = ObjectHeap::new();
        let id = heap.allocate(ObjectData::new("stdClass"));
        heap.property_set(id, "x", Value::Int(1));
        let alias = id; // copying the handle, not the object
        heap.property_set(alias, "x", Value::Int(2));
        assert_eq!(heap.property_get(id, "x").unwrap().to_int(), 2);
    }
}
