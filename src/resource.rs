//! The resource registry (spec.md §4.H): an arena of opaque integer-id
//! handles for things that aren't PHP values — file descriptors, stream
//! contexts, database connections. Mirrors the teacher's `ObjectHeap`
//! allocation shape (`core/object.rs`) but keyed by `u64` id with a
//! type-erased payload and a close callback, since resources (unlike
//! objects) don't carry PHP-visible properties.

use std::any::Any;
use std::collections::HashMap;

pub struct ResourceEntry {
    pub type_name: &'static str,
    payload: Box<dyn Any>,
    close: Option<Box<dyn FnOnce(&mut dyn Any)>>,
}

#[derive(Default)]
pub struct ResourceRegistry {
    next_id: u64,
    entries: HashMap<u64, ResourceEntry>,
    /// Registration order, so shutdown can close in reverse (spec.md §4.H).
    order: Vec<u64>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Any>(
        &mut self,
        type_name: &'static str,
        payload: T,
        close: Option<Box<dyn FnOnce(&mut dyn Any)>>,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            id,
            ResourceEntry {
                type_name,
                payload: Box::new(payload),
                close,
            },
        );
        self.order.push(id);
        id
    }

    pub fn get<T: Any>(&self, id: u64) -> Option<&T> {
        self.entries.get(&id).and_then(|e| e.payload.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, id: u64) -> Option<&mut T> {
        self.entries.get_mut(&id).and_then(|e| e.payload.downcast_mut::<T>())
    }

    pub fn type_name(&self, id: u64) -> Option<&'static str> {
        self.entries.get(&id).map(|e| e.type_name)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        if let Some(mut entry) = self.entries.remove(&id) {
            if let Some(close) = entry.close.take() {
                close(&mut entry.payload);
            }
            self.order.retain(|&o| o != id);
            true
        } else {
            false
        }
    }

    pub fn is_valid(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Run every remaining close callback in reverse registration order
    /// (spec.md §4.H), then drop the payloads.
    pub fn shutdown(&mut self) {
        for id in self.order.clone().into_iter().rev() {
            self.remove(id);
        }
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn register_then_get_round_trips_payload() {
        let mut reg = ResourceRegistry::new();
        let id = reg.register("file", 42i32, None);
        assert_eq!(*reg.get::<i32>(id).unwrap(), 42);
        assert_eq!(reg.type_name(id), Some("file"));
    }

    #[test]
    fn remove_runs_close_callback() {
        let closed = Rc::new(RefCell::new(false));
        let closed_clone = closed.clone();
        let mut reg = ResourceRegistry::new();
        let id = reg.register(
            "handle",
            0u8,
            Some(Box::new(move |_| *closed_clone.borrow_mut() = true)),
        );
        assert!(reg.remove(id));
        assert!(*closed.borrow());
        assert!(!reg.is_valid(id));
    }

    #[test]
    fn shutdown_closes_in_reverse_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut reg = ResourceRegistry::new();
        for i in 0..3 {
            let order = order.clone();
            reg.register("r", i, Some(Box::new(move |_| order.borrow_mut().push(i))));
        }
        reg.shutdown();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }
}
