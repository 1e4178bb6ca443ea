//! The process-wide symbol registry (spec.md §4.B): functions, classes,
//! interfaces, constants, and inheritance resolution.
//!
//! Generalizes the teacher's `runtime::registry::ExtensionRegistry`
//! (`functions: HashMap<Vec<u8>, NativeHandler>`, `get_function` falling
//! back to a case-insensitive scan) into a registry that also understands
//! class/interface inheritance, with name lookups normalized once up front
//! instead of rescanned per lookup.

use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

use crate::core::value::Value;
use crate::registry::symbols::{
    ClassDescriptor, ConstantDescriptor, FunctionDef, InterfaceDescriptor, MethodDescriptor,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Cannot redeclare {kind} {name}()")]
    Duplicate { kind: &'static str, name: String },
    #[error("Class {name} cannot extend final class {parent}")]
    ExtendsFinal { name: String, parent: String },
    #[error("Cannot instantiate abstract class {0}")]
    AbstractInstantiation(String),
    #[error("Inheritance cycle detected involving class {0}")]
    InheritanceCycle(String),
    #[error("Class {class} does not implement method {method} required by interface {interface}")]
    InterfaceMethodMissing {
        class: String,
        method: String,
        interface: String,
    },
    #[error("Call to undefined method {class}::{method}()")]
    MethodNotFound { class: String, method: String },
    #[error("Parent class {0} not found")]
    ParentNotFound(String),
}

fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[derive(Default)]
pub struct SymbolRegistry {
    functions: HashMap<String, Rc<FunctionDef>>,
    classes: HashMap<String, Rc<ClassDescriptor>>,
    interfaces: HashMap<String, Rc<InterfaceDescriptor>>,
    /// Constants are case-sensitive by default; `case_sensitive: false`
    /// entries are additionally indexed under their lowercase form.
    constants: HashMap<String, Rc<ConstantDescriptor>>,
    frozen: bool,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze against further interface/class registration, except for
    /// user code (user classes/constants still register after this point;
    /// only the bootstrap-owned surface is locked).
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn register_function(&mut self, def: FunctionDef) -> Result<(), RegistryError> {
        let key = normalize(&def.name);
        if self.functions.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: "function",
                name: def.name,
            });
        }
        self.functions.insert(key, Rc::new(def));
        Ok(())
    }

    pub fn lookup_function(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(&normalize(name)).cloned()
    }

    pub fn function_exists(&self, name: &str) -> bool {
        self.lookup_function(name).is_some()
    }

    pub fn register_interface(&mut self, iface: InterfaceDescriptor) -> Result<(), RegistryError> {
        let key = normalize(&iface.name);
        if self.interfaces.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: "interface",
                name: iface.name,
            });
        }
        self.interfaces.insert(key, Rc::new(iface));
        Ok(())
    }

    pub fn lookup_interface(&self, name: &str) -> Option<Rc<InterfaceDescriptor>> {
        self.interfaces.get(&normalize(name)).cloned()
    }

    pub fn register_class(&mut self, class: ClassDescriptor) -> Result<(), RegistryError> {
        let key = normalize(&class.name);
        if self.classes.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: "class",
                name: class.name,
            });
        }
        if let Some(parent_name) = &class.parent {
            let parent = self
                .classes
                .get(&normalize(parent_name))
                .ok_or_else(|| RegistryError::ParentNotFound(parent_name.clone()))?;
            if parent.is_final {
                return Err(RegistryError::ExtendsFinal {
                    name: class.name.clone(),
                    parent: parent_name.clone(),
                });
            }
        }
        self.check_no_cycle(&class)?;
        self.check_interfaces_satisfied(&class)?;
        self.classes.insert(key, Rc::new(class));
        Ok(())
    }

    fn check_no_cycle(&self, class: &ClassDescriptor) -> Result<(), RegistryError> {
        let mut seen = std::collections::HashSet::new();
        seen.insert(normalize(&class.name));
        let mut cursor = class.parent.clone();
        while let Some(name) = cursor {
            let key = normalize(&name);
            if !seen.insert(key.clone()) {
                return Err(RegistryError::InheritanceCycle(class.name.clone()));
            }
            cursor = self.classes.get(&key).and_then(|c| c.parent.clone());
        }
        Ok(())
    }

    fn check_interfaces_satisfied(&self, class: &ClassDescriptor) -> Result<(), RegistryError> {
        if class.is_abstract {
            return Ok(());
        }
        for iface_name in &class.interfaces {
            if let Some(iface) = self.lookup_interface(iface_name) {
                for method in &iface.methods {
                    if !class.methods.contains_key(&normalize(method)) {
                        return Err(RegistryError::InterfaceMethodMissing {
                            class: class.name.clone(),
                            method: method.clone(),
                            interface: iface_name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn lookup_class(&self, name: &str) -> Option<Rc<ClassDescriptor>> {
        self.classes.get(&normalize(name)).cloned()
    }

    pub fn register_constant(&mut self, constant: ConstantDescriptor) -> Result<(), RegistryError> {
        let key = if constant.case_sensitive {
            constant.name.clone()
        } else {
            normalize(&constant.name)
        };
        if self.constants.contains_key(&key) {
            return Err(RegistryError::Duplicate {
                kind: "constant",
                name: constant.name,
            });
        }
        self.constants.insert(key, Rc::new(constant));
        Ok(())
    }

    pub fn lookup_constant(&self, name: &str) -> Option<Value> {
        self.constants
            .get(name)
            .or_else(|| self.constants.get(&normalize(name)))
            .map(|c| c.value.clone())
    }

    /// Walk `parent` first, then declared traits at each level, returning
    /// the first match (spec.md §4.B). Interfaces in this registry carry
    /// only method *names* (no bodies), so there is nothing to fall back to
    /// there; a class that implements an interface natively declares a
    /// `Native`-kind `MethodDescriptor` of its own instead (see
    /// `exceptions::register`).
    pub fn resolve_method(&self, class_name: &str, method: &str) -> Result<Rc<MethodDescriptor>, RegistryError> {
        let method_key = normalize(method);
        let mut cursor = Some(normalize(class_name));
        while let Some(key) = cursor {
            let Some(class) = self.classes.get(&key) else {
                break;
            };
            if let Some(m) = class.methods.get(&method_key) {
                return Ok(m.clone());
            }
            for trait_name in &class.traits {
                if let Some(trait_class) = self.classes.get(&normalize(trait_name)) {
                    if let Some(m) = trait_class.methods.get(&method_key) {
                        return Ok(m.clone());
                    }
                }
            }
            cursor = class.parent.clone().map(|p| normalize(&p));
        }
        Err(RegistryError::MethodNotFound {
            class: class_name.to_string(),
            method: method.to_string(),
        })
    }

    /// Reflexive-transitive closure over `parent` and `interfaces`.
    pub fn is_subclass_of(&self, child: &str, ancestor: &str) -> bool {
        let ancestor_key = normalize(ancestor);
        if normalize(child) == ancestor_key {
            return true;
        }
        let mut stack = vec![normalize(child)];
        let mut visited = std::collections::HashSet::new();
        while let Some(key) = stack.pop() {
            if !visited.insert(key.clone()) {
                continue;
            }
            let Some(class) = self.classes.get(&key) else {
                continue;
            };
            for iface in &class.interfaces {
                let iface_key = normalize(iface);
                if iface_key == ancestor_key {
                    return true;
                }
                if let Some(iface_def) = self.interfaces.get(&iface_key) {
                    if iface_def.extends.iter().any(|e| normalize(e) == ancestor_key) {
                        return true;
                    }
                    stack.extend(iface_def.extends.iter().map(|e| normalize(e)));
                }
            }
            if let Some(parent) = &class.parent {
                if normalize(parent) == ancestor_key {
                    return true;
                }
                stack.push(normalize(parent));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::symbols::{FunctionKind, Parameter};

    fn dummy_function(name: &str) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            parameters: Vec::<Parameter>::new(),
            min_args: 0,
            max_args: Some(0),
            is_variadic: false,
            kind: FunctionKind::User(0),
        }
    }

    #[test]
    fn function_lookup_is_case_insensitive() {
        let mut reg = SymbolRegistry::new();
        reg.register_function(dummy_function("FOO")).unwrap();
        assert!(reg.function_exists("FOO"));
        assert!(reg.function_exists("foo"));
        assert!(reg.function_exists("Foo"));
    }

    #[test]
    fn duplicate_function_registration_fails() {
        let mut reg = SymbolRegistry::new();
        reg.register_function(dummy_function("foo")).unwrap();
        assert!(reg.register_function(dummy_function("FOO")).is_err());
    }

    #[test]
    fn final_class_rejects_further_extension() {
        let mut reg = SymbolRegistry::new();
        reg.register_class(ClassDescriptor {
            name: "Base".into(),
            is_final: true,
            ..Default::default()
        })
        .unwrap();
        let err = reg.register_class(ClassDescriptor {
            name: "Child".into(),
            parent: Some("Base".into()),
            ..Default::default()
        });
        assert!(matches!(err, Err(RegistryError::ExtendsFinal { .. })));
    }

    #[test]
    fn is_subclass_of_is_reflexive_and_transitive() {
        let mut reg = SymbolRegistry::new();
        reg.register_class(ClassDescriptor {
            name: "Throwable".into(),
            is_abstract: true,
            ..Default::default()
        })
        .unwrap();
        reg.register_class(ClassDescriptor {
            name: "Exception".into(),
            interfaces: vec!["Throwable".into()],
            ..Default::default()
        })
        .unwrap();
        reg.register_class(ClassDescriptor {
            name: "TypeError".into(),
            parent: Some("Exception".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(reg.is_subclass_of("TypeError", "Throwable"));
        assert!(reg.is_subclass_of("TypeError", "TypeError"));
        assert!(!reg.is_subclass_of("Throwable", "TypeError"));
    }

    #[test]
    fn inheritance_cycle_is_rejected() {
        let mut reg = SymbolRegistry::new();
        reg.register_class(ClassDescriptor {
            name: "A".into(),
            ..Default::default()
        })
        .unwrap();
        // Manually craft a cycle: classes map bypassed via two registrations
        // would fail ParentNotFound first in this append-only registry, so
        // the cycle check's real exercise is at construction from trusted
        // input — verified directly against the private helper via a
        // same-name parent (A -> A).
        let cyclic = ClassDescriptor {
            name: "B".into(),
            parent: Some("B".into()),
            ..Default::default()
        };
        assert!(reg.check_no_cycle(&cyclic).is_err());
    }
}
