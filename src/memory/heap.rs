//! Heap of field-bearing objects
//!
//! The heap maps an [`Address`] to a [`HeapObject`]: the object's runtime type
//! and its current field values. It is a persistent map, so every write
//! returns a new heap that shares all untouched objects with the old one.
//!
//! # Error Handling
//!
//! Reading an address that was never allocated, or a field the object does
//! not carry, is an error. Objects are created with every declared field
//! already present, so a missing field always means the simulated program
//! referenced a field its type does not declare.

use super::value::{Address, Value};
use crate::interpreter::constants::{HEAP_ADDRESS_START, HEAP_ADDRESS_STRIDE};
use crate::interpreter::errors::SimError;
use im::OrdMap;

/// An object record: runtime type tag plus field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapObject {
    pub type_name: String,
    pub fields: OrdMap<String, Value>,
}

impl HeapObject {
    pub fn new(type_name: impl Into<String>, fields: OrdMap<String, Value>) -> Self {
        HeapObject {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn field(&self, field: &str) -> Result<&Value, SimError> {
        self.fields
            .get(field)
            .ok_or_else(|| SimError::MissingField {
                type_name: self.type_name.clone(),
                field: field.to_string(),
            })
    }
}

/// The heap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heap {
    objects: OrdMap<Address, HeapObject>,
    next_address: u64,
}

impl Heap {
    pub fn new() -> Self {
        Heap {
            objects: OrdMap::new(),
            next_address: HEAP_ADDRESS_START,
        }
    }

    /// Allocate an object, returning its address and the extended heap
    pub fn allocate(&self, object: HeapObject) -> (Address, Heap) {
        let address = Address(self.next_address);
        let heap = Heap {
            objects: self.objects.update(address, object),
            next_address: self.next_address + HEAP_ADDRESS_STRIDE,
        };
        (address, heap)
    }

    pub fn get(&self, address: Address) -> Result<&HeapObject, SimError> {
        self.objects
            .get(&address)
            .ok_or(SimError::UnknownAddress { address })
    }

    /// Runtime type of the object at `address`
    pub fn type_of(&self, address: Address) -> Result<&str, SimError> {
        Ok(&self.get(address)?.type_name)
    }

    pub fn read(&self, address: Address, field: &str) -> Result<Value, SimError> {
        self.get(address)?.field(field).cloned()
    }

    /// Replace one field of the object at `address`
    pub fn write(&self, address: Address, field: &str, value: Value) -> Result<Heap, SimError> {
        let object = self.get(address)?;
        object.field(field)?;

        let updated = HeapObject {
            type_name: object.type_name.clone(),
            fields: object.fields.update(field.to_string(), value),
        };
        Ok(Heap {
            objects: self.objects.update(address, updated),
            next_address: self.next_address,
        })
    }

    /// All objects in address order (for rendering)
    pub fn objects(&self) -> impl Iterator<Item = (&Address, &HeapObject)> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
