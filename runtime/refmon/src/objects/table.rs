//! The object table
//!
//! A power-of-two array of slots indexed by handle. Slots 0 and 1 are
//! reserved for the system device and the default user; every other
//! object gets the next free index on the [`HandleSequence`] walk. When a
//! full walk finds no free slot the table doubles, up to the configured
//! maximum.

use super::handle::{next_generation, HandleSequence, ObjectHandle, SYSTEM_OBJECT_COUNT};
use super::record::{ObjectFlags, ObjectRecord};
use crate::error::internal_error;
use crate::{KernelError, Result};

#[derive(Default)]
struct Slot {
    generation: u16,
    record: Option<ObjectRecord>,
}

pub struct ObjectTable {
    slots: Vec<Slot>,
    sequence: HandleSequence,
    max_objects: usize,
    next_unique_id: u64,
    live: usize,
}

impl ObjectTable {
    /// Create a table with `initial_size` slots that may grow to `max_objects`
    pub fn new(initial_size: usize, max_objects: usize, seed: usize) -> Result<Self> {
        let Some(sequence) = HandleSequence::new(initial_size, seed) else {
            return Err(KernelError::ArgNum1);
        };
        if max_objects < initial_size || !max_objects.is_power_of_two() {
            return Err(KernelError::ArgNum1);
        }
        let mut slots = Vec::with_capacity(initial_size);
        slots.resize_with(initial_size, Slot::default);
        Ok(Self {
            slots,
            sequence,
            max_objects,
            next_unique_id: 0,
            live: 0,
        })
    }

    /// Number of slots currently allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn take_unique_id(&mut self) -> u64 {
        let id = self.next_unique_id;
        self.next_unique_id += 1;
        id
    }

    /// Place one of the fixed system objects in its reserved slot
    pub fn insert_system(&mut self, handle: ObjectHandle, mut record: ObjectRecord) -> Result<()> {
        if !handle.is_system() {
            internal_error!("system object handle outside the reserved range");
        }
        let unique_id = self.take_unique_id();
        let slot = &mut self.slots[handle.index()];
        if slot.record.is_some() {
            return Err(KernelError::Inited);
        }
        record.unique_id = unique_id;
        slot.generation = handle.generation();
        slot.record = Some(record);
        self.live += 1;
        Ok(())
    }

    /// Store a new object and return its handle
    pub fn allocate(&mut self, mut record: ObjectRecord) -> Result<ObjectHandle> {
        let index = loop {
            let slots = &self.slots;
            let found = self.sequence.next_free(|index| {
                index >= SYSTEM_OBJECT_COUNT && slots[index].record.is_none()
            });
            if let Some(index) = found {
                break index;
            }
            self.expand()?;
        };

        record.unique_id = self.take_unique_id();
        let slot = &mut self.slots[index];
        slot.record = Some(record);
        self.live += 1;
        let handle = ObjectHandle::new(index, slot.generation);
        log::debug!("allocated object {handle:?}");
        Ok(handle)
    }

    fn expand(&mut self) -> Result<()> {
        let new_size = self.slots.len() * 2;
        if new_size > self.max_objects || self.sequence.expand().is_none() {
            log::warn!("object table full at {} objects", self.live);
            return Err(KernelError::Overflow);
        }
        self.slots.resize_with(new_size, Slot::default);
        log::info!("object table expanded to {new_size} slots");
        Ok(())
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&ObjectRecord> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.record.as_ref()
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut ObjectRecord> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.record.as_mut()
    }

    /// Look up a live object
    pub fn lookup(&self, handle: ObjectHandle) -> Result<&ObjectRecord> {
        self.get(handle).ok_or(KernelError::NotFound)
    }

    pub fn lookup_mut(&mut self, handle: ObjectHandle) -> Result<&mut ObjectRecord> {
        self.get_mut(handle).ok_or(KernelError::NotFound)
    }

    pub fn is_valid(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Move an object from the low to the high state
    pub fn promote_high_state(&mut self, handle: ObjectHandle) -> Result<()> {
        let record = self.lookup_mut(handle)?;
        if record.flags.contains(ObjectFlags::NOTINITED) {
            return Err(KernelError::NotInited);
        }
        record.flags.insert(ObjectFlags::HIGH);
        Ok(())
    }

    /// Remove an object that is neither referenced nor locked
    pub fn destroy(&mut self, handle: ObjectHandle) -> Result<ObjectRecord> {
        let record = self.lookup(handle)?;
        if record.lock_count > 0 || record.ref_count > 0 {
            return Err(KernelError::Permission);
        }
        self.remove(handle).ok_or(KernelError::NotFound)
    }

    /// Remove an object unconditionally, invalidating outstanding handles
    pub(crate) fn remove(&mut self, handle: ObjectHandle) -> Option<ObjectRecord> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = next_generation(slot.generation);
        self.live -= 1;
        log::debug!("removed object {handle:?}");
        Some(record)
    }

    /// Handles of every live object
    pub fn handles(&self) -> Vec<ObjectHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.record.is_some())
            .map(|(index, slot)| ObjectHandle::new(index, slot.generation))
            .collect()
    }

    /// True if both objects belong to the same user, or one owns the other
    pub fn same_owner(&self, a: ObjectHandle, b: ObjectHandle) -> bool {
        match (self.get(a), self.get(b)) {
            (Some(ra), Some(rb)) => ra.owner == rb.owner || ra.owner == Some(b) || rb.owner == Some(a),
            _ => false,
        }
    }

    /// Drop every record, leaving an empty table of the same size
    pub(crate) fn clear(&mut self) -> Vec<ObjectRecord> {
        let mut records = Vec::with_capacity(self.live);
        for slot in &mut self.slots {
            if let Some(record) = slot.record.take() {
                slot.generation = next_generation(slot.generation);
                records.push(record);
            }
        }
        self.live = 0;
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::object_type::{ObjectType, SubType, SubTypeA};

    fn record() -> ObjectRecord {
        ObjectRecord::new(
            ObjectType::Context,
            SubType::A(SubTypeA::CTX_CONV),
            MemoryObject::shared(),
        )
    }

    #[test]
    fn test_allocate_never_uses_system_slots() {
        let mut table = ObjectTable::new(256, 256, 3).unwrap();
        for _ in 0..200 {
            let handle = table.allocate(record()).unwrap();
            assert!(handle.index() >= SYSTEM_OBJECT_COUNT);
            assert!(!handle.is_system());
        }
        assert_eq!(table.len(), 200);
    }

    #[test]
    fn test_unique_ids_are_distinct() {
        let mut table = ObjectTable::new(256, 256, 3).unwrap();
        let a = table.allocate(record()).unwrap();
        let b = table.allocate(record()).unwrap();
        assert_ne!(
            table.get(a).unwrap().unique_id,
            table.get(b).unwrap().unique_id
        );
    }

    #[test]
    fn test_table_expands_then_overflows() {
        let mut table = ObjectTable::new(256, 512, 9).unwrap();
        // 254 ordinary slots in the first table, 510 after one doubling
        for _ in 0..510 {
            table.allocate(record()).unwrap();
        }
        assert_eq!(table.capacity(), 512);
        assert_eq!(table.allocate(record()), Err(KernelError::Overflow));
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut table = ObjectTable::new(256, 256, 5).unwrap();
        let handle = table.allocate(record()).unwrap();
        table.get_mut(handle).unwrap().flags.remove(ObjectFlags::NOTINITED);
        table.destroy(handle).unwrap();
        assert!(!table.is_valid(handle));
        assert_eq!(table.lookup(handle).err(), Some(KernelError::NotFound));
    }

    #[test]
    fn test_destroy_refuses_locked_or_referenced() {
        let mut table = ObjectTable::new(256, 256, 5).unwrap();
        let handle = table.allocate(record()).unwrap();

        table.get_mut(handle).unwrap().lock_count = 1;
        assert_eq!(table.destroy(handle).err(), Some(KernelError::Permission));

        table.get_mut(handle).unwrap().lock_count = 0;
        table.get_mut(handle).unwrap().ref_count = 1;
        assert_eq!(table.destroy(handle).err(), Some(KernelError::Permission));

        table.get_mut(handle).unwrap().ref_count = 0;
        assert!(table.destroy(handle).is_ok());
    }

    #[test]
    fn test_promote_requires_init() {
        let mut table = ObjectTable::new(256, 256, 5).unwrap();
        let handle = table.allocate(record()).unwrap();
        assert_eq!(table.promote_high_state(handle), Err(KernelError::NotInited));

        table.get_mut(handle).unwrap().flags.remove(ObjectFlags::NOTINITED);
        table.promote_high_state(handle).unwrap();
        assert!(table.get(handle).unwrap().is_high());
    }

    #[test]
    fn test_system_slots() {
        let mut table = ObjectTable::new(256, 256, 5).unwrap();
        table.insert_system(ObjectHandle::SYSTEM_DEVICE, record()).unwrap();
        assert!(table.is_valid(ObjectHandle::SYSTEM_DEVICE));
        assert_eq!(
            table.insert_system(ObjectHandle::SYSTEM_DEVICE, record()),
            Err(KernelError::Inited)
        );
        assert!(table.insert_system(ObjectHandle::new(5, 0), record()).is_err());
    }
}
