//! The chained hash table: a slot arena plus per-bucket handle chains.
//!
//! Entries live in a generational slot arena and are addressed by stable
//! [`EntryHandle`]s. Each bucket holds an ordered list of handles, so
//! unlinking is a chain scan plus a slot release, with no intrusive list
//! nodes and no back-pointers into moving memory. A handle outliving its
//! entry resolves to `None` (the slot generation no longer matches) rather
//! than to an unrelated entry.
//!
//! This layer is single-threaded and unaware of iteration exclusivity; the
//! [`Store`](crate::Store) wraps it in a mutex and enforces the protocol.

use crate::error::{StoreError, StoreResult};
use crate::hash::{bucket_count_for, djb2};

/// Stable handle to an entry in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryHandle {
    slot: u32,
    generation: u32,
}

/// One stored key/value pair.
#[derive(Debug)]
pub struct Entry {
    key: Vec<u8>,
    hash: u64,
    value: Vec<u8>,
}

impl Entry {
    /// The entry's key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// The entry's current value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The stored hash of the key.
    pub fn key_hash(&self) -> u64 {
        self.hash
    }
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// A fixed-size chained hash table over a slot arena.
pub struct HashTable {
    buckets: Vec<Vec<EntryHandle>>,
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
    mask: u64,
}

impl HashTable {
    /// Build a table with at least `min_buckets` buckets, rounded up to the
    /// next power of two.
    pub fn new(min_buckets: usize) -> Self {
        let count = bucket_count_for(min_buckets);
        let mut buckets = Vec::with_capacity(count);
        buckets.resize_with(count, Vec::new);
        Self {
            buckets,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            mask: (count - 1) as u64,
        }
    }

    /// Number of buckets (always a power of two).
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bucket_of(&self, hash: u64) -> usize {
        (hash & self.mask) as usize
    }

    pub(crate) fn chain(&self, bucket: usize) -> &[EntryHandle] {
        &self.buckets[bucket]
    }

    /// Resolve a handle to its entry, or `None` if the entry has been
    /// removed since the handle was taken.
    pub fn entry(&self, handle: EntryHandle) -> Option<&Entry> {
        let slot = self.slots.get(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, handle: EntryHandle) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    /// Find the entry with exactly these key bytes.
    ///
    /// O(chain length): walks the bucket chain comparing length and bytes.
    pub fn find(&self, key: &[u8]) -> Option<EntryHandle> {
        let hash = djb2(key);
        let bucket = self.bucket_of(hash);
        for &handle in &self.buckets[bucket] {
            if let Some(entry) = self.entry(handle) {
                if entry.hash == hash && entry.key == key {
                    return Some(handle);
                }
            }
        }
        None
    }

    /// Insert a new entry. The caller must have checked that no entry with
    /// this key exists; duplicate keys here would violate the table's
    /// uniqueness invariant.
    ///
    /// Allocation failure leaves the table untouched: the key and value
    /// buffers and the chain slot are all reserved before anything is
    /// linked.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> StoreResult<EntryHandle> {
        let hash = djb2(key);
        let bucket = self.bucket_of(hash);

        let key_buf = copy_bytes(key)?;
        let value_buf = copy_bytes(value)?;
        self.buckets[bucket]
            .try_reserve(1)
            .map_err(|_| StoreError::OutOfMemory {
                requested: std::mem::size_of::<EntryHandle>(),
            })?;

        let entry = Entry {
            key: key_buf,
            hash,
            value: value_buf,
        };

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                EntryHandle {
                    slot: index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                EntryHandle {
                    slot: index,
                    generation: 0,
                }
            }
        };

        self.buckets[bucket].push(handle);
        self.len += 1;
        Ok(handle)
    }

    /// Replace an entry's value in place. The new buffer is allocated and
    /// filled before the swap; the old buffer is dropped only after the
    /// entry owns the new one. Identity (key, hash, handle) is untouched.
    pub fn replace_value(&mut self, handle: EntryHandle, value: &[u8]) -> StoreResult<()> {
        let new_buf = copy_bytes(value)?;
        let entry = self
            .entry_mut(handle)
            .ok_or_else(|| StoreError::NotFound {
                key: "<stale handle>".into(),
            })?;
        let old = std::mem::replace(&mut entry.value, new_buf);
        drop(old);
        Ok(())
    }

    /// Unlink and return an entry. Returns `None` for a stale handle.
    pub fn remove(&mut self, handle: EntryHandle) -> Option<Entry> {
        let hash = self.entry(handle)?.hash;
        let bucket = self.bucket_of(hash);
        let pos = self.buckets[bucket].iter().position(|&h| h == handle)?;
        self.buckets[bucket].remove(pos);

        let slot = &mut self.slots[handle.slot as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let entry = slot.entry.take();
        self.free.push(handle.slot);
        self.len -= 1;
        entry
    }

    /// Drop every entry. Used at teardown only.
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }

    /// The longest chain currently in the table.
    ///
    /// Diagnostic only; O(bucket count). The bucket count is fixed at
    /// construction, so this bound is probabilistic, not structural.
    pub fn deepest_chain(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// All live keys, in bucket order. Used for bulk unpublication.
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let mut keys = Vec::with_capacity(self.len);
        for chain in &self.buckets {
            for &handle in chain {
                if let Some(entry) = self.entry(handle) {
                    keys.push(entry.key.clone());
                }
            }
        }
        keys
    }
}

fn copy_bytes(src: &[u8]) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(src.len())
        .map_err(|_| StoreError::OutOfMemory {
            requested: src.len(),
        })?;
    buf.extend_from_slice(src);
    Ok(buf)
}
