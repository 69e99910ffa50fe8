//! The iteration cursor: a paused position inside the table.
//!
//! A cursor is a (bucket index, entry handle) pair owned by whichever
//! session holds the iteration lock. It walks buckets in index order and
//! chains in insertion order; the order is stable only for a single
//! uninterrupted run, which the exclusivity flag guarantees by blocking
//! structural mutation while any cursor is live.

use crate::table::{Entry, EntryHandle, HashTable};

/// Position of an external iteration over a [`HashTable`].
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    bucket: usize,
    chain_index: usize,
    handle: EntryHandle,
}

impl Cursor {
    /// A cursor at the first entry in bucket order, or `None` for an empty
    /// table.
    pub fn first(table: &HashTable) -> Option<Self> {
        Self::first_in_buckets(table, 0)
    }

    fn first_in_buckets(table: &HashTable, from_bucket: usize) -> Option<Self> {
        for bucket in from_bucket..table.bucket_count() {
            if let Some(&handle) = table.chain(bucket).first() {
                return Some(Self {
                    bucket,
                    chain_index: 0,
                    handle,
                });
            }
        }
        None
    }

    /// The entry currently under the cursor.
    ///
    /// Resolves through the generational handle, so a cursor that somehow
    /// outlives its entry yields `None` instead of an unrelated entry.
    pub fn current<'t>(&self, table: &'t HashTable) -> Option<&'t Entry> {
        table.entry(self.handle)
    }

    /// Advance to the next entry: the next handle in the same chain, or the
    /// first entry of the next non-empty bucket. `None` when the walk is
    /// exhausted.
    pub fn advance(self, table: &HashTable) -> Option<Self> {
        let chain = table.chain(self.bucket);
        let next_index = self.chain_index + 1;
        if let Some(&handle) = chain.get(next_index) {
            return Some(Self {
                bucket: self.bucket,
                chain_index: next_index,
                handle,
            });
        }
        Self::first_in_buckets(table, self.bucket + 1)
    }
}
