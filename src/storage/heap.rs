use crate::storage::tuple::Tuple;
use crate::types::Rid;

/// Append-only in-memory table heap.
///
/// Rows are never deleted or moved, so a `Rid` is simply the row's
/// position at insertion time and stays valid for the process lifetime.
#[derive(Debug, Default)]
pub struct TableHeap {
    rows: Vec<Tuple>,
}

impl TableHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row and return its handle.
    pub fn insert(&mut self, tuple: Tuple) -> Rid {
        let rid = Rid(self.rows.len() as u64);
        self.rows.push(tuple);
        rid
    }

    pub fn get(&self, rid: Rid) -> Option<&Tuple> {
        self.rows.get(rid.0 as usize)
    }

    /// Iterate rows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Rid, &Tuple)> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, t)| (Rid(i as u64), t))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
