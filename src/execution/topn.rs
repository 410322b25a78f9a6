use std::collections::BinaryHeap;

use crate::catalog::Schema;
use crate::error::Result;
use crate::execution::{compare_sort_keys, evaluate_sort_keys, Executor};
use crate::plan::OrderByKey;
use crate::storage::Tuple;

/// Heap entry ordered by sort keys; the max-heap keeps the worst retained
/// row on top so it can be evicted when a better one arrives.
struct HeapRow {
    keys: Vec<f64>,
    tuple: Tuple,
}

impl PartialEq for HeapRow {
    fn eq(&self, other: &Self) -> bool {
        compare_sort_keys(&self.keys, &other.keys) == std::cmp::Ordering::Equal
    }
}

impl Eq for HeapRow {}

impl PartialOrd for HeapRow {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapRow {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        compare_sort_keys(&self.keys, &other.keys)
    }
}

/// Keeps the `n` best rows by the order keys using a bounded heap.
/// Pipeline breaker: `init` drains the child.
pub struct TopNExecutor<'a> {
    child: Box<dyn Executor + 'a>,
    order_by: Vec<OrderByKey>,
    n: usize,
    schema: Schema,
    sorted: Vec<Tuple>,
    cursor: usize,
}

impl<'a> TopNExecutor<'a> {
    pub fn new(
        child: Box<dyn Executor + 'a>,
        order_by: Vec<OrderByKey>,
        n: usize,
        schema: Schema,
    ) -> Self {
        Self {
            child,
            order_by,
            n,
            schema,
            sorted: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for TopNExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.child.init()?;
        let mut heap: BinaryHeap<HeapRow> = BinaryHeap::new();
        while let Some(tuple) = self.child.next()? {
            let keys = evaluate_sort_keys(&tuple, self.child.schema(), &self.order_by)?;
            heap.push(HeapRow { keys, tuple });
            if heap.len() > self.n {
                heap.pop();
            }
        }
        self.sorted = heap
            .into_sorted_vec()
            .into_iter()
            .map(|row| row.tuple)
            .collect();
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let row = self.sorted.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}
