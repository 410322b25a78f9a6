use tracing::debug;

use crate::catalog::{IndexOid, Schema, TableOid};
use crate::error::{Result, SkiffError};
use crate::execution::{Executor, ExecutorContext};
use crate::storage::Tuple;

/// Fetches the `limit` rows nearest the base vector through a vector
/// index, in the distance order the index reports.
pub struct VectorIndexScanExecutor<'a> {
    ctx: &'a ExecutorContext<'a>,
    table_oid: TableOid,
    index_oid: IndexOid,
    base_vector: Vec<f64>,
    limit: usize,
    schema: Schema,
    rows: Vec<Tuple>,
    cursor: usize,
}

impl<'a> VectorIndexScanExecutor<'a> {
    pub fn new(
        ctx: &'a ExecutorContext<'a>,
        table_oid: TableOid,
        index_oid: IndexOid,
        base_vector: Vec<f64>,
        limit: usize,
        schema: Schema,
    ) -> Self {
        Self {
            ctx,
            table_oid,
            index_oid,
            base_vector,
            limit,
            schema,
            rows: Vec::new(),
            cursor: 0,
        }
    }
}

impl Executor for VectorIndexScanExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        let table = self
            .ctx
            .catalog
            .get_table(self.table_oid)
            .ok_or_else(|| SkiffError::Execution(format!("unknown table oid {}", self.table_oid)))?;
        let index_info = self
            .ctx
            .catalog
            .get_index(self.index_oid)
            .ok_or_else(|| SkiffError::Execution(format!("unknown index oid {}", self.index_oid)))?;

        let rids = index_info
            .index
            .borrow()
            .scan(&self.base_vector, self.limit);
        debug!(
            index = %index_info.name,
            requested = self.limit,
            returned = rids.len(),
            "vector index scan"
        );

        let heap = table.heap.borrow();
        self.rows = rids
            .into_iter()
            .map(|rid| {
                heap.get(rid).cloned().ok_or_else(|| {
                    SkiffError::Execution(format!("index {} returned dangling {rid}", index_info.name))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let row = self.rows.get(self.cursor).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}
