use crate::catalog::{Schema, TableOid};
use crate::error::{Result, SkiffError};
use crate::execution::{Executor, ExecutorContext};
use crate::storage::Tuple;
use crate::types::Rid;

/// Sequential scan over a table heap, in insertion order.
pub struct SeqScanExecutor<'a> {
    ctx: &'a ExecutorContext<'a>,
    table_oid: TableOid,
    schema: Schema,
    cursor: u64,
}

impl<'a> SeqScanExecutor<'a> {
    pub fn new(ctx: &'a ExecutorContext<'a>, table_oid: TableOid, schema: Schema) -> Self {
        Self {
            ctx,
            table_oid,
            schema,
            cursor: 0,
        }
    }
}

impl Executor for SeqScanExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let table = self
            .ctx
            .catalog
            .get_table(self.table_oid)
            .ok_or_else(|| SkiffError::Execution(format!("unknown table oid {}", self.table_oid)))?;
        let heap = table.heap.borrow();
        let row = heap.get(Rid(self.cursor)).cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}
