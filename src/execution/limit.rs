use crate::catalog::Schema;
use crate::error::Result;
use crate::execution::Executor;
use crate::storage::Tuple;

/// Passes through at most `limit` child rows.
pub struct LimitExecutor<'a> {
    child: Box<dyn Executor + 'a>,
    limit: usize,
    schema: Schema,
    emitted: usize,
}

impl<'a> LimitExecutor<'a> {
    pub fn new(child: Box<dyn Executor + 'a>, limit: usize, schema: Schema) -> Self {
        Self {
            child,
            limit,
            schema,
            emitted: 0,
        }
    }
}

impl Executor for LimitExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.emitted = 0;
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if self.emitted >= self.limit {
            return Ok(None);
        }
        match self.child.next()? {
            Some(tuple) => {
                self.emitted += 1;
                Ok(Some(tuple))
            }
            None => Ok(None),
        }
    }
}
