use crate::catalog::Schema;
use crate::error::{Result, SkiffError};
use crate::execution::Executor;
use crate::expression::Expression;
use crate::storage::Tuple;
use crate::types::Value;

/// Passes through child rows whose predicate evaluates to true.
pub struct FilterExecutor<'a> {
    child: Box<dyn Executor + 'a>,
    predicate: Expression,
    schema: Schema,
}

impl<'a> FilterExecutor<'a> {
    pub fn new(child: Box<dyn Executor + 'a>, predicate: Expression, schema: Schema) -> Self {
        Self {
            child,
            predicate,
            schema,
        }
    }
}

impl Executor for FilterExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        while let Some(tuple) = self.child.next()? {
            match self.predicate.evaluate(&tuple, self.child.schema())? {
                Value::Boolean(true) => return Ok(Some(tuple)),
                Value::Boolean(false) => continue,
                other => {
                    return Err(SkiffError::Execution(format!(
                        "filter predicate evaluated to non-boolean {other:?}"
                    )))
                }
            }
        }
        Ok(None)
    }
}
