use crate::catalog::Schema;
use crate::error::Result;
use crate::execution::Executor;
use crate::expression::Expression;
use crate::storage::Tuple;

/// Row-wise projection of the child's output.
pub struct ProjectionExecutor<'a> {
    child: Box<dyn Executor + 'a>,
    exprs: Vec<Expression>,
    schema: Schema,
}

impl<'a> ProjectionExecutor<'a> {
    pub fn new(child: Box<dyn Executor + 'a>, exprs: Vec<Expression>, schema: Schema) -> Self {
        Self {
            child,
            exprs,
            schema,
        }
    }
}

impl Executor for ProjectionExecutor<'_> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.child.init()
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let Some(tuple) = self.child.next()? else {
            return Ok(None);
        };
        let values = self
            .exprs
            .iter()
            .map(|expr| expr.evaluate(&tuple, self.child.schema()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Tuple::new(values)))
    }
}
