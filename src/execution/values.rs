use crate::catalog::Schema;
use crate::error::Result;
use crate::execution::Executor;
use crate::expression::Expression;
use crate::storage::Tuple;

/// Emits literal rows, one per `next` call.
pub struct ValuesExecutor {
    rows: Vec<Vec<Expression>>,
    schema: Schema,
    cursor: usize,
}

impl ValuesExecutor {
    pub fn new(rows: Vec<Vec<Expression>>, schema: Schema) -> Self {
        Self {
            rows,
            schema,
            cursor: 0,
        }
    }
}

impl Executor for ValuesExecutor {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn init(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let Some(row) = self.rows.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        let empty = Tuple::new(vec![]);
        let values = row
            .iter()
            .map(|expr| expr.evaluate(&empty, &self.schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(Tuple::new(values)))
    }
}
