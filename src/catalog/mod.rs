//! In-memory catalog: tables, schemas, and vector indexes.
//!
//! The catalog owns all table heaps and index structures. It is
//! single-threaded; executors borrow heap and index state through
//! `RefCell` for the duration of one operation.

pub mod schema;

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::info;

use crate::error::{Result, SkiffError};
use crate::index::{build_vector_index, VectorIndex};
use crate::storage::TableHeap;
use crate::types::{DistanceMetric, IndexKind, Rid, Vector};

pub use schema::{Column, ColumnType, Schema};

pub type TableOid = u32;
pub type IndexOid = u32;

/// A registered table: its schema plus the heap that stores its rows.
pub struct TableInfo {
    pub oid: TableOid,
    pub name: String,
    pub schema: Schema,
    pub heap: RefCell<TableHeap>,
}

/// A registered vector index and the metadata the planner matches on.
pub struct IndexInfo {
    pub oid: IndexOid,
    pub name: String,
    pub table_oid: TableOid,
    pub table_name: String,
    /// Table column the index key covers.
    pub key_column: usize,
    pub metric: DistanceMetric,
    pub kind: IndexKind,
    pub index: RefCell<Box<dyn VectorIndex>>,
}

#[derive(Default)]
pub struct Catalog {
    tables: HashMap<TableOid, TableInfo>,
    table_names: HashMap<String, TableOid>,
    indexes: HashMap<IndexOid, IndexInfo>,
    index_names: HashMap<String, IndexOid>,
    /// table name -> index oids, in creation order.
    table_indexes: HashMap<String, Vec<IndexOid>>,
    next_table_oid: TableOid,
    next_index_oid: IndexOid,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty table.
    pub fn create_table(&mut self, name: impl Into<String>, schema: Schema) -> Result<TableOid> {
        let name = name.into();
        if self.table_names.contains_key(&name) {
            return Err(SkiffError::TableAlreadyExists { name });
        }
        let oid = self.next_table_oid;
        self.next_table_oid += 1;
        info!(table = %name, oid, "created table");
        self.table_names.insert(name.clone(), oid);
        self.table_indexes.entry(name.clone()).or_default();
        self.tables.insert(
            oid,
            TableInfo {
                oid,
                name,
                schema,
                heap: RefCell::new(TableHeap::new()),
            },
        );
        Ok(oid)
    }

    pub fn get_table(&self, oid: TableOid) -> Option<&TableInfo> {
        self.tables.get(&oid)
    }

    pub fn get_table_by_name(&self, name: &str) -> Option<&TableInfo> {
        self.table_names.get(name).and_then(|oid| self.tables.get(oid))
    }

    /// Create a vector index over one column of an existing table and
    /// bulk-build it from the rows currently in the heap.
    ///
    /// The key column must exist and have the vector type; option parsing
    /// errors from the index factory are fatal and propagate to the caller.
    pub fn create_index(
        &mut self,
        name: impl Into<String>,
        table_name: &str,
        key_column: usize,
        metric: DistanceMetric,
        kind: IndexKind,
        options: &[(String, i64)],
    ) -> Result<IndexOid> {
        let name = name.into();
        if self.index_names.contains_key(&name) {
            return Err(SkiffError::IndexAlreadyExists { name });
        }
        let table = self
            .get_table_by_name(table_name)
            .ok_or_else(|| SkiffError::TableNotFound {
                name: table_name.to_string(),
            })?;
        match table.schema.column(key_column) {
            Some(col) if col.column_type == ColumnType::Vector => {}
            _ => {
                return Err(SkiffError::Execution(format!(
                    "column {key_column} of table {table_name} is not a vector column"
                )))
            }
        }

        let table_oid = table.oid;

        let mut index = build_vector_index(kind, metric, options)?;

        // Bulk load from whatever the table already holds.
        let initial_data: Vec<(Vector, Rid)> = table
            .heap
            .borrow()
            .iter()
            .filter_map(|(rid, tuple)| {
                tuple
                    .value_at(key_column)
                    .and_then(|v| v.as_vector())
                    .map(|v| (v.to_vec(), rid))
            })
            .collect();
        index.build(initial_data);

        let oid = self.next_index_oid;
        self.next_index_oid += 1;
        info!(index = %name, table = %table_name, oid, %kind, %metric, "created index");

        self.index_names.insert(name.clone(), oid);
        self.table_indexes
            .entry(table_name.to_string())
            .or_default()
            .push(oid);
        self.indexes.insert(
            oid,
            IndexInfo {
                oid,
                name,
                table_oid,
                table_name: table_name.to_string(),
                key_column,
                metric,
                kind,
                index: RefCell::new(index),
            },
        );
        Ok(oid)
    }

    pub fn get_index(&self, oid: IndexOid) -> Option<&IndexInfo> {
        self.indexes.get(&oid)
    }

    pub fn get_index_by_name(&self, name: &str) -> Option<&IndexInfo> {
        self.index_names.get(name).and_then(|oid| self.indexes.get(oid))
    }

    /// Indexes over the named table, in creation order.
    pub fn get_table_indexes(&self, table_name: &str) -> Vec<&IndexInfo> {
        self.table_indexes
            .get(table_name)
            .map(|oids| oids.iter().filter_map(|oid| self.indexes.get(oid)).collect())
            .unwrap_or_default()
    }
}
