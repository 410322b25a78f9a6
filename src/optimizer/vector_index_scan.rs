//! Rule B: serve a distance-ordered `TopN` from a vector index.
//!
//! Matches `TopN(order_by, n)` over a `SeqScan` (optionally through a
//! `Projection`) where the single ascending order key is a distance
//! expression between a column reference and a constant array. When the
//! catalog holds a compatible index, the scan is replaced with a
//! `VectorIndexScan`; the projection, if any, is preserved on top.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Catalog, IndexInfo, TableOid};
use crate::expression::Expression;
use crate::plan::{OrderDir, PlanNode, PlanRef};
use crate::session::Session;
use crate::types::{DistanceMetric, IndexKind};

/// Find an index on `table_oid` covering `key_column` under `metric`.
///
/// Selection is steered by the session's `vector_index_match_method`:
/// empty or `"default"` picks the first match, `"hnsw"`/`"ivfflat"`
/// restrict the kind, and `"none"` forces a negative match.
pub fn match_vector_index<'a>(
    catalog: &'a Catalog,
    table_oid: TableOid,
    key_column: usize,
    metric: DistanceMetric,
    method: &str,
) -> Option<&'a IndexInfo> {
    if method == "none" {
        return None;
    }
    let table = catalog.get_table(table_oid)?;
    for index_info in catalog.get_table_indexes(&table.name) {
        if index_info.key_column != key_column || index_info.metric != metric {
            continue;
        }
        let kind_matches = match method {
            "" | "default" => true,
            "hnsw" => index_info.kind == IndexKind::Hnsw,
            "ivfflat" => index_info.kind == IndexKind::IvfFlat,
            _ => false,
        };
        if kind_matches {
            return Some(index_info);
        }
    }
    None
}

pub(crate) fn rewrite(catalog: &Catalog, session: &Session, plan: PlanRef) -> PlanRef {
    let PlanNode::TopN {
        order_by, n, child, ..
    } = plan.as_ref()
    else {
        return plan;
    };

    // Exactly one ascending key whose expression is a distance between a
    // column and a constant array. The base vector is the second operand,
    // taken verbatim.
    let [(dir, key)] = order_by.as_slice() else {
        return plan;
    };
    if *dir == OrderDir::Desc {
        return plan;
    }
    let Expression::Distance {
        metric,
        left,
        right,
    } = key
    else {
        return plan;
    };
    let Some(order_column) = left.as_column_ref() else {
        return plan;
    };
    let Some(base_vector) = right.as_constant_vector() else {
        return plan;
    };

    // Child must be a SeqScan, possibly behind a single Projection.
    let (projection, scan) = match child.as_ref() {
        PlanNode::SeqScan { .. } => (None, child.clone()),
        PlanNode::Projection {
            child: scan_child, ..
        } if matches!(scan_child.as_ref(), PlanNode::SeqScan { .. }) => {
            (Some(child.clone()), scan_child.clone())
        }
        _ => return plan,
    };
    let PlanNode::SeqScan {
        table_oid,
        table_name,
        schema: scan_schema,
    } = scan.as_ref()
    else {
        return plan;
    };

    // Resolve the ordered column through the projection to a table column:
    // only a projection output that is itself a plain column reference can
    // be traced back.
    let key_column = match &projection {
        Some(proj) => {
            let PlanNode::Projection { exprs, .. } = proj.as_ref() else {
                return plan;
            };
            match exprs.get(order_column).and_then(Expression::as_column_ref) {
                Some(column) => column,
                None => return plan,
            }
        }
        None => order_column,
    };

    let method = session.vector_index_match_method();
    let Some(index_info) = match_vector_index(catalog, *table_oid, key_column, *metric, method)
    else {
        return plan;
    };

    debug!(
        index = %index_info.name,
        %metric,
        limit = n,
        "rewriting TopN over SeqScan as VectorIndexScan"
    );
    let index_scan: PlanRef = Arc::new(PlanNode::VectorIndexScan {
        table_oid: *table_oid,
        table_name: table_name.clone(),
        index_oid: index_info.oid,
        index_name: index_info.name.clone(),
        base_vector,
        limit: *n,
        schema: scan_schema.clone(),
    });

    match projection {
        Some(proj) => {
            let PlanNode::Projection { exprs, schema, .. } = proj.as_ref() else {
                return plan;
            };
            Arc::new(PlanNode::Projection {
                exprs: exprs.clone(),
                schema: schema.clone(),
                child: index_scan,
            })
        }
        None => index_scan,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, ColumnType, Schema};

    fn catalog_with_index(kind: IndexKind) -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .create_table(
                "t",
                Schema::new(vec![
                    Column::new("v", ColumnType::Vector),
                    Column::new("id", ColumnType::Integer),
                ]),
            )
            .unwrap();
        let options: Vec<(String, i64)> = match kind {
            IndexKind::IvfFlat => vec![("lists".into(), 2), ("probe_lists".into(), 2)],
            IndexKind::Hnsw => vec![
                ("m".into(), 4),
                ("ef_construction".into(), 10),
                ("ef_search".into(), 10),
            ],
        };
        catalog
            .create_index("t_v", "t", 0, DistanceMetric::L2, kind, &options)
            .unwrap();
        catalog
    }

    fn scan(catalog: &Catalog) -> PlanRef {
        let table = catalog.get_table_by_name("t").unwrap();
        Arc::new(PlanNode::SeqScan {
            table_oid: table.oid,
            table_name: table.name.clone(),
            schema: table.schema.clone(),
        })
    }

    fn distance_key(metric: DistanceMetric) -> Expression {
        Expression::distance(
            metric,
            Expression::column(0),
            Expression::array_of(&[1.0, 2.0, 3.0]),
        )
    }

    fn topn_over_scan(catalog: &Catalog, metric: DistanceMetric, n: usize) -> PlanRef {
        let scan = scan(catalog);
        Arc::new(PlanNode::TopN {
            order_by: vec![(OrderDir::Asc, distance_key(metric))],
            n,
            schema: scan.schema().clone(),
            child: scan,
        })
    }

    #[test]
    fn test_rewrites_topn_over_seq_scan() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let session = Session::new();
        let plan = topn_over_scan(&catalog, DistanceMetric::L2, 5);
        let rewritten = rewrite(&catalog, &session, plan);
        let PlanNode::VectorIndexScan {
            index_name,
            base_vector,
            limit,
            ..
        } = rewritten.as_ref()
        else {
            panic!("expected VectorIndexScan, got {rewritten}");
        };
        assert_eq!(index_name, "t_v");
        assert_eq!(base_vector, &vec![1.0, 2.0, 3.0]);
        assert_eq!(*limit, 5);
    }

    #[test]
    fn test_preserves_projection() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let session = Session::new();
        let scan = scan(&catalog);
        let projection = Arc::new(PlanNode::Projection {
            exprs: vec![Expression::column(0)],
            schema: Schema::new(vec![Column::new("v", ColumnType::Vector)]),
            child: scan,
        });
        let plan = Arc::new(PlanNode::TopN {
            order_by: vec![(OrderDir::Asc, distance_key(DistanceMetric::L2))],
            n: 5,
            schema: projection.schema().clone(),
            child: projection,
        });
        let rewritten = rewrite(&catalog, &session, plan);
        let PlanNode::Projection { child, .. } = rewritten.as_ref() else {
            panic!("expected Projection on top, got {rewritten}");
        };
        assert!(matches!(child.as_ref(), PlanNode::VectorIndexScan { .. }));
    }

    #[test]
    fn test_projection_of_non_column_blocks_rewrite() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let session = Session::new();
        let scan = scan(&catalog);
        // Projection output 0 is a computed expression, so the ordered
        // column cannot be traced to a table column.
        let projection = Arc::new(PlanNode::Projection {
            exprs: vec![Expression::array_of(&[1.0])],
            schema: Schema::new(vec![Column::new("a", ColumnType::Vector)]),
            child: scan,
        });
        let plan = Arc::new(PlanNode::TopN {
            order_by: vec![(OrderDir::Asc, distance_key(DistanceMetric::L2))],
            n: 5,
            schema: projection.schema().clone(),
            child: projection,
        });
        let rewritten = rewrite(&catalog, &session, plan.clone());
        assert_eq!(rewritten, plan);
    }

    #[test]
    fn test_metric_mismatch_blocks_rewrite() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let session = Session::new();
        let plan = topn_over_scan(&catalog, DistanceMetric::InnerProduct, 5);
        let rewritten = rewrite(&catalog, &session, plan.clone());
        assert_eq!(rewritten, plan);
    }

    #[test]
    fn test_non_constant_base_vector_blocks_rewrite() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let session = Session::new();
        let scan = scan(&catalog);
        let key = Expression::distance(
            DistanceMetric::L2,
            Expression::column(0),
            Expression::column(0),
        );
        let plan = Arc::new(PlanNode::TopN {
            order_by: vec![(OrderDir::Asc, key)],
            n: 5,
            schema: scan.schema().clone(),
            child: scan,
        });
        let rewritten = rewrite(&catalog, &session, plan.clone());
        assert_eq!(rewritten, plan);
    }

    #[test]
    fn test_match_method_none_blocks_rewrite() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let mut session = Session::new();
        session.set_variable(crate::session::VECTOR_INDEX_MATCH_METHOD, "none");
        let plan = topn_over_scan(&catalog, DistanceMetric::L2, 5);
        let rewritten = rewrite(&catalog, &session, plan.clone());
        assert_eq!(rewritten, plan);
    }

    #[test]
    fn test_match_method_kind_filter() {
        let catalog = catalog_with_index(IndexKind::IvfFlat);
        let mut session = Session::new();
        session.set_variable(crate::session::VECTOR_INDEX_MATCH_METHOD, "hnsw");
        // The only index is IVF-Flat, so an hnsw-only session must not match.
        let plan = topn_over_scan(&catalog, DistanceMetric::L2, 5);
        let rewritten = rewrite(&catalog, &session, plan.clone());
        assert_eq!(rewritten, plan);

        session.set_variable(crate::session::VECTOR_INDEX_MATCH_METHOD, "ivfflat");
        let rewritten = rewrite(&catalog, &session, plan.clone());
        assert!(matches!(
            rewritten.as_ref(),
            PlanNode::VectorIndexScan { .. }
        ));
    }

    #[test]
    fn test_idempotent() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let session = Session::new();
        let once = rewrite(
            &catalog,
            &session,
            topn_over_scan(&catalog, DistanceMetric::L2, 5),
        );
        let twice = rewrite(&catalog, &session, once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_match_vector_index_column_filter() {
        let catalog = catalog_with_index(IndexKind::Hnsw);
        let table_oid = catalog.get_table_by_name("t").unwrap().oid;
        assert!(
            match_vector_index(&catalog, table_oid, 0, DistanceMetric::L2, "default").is_some()
        );
        // Wrong key column.
        assert!(match_vector_index(&catalog, table_oid, 1, DistanceMetric::L2, "default").is_none());
        // Wrong metric.
        assert!(match_vector_index(
            &catalog,
            table_oid,
            0,
            DistanceMetric::CosineSimilarity,
            "default"
        )
        .is_none());
    }
}
