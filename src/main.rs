//! Demo driver: builds a small table, indexes it, and runs one
//! nearest-neighbor query through the planner, optimizer, and executors.

use skiff::catalog::{Catalog, Column, ColumnType, Schema};
use skiff::config::Config;
use skiff::execution::{execute, ExecutorContext};
use skiff::expression::Expression;
use skiff::optimizer::Optimizer;
use skiff::plan::OrderDir;
use skiff::planner::{InsertStatement, Planner, SelectStatement};
use skiff::session::Session;
use skiff::startup::{init_logging, resolve_config_path};
use skiff::types::{DistanceMetric, IndexKind, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(resolve_config_path().as_deref())?;
    init_logging(&config);

    tracing::info!("skiff starting");

    let mut catalog = Catalog::new();
    catalog.create_table(
        "docs",
        Schema::new(vec![
            Column::new("embedding", ColumnType::Vector),
            Column::new("id", ColumnType::Integer),
        ]),
    )?;

    // Load a hundred points on a 10x10 grid through the insert pipeline.
    let rows: Vec<Vec<Value>> = (0..100i64)
        .map(|i| {
            let x = (i % 10) as f64;
            let y = (i / 10) as f64;
            vec![Value::Vector(vec![x, y]), Value::Integer(i)]
        })
        .collect();
    {
        let planner = Planner::new(&catalog);
        let insert = planner.plan_insert(&InsertStatement {
            table: "docs".into(),
            rows,
        })?;
        let ctx = ExecutorContext::new(&catalog);
        let result = execute(&insert, &ctx)?;
        tracing::info!(result = ?result.first(), "rows loaded");
    }

    catalog.create_index(
        "docs_embedding_hnsw",
        "docs",
        0,
        DistanceMetric::L2,
        IndexKind::Hnsw,
        &[
            ("m".into(), 4),
            ("ef_construction".into(), 32),
            ("ef_search".into(), 32),
        ],
    )?;

    // SELECT embedding, id FROM docs
    //   ORDER BY l2(embedding, [2.2, 6.9]) LIMIT 5
    let stmt = SelectStatement {
        table: "docs".into(),
        select_list: vec![
            ("embedding".into(), Expression::column(0)),
            ("id".into(), Expression::column(1)),
        ],
        where_clause: None,
        order_by: vec![(
            OrderDir::Asc,
            Expression::distance(
                DistanceMetric::L2,
                Expression::column(0),
                Expression::array_of(&[2.2, 6.9]),
            ),
        )],
        limit: Some(5),
    };

    let session = Session::from_config(&config);
    let planner = Planner::new(&catalog);
    let plan = planner.plan_select(&stmt)?;
    println!("plan before optimization:\n{plan}");

    let optimizer = Optimizer::new(&catalog, &session);
    let optimized = optimizer.optimize(plan);
    println!("plan after optimization:\n{optimized}");

    let ctx = ExecutorContext::new(&catalog);
    let results = execute(&optimized, &ctx)?;
    println!("5 nearest rows to (2.2, 6.9):");
    for tuple in &results {
        println!("  {:?}", tuple.values());
    }

    Ok(())
}
