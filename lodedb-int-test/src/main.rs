use lodedb::errors::LodeResult;
use lodedb::query::Query;
use lodedb_int_test::test_util::{cleanup, create_test_context};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Default, Serialize)]
pub struct StressRecord {
    pub first_name: Option<String>,
    pub processed: Option<bool>,
    pub last_name: Option<String>,
    pub failed: Option<bool>,
    pub note: Option<String>,
}

fn main() -> LodeResult<()> {
    println!("Starting stress test...");
    let ctx = create_test_context()?;

    let count = 10000;
    let collection = ctx.db().collection("stress")?;
    collection.create_index("failed")?;

    let start = std::time::Instant::now();
    for _ in 0..count {
        let record = StressRecord {
            first_name: Some(uuid::Uuid::new_v4().to_string()),
            failed: Some(false),
            last_name: Some(uuid::Uuid::new_v4().to_string()),
            processed: Some(false),
            ..Default::default()
        };
        collection.insert_object(&record)?;
    }
    println!("Inserted {} records in {:?}", count, start.elapsed());

    let start = std::time::Instant::now();
    let failed = Query::new().eq("failed", false);
    let found = collection.find(&failed)?;
    println!(
        "Found {} records in {:?} ({})",
        found.len(),
        start.elapsed(),
        collection.explain(&failed)?
    );

    let start = std::time::Instant::now();
    let updated = collection.update_many(&Query::new(), json!({"processed": true}))?;
    println!("Updated {} records in {:?}", updated, start.elapsed());

    let start = std::time::Instant::now();
    let processed = collection.count_matching(&Query::new().eq("processed", true))?;
    println!("Counted {} processed records in {:?}", processed, start.elapsed());

    println!("{}", ctx.db().stats()?);
    cleanup(ctx)
}
