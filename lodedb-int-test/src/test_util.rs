use lodedb::collection::Collection;
use lodedb::errors::LodeResult;
use lodedb::Database;
use serde_json::{json, Value};
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs a test with retry logic and error handling.
///
/// `before` builds the context, `test` runs against it and `after` always
/// runs once `before` succeeded. A failing or panicking attempt is retried a
/// few times before the test is reported as failed.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> LodeResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> LodeResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> LodeResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => match after(ctx) {
                        Ok(_) => Ok(()),
                        Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                    },
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        let (error, backtrace) = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => (e, bt),
            Err(panic_err) => {
                let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                (format!("Panic: {}", message), Backtrace::capture().to_string())
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            eprintln!("Retrying in {}ms...\n", 100 * attempt);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(error);
        last_backtrace = Some(backtrace);
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    db: Database,
}

impl TestContext {
    pub fn new(path: String, db: Database) -> Self {
        Self { path, db }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(id.to_string()).to_string_lossy().to_string()
}

#[cfg(not(feature = "memory"))]
pub fn create_test_context() -> LodeResult<TestContext> {
    let path = random_path();
    let db = Database::open(&path)?;
    Ok(TestContext::new(path, db))
}

#[cfg(feature = "memory")]
pub fn create_test_context() -> LodeResult<TestContext> {
    let path = random_path();
    let db = Database::open_in_memory()?;
    Ok(TestContext::new(path, db))
}

/// Closes the database and removes its directory, if any.
pub fn cleanup(ctx: TestContext) -> LodeResult<()> {
    let db = ctx.db();
    if !db.is_closed() {
        if let Err(e) = db.close() {
            eprintln!("Warning: Failed to close database: {:?}", e);
        }
    }
    remove_dir(ctx.path());
    Ok(())
}

/// Removes a test directory, retrying a few times on transient failures.
pub fn remove_dir(path: &str) {
    let max_retries = 5;
    for retry in 0..max_retries {
        match fs::remove_dir_all(path) {
            Ok(_) => return,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) if retry == max_retries - 1 => {
                eprintln!("Warning: Failed to remove test directory {}: {:?}", path, e);
            }
            Err(_) => thread::sleep(Duration::from_millis(50 * (retry + 1) as u64)),
        }
    }
}

pub fn create_test_docs() -> Vec<Value> {
    vec![
        json!({
            "first_name": "fn1",
            "last_name": "ln1",
            "email": "john@example.com",
            "age": 30,
            "active": true,
            "address": {"city": "Berlin", "zip": "10115"},
            "tags": ["a", "b"]
        }),
        json!({
            "first_name": "fn2",
            "last_name": "ln2",
            "email": "jane@example.com",
            "age": 25,
            "active": true,
            "address": {"city": "Oslo", "zip": "0150"}
        }),
        json!({
            "first_name": "fn3",
            "last_name": "ln2",
            "email": "bob@example.org",
            "age": 35,
            "active": false,
            "address": {"city": "berlin"}
        }),
    ]
}

pub fn insert_test_documents(collection: &Collection) -> LodeResult<Vec<String>> {
    collection.insert_many(create_test_docs())
}

/// Inserts Alice (25), Bob (30) and Charlie (35) and returns their ids in that
/// order.
pub fn insert_users(collection: &Collection) -> LodeResult<Vec<String>> {
    collection.insert_many(vec![
        json!({"name": "Alice", "age": 25}),
        json!({"name": "Bob", "age": 30}),
        json!({"name": "Charlie", "age": 35}),
    ])
}

/// Names of `docs`, in order.
pub fn names(docs: &[lodedb::collection::Document]) -> Vec<String> {
    docs.iter().map(|doc| doc.get("name").to_text()).collect()
}
