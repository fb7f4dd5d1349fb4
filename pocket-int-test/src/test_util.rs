use pocket::common::AesGcmCipher;
use pocket::errors::{ErrorKind, PocketError, PocketResult};
use pocket::{Pocket, PocketBuilder};
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::{env, fs, thread};


#[cfg(all(feature = "fjall", not(feature = "memory")))]
pub type TestSubstrate = pocket_fjall_adapter::FjallSubstrate;

#[cfg(any(feature = "memory", not(feature = "fjall")))]
pub type TestSubstrate = pocket::store::InMemorySubstrate;

/// Runs a test with retry logic and error handling.
///
/// `after` runs even when the test body fails, so on-disk state is cleaned.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> PocketResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> PocketResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> PocketResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let failure = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, _bt))) => e,
            Err(panic_err) => {
                let message = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                format!("Panic: {}", message)
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", failure);
            thread::sleep(Duration::from_millis(100 * attempt as u64));
        }
        last_error = Some(failure);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: String,
    substrate: TestSubstrate,
    db: Pocket,
}

impl TestContext {
    pub fn new(path: String, substrate: TestSubstrate, db: Pocket) -> Self {
        Self {
            path,
            substrate,
            db,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn db(&self) -> Pocket {
        self.db.clone()
    }

    pub fn substrate(&self) -> TestSubstrate {
        self.substrate.clone()
    }

    /// Opens a second, fresh store over the same substrate.
    pub fn open_fresh_store(&self) -> PocketResult<Pocket> {
        test_builder().substrate(self.substrate()).open()
    }
}

/// A builder with a cipher cheap enough for tests.
pub fn test_builder() -> PocketBuilder {
    match AesGcmCipher::with_params(1024, 1, 1) {
        Ok(cipher) => Pocket::builder().cipher(cipher),
        Err(_) => Pocket::builder(),
    }
}

pub fn random_path() -> String {
    let id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    temp_dir.join(id.to_string()).to_str().unwrap().to_string()
}

#[cfg(all(feature = "fjall", not(feature = "memory")))]
pub fn create_test_context() -> PocketResult<TestContext> {
    use pocket_fjall_adapter::FjallSubstrate;

    const MAX_ATTEMPTS: u32 = 3;
    let mut last_error: Option<PocketError> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let path = random_path();
        if std::path::Path::new(&path).exists() {
            let _ = fs::remove_dir_all(&path);
        }

        let opened = FjallSubstrate::with_config()
            .db_path(&path)
            .build()
            .and_then(|substrate| {
                let db = test_builder().substrate(substrate.clone()).open()?;
                Ok(TestContext::new(path.clone(), substrate, db))
            });

        match opened {
            Ok(ctx) => return Ok(ctx),
            Err(e) => {
                let _ = fs::remove_dir_all(&path);
                if attempt < MAX_ATTEMPTS {
                    eprintln!(
                        "Warning: Failed to create test context (attempt {}/{}): {:?}",
                        attempt, MAX_ATTEMPTS, e
                    );
                    thread::sleep(Duration::from_millis(50 * attempt as u64));
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        PocketError::new("Failed to create test context", ErrorKind::InternalError)
    }))
}

#[cfg(any(feature = "memory", not(feature = "fjall")))]
pub fn create_test_context() -> PocketResult<TestContext> {
    let path = random_path();
    let substrate = TestSubstrate::new();
    let db = test_builder().substrate(substrate.clone()).open()?;
    Ok(TestContext::new(path, substrate, db))
}

pub fn cleanup(ctx: TestContext) -> PocketResult<()> {
    if let Err(e) = ctx.db().close() {
        eprintln!("Warning: Failed to close store: {:?}", e);
    }

    let path = ctx.path().to_string();
    drop(ctx);

    // fjall releases file handles once the last keyspace handle is gone
    thread::sleep(Duration::from_millis(50));
    let mut retry = 0;
    while std::path::Path::new(&path).exists() && retry < 3 {
        if fs::remove_dir_all(&path).is_ok() {
            break;
        }
        thread::sleep(Duration::from_millis(100));
        retry += 1;
    }
    Ok(())
}

/// Fails with an [ErrorKind::InternalError] when `condition` is false.
pub fn ensure(condition: bool, message: &str) -> PocketResult<()> {
    if condition {
        Ok(())
    } else {
        Err(PocketError::new(message, ErrorKind::InternalError))
    }
}

/// Three patients, two of which share a surname.
pub fn create_test_docs() -> Vec<serde_json::Value> {
    vec![
        pocket::doc!{ "forename": "Foo", "surname": "Bar", "age": 18 },
        pocket::doc!{ "forename": "Baz", "surname": "Bar", "age": 16 },
        pocket::doc!{ "forename": "Qux", "surname": "Quux", "age": 40 },
    ]
}
