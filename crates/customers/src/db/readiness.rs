//! Startup readiness gate.
//!
//! The database container frequently comes up after the service, so startup
//! polls the database at a fixed interval before the listener is bound. Each
//! attempt is one connection, so a refused attempt fails immediately.

use std::fmt::Display;
use std::future::Future;

use crate::config::ReadinessConfig;
use crate::error::StartupError;

use super::Database;

/// Wait until a connection to the database can be opened.
///
/// Returns the number of attempts it took.
///
/// # Errors
///
/// Returns `StartupError::DatabaseUnreachable` once every attempt has failed.
pub async fn wait_for_db(db: &Database, readiness: ReadinessConfig) -> Result<u32, StartupError> {
    retry_until_ready(readiness, || db.ping()).await
}

/// Run `probe` up to `max_attempts` times, sleeping `delay` between failures.
pub(crate) async fn retry_until_ready<F, Fut, E>(
    readiness: ReadinessConfig,
    mut probe: F,
) -> Result<u32, StartupError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    let ReadinessConfig {
        max_attempts,
        delay,
    } = readiness;

    for attempt in 1..=max_attempts {
        match probe().await {
            Ok(()) => {
                tracing::info!(attempt, "Database reachable");
                return Ok(attempt);
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %e,
                    "DB connect attempt {attempt}/{max_attempts} failed, retrying in {}ms",
                    delay.as_millis()
                );
                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(StartupError::DatabaseUnreachable {
        attempts: max_attempts,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;
    use crate::config::ServiceConfig;
    use crate::db::test_support::unreachable_database;

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn fast(max_attempts: u32) -> ReadinessConfig {
        ReadinessConfig {
            max_attempts,
            delay: Duration::from_millis(1),
        }
    }

    /// Probe that fails until its `succeed_on`-th call.
    fn scripted_probe(
        succeed_on: u32,
        calls: Arc<Mutex<u32>>,
    ) -> impl FnMut() -> std::future::Ready<Result<(), String>> {
        move || {
            let mut n = calls.lock().unwrap();
            *n += 1;
            let result = if *n >= succeed_on {
                Ok(())
            } else {
                Err("connection refused".to_string())
            };
            std::future::ready(result)
        }
    }

    #[tokio::test]
    async fn test_ready_on_first_attempt() {
        let calls = Arc::new(Mutex::new(0));
        let attempts = retry_until_ready(fast(15), scripted_probe(1, Arc::clone(&calls)))
            .await
            .unwrap();

        assert_eq!(attempts, 1);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ready_on_third_attempt_logs_two_failures() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let calls = Arc::new(Mutex::new(0));
        let attempts = retry_until_ready(fast(15), scripted_probe(3, Arc::clone(&calls)))
            .await
            .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(*calls.lock().unwrap(), 3);

        let output = logs.contents();
        assert_eq!(output.matches("failed, retrying").count(), 2);
        assert!(output.contains("DB connect attempt 1/15 failed"));
        assert!(output.contains("DB connect attempt 2/15 failed"));
        assert!(!output.contains("DB connect attempt 3/15 failed"));
        assert!(output.contains("Database reachable"));
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = Arc::new(Mutex::new(0));
        let err = retry_until_ready(fast(4), scripted_probe(u32::MAX, Arc::clone(&calls)))
            .await
            .unwrap_err();

        assert!(matches!(err, StartupError::DatabaseUnreachable { attempts: 4 }));
        assert_eq!(*calls.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_delay_is_fixed_between_attempts() {
        let calls = Arc::new(Mutex::new(0));
        let readiness = ReadinessConfig {
            max_attempts: 3,
            delay: Duration::from_millis(20),
        };

        let started = Instant::now();
        let _ = retry_until_ready(readiness, scripted_probe(u32::MAX, Arc::clone(&calls))).await;

        // Two sleeps between three attempts, none after the last.
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_wait_for_unreachable_database() {
        let db = unreachable_database();
        let err = wait_for_db(&db, fast(2)).await.unwrap_err();
        assert!(matches!(err, StartupError::DatabaseUnreachable { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_refused_attempts_do_not_wait_on_the_pool() {
        let config = ServiceConfig::from_lookup(|key| match key {
            "POSTGRES_HOST" => Some("127.0.0.1".to_string()),
            "POSTGRES_PORT" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        let db = Database::connect_lazy(&config.postgres);

        let started = Instant::now();
        let err = wait_for_db(&db, fast(2)).await.unwrap_err();

        assert!(matches!(err, StartupError::DatabaseUnreachable { attempts: 2 }));
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
