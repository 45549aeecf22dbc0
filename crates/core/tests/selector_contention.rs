//! Selector contention integration tests.
//!
//! Many selectors poll the same directory concurrently; every file must be
//! handed to exactly one of them.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use hopper_core::selector::{FileSelector, RandomSelector, SelectorConfig};
use hopper_core::testing::fixtures;

const FILES: usize = 40;
const WORKERS: usize = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_selectors_never_share_a_file() {
    let root = TempDir::new().unwrap();
    let inbox = root.path().join("inbox");
    let done = root.path().join("done");
    fixtures::seed_files(&inbox, FILES, "dat");

    let claimed = Arc::new(Mutex::new(Vec::new()));
    let cancel = CancellationToken::new();
    let mut handles = Vec::new();

    for _ in 0..WORKERS {
        let selector = RandomSelector::new(
            SelectorConfig::new(&inbox).with_poll_interval(Duration::from_millis(10)),
        )
        .unwrap();
        let claimed = Arc::clone(&claimed);
        let cancel = cancel.clone();
        let done = done.clone();
        handles.push(tokio::spawn(async move {
            while let Ok(mut file) = selector.select(&cancel).await {
                claimed.lock().await.push(file.file_name().unwrap().to_owned());
                tokio::time::sleep(Duration::from_millis(2)).await;
                file.move_to(&done).await.unwrap();
                file.unlock().await;
            }
        }));
    }

    for _ in 0..200 {
        if fixtures::content_names(&done).len() == FILES {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    cancel.cancel();
    for handle in handles {
        handle.await.unwrap();
    }

    let claimed = claimed.lock().await;
    let unique: HashSet<_> = claimed.iter().collect();
    assert_eq!(claimed.len(), FILES, "every file claimed exactly once");
    assert_eq!(unique.len(), FILES);
    assert_eq!(fixtures::content_names(&done).len(), FILES);
    assert!(fixtures::content_names(&inbox).is_empty());
    assert!(fixtures::sidecar_names(&inbox, hopper_core::Sidecar::Lock).is_empty());
}
