//! Cascade ordering and truncation, verified with counting test doubles.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use socialsync_common::{Platform, Post};
use socialsync_ingest::{run_cascade, FetchStrategy};

struct CountingStrategy {
    calls: Arc<AtomicUsize>,
    yields: usize,
}

#[async_trait]
impl FetchStrategy for CountingStrategy {
    async fn attempt(&self, _limit: usize) -> Vec<Post> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (0..self.yields)
            .map(|i| Post {
                platform: Platform::Threads,
                post_url: format!("https://www.threads.net/@u/post/{i}"),
                content: format!("post {i}"),
                published_at: Some(Utc::now()),
            })
            .collect()
    }
}

fn strategy(calls: &Arc<AtomicUsize>, yields: usize) -> Box<dyn FetchStrategy> {
    Box::new(CountingStrategy {
        calls: calls.clone(),
        yields,
    })
}

#[tokio::test]
async fn second_strategy_is_never_invoked_when_first_yields() {
    let static_calls = Arc::new(AtomicUsize::new(0));
    let rendered_calls = Arc::new(AtomicUsize::new(0));

    let strategies = vec![strategy(&static_calls, 3), strategy(&rendered_calls, 5)];
    let posts = run_cascade(&strategies, 10).await;

    assert_eq!(posts.len(), 3);
    assert_eq!(static_calls.load(Ordering::SeqCst), 1);
    assert_eq!(rendered_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_first_strategy_escalates_to_the_next() {
    let static_calls = Arc::new(AtomicUsize::new(0));
    let rendered_calls = Arc::new(AtomicUsize::new(0));

    let strategies = vec![strategy(&static_calls, 0), strategy(&rendered_calls, 2)];
    let posts = run_cascade(&strategies, 10).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(static_calls.load(Ordering::SeqCst), 1);
    assert_eq!(rendered_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn result_is_truncated_to_limit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let strategies = vec![strategy(&calls, 7)];

    let posts = run_cascade(&strategies, 4).await;
    assert_eq!(posts.len(), 4);
}

#[tokio::test]
async fn all_strategies_empty_yields_empty() {
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));

    let strategies = vec![strategy(&a, 0), strategy(&b, 0)];
    let posts = run_cascade(&strategies, 10).await;

    assert!(posts.is_empty());
    assert_eq!(a.load(Ordering::SeqCst), 1);
    assert_eq!(b.load(Ordering::SeqCst), 1);
}
