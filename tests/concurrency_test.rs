//! Close/resolve races and concurrent resolutions through shared bindings

mod common;

use common::*;
use parking_lot::Mutex;
use sass_imports::{
    ImportError, ImporterContext, ResolutionResult, ResolverFn, ResolverMode, ResolverOptions,
    ResolverSession, SessionState,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_close_waits_for_in_flight_resolution() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let events = Arc::new(Mutex::new(Vec::new()));

    let registry = shared_registry();
    let session = Arc::new(ResolverSession::configure(
        Arc::clone(&registry),
        ResolverOptions::new(ResolverMode::ByImporterUrl, 4),
        ResolverFn::advanced({
            let entered = Arc::clone(&entered);
            let release = Arc::clone(&release);
            let events = Arc::clone(&events);
            move |url: &str, _prev: &str| {
                if url == "slow" {
                    entered.wait();
                    release.wait();
                    events.lock().push("resolver returned");
                }
                ResolutionResult::resolved(url, ".slow {}")
            }
        }),
    ));
    let binding = session.bind().unwrap();

    let resolving = {
        let binding = binding.clone();
        thread::spawn(move || binding.resolve("slow", &ImporterContext::stdin()))
    };
    entered.wait();
    assert_eq!(session.in_flight(), 1);

    let close_returned = Arc::new(AtomicBool::new(false));
    let closing = {
        let session = Arc::clone(&session);
        let events = Arc::clone(&events);
        let close_returned = Arc::clone(&close_returned);
        thread::spawn(move || {
            let result = session.close();
            events.lock().push("close returned");
            close_returned.store(true, Ordering::SeqCst);
            result
        })
    };

    assert!(wait_until(Duration::from_secs(5), || session.state() == SessionState::Closed));
    thread::sleep(Duration::from_millis(50));
    assert!(!close_returned.load(Ordering::SeqCst));

    // New work is refused while the close is still draining
    assert!(matches!(
        binding.resolve("fast", &ImporterContext::stdin()),
        Err(ImportError::LifecycleViolation { .. })
    ));

    release.wait();
    let answer = resolving.join().unwrap().unwrap();
    assert!(answer.resolved);
    closing.join().unwrap().unwrap();

    assert_eq!(*events.lock(), vec!["resolver returned", "close returned"]);
    assert_eq!(session.in_flight(), 0);
    assert!(registry.is_empty());

    for error in [
        binding.resolve("slow", &ImporterContext::stdin()).unwrap_err(),
        session.resolve("slow", &ImporterContext::stdin()).unwrap_err(),
    ] {
        assert!(matches!(error, ImportError::LifecycleViolation { .. }));
    }
}

#[test]
fn test_concurrent_resolutions_share_one_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let session = Arc::new(ResolverSession::configure(
        shared_registry(),
        ResolverOptions::new(ResolverMode::ByImporterUrl, 64),
        ResolverFn::advanced(move |url, _prev| {
            counter.fetch_add(1, Ordering::SeqCst);
            ResolutionResult::resolved(format!("{url}.scss"), format!(".{url} {{}}")).cacheable()
        }),
    ));
    let binding = session.bind().unwrap();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let binding = binding.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    let url = format!("m{}", i % 10);
                    let answer = binding.resolve(&url, &ImporterContext::stdin()).unwrap();
                    assert_eq!(answer.new_url, format!("{url}.scss"));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    // Racing misses on one url share a single resolver call
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    assert_eq!(session.cache_stats().unwrap().entries, 10);
    assert_eq!(session.in_flight(), 0);
}

#[test]
fn test_simultaneous_misses_invoke_resolver_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let session = Arc::new(ResolverSession::configure(
        shared_registry(),
        ResolverOptions::new(ResolverMode::ByImporterUrl, 16),
        ResolverFn::advanced(move |url, _prev| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            ResolutionResult::resolved(format!("{url}.scss"), A_SOURCE).cacheable()
        }),
    ));
    let start = Arc::new(Barrier::new(8));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let session = Arc::clone(&session);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                session.resolve("a", &ImporterContext::stdin())
            })
        })
        .collect();
    for worker in workers {
        let answer = worker.join().unwrap().unwrap();
        assert_eq!(answer.new_url, "a.scss");
        assert_eq!(answer.source, A_SOURCE);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let stats = session.cache_stats().unwrap();
    assert_eq!(stats.insertions, 1);
    assert_eq!(stats.hits + stats.misses, 8);
}

#[test]
fn test_add_source_racing_close_leaves_store_empty() {
    let session = Arc::new(ResolverSession::new(
        shared_registry(),
        ResolverOptions::default(),
    ));
    let started = Arc::new(Barrier::new(5));

    let writers: Vec<_> = (0..4)
        .map(|n| {
            let session = Arc::clone(&session);
            let started = Arc::clone(&started);
            thread::spawn(move || {
                started.wait();
                let mut added = 0usize;
                loop {
                    match session.add_source("", &format!("w{n}-{added}"), ".w {}") {
                        Ok(()) => added += 1,
                        Err(error) => return (added, error),
                    }
                }
            })
        })
        .collect();

    started.wait();
    thread::sleep(Duration::from_millis(10));
    session.close().unwrap();

    for writer in writers {
        let (_added, error) = writer.join().unwrap();
        assert!(matches!(error, ImportError::LifecycleViolation { .. }));
    }
    // No add may land after close emptied the store
    assert_eq!(session.imports(), 0);
}

#[test]
fn test_close_during_resolution_storm() {
    let session = Arc::new(ResolverSession::configure(
        shared_registry(),
        ResolverOptions::default(),
        ResolverFn::advanced(|url, _prev| {
            thread::sleep(Duration::from_micros(200));
            ResolutionResult::resolved(url, "")
        }),
    ));
    let binding = session.bind().unwrap();
    let started = Arc::new(Barrier::new(5));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let binding = binding.clone();
            let started = Arc::clone(&started);
            thread::spawn(move || {
                started.wait();
                let mut completed = 0usize;
                loop {
                    match binding.resolve("x", &ImporterContext::stdin()) {
                        Ok(_) => completed += 1,
                        Err(error) => return (completed, error),
                    }
                }
            })
        })
        .collect();

    started.wait();
    thread::sleep(Duration::from_millis(20));
    session.close().unwrap();
    assert_eq!(session.in_flight(), 0);

    for worker in workers {
        let (_completed, error) = worker.join().unwrap();
        assert!(matches!(error, ImportError::LifecycleViolation { .. }));
    }
}
