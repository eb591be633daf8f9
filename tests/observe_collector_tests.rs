use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pipeline_collector::models::{GroupInfo, GroupRef, LogEvent, PipelineEvent, PipelineGroupEvents};
use pipeline_collector::pipeline::{CollectorError, ObservePipeCollector, ReceiveError};

fn log(n: u64) -> PipelineEvent {
    LogEvent::new("test", format!("line {n}"), n).into()
}

fn group(source: &str) -> GroupRef {
    GroupRef::new(GroupInfo::new().with_metadata("source", source))
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_empty_input_is_noop() {
    let collector = ObservePipeCollector::new(4);
    let g = group("a");

    collector.collect(&g, vec![]).unwrap();
    collector.collect_list(vec![]).unwrap();
    collector.collect_list(vec![PipelineGroupEvents::new(g.clone(), vec![])]).unwrap();

    assert!(collector.is_empty(), "Empty input must not enqueue anything");
    assert!(collector.to_array().is_empty());
}

#[test]
fn test_order_preserved_within_batch_and_across_batches() {
    let collector = ObservePipeCollector::new(8);
    let g = group("a");

    collector.collect(&g, vec![log(1), log(2), log(3)]).unwrap();
    collector.collect(&g, vec![log(4)]).unwrap();
    collector.collect(&g, vec![log(5)]).unwrap();

    let drained = collector.to_array();
    assert_eq!(drained.len(), 3);
    assert_eq!(drained[0].events, vec![log(1), log(2), log(3)]);
    assert_eq!(drained[1].events, vec![log(4)]);
    assert_eq!(drained[2].events, vec![log(5)]);
    assert!(drained.iter().all(|b| b.group == g));
}

#[test]
fn test_collect_list_enqueues_each_batch_in_order() {
    let collector = ObservePipeCollector::new(8);
    let a = group("a");
    let b = group("b");

    collector
        .collect_list(vec![
            PipelineGroupEvents::new(a.clone(), vec![log(1)]),
            PipelineGroupEvents::new(b.clone(), vec![log(2)]),
            PipelineGroupEvents::new(a.clone(), vec![log(3)]),
        ])
        .unwrap();

    let drained = collector.to_array();
    assert_eq!(drained.len(), 3, "Observable collector does not merge batches");
    assert_eq!(drained[0].group, a);
    assert_eq!(drained[1].group, b);
    assert_eq!(drained[2].group, a);
    assert_eq!(drained[2].events, vec![log(3)]);
}

#[test]
fn test_drain_then_empty() {
    let collector = ObservePipeCollector::new(4);
    collector.collect(&group("a"), vec![log(1)]).unwrap();

    assert_eq!(collector.to_array().len(), 1);
    assert!(collector.to_array().is_empty(), "Second drain should find nothing");
}

#[test]
fn test_backpressure_blocks_second_collect() {
    let collector = ObservePipeCollector::new(1);
    let g = group("a");
    let completed = Arc::new(AtomicUsize::new(0));

    let producer = {
        let collector = collector.clone();
        let completed = completed.clone();
        let g = g.clone();
        thread::spawn(move || {
            for n in 1..=2 {
                collector.collect(&g, vec![log(n)]).unwrap();
                completed.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    assert!(wait_until(|| completed.load(Ordering::SeqCst) == 1));
    thread::sleep(Duration::from_millis(100));
    assert_eq!(completed.load(Ordering::SeqCst), 1, "Second collect should block on a full queue");
    assert_eq!(collector.len(), 1);

    let first = collector.to_array();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].events, vec![log(1)]);

    producer.join().unwrap();
    assert_eq!(completed.load(Ordering::SeqCst), 2);

    let second = collector.to_array();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].events, vec![log(2)]);
}

#[test]
fn test_collect_after_close_fails() {
    let collector = ObservePipeCollector::new(4);
    let g = group("a");
    collector.close();

    assert!(collector.is_closed());
    assert_eq!(collector.collect(&g, vec![log(1)]), Err(CollectorError::Closed));
    assert_eq!(
        collector.collect_list(vec![PipelineGroupEvents::new(g, vec![log(2)])]),
        Err(CollectorError::Closed)
    );
    assert!(collector.is_empty(), "Nothing may be enqueued after close");
}

#[test]
fn test_empty_collect_after_close_is_still_noop() {
    let collector = ObservePipeCollector::new(4);
    collector.close();
    assert_eq!(collector.collect(&group("a"), vec![]), Ok(()));
}

#[test]
fn test_close_is_idempotent() {
    let collector = ObservePipeCollector::new(4);
    collector.close();
    collector.close();
    assert!(collector.is_closed());
}

#[test]
fn test_close_wakes_blocked_producer() {
    let collector = ObservePipeCollector::new(1);
    let g = group("a");
    collector.collect(&g, vec![log(1)]).unwrap();

    let producer = {
        let collector = collector.clone();
        let g = g.clone();
        thread::spawn(move || collector.collect(&g, vec![log(2)]))
    };

    thread::sleep(Duration::from_millis(50));
    collector.close();

    assert_eq!(producer.join().unwrap(), Err(CollectorError::Closed));
    let remaining = collector.to_array();
    assert_eq!(remaining.len(), 1, "Buffered batch survives close");
    assert_eq!(remaining[0].events, vec![log(1)]);
}

#[test]
fn test_receiver_drains_remaining_then_ends_after_close() {
    let collector = ObservePipeCollector::new(4);
    let g = group("a");
    collector.collect(&g, vec![log(1)]).unwrap();
    collector.collect(&g, vec![log(2)]).unwrap();

    let receiver = collector.observe();
    collector.close();

    let drained: Vec<_> = receiver.collect();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].events, vec![log(1)]);
    assert_eq!(drained[1].events, vec![log(2)]);
}

#[test]
fn test_recv_timeout() {
    let collector = ObservePipeCollector::new(4);
    let receiver = collector.observe();

    assert_eq!(
        receiver.recv_timeout(Duration::from_millis(20)).unwrap_err(),
        ReceiveError::Timeout
    );
    assert!(receiver.try_recv().is_none());

    collector.collect(&group("a"), vec![log(1)]).unwrap();
    let batch = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(batch.events, vec![log(1)]);

    collector.close();
    assert_eq!(
        receiver.recv_timeout(Duration::from_secs(1)).unwrap_err(),
        ReceiveError::Closed
    );
}

#[test]
fn test_close_wakes_blocked_consumer() {
    let collector = ObservePipeCollector::new(4);
    let receiver = collector.observe();
    let consumer = thread::spawn(move || receiver.recv());

    thread::sleep(Duration::from_millis(50));
    collector.close();

    assert!(consumer.join().unwrap().is_none());
}

#[test]
fn test_multiple_consumers_each_batch_delivered_once() {
    const PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 50;

    let collector = ObservePipeCollector::new(4);

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let receiver = collector.observe();
            thread::spawn(move || receiver.map(|b| b.events[0].timestamp()).collect::<Vec<_>>())
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let collector = collector.clone();
            let g = group(&format!("producer-{p}"));
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    collector.collect(&g, vec![log(p * PER_PRODUCER + i)]).unwrap();
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }
    collector.close();

    let mut seen = HashSet::new();
    let mut total = 0;
    for consumer in consumers {
        for ts in consumer.join().unwrap() {
            total += 1;
            assert!(seen.insert(ts), "Batch {ts} delivered twice");
        }
    }
    assert_eq!(total, PRODUCERS * PER_PRODUCER);
}

#[test]
fn test_capacity_reported() {
    let collector = ObservePipeCollector::new(16);
    assert_eq!(collector.capacity(), 16);
    assert_eq!(collector.len(), 0);
}
