use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use pipeline_collector::models::{GroupInfo, GroupRef, LogEvent, MetricEvent, PipelineEvent, PipelineGroupEvents};
use pipeline_collector::{CollectorConfig, PipelineContext};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const PRODUCERS: usize = 3;
const PRODUCE_EVERY: Duration = Duration::from_millis(50);
const FLUSH_EVERY: Duration = Duration::from_millis(500);
const MAX_FLUSHES: u32 = 10;

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn print_batch(batch: &PipelineGroupEvents) {
    match serde_json::to_string(batch) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!("Failed to encode batch: {}", e),
    }
}

/// Emits a log or metric batch for its group on every tick until the stage hangs up.
async fn produce(id: usize, group: GroupRef, tx: mpsc::Sender<PipelineGroupEvents>) {
    let mut cadence = tokio::time::interval(PRODUCE_EVERY);
    let mut seq: u64 = 0;
    loop {
        cadence.tick().await;
        seq += 1;
        let event: PipelineEvent = if seq % 2 == 0 {
            MetricEvent::counter("producer_ticks", seq as f64, now_nanos()).into()
        } else {
            LogEvent::new(format!("producer-{id}"), format!("tick {seq}"), now_nanos()).into()
        };
        if tx.send(PipelineGroupEvents::new(group.clone(), vec![event])).await.is_err() {
            return;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let config = CollectorConfig::from_env().context("loading collector config")?;
    tracing::info!("Starting collector driver with {:?}", config);

    let mut context = PipelineContext::from_config(&config);

    // Two producers share a group so the grouped collector has something to merge.
    let shared = GroupRef::new(GroupInfo::new().with_metadata("source", "shared"));
    let (tx, mut rx) = mpsc::channel(64);
    for id in 0..PRODUCERS {
        let group = if id < 2 {
            shared.clone()
        } else {
            GroupRef::new(GroupInfo::new().with_metadata("source", format!("producer-{id}")))
        };
        tokio::spawn(produce(id, group, tx.clone()));
    }
    drop(tx);

    // Push-based drain when the collector supports it, polling otherwise.
    let consumer = context.collector().observe().map(|receiver| {
        tokio::task::spawn_blocking(move || {
            let mut consumed = 0usize;
            for batch in receiver {
                print_batch(&batch);
                consumed += 1;
            }
            consumed
        })
    });

    let mut flush = tokio::time::interval(FLUSH_EVERY);
    flush.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut flushes = 0u32;

    tracing::info!("Collector driver active. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            Some(batch) = rx.recv() => {
                let collector = context.collector_mut();
                tokio::task::block_in_place(|| collector.collect_list(vec![batch]))
                    .context("collector rejected a batch")?;
            }
            _ = flush.tick() => {
                flushes += 1;
                if consumer.is_none() {
                    let drained = context.collector_mut().to_array();
                    tracing::info!("Flush {}: {} groups", flushes, drained.len());
                    drained.iter().for_each(print_batch);
                }
                if flushes >= MAX_FLUSHES {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    // Closing drops whatever a grouped collector still holds, so drain first.
    context.collector_mut().to_array().iter().for_each(print_batch);
    context.collector_mut().close();

    if let Some(handle) = consumer {
        let consumed = handle.await.context("consumer task panicked")?;
        tracing::info!("Consumer finished after {} batches", consumed);
    }

    Ok(())
}
