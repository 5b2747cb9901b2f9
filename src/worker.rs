use std::sync::{mpsc, Arc};
use std::thread;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::JoinHandle;

use crate::data::awc::{AdvisorySource, FetchError};
use crate::data::model::{Product, WeatherFeatureCollection};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum FetchCommand {
    Fetch { generation: u64, target: DateTime<Utc> },
}

/// Result of one fetch request, tagged with the generation it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded {
        generation: u64,
        sigmets: WeatherFeatureCollection,
        air_sigmets: WeatherFeatureCollection,
    },
    Failed {
        generation: u64,
        error: String,
    },
}

impl FetchOutcome {
    pub fn generation(&self) -> u64 {
        match self {
            FetchOutcome::Loaded { generation, .. } | FetchOutcome::Failed { generation, .. } => *generation,
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Background fetcher running its own tokio runtime on a dedicated thread.
///
/// Every request supersedes the previous one: the in-flight task is aborted
/// and never reports back. Outcomes are polled from the UI thread.
pub struct FetchWorker {
    cmd_tx: UnboundedSender<FetchCommand>,
    res_rx: mpsc::Receiver<FetchOutcome>,
    next_generation: u64,
}

impl FetchWorker {
    /// `notify` is called after each outcome is queued (e.g. to wake the UI).
    pub fn spawn<F>(source: Arc<dyn AdvisorySource>, notify: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (cmd_tx, mut cmd_rx) = unbounded_channel::<FetchCommand>();
        let (res_tx, res_rx) = mpsc::channel::<FetchOutcome>();
        let notify = Arc::new(notify);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("advisory-fetch-rt")
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("advisory-fetch".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut in_flight: Option<JoinHandle<()>> = None;

                    while let Some(cmd) = cmd_rx.recv().await {
                        match cmd {
                            FetchCommand::Fetch { generation, target } => {
                                if let Some(previous) = in_flight.take() {
                                    if !previous.is_finished() {
                                        log::debug!("aborting fetch superseded by generation {generation}");
                                        previous.abort();
                                    }
                                }

                                let source = Arc::clone(&source);
                                let res_tx = res_tx.clone();
                                let notify = Arc::clone(&notify);
                                in_flight = Some(tokio::spawn(async move {
                                    let outcome = match fetch_both(source.as_ref(), target).await {
                                        Ok((sigmets, air_sigmets)) => FetchOutcome::Loaded {
                                            generation,
                                            sigmets,
                                            air_sigmets,
                                        },
                                        Err(err) => {
                                            log::error!("fetch generation {generation} failed: {err}");
                                            FetchOutcome::Failed {
                                                generation,
                                                error: err.to_string(),
                                            }
                                        }
                                    };
                                    if res_tx.send(outcome).is_ok() {
                                        notify();
                                    }
                                }));
                            }
                        }
                    }

                    if let Some(handle) = in_flight {
                        handle.abort();
                    }
                    log::debug!("fetch worker stopped");
                });
            })?;

        Ok(FetchWorker {
            cmd_tx,
            res_rx,
            next_generation: 0,
        })
    }

    /// Queue a fetch of both products for `target`; returns its generation,
    /// or `None` when the worker thread is gone.
    pub fn request(&mut self, target: DateTime<Utc>) -> Option<u64> {
        let generation = self.next_generation + 1;
        if self.cmd_tx.send(FetchCommand::Fetch { generation, target }).is_err() {
            log::error!("fetch worker is no longer running");
            return None;
        }
        self.next_generation = generation;
        log::info!("fetching advisories for {target} (generation {generation})");
        Some(generation)
    }

    /// Next finished outcome, if any. Never blocks.
    pub fn try_recv(&self) -> Option<FetchOutcome> {
        self.res_rx.try_recv().ok()
    }
}

async fn fetch_both(
    source: &dyn AdvisorySource,
    target: DateTime<Utc>,
) -> Result<(WeatherFeatureCollection, WeatherFeatureCollection), FetchError> {
    tokio::try_join!(
        source.fetch(Product::Sigmet, target),
        source.fetch(Product::AirSigmet, target)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::time::Duration;

    /// Serves one advisory per product; requests for `slow_target` take a while,
    /// requests for `failing_target` fail.
    struct FakeSource {
        slow_target: DateTime<Utc>,
        failing_target: DateTime<Utc>,
    }

    #[async_trait]
    impl AdvisorySource for FakeSource {
        async fn fetch(&self, product: Product, target: DateTime<Utc>) -> Result<WeatherFeatureCollection, FetchError> {
            if target == self.slow_target {
                tokio::time::sleep(Duration::from_millis(400)).await;
            }
            if target == self.failing_target && product == Product::AirSigmet {
                return Err(FetchError::Status(StatusCode::BAD_GATEWAY));
            }
            let mut props = crate::data::model::Properties::new();
            props.insert("hazard".to_string(), product.label().into());
            props.insert("target".to_string(), target.to_rfc3339().into());
            Ok(WeatherFeatureCollection::from_features(vec![
                crate::data::model::WeatherFeature::new(None, props),
            ]))
        }
    }

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    fn spawn() -> FetchWorker {
        let source = Arc::new(FakeSource {
            slow_target: hour(1),
            failing_target: hour(3),
        });
        FetchWorker::spawn(source, || {}).unwrap()
    }

    #[test]
    fn delivers_both_products() {
        let mut worker = spawn();
        let generation = worker.request(hour(2)).unwrap();

        let outcome = worker.res_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.generation(), generation);
        match outcome {
            FetchOutcome::Loaded { sigmets, air_sigmets, .. } => {
                assert_eq!(sigmets.len(), 1);
                assert_eq!(air_sigmets.len(), 1);
            }
            other => panic!("expected loaded outcome, got {other:?}"),
        }
    }

    #[test]
    fn superseded_request_never_reports() {
        let mut worker = spawn();
        let stale = worker.request(hour(1)).unwrap();
        let fresh = worker.request(hour(2)).unwrap();
        assert!(fresh > stale);

        let outcome = worker.res_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.generation(), fresh);

        // the slow, aborted request must not surface afterwards either
        assert!(worker.res_rx.recv_timeout(Duration::from_millis(800)).is_err());
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn request_to_a_stopped_worker_is_refused() {
        let (cmd_tx, cmd_rx) = unbounded_channel::<FetchCommand>();
        let (_res_tx, res_rx) = mpsc::channel::<FetchOutcome>();
        drop(cmd_rx);
        let mut worker = FetchWorker {
            cmd_tx,
            res_rx,
            next_generation: 4,
        };

        assert_eq!(worker.request(hour(2)), None);
        assert_eq!(worker.next_generation, 4);
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn either_product_failing_fails_the_request() {
        let mut worker = spawn();
        let generation = worker.request(hour(3)).unwrap();

        let outcome = worker.res_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            outcome,
            FetchOutcome::Failed {
                generation,
                error: "Request failed (502)".to_string(),
            }
        );
    }
}
