use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use tokio_util::task::AbortOnDropHandle;

use crate::config::probe_config::ProbeSettings;

use super::probe::check_host;
use super::result::{ProbeResult, ProbeResultSet};
use super::transport::{ReqwestTransport, Transport};

/// Probes many hosts with at most `max_workers` probes in flight.
///
/// Each host runs in its own task. A task is only spawned once a worker slot
/// is free, so the number of live tasks never exceeds the budget. A task that
/// panics is turned into a degraded result for its host; it never takes the
/// batch down with it. Dropping a batch before it finishes aborts the probes
/// it still has running.
pub struct Prober<T: Transport = ReqwestTransport> {
    transport: Arc<T>,
    settings: Arc<ProbeSettings>,
}

impl Prober<ReqwestTransport> {
    pub fn new(settings: ProbeSettings) -> Self {
        let transport = ReqwestTransport::new(&settings);
        Self::with_transport(transport, settings)
    }
}

impl<T: Transport> Prober<T> {
    pub fn with_transport(transport: T, settings: ProbeSettings) -> Self {
        Self {
            transport: Arc::new(transport),
            settings: Arc::new(settings.normalized()),
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Probe every host and wait for all of them.
    ///
    /// The returned set holds exactly one result per input entry, in input
    /// order. Duplicates are probed independently.
    pub async fn check_hosts(&self, hosts: &[String]) -> ProbeResultSet {
        if hosts.is_empty() {
            return ProbeResultSet::default();
        }

        log::info!(
            "Probing {} hosts with {} workers",
            hosts.len(),
            self.settings.max_workers
        );

        let mut results: Vec<(usize, ProbeResult)> = self.probes(hosts.to_vec()).collect().await;
        results.sort_by_key(|(index, _)| *index);

        let results: ProbeResultSet = results.into_iter().map(|(_, result)| result).collect();
        log::info!("{}/{} hosts alive", results.alive().count(), results.len());
        results
    }

    /// Results in completion order, as soon as each probe finishes.
    pub fn stream_hosts(&self, hosts: Vec<String>) -> impl Stream<Item = ProbeResult> + '_ {
        self.probes(hosts).map(|(_, result)| result)
    }

    fn probes(&self, hosts: Vec<String>) -> impl Stream<Item = (usize, ProbeResult)> + '_ {
        stream::iter(hosts.into_iter().enumerate())
            .map(move |(index, host)| {
                let handle = self.spawn_probe(host.clone());
                async move {
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            log::error!("Probe for {host} did not complete: {e}");
                            ProbeResult::degraded(host, e.to_string())
                        }
                    };
                    (index, result)
                }
            })
            .buffer_unordered(self.settings.max_workers)
    }

    fn spawn_probe(&self, host: String) -> AbortOnDropHandle<ProbeResult> {
        let transport = Arc::clone(&self.transport);
        let settings = Arc::clone(&self.settings);
        AbortOnDropHandle::new(tokio::spawn(async move {
            check_host(transport.as_ref(), &host, &settings).await
        }))
    }
}
