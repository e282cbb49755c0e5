//! Scripted transport for exercising the prober without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{LivenessResponse, Session, Transport, TransportError};

#[derive(Debug, Clone)]
pub(crate) enum Behaviour {
    Respond { status: u16, server: Option<String> },
    Fail(String),
    Hang,
    Panic,
}

impl Behaviour {
    pub(crate) fn respond(status: u16, server: Option<&str>) -> Self {
        Behaviour::Respond {
            status,
            server: server.map(str::to_string),
        }
    }

    pub(crate) fn fail(message: &str) -> Self {
        Behaviour::Fail(message.to_string())
    }
}

#[derive(Default)]
struct Inner {
    routes: HashMap<String, Behaviour>,
    latency: Duration,
    broken_sessions: bool,
    calls: Mutex<Vec<String>>,
    sessions: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Unrouted URLs are refused.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    inner: Arc<Inner>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn inner_mut(&mut self) -> &mut Inner {
        Arc::get_mut(&mut self.inner).expect("configure the fake before sharing it")
    }

    pub(crate) fn route(mut self, url: &str, behaviour: Behaviour) -> Self {
        self.inner_mut().routes.insert(url.to_string(), behaviour);
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.inner_mut().latency = latency;
        self
    }

    pub(crate) fn with_broken_sessions(mut self) -> Self {
        self.inner_mut().broken_sessions = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn sessions(&self) -> usize {
        self.inner.sessions.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    type Session = FakeTransport;

    fn session(&self) -> Result<FakeTransport, TransportError> {
        if self.inner.broken_sessions {
            return Err(TransportError::Request("could not build client".to_string()));
        }
        self.inner.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(self.clone())
    }
}

struct InFlight<'a>(&'a Inner);

impl<'a> InFlight<'a> {
    fn enter(inner: &'a Inner) -> Self {
        let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(inner)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Session for FakeTransport {
    async fn head(&self, url: &str) -> Result<LivenessResponse, TransportError> {
        self.inner.calls.lock().expect("calls lock").push(url.to_string());
        let _guard = InFlight::enter(&self.inner);

        if !self.inner.latency.is_zero() {
            tokio::time::sleep(self.inner.latency).await;
        }

        match self.inner.routes.get(url) {
            Some(Behaviour::Respond { status, server }) => Ok(LivenessResponse {
                status: *status,
                server: server.clone(),
                final_url: format!("{url}/"),
            }),
            Some(Behaviour::Fail(message)) => Err(TransportError::Connect(message.clone())),
            Some(Behaviour::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(TransportError::Timeout("fake hang elapsed".to_string()))
            }
            Some(Behaviour::Panic) => panic!("fake transport blew up on {url}"),
            None => Err(TransportError::Connect("connection refused".to_string())),
        }
    }
}
