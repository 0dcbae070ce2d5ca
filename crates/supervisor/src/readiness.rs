//! Readiness polling with crash detection.
//!
//! The loop is an explicit state machine over [`PollPhase`]. After every failed
//! probe the process is checked for exit before the next sleep, so a crash is
//! noticed within one poll interval and a dead process is never probed again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::debug;
use url::Url;

use crate::errors::SupervisorError;
use crate::process::{NodeExit, NodeProcess};

/// Result of a single readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Ready,
    /// Not serving yet; carries the reason for debug logs.
    NotReady(String),
}

/// Lightweight liveness request against the node.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

/// Probes an HTTP endpoint; `200 OK` means ready.
#[derive(Debug, Clone)]
pub struct HttpReadinessProbe {
    client: Client,
    url: Url,
}

impl HttpReadinessProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, SupervisorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SupervisorError::ProbeClient { source })?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl ReadinessProbe for HttpReadinessProbe {
    async fn probe(&self) -> ProbeOutcome {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) if response.status() == StatusCode::OK => ProbeOutcome::Ready,
            Ok(response) => ProbeOutcome::NotReady(format!("HTTP {}", response.status())),
            Err(error) => ProbeOutcome::NotReady(error.to_string()),
        }
    }
}

/// Terminal outcome of [`wait_until_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    Ready,
    Crashed(NodeExit),
}

/// Phase of the readiness loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Probe,
    CheckExit,
    Sleep,
}

/// What happened while executing a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    ProbeSucceeded,
    ProbeFailed,
    ProcessExited(NodeExit),
    ProcessAlive,
    Slept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTransition {
    Continue(PollPhase),
    Finish(ReadyOutcome),
}

impl PollPhase {
    /// Transition table of the readiness loop.
    ///
    /// Events that don't belong to the current phase leave it unchanged.
    pub fn advance(self, event: PollEvent) -> PollTransition {
        match (self, event) {
            (PollPhase::Probe, PollEvent::ProbeSucceeded) => PollTransition::Finish(ReadyOutcome::Ready),
            (PollPhase::Probe, PollEvent::ProbeFailed) => PollTransition::Continue(PollPhase::CheckExit),
            (PollPhase::CheckExit, PollEvent::ProcessExited(exit)) => PollTransition::Finish(ReadyOutcome::Crashed(exit)),
            (PollPhase::CheckExit, PollEvent::ProcessAlive) => PollTransition::Continue(PollPhase::Sleep),
            (PollPhase::Sleep, PollEvent::Slept) => PollTransition::Continue(PollPhase::Probe),
            (phase, _) => PollTransition::Continue(phase),
        }
    }
}

/// Polls `probe` every `poll_interval` until the node serves or its process exits.
///
/// There is no overall deadline; callers wanting one can wrap this in
/// `tokio::time::timeout`. Probe failures of any kind count as "not yet".
pub async fn wait_until_ready<P, R>(process: &mut P, probe: &R, poll_interval: Duration) -> Result<ReadyOutcome, SupervisorError>
where
    P: NodeProcess + ?Sized,
    R: ReadinessProbe + ?Sized,
{
    let mut phase = PollPhase::Probe;
    let mut attempts: u64 = 0;
    loop {
        let event = match phase {
            PollPhase::Probe => {
                attempts += 1;
                debug!(attempt = attempts, "Checking if localnet is up");
                match probe.probe().await {
                    ProbeOutcome::Ready => PollEvent::ProbeSucceeded,
                    ProbeOutcome::NotReady(reason) => {
                        debug!(attempt = attempts, reason = %reason, "Localnet not ready yet");
                        PollEvent::ProbeFailed
                    }
                }
            }
            PollPhase::CheckExit => match process.try_exit()? {
                Some(exit) => PollEvent::ProcessExited(exit),
                None => PollEvent::ProcessAlive,
            },
            PollPhase::Sleep => {
                sleep(poll_interval).await;
                PollEvent::Slept
            }
        };

        match phase.advance(event) {
            PollTransition::Continue(next) => phase = next,
            PollTransition::Finish(outcome) => return Ok(outcome),
        }
    }
}
