//! Detects when assigned content has actually mounted in its host.
//!
//! Each content assignment opens a new [`Generation`]. Ready fires at most once
//! per generation, on the first child insertion or when the fallback timer
//! runs out, whichever comes first. Signals carrying an older generation are
//! ignored, so a slow timer from replaced content can never fire Ready.

use std::time::Duration;

/// How long to wait for an observable insertion before assuming the content
/// is there anyway.
pub const READY_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCause {
    Mutation,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyEvent {
    pub generation: Generation,
    pub cause: ReadyCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Watching(Generation),
    Ready(Generation),
}

#[derive(Debug, Default)]
pub struct MountReadiness {
    issued: u64,
    phase: Phase,
}

impl MountReadiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// New content was assigned. Anything issued before is now stale; the
    /// caller is expected to have torn down its observer and timer.
    pub fn watch(&mut self) -> Generation {
        self.issued += 1;
        let generation = Generation(self.issued);
        tracing::debug!(generation = generation.0, "watching for mounted content");
        self.phase = Phase::Watching(generation);
        generation
    }

    /// An insertion was observed under the host.
    pub fn on_mutation(&mut self, generation: Generation, host_has_children: bool) -> Option<ReadyEvent> {
        if !host_has_children {
            return None;
        }
        self.fire(generation, ReadyCause::Mutation)
    }

    pub fn on_timeout(&mut self, generation: Generation) -> Option<ReadyEvent> {
        self.fire(generation, ReadyCause::Timeout)
    }

    fn fire(&mut self, generation: Generation, cause: ReadyCause) -> Option<ReadyEvent> {
        if self.phase != Phase::Watching(generation) {
            return None;
        }
        self.phase = Phase::Ready(generation);
        match cause {
            ReadyCause::Mutation => {
                tracing::debug!(generation = generation.0, "content detected in host")
            }
            ReadyCause::Timeout => {
                tracing::debug!(generation = generation.0, "no insertion seen, assuming content is ready")
            }
        }
        Some(ReadyEvent { generation, cause })
    }

    /// Host unmounted. Every outstanding generation becomes stale.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Whether work started for `generation` may still touch the host.
    pub fn is_current(&self, generation: Generation) -> bool {
        matches!(self.phase, Phase::Watching(g) | Phase::Ready(g) if g == generation)
    }
}
