//! The scan orchestrator.
//!
//! One cycle runs all scanners concurrently under a non-blocking run
//! gate: a trigger that arrives while a cycle is in flight is dropped,
//! not queued. Each scanner gets a bounded wait; one that overruns is
//! abandoned, not cancelled -- its eventual writes may still land after
//! the cycle reports complete. Scheduled cycles re-arm a fixed interval
//! after completion, so drift accumulates by design.

use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as TokioMutex, Notify};
use tracing::{info, warn};

use crate::call::scan_calls;
use crate::chat::scan_chat;
use crate::context::ScanContext;
use crate::mail::scan_mail;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
}

/// Externally visible orchestrator status.
#[derive(Clone, Debug)]
pub struct ScanStatus {
    pub state: ScanState,
    pub last: Option<DateTime<Utc>>,
    pub next: Option<DateTime<Utc>>,
}

pub struct ScanOrchestrator {
    ctx: Arc<ScanContext>,
    run_gate: TokioMutex<()>,
    status: StdMutex<ScanStatus>,
    shutdown: Notify,
}

impl ScanOrchestrator {
    pub fn new(ctx: Arc<ScanContext>) -> Self {
        Self {
            ctx,
            run_gate: TokioMutex::new(()),
            status: StdMutex::new(ScanStatus {
                state: ScanState::Idle,
                last: None,
                next: None,
            }),
            shutdown: Notify::new(),
        }
    }

    pub fn status(&self) -> ScanStatus {
        self.status
            .lock()
            .map(|s| s.clone())
            .unwrap_or(ScanStatus {
                state: ScanState::Idle,
                last: None,
                next: None,
            })
    }

    /// Run one scan cycle now.
    ///
    /// Returns false when a cycle is already in flight -- the request is
    /// dropped and logged, never queued.
    pub async fn run_cycle(&self, manual: bool) -> bool {
        let Ok(_guard) = self.run_gate.try_lock() else {
            info!("scan already running -- trigger dropped");
            return false;
        };

        self.set_state(ScanState::Running);
        info!(
            kind = if manual { "manual" } else { "scheduled" },
            "scan cycle starting"
        );

        let timeout = std::time::Duration::from_secs(self.ctx.config.scan.scanner_timeout_secs);
        let scanners = [
            ("mail", spawn_scanner(&self.ctx, ScannerKind::Mail)),
            ("chat", spawn_scanner(&self.ctx, ScannerKind::Chat)),
            ("calls", spawn_scanner(&self.ctx, ScannerKind::Calls)),
        ];

        for (name, mut handle) in scanners {
            match tokio::time::timeout(timeout, &mut handle).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => warn!(scanner = name, error = %e, "scanner aborted this cycle"),
                Ok(Err(e)) => warn!(scanner = name, error = %e, "scanner task failed"),
                // Dropping the handle detaches the task; its writes may
                // still land later.
                Err(_) => warn!(scanner = name, "scanner overran its wait -- abandoned"),
            }
        }

        if let Ok(mut status) = self.status.lock() {
            status.state = ScanState::Idle;
            status.last = Some(Utc::now());
        }
        info!("scan cycle complete");
        true
    }

    /// The scheduled loop: first cycle after the startup delay, then a
    /// fixed interval from each completion. Returns on shutdown.
    pub async fn run(&self) {
        let startup = std::time::Duration::from_secs(self.ctx.config.scan.startup_delay_secs);
        tokio::select! {
            _ = tokio::time::sleep(startup) => {}
            _ = self.shutdown.notified() => return,
        }

        loop {
            self.run_cycle(false).await;

            let interval =
                std::time::Duration::from_secs(self.ctx.config.scan.interval_minutes * 60);
            if let Ok(mut status) = self.status.lock() {
                status.next = Some(Utc::now() + chrono::Duration::seconds(interval.as_secs() as i64));
            }
            info!(
                minutes = self.ctx.config.scan.interval_minutes,
                "next scheduled scan"
            );

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.shutdown.notified() => return,
            }
        }
    }

    /// Signal the scheduled loop to stop after the current cycle.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    fn set_state(&self, state: ScanState) {
        if let Ok(mut status) = self.status.lock() {
            status.state = state;
        }
    }
}

enum ScannerKind {
    Mail,
    Chat,
    Calls,
}

fn spawn_scanner(
    ctx: &Arc<ScanContext>,
    kind: ScannerKind,
) -> tokio::task::JoinHandle<scout_core::error::Result<()>> {
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        match kind {
            ScannerKind::Mail => scan_mail(&ctx).await,
            ScannerKind::Chat => scan_chat(&ctx).await,
            ScannerKind::Calls => scan_calls(&ctx).await,
        }
    })
}
