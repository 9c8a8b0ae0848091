//! Daily reminder timers.
//!
//! Two independent timers over the task store: an afternoon digest of
//! unfinished "today" tasks, and a morning check that fires when a
//! long-term task's due date is a configured number of days away.
//! Delivery goes through every wired notifier, best-effort and
//! fire-and-forget, each channel independent of the others.

use std::sync::Arc;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tokio::sync::Notify;
use tracing::{info, warn};

use scout_core::error::Result;

use crate::context::ScanContext;
use crate::sources::Notifier;

pub struct ReminderService {
    ctx: Arc<ScanContext>,
    notifiers: Vec<Arc<dyn Notifier>>,
    shutdown: Notify,
}

impl ReminderService {
    pub fn new(ctx: Arc<ScanContext>, notifiers: Vec<Arc<dyn Notifier>>) -> Self {
        Self {
            ctx,
            notifiers,
            shutdown: Notify::new(),
        }
    }

    /// Drive both timers until shutdown.
    pub async fn run(&self) {
        tokio::join!(self.digest_loop(), self.due_check_loop());
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }

    async fn digest_loop(&self) {
        let cfg = &self.ctx.config.reminders;
        loop {
            let secs = seconds_until(Local::now().naive_local(), cfg.digest_hour, cfg.digest_minute);
            info!(hours = secs as f64 / 3600.0, "next open-task digest");
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs(secs)) => {}
                _ = self.shutdown.notified() => return,
            }
            if let Err(e) = self.send_digest() {
                warn!(error = %e, "open-task digest failed");
            }
        }
    }

    async fn due_check_loop(&self) {
        let cfg = &self.ctx.config.reminders;
        loop {
            let secs =
                seconds_until(Local::now().naive_local(), cfg.due_check_hour, cfg.due_check_minute);
            info!(hours = secs as f64 / 3600.0, "next due-date check");
            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs(secs)) => {}
                _ = self.shutdown.notified() => return,
            }
            if let Err(e) = self.send_due_reminders() {
                warn!(error = %e, "due-date check failed");
            }
        }
    }

    /// Digest of unfinished tasks in the "today" bucket.
    fn send_digest(&self) -> Result<()> {
        let book = self.ctx.store.load()?;
        let open: Vec<_> = book.today.iter().filter(|t| !t.done).collect();
        if open.is_empty() {
            info!("all daily tasks complete -- no digest sent");
            return Ok(());
        }

        let lines: Vec<String> = open
            .iter()
            .map(|t| format!("  - [{}] {}", t.priority.label().to_uppercase(), t.text))
            .collect();
        let subject = format!("{} daily task(s) still open", open.len());
        let body = format!(
            "You have {} unfinished task(s) today:\n\n{}",
            open.len(),
            lines.join("\n")
        );
        info!(count = open.len(), "sending open-task digest");
        self.notify_all(&subject, &body);
        Ok(())
    }

    /// One reminder per long-term task whose due date is exactly a
    /// configured number of days away.
    fn send_due_reminders(&self) -> Result<()> {
        let book = self.ctx.store.load()?;
        let today = self.ctx.today();
        let thresholds = &self.ctx.config.reminders.due_thresholds;

        let mut fired = 0usize;
        for task in book.longterm.iter().filter(|t| !t.done) {
            let Some(due) = task.due else { continue };
            let days_left = days_between(today, due);
            if !thresholds.contains(&days_left) {
                continue;
            }
            let subject = format!("{}d left: \"{}\"", days_left, task.text);
            let body = format!(
                "Long-term task due in {} day(s):\n\n  Task:     {}\n  Priority: {}\n  Due:      {}",
                days_left,
                task.text,
                task.priority.label(),
                due
            );
            info!(days_left, task = %task.text, "due-date reminder");
            self.notify_all(&subject, &body);
            fired += 1;
        }
        if fired == 0 {
            info!("no due-date thresholds hit today");
        }
        Ok(())
    }

    /// Fan out to every notifier, fire-and-forget. A failing channel is
    /// logged and never blocks the others.
    fn notify_all(&self, subject: &str, body: &str) {
        for notifier in &self.notifiers {
            let notifier = Arc::clone(notifier);
            let subject = subject.to_string();
            let body = body.to_string();
            tokio::spawn(async move {
                if let Err(e) = notifier.notify(&subject, &body).await {
                    warn!(channel = notifier.channel(), error = %e, "notification failed");
                }
            });
        }
    }
}

/// Seconds from `now` until the next occurrence of `hour:minute`,
/// rolling to tomorrow when the time has already passed today.
pub fn seconds_until(now: NaiveDateTime, hour: u32, minute: u32) -> u64 {
    let target_time = chrono::NaiveTime::from_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| chrono::NaiveTime::from_hms_opt(0, 0, 0).expect("midnight exists"));
    let mut target = now.date().and_time(target_time);
    if now >= target {
        target += chrono::Duration::days(1);
    }
    (target - now).num_seconds().max(0) as u64
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
