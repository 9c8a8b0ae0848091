//! The chat scanner.
//!
//! Chat search surfaces recent mentions of the tracked person; the
//! scanner windows them to the current cycle, skips self-sent messages,
//! frames each with its sender and channel, and runs the extractor.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use scout_core::error::Result;
use scout_core::types::SourceKind;
use scout_storage::ledger::message_id;

use crate::context::ScanContext;
use crate::merge;
use crate::sources::ChatMessage;

/// One chat scan pass.
pub async fn scan_chat(ctx: &ScanContext) -> Result<()> {
    let Some(source) = &ctx.chat else {
        debug!("chat source not configured");
        return Ok(());
    };

    let messages = source.fetch_recent().await?;
    info!(count = messages.len(), "chat scan: messages to check");

    // Window: the scan interval plus a little slack, so a message
    // landing mid-cycle is seen by exactly one of two adjacent cycles.
    let window_minutes =
        ctx.config.scan.interval_minutes + ctx.config.scan.chat_slack_minutes;
    let cutoff = Utc::now() - Duration::minutes(window_minutes as i64);

    let mut seen_this_pass: HashSet<String> = HashSet::new();

    for message in &messages {
        if message.ts.trim().is_empty()
            || message.posted_at < cutoff
            || !seen_this_pass.insert(message.ts.clone())
        {
            continue;
        }
        if let Err(e) = process_message(ctx, message) {
            warn!(error = %e, "chat message skipped");
        }
    }
    Ok(())
}

fn process_message(ctx: &ScanContext, message: &ChatMessage) -> Result<()> {
    let pid = message_id("chat", message.ts.trim());
    if ctx.ledger.contains(&pid) {
        return Ok(());
    }

    // The person's own messages are never directives to themselves.
    if is_self_chat(ctx, &message.sender) {
        return ctx.ledger.mark(&pid);
    }

    info!(channel = %message.channel, "checking chat message");
    let content = format!(
        "From: {} in #{}\n\n{}",
        message.sender, message.channel, message.text
    );
    let today = ctx.today();
    let detail = format!("#{}", message.channel);
    for candidate in ctx.extractor.extract("chat message", &content, today) {
        merge::merge_candidate(&ctx.store, &candidate, SourceKind::Chat, &detail, today)?;
    }
    ctx.ledger.mark(&pid)
}

fn is_self_chat(ctx: &ScanContext, sender: &str) -> bool {
    let sender = sender.trim();
    if sender.is_empty() {
        return false;
    }
    let handle = ctx.user.chat_handle.trim();
    (!handle.is_empty() && sender.eq_ignore_ascii_case(handle))
        || (!ctx.user.full_name.is_empty() && sender.eq_ignore_ascii_case(&ctx.user.full_name))
}
