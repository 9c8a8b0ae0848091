//! The mailbox scanner.
//!
//! Routing cascade per message: ledger skip, calendar/automated/self
//! filters, notes-bot and internal-broadcast mail to the ingest queue,
//! calendar-shaped bodies dropped, external-domain mail to the ingest
//! queue, and finally the deterministic extractor over the quote-
//! stripped body of trusted internal mail. Every examined message is
//! marked processed exactly once, whatever path it took.

use tracing::{debug, info, warn};

use scout_core::error::Result;
use scout_core::types::{truncate_chars, SourceKind};
use scout_storage::ledger::message_id;

use crate::context::ScanContext;
use crate::filters;
use crate::merge;
use crate::sources::MailMessage;

/// One mail scan pass. Transient retrieval failures abort the pass;
/// nothing was marked processed, so the next cycle retries.
pub async fn scan_mail(ctx: &ScanContext) -> Result<()> {
    let Some(source) = &ctx.mail else {
        debug!("mail source not configured");
        return Ok(());
    };

    let messages = source
        .fetch_recent(
            ctx.config.scan.mail_lookback_days,
            ctx.config.scan.mail_batch_limit,
        )
        .await?;
    info!(count = messages.len(), "mail scan: messages to check");

    for message in &messages {
        // One bad message never stops the batch.
        if let Err(e) = process_message(ctx, message) {
            warn!(error = %e, "mail message skipped");
        }
    }
    Ok(())
}

fn process_message(ctx: &ScanContext, message: &MailMessage) -> Result<()> {
    let native_id = message.message_id.trim();
    if native_id.is_empty() {
        // Without an id the ledger cannot record it; leave it alone.
        return Ok(());
    }
    let pid = message_id("email", native_id);
    if ctx.ledger.contains(&pid) {
        return Ok(());
    }

    let subject = message.subject.as_str();
    let sender = message.sender.as_str();
    let subject_short = truncate_chars(subject, 55);

    // Calendar traffic and automated senders carry no directives.
    if filters::is_calendar_subject(subject)
        || filters::is_self_sender(sender, &ctx.user.email)
        || filters::is_automated_sender(sender)
    {
        info!(subject = %subject_short, "skipping calendar/automated mail");
        return ctx.ledger.mark(&pid);
    }

    // Meeting-notes-bot mail needs semantic judgment -- queue it.
    if is_notes_bot(ctx, sender) {
        ctx.queue.enqueue(
            &format!("{}\n\n{}", subject, message.body),
            &format!("Meeting notes: {}", truncate_chars(subject, 80)),
        )?;
        info!(subject = %subject_short, "queued notes-bot mail");
        return ctx.ledger.mark(&pid);
    }

    let internal = filters::is_internal_sender(sender, &ctx.user.internal_domain);

    // Broadcast/summary mail is too contextual for the rule cascade.
    if internal && filters::is_broadcast_subject(subject) {
        ctx.queue.enqueue(
            &framed_body(sender, subject, &message.body),
            &format!("Email: {}", truncate_chars(subject, 80)),
        )?;
        info!(subject = %subject_short, "queued internal broadcast mail");
        return ctx.ledger.mark(&pid);
    }

    // Calendar-shaped bodies arrive from human senders too, e.g.
    // reschedule replies.
    if filters::is_calendar_body(&message.body) {
        info!(subject = %subject_short, "skipping calendar-shaped body");
        return ctx.ledger.mark(&pid);
    }

    // The deterministic extractor is tuned for terse internal mail;
    // external text produces too many false positives, so it goes to
    // the queue for the external agent to judge.
    if !internal {
        ctx.queue.enqueue(
            &framed_body(sender, subject, &message.body),
            &format!("Email: {}", truncate_chars(subject, 80)),
        )?;
        info!(subject = %subject_short, "queued external mail");
        return ctx.ledger.mark(&pid);
    }

    // Trusted internal mail: extract from the newly-authored portion of
    // the body only. Headers stay out -- they create false-positive name
    // matches.
    info!(subject = %subject_short, "checking internal mail");
    let fresh = filters::strip_quoted_history(&message.body);
    let today = ctx.today();
    let detail = format!(
        "{} — {}",
        truncate_chars(subject, 60),
        filters::display_name(sender)
    );
    for candidate in ctx.extractor.extract("email", &fresh, today) {
        merge::merge_candidate(&ctx.store, &candidate, SourceKind::Email, &detail, today)?;
    }
    ctx.ledger.mark(&pid)
}

fn is_notes_bot(ctx: &ScanContext, sender: &str) -> bool {
    let sender = sender.to_lowercase();
    ctx.config
        .user
        .notes_bot_senders
        .iter()
        .any(|marker| !marker.is_empty() && sender.contains(&marker.to_lowercase()))
}

fn framed_body(sender: &str, subject: &str, body: &str) -> String {
    format!("From: {}\nSubject: {}\n\n{}", sender, subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_core::config::ScoutConfig;

    fn ctx_in(dir: &tempfile::TempDir) -> ScanContext {
        let mut config = ScoutConfig::default();
        config.user.full_name = "Morgan Reyes".to_string();
        config.user.email = "morgan@corgi.dev".to_string();
        config.user.internal_domain = "corgi.dev".to_string();
        config.user.notes_bot_senders = vec!["meeting-notes@".to_string()];
        ScanContext::new(config, dir.path()).unwrap()
    }

    fn mail(id: &str, subject: &str, sender: &str, body: &str) -> MailMessage {
        MailMessage {
            message_id: id.to_string(),
            subject: subject.to_string(),
            sender: sender.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_internal_directive_becomes_task() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m1@corgi.dev>",
            "pricing",
            "Jordan Lee <jordan@corgi.dev>",
            "Morgan, can you confirm the vendor shortlist this week?",
        );
        process_message(&ctx, &msg).unwrap();

        let book = ctx.store.load().unwrap();
        assert_eq!(book.len(), 1);
        assert!(book.today[0].source_detail.contains("Jordan Lee"));
        assert!(ctx.ledger.contains("email_<m1@corgi.dev>"));
        assert!(ctx.queue.pending().unwrap().is_empty());
    }

    #[test]
    fn test_calendar_subject_marked_and_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m2@corgi.dev>",
            "Invitation: Q3 planning",
            "Jordan Lee <jordan@corgi.dev>",
            "Morgan, can you confirm the vendor shortlist this week?",
        );
        process_message(&ctx, &msg).unwrap();
        assert!(ctx.store.load().unwrap().is_empty());
        assert!(ctx.ledger.contains("email_<m2@corgi.dev>"));
    }

    #[test]
    fn test_self_sent_mail_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m3@corgi.dev>",
            "note to self",
            "Morgan Reyes <morgan@corgi.dev>",
            "Morgan, can you review the summary?",
        );
        process_message(&ctx, &msg).unwrap();
        assert!(ctx.store.load().unwrap().is_empty());
        assert!(ctx.ledger.contains("email_<m3@corgi.dev>"));
    }

    #[test]
    fn test_notes_bot_mail_is_queued() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m4@x>",
            "Notes: weekly sync",
            "Notes <meeting-notes@recorder.example.com>",
            "Morgan agreed to send the pricing sheet.",
        );
        process_message(&ctx, &msg).unwrap();

        let pending = ctx.queue.pending().unwrap();
        assert_eq!(pending.len(), 1);
        let item = ctx.queue.read(&pending[0]).unwrap();
        assert!(item.source.starts_with("Meeting notes:"));
        assert!(item.text.contains("Morgan agreed"));
        assert!(ctx.store.load().unwrap().is_empty());
        assert!(ctx.ledger.contains("email_<m4@x>"));
    }

    #[test]
    fn test_internal_broadcast_is_queued() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m5@corgi.dev>",
            "Weekly summary: platform",
            "Jordan Lee <jordan@corgi.dev>",
            "Lots of context here. Morgan, please review the deck.",
        );
        process_message(&ctx, &msg).unwrap();
        assert_eq!(ctx.queue.pending().unwrap().len(), 1);
        assert!(ctx.store.load().unwrap().is_empty());
    }

    #[test]
    fn test_external_mail_is_queued_not_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m6@vendor>",
            "Quick question",
            "Sales <sales@outbound.example.com>",
            "Morgan, can you review our amazing new product today?",
        );
        process_message(&ctx, &msg).unwrap();

        let pending = ctx.queue.pending().unwrap();
        assert_eq!(pending.len(), 1);
        let item = ctx.queue.read(&pending[0]).unwrap();
        assert!(item.text.starts_with("From: Sales"));
        assert!(ctx.store.load().unwrap().is_empty());
    }

    #[test]
    fn test_calendar_shaped_body_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m7@corgi.dev>",
            "moved our chat",
            "Jordan Lee <jordan@corgi.dev>",
            "Organizer: Jordan Lee\nWhen: Thursday 2pm - 3pm\nGoing? Yes",
        );
        process_message(&ctx, &msg).unwrap();
        assert!(ctx.store.load().unwrap().is_empty());
        assert!(ctx.queue.pending().unwrap().is_empty());
        assert!(ctx.ledger.contains("email_<m7@corgi.dev>"));
    }

    #[test]
    fn test_quoted_history_not_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail(
            "<m8@corgi.dev>",
            "re: vendor list",
            "Jordan Lee <jordan@corgi.dev>",
            "Thanks, all set.\n\nOn Tue, Jan 2 at 3:00 PM Jordan <jordan@corgi.dev> wrote:\n> Morgan, can you confirm the vendor shortlist this week?",
        );
        process_message(&ctx, &msg).unwrap();
        assert!(ctx.store.load().unwrap().is_empty());
        assert!(ctx.ledger.contains("email_<m8@corgi.dev>"));
    }

    #[test]
    fn test_already_processed_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        ctx.ledger.mark("email_<m9@corgi.dev>").unwrap();
        let msg = mail(
            "<m9@corgi.dev>",
            "pricing",
            "Jordan Lee <jordan@corgi.dev>",
            "Morgan, can you confirm the vendor shortlist this week?",
        );
        process_message(&ctx, &msg).unwrap();
        assert!(ctx.store.load().unwrap().is_empty());
    }

    #[test]
    fn test_missing_message_id_not_marked() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        let msg = mail("  ", "x", "Jordan <jordan@corgi.dev>", "body");
        process_message(&ctx, &msg).unwrap();
        assert!(ctx.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_scan_without_source_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_in(&dir);
        scan_mail(&ctx).await.unwrap();
        assert!(ctx.store.load().unwrap().is_empty());
    }
}
