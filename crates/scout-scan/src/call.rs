//! The call-transcript scanner.
//!
//! Calls arrive with flattened speaker-labelled transcripts; the
//! extractor runs over the whole transcript and the call title becomes
//! the provenance detail. A call with no transcript is still marked
//! processed -- there is nothing more to learn from it.

use tracing::{debug, info, warn};

use scout_core::error::Result;
use scout_core::types::SourceKind;
use scout_storage::ledger::message_id;

use crate::context::ScanContext;
use crate::merge;
use crate::sources::CallRecord;

/// One call scan pass.
pub async fn scan_calls(ctx: &ScanContext) -> Result<()> {
    let Some(source) = &ctx.calls else {
        debug!("call source not configured");
        return Ok(());
    };

    let calls = source
        .fetch_recent(ctx.config.scan.call_lookback_hours)
        .await?;
    info!(count = calls.len(), "call scan: recent calls");

    for call in &calls {
        if let Err(e) = process_call(ctx, call) {
            warn!(error = %e, title = %call.title, "call skipped");
        }
    }
    Ok(())
}

fn process_call(ctx: &ScanContext, call: &CallRecord) -> Result<()> {
    let native_id = call.call_id.trim();
    if native_id.is_empty() {
        return Ok(());
    }
    let pid = message_id("call", native_id);
    if ctx.ledger.contains(&pid) {
        return Ok(());
    }

    if !call.transcript.trim().is_empty() {
        info!(title = %call.title, "checking call transcript");
        let today = ctx.today();
        for candidate in ctx
            .extractor
            .extract("call transcript", &call.transcript, today)
        {
            merge::merge_candidate(&ctx.store, &candidate, SourceKind::Call, &call.title, today)?;
        }
    }
    ctx.ledger.mark(&pid)
}
