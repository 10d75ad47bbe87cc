//! Progress percentage estimation.
//!
//! The backend only exposes a coarse status plus a free-text message, so the
//! panel approximates advancement with ordered band heuristics. A structured
//! stage hint, when present, takes precedence over message matching; the two
//! paths are kept separate so the structured one can fully replace the
//! heuristic one without touching call sites.

use crate::status::{JobStatus, StageHint};

/// Percentage shown as soon as a job is accepted.
pub const PENDING_PERCENT: u8 = 5;

const CRAWL_BAND: (u8, u8) = (10, 40);
const SCRAPE_BAND: (u8, u8) = (40, 70);
const UPLOAD_BAND: (u8, u8) = (70, 85);
const EXPORT_BAND: (u8, u8) = (85, 95);
const RUNNING_CAP: u8 = 90;
const EXPORTING_PERCENT: u8 = 95;

/// Maps the previous percentage plus the latest snapshot fields to a new
/// percentage. Never decreases within a running session; the only downward
/// move is the reset to 0 on `failed`.
pub fn estimate(prev: u8, status: &JobStatus, stage: Option<StageHint>, message: &str) -> u8 {
    match status {
        JobStatus::Pending => PENDING_PERCENT,
        JobStatus::Running => running_percent(prev, stage, message),
        JobStatus::Exporting => EXPORTING_PERCENT,
        JobStatus::Completed => 100,
        JobStatus::Failed => 0,
        JobStatus::Other(_) => prev,
    }
}

fn running_percent(prev: u8, stage: Option<StageHint>, message: &str) -> u8 {
    if let Some(hint) = stage {
        return stage_percent(prev, hint);
    }
    message_percent(prev, message)
}

/// Structured path: the backend named its stage, no text sniffing needed.
fn stage_percent(prev: u8, hint: StageHint) -> u8 {
    match hint {
        StageHint::Crawling => advance(prev, 2, 0, CRAWL_BAND.1),
        StageHint::Scraping => advance(prev, 1, SCRAPE_BAND.0, SCRAPE_BAND.1),
        StageHint::Uploading => advance(prev, 2, UPLOAD_BAND.0, UPLOAD_BAND.1),
        StageHint::Exporting => advance(prev, 2, EXPORT_BAND.0, EXPORT_BAND.1),
    }
}

/// Degraded path: ordered substring heuristics over the status message.
/// First match wins.
fn message_percent(prev: u8, message: &str) -> u8 {
    if message.contains("Crawling") || message.contains("Discovering") {
        if let Some((current, total)) = parse_bracket_pair(message) {
            // Map crawl sub-progress onto the crawl band.
            let span = u32::from(CRAWL_BAND.1 - CRAWL_BAND.0);
            let scaled = current.saturating_mul(span) / total;
            return CRAWL_BAND.0 + scaled.min(span) as u8;
        }
        return advance(prev, 2, 0, CRAWL_BAND.1);
    }
    if message.contains("Scraping product") || message.contains("Product Summary") {
        return advance(prev, 1, SCRAPE_BAND.0, SCRAPE_BAND.1);
    }
    if message.contains("Uploading") || message.contains("Google Sheets") {
        return advance(prev, 2, UPLOAD_BAND.0, UPLOAD_BAND.1);
    }
    if message.contains("Exporting") || message.contains("files") {
        return advance(prev, 2, EXPORT_BAND.0, EXPORT_BAND.1);
    }
    advance(prev, 1, 0, RUNNING_CAP)
}

/// `clamp(max(prev + step, floor), floor, ceil)`.
fn advance(prev: u8, step: u8, floor: u8, ceil: u8) -> u8 {
    prev.saturating_add(step).max(floor).min(ceil)
}

/// Extracts a `[current/total]` pair from a message like `Crawling [3/10] pages`.
/// Zero totals and unparseable integers are rejected so the caller falls back
/// to the gradual-increase branch.
fn parse_bracket_pair(message: &str) -> Option<(u32, u32)> {
    let open = message.find('[')?;
    let rest = &message[open + 1..];
    let close = rest.find(']')?;
    let (current, total) = rest[..close].split_once('/')?;
    let current = current.trim().parse::<u32>().ok()?;
    let total = total.trim().parse::<u32>().ok()?;
    if total == 0 {
        return None;
    }
    Some((current, total))
}
