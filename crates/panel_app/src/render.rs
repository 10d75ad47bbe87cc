use panel_core::{PanelViewModel, SessionState};

const BAR_WIDTH: usize = 30;

/// Prints the current session view as plain lines. Called only when the
/// state reported itself dirty, so quiet polls produce no output.
pub fn draw(view: &PanelViewModel) {
    match view.session {
        SessionState::Idle => {}
        SessionState::Polling => {
            println!(
                "[{}] {:>3}% {} (poll {})",
                bar(view.percent),
                view.percent,
                view.activity,
                view.polls
            );
        }
        SessionState::Completed => draw_completed(view),
        SessionState::Failed => {
            let reason = view.error.as_deref().unwrap_or("unknown error");
            println!("Job failed: {reason}");
        }
        SessionState::TimedOut => {
            let reason = view.error.as_deref().unwrap_or("timed out");
            println!("Gave up waiting: {reason}");
        }
    }
}

fn draw_completed(view: &PanelViewModel) {
    println!("[{}] 100% Scraping completed", bar(100));
    if let Some(job_id) = &view.job_id {
        println!("Job: {job_id}");
    }
    if let Some(metrics) = &view.metrics {
        println!(
            "Products: {}  Pages: {}  Duration: {}  Files: {}",
            metrics.total_products, metrics.pages_crawled, metrics.duration, metrics.file_count
        );
    }
    for row in &view.artifacts {
        match (&row.filename, &row.size_label, &row.failure) {
            (Some(filename), Some(size), _) => {
                println!("  {} -> {} ({})", row.label, filename, size);
            }
            (_, _, Some(reason)) => {
                println!("  {} failed: {}", row.label, reason);
            }
            _ => {}
        }
    }
    if let Some(url) = &view.sheet_url {
        println!("Spreadsheet: {url}");
    }
    if let Some(error) = &view.error {
        println!("Note: {error}");
    }
}

fn bar(percent: u8) -> String {
    let filled = (percent as usize * BAR_WIDTH) / 100;
    let mut bar = String::with_capacity(BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar
}
