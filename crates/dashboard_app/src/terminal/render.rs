use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};
use dashboard_core::{AppViewModel, JobDetailView, JobStatus, NoticeKind};

const BAR_WIDTH: usize = 20;

/// Draw the whole dashboard as plain text.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let health = match &view.health {
        Some(health) => format!(
            "{} (storage: {}){}",
            health.status,
            health.storage,
            if health.healthy { "" } else { " !" }
        ),
        None => "UNKNOWN".to_string(),
    };
    let _ = writeln!(out, "== Download Dashboard ==  Service: {health}");

    if let Some(notice) = &view.notice {
        let label = match notice.kind {
            NoticeKind::Validation => "!",
            NoticeKind::Failure => "ERROR",
        };
        let _ = writeln!(out, "[{label}] {}", notice.message);
    }

    out.push_str("\n-- Upload --\n");
    if view.chosen_files.is_empty() {
        out.push_str("Chosen files: none\n");
    } else {
        let _ = writeln!(out, "Chosen files: {}", view.chosen_files.join(", "));
    }
    if view.uploading {
        out.push_str("Uploading...\n");
    }
    for row in &view.uploads {
        let _ = writeln!(
            out,
            "  #{:<8} {:<32} {}",
            row.file_id,
            row.file_name,
            format_uploaded_at(row.uploaded_at_ms, &Local)
        );
    }

    out.push_str("\n-- Download --\n");
    let _ = writeln!(
        out,
        "File IDs: {}{}",
        view.file_ids_input,
        if view.initiating { "  (creating job...)" } else { "" }
    );

    let _ = writeln!(out, "\n-- Jobs ({}) --", view.job_count);
    if view.jobs.is_empty() {
        out.push_str("No jobs yet\n");
    }
    for (position, job) in view.jobs.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} #{:<2} {}  {:<10} {} {:>3}%",
            if job.selected { ">" } else { " " },
            position + 1,
            job.short_id,
            job.status,
            progress_bar(job.progress),
            job.progress
        );
    }

    if let Some(detail) = &view.detail {
        render_detail(&mut out, detail, view.polling);
    }

    out
}

fn render_detail(out: &mut String, detail: &JobDetailView, polling: bool) {
    let _ = writeln!(out, "\n-- Job {} --", detail.job_id);
    let _ = writeln!(
        out,
        "Status: {}{}",
        detail.status,
        if polling { "  (polling)" } else { "" }
    );
    let _ = writeln!(
        out,
        "Progress: {} {}%  ({} / {} files)",
        progress_bar(detail.progress),
        detail.progress,
        detail.processed,
        detail.total
    );
    if let Some(error) = &detail.error {
        let _ = writeln!(out, "Error: {error}");
    }
    if matches!(detail.status, JobStatus::Ready) || !detail.links.is_empty() {
        out.push_str("Results:\n");
        for link in &detail.links {
            let _ = writeln!(
                out,
                "  File {}: {}",
                link.index,
                link.url.as_deref().unwrap_or("Not available")
            );
        }
    }
}

/// Server progress may exceed 100; the bar is clamped, the number is not.
fn progress_bar(progress: u32) -> String {
    let filled = (progress.min(100) as usize * BAR_WIDTH) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn format_uploaded_at<Tz: TimeZone>(millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(millis) {
        Some(utc) => utc
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown time".to_string(),
    }
}
