use dashboard_logging::{dashboard_debug, dashboard_info, dashboard_warn};

use crate::input::parse_file_ids;
use crate::{AppState, Effect, JobId, JobSnapshot, Msg, Notice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesChosen(files) => {
            state.choose_files(files);
            Vec::new()
        }
        Msg::UploadClicked => {
            if state.is_uploading() {
                return (state, Vec::new());
            }
            if state.chosen_files().is_empty() {
                state.set_notice(Notice::validation("Please select at least one file"));
                return (state, Vec::new());
            }
            state.begin_upload();
            vec![Effect::UploadFiles {
                files: state.chosen_files().to_vec(),
            }]
        }
        Msg::UploadFinished(result) => {
            match result {
                Ok(records) => {
                    dashboard_info!("Uploaded {} file(s)", records.len());
                    state.finish_upload(records);
                }
                Err(reason) => {
                    state.fail_upload(Notice::failure(format!("Upload failed: {reason}")));
                }
            }
            Vec::new()
        }
        Msg::FileIdsChanged(input) => {
            state.set_file_ids_input(input);
            Vec::new()
        }
        Msg::StartDownloadClicked => {
            if state.is_initiating() {
                return (state, Vec::new());
            }
            let file_ids = parse_file_ids(state.file_ids_input());
            if file_ids.is_empty() {
                state.set_notice(Notice::validation("Please enter at least one file ID"));
                return (state, Vec::new());
            }
            state.begin_initiating();
            vec![Effect::InitiateDownload { file_ids }]
        }
        Msg::DownloadInitiated(result) => {
            state.finish_initiating();
            match result {
                Ok(job) => {
                    let snapshot =
                        JobSnapshot::created(job.job_id.clone(), job.status, job.total_file_ids);
                    if let Err(err) = state.admit_job(snapshot) {
                        dashboard_warn!("Ignoring job creation response: {}", err);
                        return (state, Vec::new());
                    }
                    dashboard_info!(
                        "Created job {} for {} file(s)",
                        job.job_id,
                        job.total_file_ids
                    );
                    // A new job is polled even if it claims to be finished already;
                    // the first tick stops the loop in that case.
                    state.set_selection(job.job_id.clone());
                    start_polling(&mut state, job.job_id)
                }
                Err(reason) => {
                    state.set_notice(Notice::failure(format!("Failed to initiate: {reason}")));
                    Vec::new()
                }
            }
        }
        Msg::JobSelected { job_id } => select_job(&mut state, job_id),
        Msg::RefreshSelected => match state.selected_job_id().map(str::to_owned) {
            Some(job_id) => start_polling(&mut state, job_id),
            None => Vec::new(),
        },
        Msg::ClearSelection => {
            state.clear_selection();
            stop_polling(&mut state)
        }
        Msg::JobPolled { ticket, snapshot } => {
            if state.poll_ticket() != Some(&ticket) {
                dashboard_debug!(
                    "Discarding stale poll result for job {} (generation {})",
                    ticket.job_id,
                    ticket.generation
                );
                return (state, Vec::new());
            }
            let terminal = snapshot.is_terminal();
            state.apply_poll_result(&ticket.job_id, snapshot);
            if terminal {
                dashboard_info!("Job {} reached a terminal status", ticket.job_id);
                stop_polling(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::HealthChecked(report) => {
            state.set_health(report);
            Vec::new()
        }
        Msg::DismissNotice => {
            state.clear_notice();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Terminal jobs are shown without polling; anything else, including a job
/// with no known snapshot, is polled.
fn select_job(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    let terminal = state
        .registry()
        .get(&job_id)
        .is_some_and(JobSnapshot::is_terminal);
    let already_polling = state
        .poll_ticket()
        .is_some_and(|ticket| ticket.job_id == job_id);

    state.set_selection(job_id.clone());
    if terminal {
        stop_polling(state)
    } else if already_polling {
        Vec::new()
    } else {
        start_polling(state, job_id)
    }
}

fn start_polling(state: &mut AppState, job_id: JobId) -> Vec<Effect> {
    let ticket = state.begin_poll(job_id);
    vec![Effect::StartPolling { ticket }]
}

fn stop_polling(state: &mut AppState) -> Vec<Effect> {
    if state.end_poll() {
        vec![Effect::StopPolling]
    } else {
        Vec::new()
    }
}
