use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use dashboard_core::{update, AppState, Msg};
use dashboard_logging::{dashboard_debug, dashboard_info};

use super::commands::{parse_command, Command, JobRef, HELP};
use super::config::DashboardConfig;
use super::effects::EffectRunner;
use super::render::render;

/// Everything the dispatch loop reacts to, in arrival order.
pub enum Input {
    Engine(Msg),
    Line(String),
    Closed,
}

enum Action {
    Dispatch(Msg),
    Show,
    Help,
    Quit,
}

pub fn run(config: DashboardConfig) -> Result<()> {
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config.engine_settings(), input_tx.clone())?;
    dashboard_info!("Dashboard started against {}", config.base_url);

    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    let mut session = Session {
        state: AppState::with_file_ids(config.default_file_ids),
        runner,
    };
    println!("{}", render(&session.state.view()));
    println!("Type 'help' for commands.");

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Engine(msg) => session.dispatch(msg),
            Input::Line(line) => match to_action(&session.state, &line) {
                Ok(Action::Dispatch(msg)) => session.dispatch(msg),
                Ok(Action::Show) => println!("{}", render(&session.state.view())),
                Ok(Action::Help) => println!("{HELP}"),
                Ok(Action::Quit) => break,
                Err(message) => println!("{message}"),
            },
            Input::Closed => break,
        }
    }

    dashboard_info!("Dashboard exiting");
    Ok(())
}

struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    fn dispatch(&mut self, msg: Msg) {
        dashboard_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        if state.consume_dirty() {
            println!("{}", render(&state.view()));
        }
        self.state = state;
    }
}

fn to_action(state: &AppState, line: &str) -> Result<Action, String> {
    let action = match parse_command(line)? {
        Command::ChooseFiles(paths) => Action::Dispatch(Msg::FilesChosen(paths)),
        Command::Upload => Action::Dispatch(Msg::UploadClicked),
        Command::SetFileIds(text) => Action::Dispatch(Msg::FileIdsChanged(text)),
        Command::Start => Action::Dispatch(Msg::StartDownloadClicked),
        Command::Select(JobRef::Id(job_id)) => Action::Dispatch(Msg::JobSelected { job_id }),
        Command::Select(JobRef::Index(index)) => {
            let job = state
                .registry()
                .list_recent()
                .get(index - 1)
                .ok_or_else(|| format!("No job #{index}"))?;
            Action::Dispatch(Msg::JobSelected {
                job_id: job.job_id.clone(),
            })
        }
        Command::Refresh => Action::Dispatch(Msg::RefreshSelected),
        Command::Clear => Action::Dispatch(Msg::ClearSelection),
        Command::Dismiss => Action::Dispatch(Msg::DismissNotice),
        Command::Show => Action::Show,
        Command::Help => Action::Help,
        Command::Quit => Action::Quit,
    };
    Ok(action)
}
