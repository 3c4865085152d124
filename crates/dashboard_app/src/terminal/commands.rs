use std::path::PathBuf;

/// A job named on the command line, either by id or by its row in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRef {
    Id(String),
    /// 1-based position in the most-recent-first job list.
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ChooseFiles(Vec<PathBuf>),
    Upload,
    SetFileIds(String),
    Start,
    Select(JobRef),
    Refresh,
    Clear,
    Dismiss,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  files <path>...         choose files to upload
  upload                  upload the chosen files
  ids <id,id,...>         set the file ids for the next download job
  start                   create a download job from the file ids
  select <jobId|#index>   show a job and follow its progress
  refresh                 fetch the selected job again
  clear                   close the job detail
  dismiss                 hide the current notice
  show                    redraw the dashboard
  help                    this text
  quit                    exit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "files" | "f" => {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            Command::ChooseFiles(paths)
        }
        "upload" | "u" => Command::Upload,
        "ids" => Command::SetFileIds(rest.to_string()),
        "start" | "s" => Command::Start,
        "select" => Command::Select(parse_job_ref(rest)?),
        "refresh" | "r" => Command::Refresh,
        "clear" => Command::Clear,
        "dismiss" => Command::Dismiss,
        "show" | "" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };
    Ok(command)
}

fn parse_job_ref(raw: &str) -> Result<JobRef, String> {
    if raw.is_empty() {
        return Err("select needs a job id or #index".to_string());
    }
    match raw.strip_prefix('#') {
        Some(index) => match index.parse::<usize>() {
            Ok(index) if index > 0 => Ok(JobRef::Index(index)),
            _ => Err(format!("'{raw}' is not a job index")),
        },
        None => Ok(JobRef::Id(raw.to_string())),
    }
}
