use crate::{FileId, UploadedFile};

/// Parse a comma separated list of file ids, dropping entries that are not
/// non-negative integers. An entry with a numeric prefix, like `12abc`, is
/// dropped whole rather than read as `12`.
pub fn parse_file_ids(raw: &str) -> Vec<FileId> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse::<FileId>().ok())
        .collect()
}

pub(crate) fn join_file_ids(files: &[UploadedFile]) -> String {
    files
        .iter()
        .map(|file| file.file_id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
