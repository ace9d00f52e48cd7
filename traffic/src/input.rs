use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use tracing::info;

use crate::{
    error::{Error, Result},
    record::{self, RecordError},
};

/// Loads every line of the input before distribution starts. Lines past the
/// record length limit are rejected, never truncated.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = read_lines(BufReader::new(file))?;
    info!(path = %path.display(), lines = lines.len(), "input loaded");
    Ok(lines)
}

pub fn read_lines(reader: impl BufRead) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| Error::InputRead { line: i + 1, source })?;
        if let Err(RecordError::TooLong { len }) = record::check_len(&line) {
            return Err(Error::RecordTooLong { line: i + 1, len });
        }
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;
    use crate::record::MAX_RECORD_LEN;

    #[test]
    fn test_read_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "08:00,A,5\n08:01,B,2\n08:02,A,3\n").unwrap();

        let lines = read_records(file.path()).unwrap();
        assert_eq!(lines, vec!["08:00,A,5", "08:01,B,2", "08:02,A,3"]);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traffic_data.txt");
        match read_records(&path) {
            Err(Error::InputUnavailable { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(read_lines(Cursor::new("")).unwrap().is_empty());
    }

    #[test]
    fn test_last_line_without_newline() {
        let lines = read_lines(Cursor::new("08:00,A,5\r\n08:01,B,2")).unwrap();
        assert_eq!(lines, vec!["08:00,A,5", "08:01,B,2"]);
    }

    #[test]
    fn test_overlong_line_is_rejected() {
        let input = format!("08:00,A,5\n08:01,{},2\n", "X".repeat(MAX_RECORD_LEN));
        assert!(matches!(
            read_lines(Cursor::new(input)),
            Err(Error::RecordTooLong { line: 2, .. })
        ));
    }
}
