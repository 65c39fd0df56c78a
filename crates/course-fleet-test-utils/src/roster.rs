//! Temporary roster files for tests

use std::io::Write;
use tempfile::NamedTempFile;

/// The four-student roster used by the transcript tests
pub const SAMPLE_ROSTER: [&str; 4] = ["coleman", "caine", "lansing", "freedman"];

/// Write `lines` to a temporary roster file, one per line.
///
/// The file is deleted when the returned handle is dropped.
pub fn write_roster(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp roster");
    for line in lines {
        writeln!(file, "{line}").expect("write temp roster");
    }
    file.flush().expect("flush temp roster");
    file
}
