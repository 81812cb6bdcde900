//! Report rows and the sinks that record them.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::error::OutputError;
use crate::owners::Member;

/// Column names of the report.
pub const HEADER: [&str; 4] = ["organization", "login", "name", "email"];

/// One line of the owner report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRow {
    pub organization: String,
    pub login: String,
    pub name: String,
    pub email: String,
}

impl ReportRow {
    pub fn owner(organization: &str, member: Member) -> Self {
        Self {
            organization: organization.to_string(),
            login: member.login,
            name: member.name,
            email: member.email,
        }
    }

    /// Placeholder row for an organization with no owners.
    pub fn without_owner(organization: &str) -> Self {
        Self {
            organization: organization.to_string(),
            ..Self::default()
        }
    }

    fn as_record(&self) -> [&str; 4] {
        [
            self.organization.as_str(),
            self.login.as_str(),
            self.name.as_str(),
            self.email.as_str(),
        ]
    }
}

/// Project an organization's owners into report rows.
///
/// Always yields at least one row: an organization without owners gets a
/// single row with empty owner fields.
pub fn rows_for(organization: &str, owners: Vec<Member>) -> Vec<ReportRow> {
    if owners.is_empty() {
        return vec![ReportRow::without_owner(organization)];
    }
    owners
        .into_iter()
        .map(|member| ReportRow::owner(organization, member))
        .collect()
}

/// Destination for report rows.
///
/// Rows are written in the order received. Rows written before a successful
/// [`flush`](ReportSink::flush) survive a later failure.
pub trait ReportSink {
    fn write_header(&mut self) -> Result<(), OutputError>;

    fn write_row(&mut self, row: &ReportRow) -> Result<(), OutputError>;

    fn flush(&mut self) -> Result<(), OutputError>;
}

/// CSV report sink.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReportSink<File> {
    /// Create a fresh report file at `path`.
    ///
    /// The parent directory is created when missing and any previous report
    /// at the same location is removed first.
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let io_err = |source: io::Error| OutputError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        match fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Removed previous report"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(e)),
        }

        let file = File::create(path).map_err(io_err)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> CsvReportSink<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flush buffered rows and return the underlying writer.
    pub fn into_inner(self) -> Result<W, OutputError> {
        self.writer.into_inner().map_err(|e| {
            let source = e.error();
            OutputError::Flush(io::Error::new(source.kind(), source.to_string()))
        })
    }
}

impl<W: Write> ReportSink for CsvReportSink<W> {
    fn write_header(&mut self) -> Result<(), OutputError> {
        self.writer.write_record(HEADER)?;
        Ok(())
    }

    fn write_row(&mut self, row: &ReportRow) -> Result<(), OutputError> {
        self.writer.write_record(row.as_record())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(OutputError::Flush)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(login: &str, name: &str, email: &str) -> Member {
        Member {
            login: login.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn render(rows: &[ReportRow]) -> String {
        let mut sink = CsvReportSink::from_writer(Vec::new());
        sink.write_header().expect("header");
        for row in rows {
            sink.write_row(row).expect("row");
        }
        String::from_utf8(sink.into_inner().expect("flush")).expect("utf-8")
    }

    #[test]
    fn test_rows_for_organization_without_owners() {
        let rows = rows_for("empty-org", Vec::new());
        assert_eq!(rows, vec![ReportRow::without_owner("empty-org")]);
        assert_eq!(render(&rows), "organization,login,name,email\nempty-org,,,\n");
    }

    #[test]
    fn test_rows_for_keeps_owner_order() {
        let rows = rows_for(
            "acme",
            vec![
                member("zed", "Zed", "z@x.com"),
                member("alice", "Alice", "a@x.com"),
            ],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].login, "zed");
        assert_eq!(rows[1].login, "alice");
        assert!(rows.iter().all(|r| r.organization == "acme"));
    }

    #[test]
    fn test_csv_quotes_fields_that_need_it() {
        let rows = rows_for(
            "acme",
            vec![member("alice", "Smith, Alice \"Al\"", "a@x.com")],
        );
        assert_eq!(
            render(&rows),
            "organization,login,name,email\nacme,alice,\"Smith, Alice \"\"Al\"\"\",a@x.com\n"
        );
    }

    #[test]
    fn test_create_replaces_previous_report_and_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dist").join("owners.csv");

        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "stale,report\nfrom,last,run,x\n").expect("seed");

        let mut sink = CsvReportSink::create(&path).expect("create");
        sink.write_header().expect("header");
        sink.flush().expect("flush");

        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "organization,login,name,email\n");
    }

    #[test]
    fn test_create_in_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a").join("b").join("owners.csv");

        let sink = CsvReportSink::create(&path).expect("create");
        drop(sink);
        assert!(path.exists());
    }

    #[test]
    fn test_flushed_rows_are_visible_before_close() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("owners.csv");

        let mut sink = CsvReportSink::create(&path).expect("create");
        sink.write_header().expect("header");
        sink.write_row(&ReportRow::without_owner("first-org")).expect("row");
        sink.flush().expect("flush");

        let contents = fs::read_to_string(&path).expect("read");
        assert_eq!(contents, "organization,login,name,email\nfirst-org,,,\n");
    }
}
