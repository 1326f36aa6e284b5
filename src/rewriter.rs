//! The lcov path rewriter.
//!
//! Only `SF:` (source file) records are interpreted; every other line is
//! opaque and copied through byte for byte. The rewriter never logs; callers
//! report on the returned [`RewriteSummary`].

use crate::error::{Result, RewriteError};
use crate::path_util;
use crate::storage;
use crate::types::{RewriteOptions, RewriteSummary};
use std::path::Path;

/// Record tag of an lcov source-file line.
pub const SOURCE_FILE_TAG: &str = "SF:";

/// Outcome of rewriting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not an `SF:` record.
    Passthrough,
    /// `SF:` record with a relative path, left as-is.
    Relative,
    /// `SF:` record rewritten; holds the new line including its terminator.
    Rewritten(String),
    /// Absolute `SF:` path with no relative form from the base.
    Unrelatable,
}

/// Split a line into its content and terminator (`"\r\n"`, `"\n"` or `""`).
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Rewrite a single line (terminator included) against `base_dir`.
pub fn rewrite_line(line: &str, base_dir: &Path, options: &RewriteOptions) -> LineOutcome {
    let Some(rest) = line.strip_prefix(SOURCE_FILE_TAG) else {
        return LineOutcome::Passthrough;
    };
    let (source, terminator) = split_terminator(rest);
    let source_path = Path::new(source);
    if !source_path.is_absolute() {
        return LineOutcome::Relative;
    }

    match path_util::relative_to(source_path, base_dir) {
        Some(rel) => {
            let rel = rel.to_string_lossy();
            let rel = if options.normalize_separators {
                path_util::normalize_rel_path(&rel)
            } else {
                rel.into_owned()
            };
            LineOutcome::Rewritten(format!("{SOURCE_FILE_TAG}{rel}{terminator}"))
        }
        None => LineOutcome::Unrelatable,
    }
}

/// Rewrite a whole in-memory report. Line order, count and terminators are preserved.
pub fn rewrite_report(
    report: &str,
    base_dir: &Path,
    options: &RewriteOptions,
) -> (String, RewriteSummary) {
    let mut out = String::with_capacity(report.len());
    let mut summary = RewriteSummary::default();

    for line in report.split_inclusive('\n') {
        summary.lines += 1;
        match rewrite_line(line, base_dir, options) {
            LineOutcome::Passthrough => out.push_str(line),
            LineOutcome::Relative => {
                summary.records += 1;
                out.push_str(line);
            }
            LineOutcome::Rewritten(new_line) => {
                summary.records += 1;
                if new_line != line {
                    summary.rewritten += 1;
                }
                out.push_str(&new_line);
            }
            LineOutcome::Unrelatable => {
                summary.records += 1;
                summary.unrelatable += 1;
                out.push_str(line);
            }
        }
    }

    (out, summary)
}

/// Read `input`, rewrite absolute `SF:` paths relative to `base_dir`, and write the
/// result to `output`, which may be the same file.
///
/// The input is read completely before the output is opened.
pub fn rewrite_file(
    input: &Path,
    base_dir: &Path,
    output: &Path,
    options: &RewriteOptions,
) -> Result<RewriteSummary> {
    if !base_dir.is_absolute() {
        return Err(RewriteError::BaseDirNotAbsolute {
            path: base_dir.to_path_buf(),
        });
    }

    let report = storage::read_report(input)?;
    let (rewritten, summary) = rewrite_report(&report, base_dir, options);
    storage::write_report(output, &rewritten, options.atomic)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn opts() -> RewriteOptions {
        RewriteOptions::default()
    }

    #[cfg(unix)]
    #[test]
    fn absolute_source_becomes_relative() {
        let base = Path::new("/home/user/project");
        assert_eq!(
            rewrite_line("SF:/home/user/project/src/main.c\n", base, &opts()),
            LineOutcome::Rewritten("SF:src/main.c\n".into())
        );
    }

    #[test]
    fn relative_source_untouched() {
        let base = std::env::temp_dir();
        assert_eq!(
            rewrite_line("SF:src/util.c\n", &base, &opts()),
            LineOutcome::Relative
        );
    }

    #[test]
    fn other_records_pass_through() {
        let base = std::env::temp_dir();
        for line in ["DA:12,1\n", "FN:3,main\n", "end_of_record\n", "TN:\n", " SF:/x\n"] {
            assert_eq!(rewrite_line(line, &base, &opts()), LineOutcome::Passthrough);
        }
    }

    #[test]
    fn empty_source_path_is_relative() {
        let base = std::env::temp_dir();
        assert_eq!(rewrite_line("SF:\n", &base, &opts()), LineOutcome::Relative);
    }

    #[cfg(unix)]
    #[test]
    fn crlf_terminator_is_kept() {
        let base = Path::new("/repo");
        assert_eq!(
            rewrite_line("SF:/repo/a/b.rs\r\n", base, &opts()),
            LineOutcome::Rewritten("SF:a/b.rs\r\n".into())
        );
    }

    #[cfg(unix)]
    #[test]
    fn report_rewrite_preserves_everything_else() {
        let base = Path::new("/home/user/project");
        let report = "TN:\n\
                      SF:/home/user/project/src/main.c\n\
                      FN:1,main\n\
                      DA:12,1\n\
                      end_of_record\n\
                      SF:src/util.c\n\
                      DA:3,0\n\
                      SF:/home/user/lib/z.c\n\
                      end_of_record";
        let (out, summary) = rewrite_report(report, base, &opts());
        assert_eq!(
            out,
            "TN:\n\
             SF:src/main.c\n\
             FN:1,main\n\
             DA:12,1\n\
             end_of_record\n\
             SF:src/util.c\n\
             DA:3,0\n\
             SF:../lib/z.c\n\
             end_of_record"
        );
        assert_eq!(
            summary,
            RewriteSummary {
                lines: 9,
                records: 3,
                rewritten: 2,
                unrelatable: 0,
            }
        );
        assert_eq!(out.split_inclusive('\n').count(), report.split_inclusive('\n').count());
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_is_idempotent() {
        let base = Path::new("/work");
        let report = "SF:/work/a.c\nDA:1,1\nSF:/elsewhere/b.c\nend_of_record\n";
        let (first, _) = rewrite_report(report, base, &opts());
        let (second, summary) = rewrite_report(&first, base, &opts());
        assert_eq!(first, second);
        assert_eq!(summary.rewritten, 0);
    }

    #[test]
    fn empty_report_stays_empty() {
        let (out, summary) = rewrite_report("", &std::env::temp_dir(), &opts());
        assert!(out.is_empty());
        assert_eq!(summary, RewriteSummary::default());
    }

    #[test]
    fn rewrite_file_rejects_relative_base() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("lcov.info");
        std::fs::write(&input, "SF:a.c\n").unwrap();

        let err = rewrite_file(&input, Path::new("relative/base"), &input, &opts()).unwrap_err();
        assert!(matches!(err, RewriteError::BaseDirNotAbsolute { .. }));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), "SF:a.c\n");
    }

    #[test]
    fn rewrite_file_in_place() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("lcov.info");
        let source = dir.path().join("src").join("lib.rs");
        std::fs::write(&input, format!("SF:{}\nDA:1,1\nend_of_record\n", source.display()))
            .unwrap();

        let summary = rewrite_file(&input, dir.path(), &input, &opts()).unwrap();
        assert_eq!(summary.rewritten, 1);

        let expected = Path::new("src").join("lib.rs");
        assert_eq!(
            std::fs::read_to_string(&input).unwrap(),
            format!("SF:{}\nDA:1,1\nend_of_record\n", expected.display())
        );
    }

    #[test]
    fn rewrite_file_missing_input_creates_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("missing.info");
        let output = dir.path().join("out.info");

        let err = rewrite_file(&input, dir.path(), &output, &opts()).unwrap_err();
        assert!(matches!(err, RewriteError::NotFound { .. }));
        assert!(!output.exists());
    }
}
