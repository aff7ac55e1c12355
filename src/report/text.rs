//! Plain-text rendering of an [`ImpactReport`].

use std::fmt::Write as _;

use super::{ImpactReport, ReportStatus};

/// Renders `report` for a terminal.
#[must_use]
pub fn render(report: &ImpactReport) -> String {
    let mut out = String::new();
    let status = match report.status {
        ReportStatus::Unchanged => "no API surface changes",
        ReportStatus::Unanalyzable => "could not be analyzed",
        ReportStatus::NoProvenDependencies => "changed; no proven dependents",
        ReportStatus::Impacted => "changed",
    };
    let _ = writeln!(out, "{}: {status}", report.source_file);
    if report.findings.is_empty() {
        return out;
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "  {} breaking, {} warning(s), {} info",
        summary.breaking, summary.warnings, summary.info
    );
    let _ = writeln!(out);
    for finding in &report.findings {
        let line = finding.line.map(|l| format!(":{l}")).unwrap_or_default();
        let _ = writeln!(
            out,
            "  [{}] {} ({}{line})",
            finding.severity, finding.message, finding.rule_id
        );
        if let Some(before) = &finding.before {
            let _ = writeln!(out, "      - {before}");
        }
        if let Some(after) = &finding.after {
            let _ = writeln!(out, "      + {after}");
        }
    }

    if !report.downstream_files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  downstream files ({}):", report.downstream_files.len());
        for file in &report.downstream_files {
            match report.downstream_lines.get(file).copied().flatten() {
                Some(line) => {
                    let _ = writeln!(out, "    {file}:{line}");
                }
                None => {
                    let _ = writeln!(out, "    {file}");
                }
            }
        }
    }
    if !report.tests.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  affected tests ({}):", report.tests.len());
        for test in &report.tests {
            let _ = writeln!(out, "    {test}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::config::DEFAULT_PAIRING_THRESHOLD;
    use crate::diff::diff_snapshots;
    use crate::impact::downstream::DownstreamFile;
    use crate::report::format;
    use crate::snapshot::build_snapshot;

    #[test]
    fn unchanged_report_is_one_line() {
        let text = render(&ImpactReport::unchanged("src/a.ts"));
        assert_eq!(text, "src/a.ts: no API surface changes\n");
    }

    #[test]
    fn findings_and_downstream_are_listed() {
        let diff = diff_snapshots(
            &build_snapshot("src/a.ts", "export function foo(): void {}\n"),
            &build_snapshot("src/a.ts", ""),
            DEFAULT_PAIRING_THRESHOLD,
        );
        let downstream = [DownstreamFile {
            path: "/p/src/b.ts".into(),
            line: Some(3),
            depth: 1,
            is_test: false,
        }];
        let report = format("src/a.ts", &diff, Path::new("/p"), &downstream, &[]);
        let text = render(&report);
        assert!(text.starts_with("src/a.ts: changed\n"));
        assert!(text.contains("[breaking] export `foo` was removed (export-removed:1)"));
        assert!(text.contains("    src/b.ts:3\n"));
    }
}
