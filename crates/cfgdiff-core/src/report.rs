//! Daily report model and rendering.
//!
//! One [`Report`] per run. Only devices with real changes make it in; the
//! text form doubles as the `--dry-run` console output and the HTML form is
//! what lands in the results directory.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::collect::DeviceOutcome;
use crate::error::Result;
use crate::obs;

pub const HTML_FILE: &str = "config_diff.html";
pub const TEXT_FILE: &str = "config_diff.txt";

const SUBJECT_PREFIX: &str = "Cbackup Report - Daily configuration diffs";

/// Minimized diff of one device, rendered to plain lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceReport {
    pub hostname: String,
    pub file: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Local>,
    pub weekday: String,
    pub devices: Vec<DeviceReport>,
}

impl Report {
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self {
            weekday: generated_at.format("%A").to_string(),
            generated_at,
            devices: Vec::new(),
        }
    }

    /// Keep the changed devices, in collection order.
    pub fn from_outcomes(generated_at: DateTime<Local>, outcomes: &[DeviceOutcome]) -> Self {
        let mut report = Self::new(generated_at);
        report.devices = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                DeviceOutcome::Changed {
                    file,
                    hostname,
                    diff,
                } => Some(DeviceReport {
                    hostname: hostname.clone(),
                    file: file.clone(),
                    lines: diff.rendered(),
                }),
                _ => None,
            })
            .collect();
        report
    }

    /// Report date as `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        self.generated_at.format("%Y-%m-%d").to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

pub fn report_subject(report: &Report) -> String {
    format!("{SUBJECT_PREFIX} {}", report.date())
}

/// Plain text: a `Hostname: <name>` header followed by the device's lines.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for device in &report.devices {
        let _ = writeln!(out, "Hostname: {}", device.hostname);
        for line in &device.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn line_class(line: &str) -> &'static str {
    match line.chars().next() {
        Some('-') => "removed",
        Some('+') => "added",
        _ => "context",
    }
}

pub fn render_html(report: &Report) -> String {
    let title = escape_html(&report_subject(report));
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    out.push_str(
        "<style>\n\
         pre { font-family: monospace; margin: 0 0 1em 0; }\n\
         .removed { color: #b00020; }\n\
         .added { color: #1b7f1b; }\n\
         .context { color: #555555; }\n\
         </style>\n</head>\n<body>\n",
    );
    let _ = writeln!(out, "<h1>{title}</h1>");
    let _ = writeln!(out, "<p>{}</p>", escape_html(&report.weekday));

    if report.is_empty() {
        out.push_str("<p>No configuration changes.</p>\n");
    }
    for device in &report.devices {
        let _ = writeln!(
            out,
            "<h2>Hostname: {} <small>({})</small></h2>",
            escape_html(&device.hostname),
            escape_html(&device.file)
        );
        out.push_str("<pre>\n");
        for line in &device.lines {
            let _ = writeln!(
                out,
                "<span class=\"{}\">{}</span>",
                line_class(line),
                escape_html(line)
            );
        }
        out.push_str("</pre>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

/// Write both renderings into `dir`, creating it if needed. Returns the
/// HTML path.
pub fn write_report(dir: &Path, report: &Report) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let html_path = dir.join(HTML_FILE);
    std::fs::write(&html_path, render_html(report))?;
    std::fs::write(dir.join(TEXT_FILE), render_text(report))?;
    obs::emit_report_written(&html_path, report.devices.len());
    Ok(html_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::{Marker, OutputLine};
    use crate::normalize::NormalizedDiff;
    use chrono::TimeZone;

    fn monday() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 1, 5, 7, 30, 0)
            .single()
            .expect("unambiguous local time")
    }

    fn sample() -> Report {
        let mut report = Report::new(monday());
        report.devices.push(DeviceReport {
            hostname: "core-sw1".to_string(),
            file: "10.0.0.1".to_string(),
            lines: vec![
                " interface Gi0/1".to_string(),
                "-description <old>".to_string(),
                "+description R&D".to_string(),
            ],
        });
        report
    }

    #[test]
    fn test_weekday_and_subject() {
        let report = Report::new(monday());
        assert_eq!(report.weekday, "Monday");
        assert_eq!(
            report_subject(&report),
            "Cbackup Report - Daily configuration diffs 2026-01-05"
        );
    }

    #[test]
    fn test_from_outcomes_keeps_only_changed() {
        let diff = NormalizedDiff {
            lines: vec![OutputLine::new(Marker::Added, 0, "mtu 9000")],
            has_real_changes: true,
        };
        let outcomes = vec![
            DeviceOutcome::Unchanged {
                file: "a".to_string(),
            },
            DeviceOutcome::Changed {
                file: "b".to_string(),
                hostname: "sw-b".to_string(),
                diff,
            },
            DeviceOutcome::Failed {
                file: "c".to_string(),
                error: "boom".to_string(),
            },
        ];
        let report = Report::from_outcomes(monday(), &outcomes);
        assert_eq!(report.devices.len(), 1);
        assert_eq!(report.devices[0].hostname, "sw-b");
        assert_eq!(report.devices[0].lines, vec!["+mtu 9000"]);
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample());
        assert_eq!(
            text,
            "Hostname: core-sw1\n interface Gi0/1\n-description <old>\n+description R&D\n\n"
        );
    }

    #[test]
    fn test_render_html_escapes_and_classes() {
        let html = render_html(&sample());
        assert!(html.contains("<span class=\"removed\">-description &lt;old&gt;</span>"));
        assert!(html.contains("<span class=\"added\">+description R&amp;D</span>"));
        assert!(html.contains("<span class=\"context\"> interface Gi0/1</span>"));
        assert!(html.contains("Hostname: core-sw1"));
    }

    #[test]
    fn test_render_html_empty_report() {
        let html = render_html(&Report::new(monday()));
        assert!(html.contains("No configuration changes."));
    }

    #[test]
    fn test_write_report_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("results");
        let path = write_report(&dir, &sample()).unwrap();
        assert_eq!(path, dir.join(HTML_FILE));
        let text = std::fs::read_to_string(dir.join(TEXT_FILE)).unwrap();
        assert!(text.starts_with("Hostname: core-sw1"));
    }

    #[test]
    fn test_report_serializes() {
        let raw = serde_json::to_value(sample()).unwrap();
        assert_eq!(raw["weekday"], "Monday");
        assert_eq!(raw["devices"][0]["file"], "10.0.0.1");
    }
}
