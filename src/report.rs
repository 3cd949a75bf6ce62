//! Report assembly: merge exported summaries into a rendered HTML + PDF
//! report.
//!
//! The reporter only consumes artifacts a prior `analyze` run exported; it
//! never recomputes statistics. Template rendering goes through `minijinja`
//! (the report templates are Jinja dialect); PDF conversion is a seam so the
//! concrete converter stays swappable and tests can inject a stub.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use minijinja::{context, Environment};
use serde::de::DeserializeOwned;

use crate::error::AnalysisError;
use crate::files;
use crate::platform::PlatformInfo;
use crate::stats::LatencyStatistics;

/// Converts rendered markup into binary document bytes.
pub trait PdfConverter {
    /// Convert HTML markup to a PDF byte stream.
    fn convert(&self, html: &str) -> Result<Vec<u8>, AnalysisError>;
}

/// Default converter: pipes the markup through the `wkhtmltopdf` binary.
pub struct WkhtmltopdfConverter {
    binary: PathBuf,
}

impl WkhtmltopdfConverter {
    /// Use `wkhtmltopdf` from `PATH`.
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("wkhtmltopdf"),
        }
    }

    /// Use a specific converter binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for WkhtmltopdfConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfConverter for WkhtmltopdfConverter {
    fn convert(&self, html: &str) -> Result<Vec<u8>, AnalysisError> {
        let mut child = Command::new(&self.binary)
            .args(["--quiet", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                AnalysisError::Render(format!("failed to spawn {}: {}", self.binary.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(html.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(AnalysisError::Render(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output.stdout)
    }
}

/// The two rendered report outputs.
#[derive(Debug)]
pub struct Report {
    /// Rendered markup, persisted as `report.html`.
    pub html: String,
    /// Converted document bytes, persisted as `report.pdf`.
    pub pdf: Vec<u8>,
}

/// Assembles the consolidated report from a results directory.
#[derive(Debug)]
pub struct Reporter {
    results_dir: PathBuf,
    template_path: PathBuf,
}

impl Reporter {
    /// Bind the reporter to a results directory and a template file.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MissingInput`] if the template file is absent.
    pub fn new(results_dir: &Path, template_path: &Path) -> Result<Self, AnalysisError> {
        if !template_path.is_file() {
            return Err(AnalysisError::MissingInput {
                what: "report template",
                path: template_path.to_path_buf(),
            });
        }
        Ok(Self {
            results_dir: results_dir.to_path_buf(),
            template_path: template_path.to_path_buf(),
        })
    }

    /// Load the four summary documents, render the template, convert to PDF,
    /// and persist both outputs into the results directory.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MissingArtifact`] if any summary document is absent
    /// or malformed; [`AnalysisError::Render`] if the template or the
    /// converter fails.
    pub fn assemble(&self, converter: &dyn PdfConverter) -> Result<Report, AnalysisError> {
        let ack: LatencyStatistics = self.load_summary(files::ACKED_SUMMARY)?;
        let ent: LatencyStatistics = self.load_summary(files::ENTRY_SUMMARY)?;
        let rt: LatencyStatistics = self.load_summary(files::ROUND_TRIP_SUMMARY)?;
        let sys = PlatformInfo::load(&self.results_dir.join(files::PLATFORM_SUMMARY))?;

        let template_src = fs::read_to_string(&self.template_path)?;
        let env = Environment::new();
        let template = env
            .template_from_str(&template_src)
            .map_err(|e| AnalysisError::Render(e.to_string()))?;
        let html = template
            .render(context! {
                ack => ack,
                ent => ent,
                source => self.results_dir.display().to_string(),
                sys => sys,
                rt => rt,
            })
            .map_err(|e| AnalysisError::Render(e.to_string()))?;

        let pdf = converter.convert(&html)?;

        fs::write(self.results_dir.join(files::REPORT_HTML), &html)?;
        tracing::info!("{} created", files::REPORT_HTML);
        fs::write(self.results_dir.join(files::REPORT_PDF), &pdf)?;
        tracing::info!("{} created", files::REPORT_PDF);

        Ok(Report { html, pdf })
    }

    fn load_summary<T: DeserializeOwned>(&self, name: &'static str) -> Result<T, AnalysisError> {
        let path = self.results_dir.join(name);
        let text = fs::read_to_string(&path).map_err(|e| AnalysisError::MissingArtifact {
            name,
            path: path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| AnalysisError::MissingArtifact {
            name,
            path,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::write_summary_json;
    use crate::stats::summarize;
    use tempfile::TempDir;

    /// Stub converter so tests never depend on an installed binary.
    struct FakeConverter;

    impl PdfConverter for FakeConverter {
        fn convert(&self, html: &str) -> Result<Vec<u8>, AnalysisError> {
            Ok(format!("%PDF-stub {} bytes", html.len()).into_bytes())
        }
    }

    fn write_artifacts(dir: &Path) {
        let stats = summarize("rdtsc", 1_000_000_000, &[5, 8, 3]).unwrap();
        for name in [
            files::ACKED_SUMMARY,
            files::ENTRY_SUMMARY,
            files::ROUND_TRIP_SUMMARY,
        ] {
            write_summary_json(&stats, &dir.join(name)).unwrap();
        }
        PlatformInfo::collect()
            .save(&dir.join(files::PLATFORM_SUMMARY))
            .unwrap();
    }

    fn write_template(dir: &Path) -> PathBuf {
        let path = dir.join("report.html.j2");
        fs::write(
            &path,
            "<h1>{{ source }}</h1>\
             <p>ack min {{ ack.min }} max {{ ack.max }}</p>\
             <p>rt median {{ rt.median }}</p>\
             <p>host {{ sys.node }} ({{ sys.cores }} cores)</p>",
        )
        .unwrap();
        path
    }

    #[test]
    fn assemble_renders_and_persists() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        let template = write_template(dir.path());

        let reporter = Reporter::new(dir.path(), &template).unwrap();
        let report = reporter.assemble(&FakeConverter).unwrap();

        assert!(report.html.contains("ack min 3 max 8"));
        assert!(report.html.contains("rt median 5"));
        assert!(report.pdf.starts_with(b"%PDF-stub"));
        assert_eq!(
            fs::read_to_string(dir.path().join(files::REPORT_HTML)).unwrap(),
            report.html
        );
        assert_eq!(fs::read(dir.path().join(files::REPORT_PDF)).unwrap(), report.pdf);
    }

    #[test]
    fn missing_template_rejected() {
        let dir = TempDir::new().unwrap();
        let err = Reporter::new(dir.path(), &dir.path().join("nope.j2")).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingInput { .. }));
    }

    #[test]
    fn missing_summary_is_missing_artifact() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::remove_file(dir.path().join(files::ENTRY_SUMMARY)).unwrap();
        let template = write_template(dir.path());

        let reporter = Reporter::new(dir.path(), &template).unwrap();
        let err = reporter.assemble(&FakeConverter).unwrap_err();
        match err {
            AnalysisError::MissingArtifact { name, .. } => {
                assert_eq!(name, files::ENTRY_SUMMARY);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn malformed_summary_is_missing_artifact() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::write(dir.path().join(files::ROUND_TRIP_SUMMARY), "not json").unwrap();
        let template = write_template(dir.path());

        let reporter = Reporter::new(dir.path(), &template).unwrap();
        let err = reporter.assemble(&FakeConverter).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingArtifact { .. }));
    }
}
