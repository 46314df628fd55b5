use crate::args::Args;
use crate::decode;
use crate::errors::*;
use crate::report::Report;
use crate::trivy;
use std::fs;
use std::path::{Path, PathBuf};

enum ReportFile {
    Temporary(tempfile::NamedTempFile),
    Explicit(PathBuf),
}

impl ReportFile {
    fn new(output: Option<&Path>) -> Result<Self> {
        if let Some(output) = output {
            Ok(ReportFile::Explicit(output.to_path_buf()))
        } else {
            let tmp = tempfile::Builder::new()
                .prefix("trivy-plugin-")
                .suffix(".json")
                .tempfile()
                .context("Failed to create temporary report file")?;
            Ok(ReportFile::Temporary(tmp))
        }
    }

    fn path(&self) -> &Path {
        match self {
            ReportFile::Temporary(tmp) => tmp.path(),
            ReportFile::Explicit(path) => path.as_ref(),
        }
    }

    fn close(self) -> Result<()> {
        if let ReportFile::Temporary(tmp) = self {
            let path = tmp.path().to_path_buf();
            tmp.close()
                .with_context(|| anyhow!("Failed to remove file {:?}", path))?;
        }
        Ok(())
    }
}

pub fn save_result(path: &Path, report: &Report) -> Result<()> {
    let buf = serde_json::to_vec_pretty(report)?;
    fs::write(path, buf).with_context(|| anyhow!("Failed to write {:?}", path))?;
    Ok(())
}

async fn convert(args: &Args, report_file: &Path) -> Result<Report> {
    trivy::make_json_report(&args.trivy_bin, &args.trivy_args, report_file)
        .await
        .context("Failed to make trivy report")?;

    let report = decode::read_report(report_file).context("Failed to get report from json")?;

    save_result(&args.plugin_output, &report).context("Failed to save result")?;
    info!(
        "Wrote {} results to {:?}",
        report.results.len(),
        args.plugin_output
    );

    Ok(report)
}

pub async fn run(args: &Args) -> Result<Report> {
    let report_file = ReportFile::new(args.output.as_deref())?;
    debug!("Using trivy report file {:?}", report_file.path());

    let result = convert(args, report_file.path()).await;
    finish(result, report_file.close())
}

/// A failed conversion is the error worth reporting, cleanup errors are only logged then
fn finish(result: Result<Report>, closed: Result<()>) -> Result<Report> {
    match (result, closed) {
        (Ok(report), closed) => closed.map(|_| report),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            error!("{:#}", close_err);
            Err(err)
        }
    }
}
