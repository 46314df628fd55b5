use crate::errors::*;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;

/// Run trivy with the given arguments and have it write a json report to `output`
pub async fn make_json_report(trivy_bin: &str, args: &[OsString], output: &Path) -> Result<()> {
    let mut cmd = Command::new(trivy_bin);
    cmd.args(args)
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(output);
    debug!("Executing {:?}", cmd);

    let status = cmd
        .status()
        .await
        .with_context(|| anyhow!("Failed to run {:?}", trivy_bin))?;
    if !status.success() {
        bail!(
            "Process ({} {:?}) exited with error: {:?}",
            trivy_bin,
            args,
            status
        );
    }

    Ok(())
}
