use crate::errors::*;
use crate::report::{KubernetesReport, Report, Shape};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::fs;
use std::path::Path;

lazy_static! {
    static ref UNKNOWN_FIELD: Regex = Regex::new(r"^unknown field `([^`]*)`").unwrap();
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The document has a field the target type doesn't declare
    #[error("unknown field {0:?}")]
    UnknownField(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DecodeError {
    fn from_json(err: serde_json::Error) -> Self {
        if err.is_data() {
            if let Some(caps) = UNKNOWN_FIELD.captures(&err.to_string()) {
                return DecodeError::UnknownField(caps[1].to_string());
            }
        }
        DecodeError::Other(err.into())
    }
}

/// Decode a json file into `T`, which must reject fields it doesn't know
/// about (`#[serde(deny_unknown_fields)]`).
///
/// Syntax errors anywhere in the document win over unknown fields.
pub fn decode_strict<T: DeserializeOwned>(path: &Path) -> Result<T, DecodeError> {
    let buf = fs::read(path).with_context(|| anyhow!("Failed to open {:?}", path))?;

    serde_json::from_slice::<IgnoredAny>(&buf).map_err(|err| DecodeError::Other(err.into()))?;
    serde_json::from_slice(&buf).map_err(DecodeError::from_json)
}

fn read_failed(err: DecodeError, path: &Path) -> Error {
    let err = match err {
        DecodeError::Other(err) => err,
        err => Error::from(err),
    };
    err.context(format!("Failed to read report {:?}", path))
}

fn resolve_with<F, K>(path: &Path, flat: F, k8s: K) -> Result<(Shape, Report)>
where
    F: FnOnce(&Path) -> Result<Report, DecodeError>,
    K: FnOnce(&Path) -> Result<KubernetesReport, DecodeError>,
{
    match flat(path) {
        Ok(report) => return Ok((Shape::Flat, report)),
        Err(DecodeError::UnknownField(field)) => {
            debug!("Report has unknown field {:?}, trying kubernetes layout", field);
        }
        Err(err) => return Err(read_failed(err, path)),
    }

    let k8s = k8s(path).map_err(|err| read_failed(err, path))?;
    debug!(
        "Flattening kubernetes report (vulnerabilities={}, misconfigurations={})",
        k8s.vulnerabilities.len(),
        k8s.misconfigurations.len()
    );
    Ok((Shape::Kubernetes, k8s.into()))
}

/// Read a trivy json report, accepting both the flat and the kubernetes layout
pub fn resolve_report(path: &Path) -> Result<(Shape, Report)> {
    info!("Reading report {:?}", path);
    let (shape, report) = resolve_with(
        path,
        decode_strict::<Report>,
        decode_strict::<KubernetesReport>,
    )?;
    info!("Loaded {} with {} results", shape, report.results.len());
    Ok((shape, report))
}

pub fn read_report(path: &Path) -> Result<Report> {
    resolve_report(path).map(|(_, report)| report)
}
