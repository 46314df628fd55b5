use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::Display;

/// Which of the known report layouts a file was decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Shape {
    #[strum(serialize = "report")]
    Flat,
    #[strum(serialize = "kubernetes report")]
    Kubernetes,
}

/// A single entry of `Results`, kept exactly as trivy wrote it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult(pub Value);

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ScanResult>,
}

/// Output of `trivy k8s`, one entry per scanned resource
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct KubernetesReport {
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vulnerabilities: Vec<Resource>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub misconfigurations: Vec<Resource>,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Resource {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ScanResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl From<KubernetesReport> for Report {
    /// Vulnerability results come first, then misconfigurations, each in file order.
    fn from(k8s: KubernetesReport) -> Self {
        let mut results = Vec::new();
        for vuln in k8s.vulnerabilities {
            results.extend(vuln.results);
        }
        for misc in k8s.misconfigurations {
            results.extend(misc.results);
        }

        Report {
            results,
            ..Default::default()
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let list = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(list.unwrap_or_default())
}
