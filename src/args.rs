use clap::{ArgAction, Parser};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Plugin flags that take a value, everything else is passed on to trivy
pub const VALUE_FLAGS: &[&str] = &["--plugin-output", "--output", "--trivy-bin"];
pub const SWITCH_FLAGS: &[&str] = &["-h", "--help", "--plugin-verbose"];

#[derive(Debug, Parser)]
#[command(
    name = "trivy-plugin-report",
    about = "Run trivy and normalize its json report into a single list of results",
    override_usage = "trivy trivy-plugin-report [-h,--help] --plugin-output <PATH> [TRIVY ARGS]...",
    after_help = "Examples:\n  trivy trivy-plugin-report image alpine:3.18 --plugin-output results.json\n  trivy trivy-plugin-report k8s --report summary cluster --plugin-output results.json"
)]
pub struct Args {
    /// More verbose logging
    #[arg(long, action(ArgAction::Count))]
    pub plugin_verbose: u8,
    /// Write the normalized report to this file
    #[arg(long, value_name = "PATH")]
    pub plugin_output: PathBuf,
    /// Keep the raw trivy report at this path instead of a temporary file
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// The trivy executable to run
    #[arg(
        long,
        value_name = "PATH",
        env = "TRIVY_PLUGIN_TRIVY_BIN",
        default_value = "trivy"
    )]
    pub trivy_bin: String,
    /// Arguments forwarded to trivy
    #[arg(skip)]
    pub trivy_args: Vec<OsString>,
}

impl Args {
    pub fn parse_with_passthrough<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let (plugin, trivy) = split_args(args);
        let mut args = Args::parse_from(plugin);
        args.trivy_args = trivy;
        args
    }

    pub fn try_parse_with_passthrough<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let (plugin, trivy) = split_args(args);
        let mut args = Args::try_parse_from(plugin)?;
        args.trivy_args = trivy;
        Ok(args)
    }
}

fn is_switch(arg: &OsStr) -> bool {
    SWITCH_FLAGS.iter().any(|flag| arg == *flag)
}

/// Returns `Some(true)` for `--flag=value`, `Some(false)` for a bare `--flag`
fn value_flag(arg: &OsStr) -> Option<bool> {
    if VALUE_FLAGS.iter().any(|flag| arg == *flag) {
        return Some(false);
    }
    let arg = arg.to_str()?;
    VALUE_FLAGS
        .iter()
        .any(|flag| {
            arg.strip_prefix(flag)
                .map_or(false, |rest| rest.starts_with('='))
        })
        .then_some(true)
}

/// Separate plugin flags from the trivy command line. Plugin flags may appear
/// anywhere, the program name stays with the plugin arguments.
pub fn split_args<I, T>(args: I) -> (Vec<OsString>, Vec<OsString>)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut plugin = Vec::new();
    let mut trivy = Vec::new();

    if let Some(program) = args.next() {
        plugin.push(program);
    }

    while let Some(arg) = args.next() {
        if is_switch(&arg) {
            plugin.push(arg);
        } else if let Some(has_value) = value_flag(&arg) {
            plugin.push(arg);
            if !has_value {
                if let Some(value) = args.next() {
                    plugin.push(value);
                }
            }
        } else {
            trivy.push(arg);
        }
    }

    (plugin, trivy)
}
