use env_logger::Env;
use std::env;
use trivy_plugin_report::args::Args;
use trivy_plugin_report::errors::*;
use trivy_plugin_report::plugin;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_with_passthrough(env::args_os());

    let log_level = match args.plugin_verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::init_from_env(Env::default().default_filter_or(log_level));

    let report = plugin::run(&args).await?;
    trace!("Report: {:?}", report);

    Ok(())
}
