#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use mesh_vet_k8s_api::StoreLookup;
use std::{fs, io, path::PathBuf};
use tracing::info;

#[cfg(all(target_os = "linux", target_arch = "x86_64", target_env = "gnu"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

/// Lists the namespaces, pods, services, and endpoints that belong to the mesh
///
/// Mesh membership is determined from the sidecar injector's configuration. When automatic
/// injection is not configured, the report carries a note explaining how to enable it.
#[derive(Debug, Parser)]
#[clap(name = "mesh-vet", version, about)]
struct Args {
    #[clap(long, default_value = "mesh_vet=info,warn", env = "MESH_VET_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain", env = "MESH_VET_LOG_FORMAT")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// Identifies this vetter in the notes it reports
    #[clap(long, default_value = "mesh-vet")]
    vetter_id: String,

    /// Writes the report to a file instead of stdout
    #[clap(long, short = 'o')]
    output: Option<PathBuf>,

    /// Pretty-prints the report
    #[clap(long)]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Args {
        log_level,
        log_format,
        client,
        vetter_id,
        output,
        pretty,
    } = Args::parse();

    log_format
        .try_init(log_level)
        .expect("must configure logging");

    let client = client.try_client().await?;
    let lookup = StoreLookup::spawn(client)
        .await
        .context("failed to sync cluster state")?;

    let report = report::Report::collect(&lookup, &vetter_id)?;
    info!(
        namespaces = report.namespaces.len(),
        pods = report.pods.len(),
        services = report.services.len(),
        endpoints = report.endpoints.len(),
        notes = report.notes.len(),
        "Collected mesh inventory"
    );

    match output {
        Some(path) => {
            let file = fs::File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            report.write(file, pretty)?;
        }
        None => report.write(io::stdout().lock(), pretty)?,
    }

    Ok(())
}
