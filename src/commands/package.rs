use std::path::{Path, PathBuf};
use std::process::ExitCode;

use qmlbridge_lib::config::ArchiveConfig;
use qmlbridge_lib::{
    build_archive, BridgeError, BridgeOutput, PackageOutput, Reporter, Result, StoreHandle,
    OUTPUT_VERSION,
};
use tracing::info;

use super::{output_dir, prepare, GlobalArgs};
use crate::formatting::{render_error, write_output};

/// Run the package command.
pub async fn run_package(globals: GlobalArgs, output: Option<PathBuf>) -> ExitCode {
    let format = globals.format;
    let ctx = match prepare(&globals).await {
        Ok(ctx) => ctx,
        Err(err) => return render_error(err, format),
    };

    let handle = ctx.db.init();
    let result = package_into(
        &handle,
        &ctx.config.archive,
        &output_dir(output.as_deref()),
        &Reporter::silent(),
    )
    .await;
    handle.close();

    let package = match result {
        Ok(package) => package,
        Err(err) => return render_error(err, format),
    };
    if let Err(err) = write_output(&BridgeOutput::Package(package), format) {
        eprintln!("Failed to write output: {err}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}

/// Build the archive and write it into `dir`.
pub(crate) async fn package_into(
    handle: &StoreHandle,
    config: &ArchiveConfig,
    dir: &Path,
    reporter: &Reporter,
) -> Result<PackageOutput> {
    let archive = build_archive(handle, config, reporter).await?;

    tokio::fs::create_dir_all(dir).await.map_err(|err| {
        BridgeError::archive(format!("failed to create {}: {err}", dir.display()))
    })?;
    let path = dir.join(&archive.file_name);
    tokio::fs::write(&path, &archive.bytes).await.map_err(|err| {
        BridgeError::archive(format!("failed to write {}: {err}", path.display()))
    })?;
    info!(path = %path.display(), files = archive.file_count, "archive written");

    Ok(PackageOutput {
        version: OUTPUT_VERSION.to_string(),
        size_bytes: archive.bytes.len() as u64,
        file_name: archive.file_name,
        path,
        file_count: archive.file_count,
    })
}
