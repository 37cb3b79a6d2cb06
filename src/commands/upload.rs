use std::path::PathBuf;
use std::process::ExitCode;

use qmlbridge_lib::{upload, BridgeError, BridgeOutput, UploadOutput, OUTPUT_VERSION};

use super::{prepare, GlobalArgs};
use crate::formatting::{render_error, write_output};

/// Run the upload command.
pub async fn run_upload(globals: GlobalArgs, file: PathBuf) -> ExitCode {
    let format = globals.format;
    let ctx = match prepare(&globals).await {
        Ok(ctx) => ctx,
        Err(err) => return render_error(err, format),
    };

    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return render_error(
                BridgeError::upload(format!("failed to read {}: {err}", file.display())),
                format,
            )
        }
    };

    let name = file.to_string_lossy();
    let receipt = match upload(&ctx.db, &name, bytes, &ctx.config.upload).await {
        Ok(receipt) => receipt,
        Err(err) => return render_error(err, format),
    };

    let body = BridgeOutput::Upload(UploadOutput {
        version: OUTPUT_VERSION.to_string(),
        receipt,
        store_dir: ctx.store_dir,
    });
    if let Err(err) = write_output(&body, format) {
        eprintln!("Failed to write output: {err}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
