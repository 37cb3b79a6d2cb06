use std::path::PathBuf;
use std::process::ExitCode;

use qmlbridge_lib::{upload, BridgeError, BridgeOutput, ConvertOutput, OUTPUT_VERSION};

use super::package::package_into;
use super::process::process_stored;
use super::{output_dir, prepare, GlobalArgs, LogBuffer};
use crate::cli::TransformArgs;
use crate::formatting::{render_error, write_output};

/// Run upload, process and package back to back.
pub async fn run_convert(
    globals: GlobalArgs,
    file: PathBuf,
    transform: TransformArgs,
    output: Option<PathBuf>,
) -> ExitCode {
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
    let receipt = match upload(&ctx.db, &file.to_string_lossy(), bytes, &ctx.config.upload).await
    {
        Ok(receipt) => receipt,
        Err(err) => return render_error(err, format),
    };

    let options = transform.options();
    let log = LogBuffer::default();
    let handle = ctx.db.init();
    // Packaging gets its own reporter: progress restarts at 0, log lines keep accumulating.
    let result = match process_stored(&handle, options, &ctx.config.fonts, log.reporter()).await {
        Ok(report) => package_into(
            &handle,
            &ctx.config.archive,
            &output_dir(output.as_deref()),
            &log.reporter(),
        )
        .await
        .map(|archive| (report, archive)),
        Err(err) => Err(err),
    };
    handle.close();

    let (report, archive) = match result {
        Ok(done) => done,
        Err(err) => return render_error(err, format),
    };

    let body = BridgeOutput::Convert(ConvertOutput {
        version: OUTPUT_VERSION.to_string(),
        upload: receipt,
        options,
        report,
        archive,
        log: log.take(),
    });
    if let Err(err) = write_output(&body, format) {
        eprintln!("Failed to write output: {err}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
