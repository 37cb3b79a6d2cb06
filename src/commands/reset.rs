use std::process::ExitCode;

use qmlbridge_lib::{BridgeOutput, Database, ResetOutput, OUTPUT_VERSION};

use super::{resolve, GlobalArgs};
use crate::formatting::{render_error, write_output};

/// Run the reset command. Works on stores left behind by other schema versions.
pub async fn run_reset(globals: GlobalArgs) -> ExitCode {
    let format = globals.format;
    let store_dir = match resolve(&globals) {
        Ok((_, store_dir)) => store_dir,
        Err(err) => return render_error(err, format),
    };

    if let Err(err) = Database::reset_dir(&store_dir).await {
        return render_error(err, format);
    }

    let body = BridgeOutput::Reset(ResetOutput {
        version: OUTPUT_VERSION.to_string(),
        store_dir,
    });
    if let Err(err) = write_output(&body, format) {
        eprintln!("Failed to write output: {err}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
