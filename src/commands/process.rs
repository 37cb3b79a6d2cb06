use std::process::ExitCode;
use std::sync::Arc;

use qmlbridge_lib::config::FontsConfig;
use qmlbridge_lib::types::TransformationOptions;
use qmlbridge_lib::{
    BridgeOutput, FileProcessor, GoogleFontsClient, ProcessOutput, ProcessingReport, Reporter,
    Result, StoreHandle, OUTPUT_VERSION,
};

use super::{prepare, GlobalArgs, LogBuffer};
use crate::cli::TransformArgs;
use crate::formatting::{render_error, write_output};

/// Run the process command.
pub async fn run_process(globals: GlobalArgs, transform: TransformArgs) -> ExitCode {
    let format = globals.format;
    let ctx = match prepare(&globals).await {
        Ok(ctx) => ctx,
        Err(err) => return render_error(err, format),
    };

    let options = transform.options();
    let log = LogBuffer::default();
    let handle = ctx.db.init();
    let result = process_stored(&handle, options, &ctx.config.fonts, log.reporter()).await;
    handle.close();

    let report = match result {
        Ok(report) => report,
        Err(err) => return render_error(err, format),
    };

    let body = BridgeOutput::Process(ProcessOutput {
        version: OUTPUT_VERSION.to_string(),
        options,
        report,
        log: log.take(),
    });
    if let Err(err) = write_output(&body, format) {
        eprintln!("Failed to write output: {err}");
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}

/// Process the stored upload, wiring the Google Fonts client in when downloads are on.
pub(crate) async fn process_stored(
    handle: &StoreHandle,
    options: TransformationOptions,
    fonts: &FontsConfig,
    reporter: Reporter,
) -> Result<ProcessingReport> {
    let mut processor = FileProcessor::new(handle, reporter);
    if options.download_fonts {
        let client = GoogleFontsClient::new(fonts)?;
        processor = processor.with_font_source(Arc::new(client));
    }
    processor.start_processing(options).await
}
