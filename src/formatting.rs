use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use qmlbridge_lib::{BridgeError, BridgeOutput, ErrorOutput, OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Write output in the requested format.
pub fn write_output(
    body: &BridgeOutput,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(body)?),
        OutputFormat::Pretty => write_pretty_output(body)?,
    };
    Ok(())
}

/// Render an error and return the fatal exit code.
pub fn render_error(err: BridgeError, format: OutputFormat) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = BridgeOutput::Error(ErrorOutput {
        version: OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            println!("{content}");
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

/// Human output on a terminal; pretty-printed JSON otherwise.
fn write_pretty_output(body: &BridgeOutput) -> io::Result<()> {
    if std::io::stdout().is_terminal() {
        println!("{}", format_pretty(body, true));
        return Ok(());
    }

    // Non-tty: keep JSON shape for pipelines.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    println!("{content}");
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &BridgeOutput, colorize: bool) -> String {
    let mut buf = String::new();
    match body {
        BridgeOutput::Upload(out) => {
            let header = color("[UPLOAD]", "36", colorize);
            writeln!(
                buf,
                "{} Stored {} ({} bytes)",
                header, out.receipt.file_name, out.receipt.size_bytes
            )
            .ok();
            writeln!(buf, "Store: {}", out.store_dir.display()).ok();
        }
        BridgeOutput::Process(out) => {
            let header = color("[PROCESS]", "32", colorize);
            let source = if out.report.resumed {
                "cached metadata"
            } else {
                "uploaded archive"
            };
            writeln!(
                buf,
                "{} Generated {} QML file(s) from {}",
                header, out.report.qml_files, source
            )
            .ok();
            write_report_details(&mut buf, &out.report, colorize);
            write_log(&mut buf, &out.log);
        }
        BridgeOutput::Package(out) => {
            let header = color("[PACKAGE]", "34", colorize);
            writeln!(
                buf,
                "{} {} file(s) -> {} ({} bytes)",
                header,
                out.file_count,
                out.path.display(),
                out.size_bytes
            )
            .ok();
        }
        BridgeOutput::Convert(out) => {
            let header = color("[CONVERT]", "32", colorize);
            writeln!(
                buf,
                "{} {} -> {}",
                header,
                out.upload.file_name,
                out.archive.path.display()
            )
            .ok();
            writeln!(
                buf,
                "QML files: {}, archive entries: {}",
                out.report.qml_files, out.archive.file_count
            )
            .ok();
            write_report_details(&mut buf, &out.report, colorize);
            write_log(&mut buf, &out.log);
        }
        BridgeOutput::Reset(out) => {
            let header = color("[RESET]", "33", colorize);
            writeln!(buf, "{} Store cleared: {}", header, out.store_dir.display()).ok();
        }
        BridgeOutput::Error(out) => {
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or(out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
        }
    }
    buf
}

fn write_report_details(buf: &mut String, report: &qmlbridge_lib::ProcessingReport, colorize: bool) {
    if report.images > 0 {
        writeln!(buf, "Images: {}", report.images).ok();
    }
    if !report.font_families.is_empty() {
        writeln!(buf, "Font families: {}", report.font_families.join(", ")).ok();
    }
    if let Some(fonts) = &report.fonts {
        let ratio = format!("{}/{}", fonts.available(), fonts.requested);
        let code = if fonts.failures.is_empty() { "32" } else { "33" };
        writeln!(buf, "Fonts ready: {}", color(&ratio, code, colorize)).ok();
        for failure in &fonts.failures {
            writeln!(buf, "- {}: {}", failure.family, failure.message).ok();
        }
    }
}

fn write_log(buf: &mut String, log: &[String]) {
    if log.is_empty() {
        return;
    }
    writeln!(buf, "Log:").ok();
    for line in log {
        writeln!(buf, "  {line}").ok();
    }
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
