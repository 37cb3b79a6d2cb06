use clap::{Args, Parser, Subcommand, ValueEnum};
use qmlbridge_lib::types::TransformationOptions;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "qmlbridge")]
#[command(
    version,
    about = "QtBridge to QML - Convert QtBridge design exports into QML projects",
    long_about = "QtBridge to QML\n\nCommands:\n- upload: validate a .qtbridge export and store it (wipes the store first).\n- process: extract, transform and optionally download fonts for the stored upload.\n- package: zip images, fonts and generated QML into one archive.\n- convert: upload + process + package in one go.\n- reset: wipe the store.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for store location, font API and archive settings; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Store directory (overrides store_dir from config)"
    )]
    pub store_dir: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a .qtbridge export and store it
    Upload {
        #[arg(value_name = "FILE", help = "QtBridge export (.qtbridge, at most 10 MiB)")]
        file: PathBuf,
    },

    /// Transform the stored upload into QML
    Process {
        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Package everything stored into a ZIP archive
    Package {
        #[arg(
            long,
            short,
            value_name = "DIR",
            help = "Directory to write the archive to (current directory if omitted)"
        )]
        output: Option<PathBuf>,
    },

    /// Upload, process and package a .qtbridge export
    Convert {
        #[arg(value_name = "FILE", help = "QtBridge export (.qtbridge, at most 10 MiB)")]
        file: PathBuf,

        #[command(flatten)]
        transform: TransformArgs,

        #[arg(
            long,
            short,
            value_name = "DIR",
            help = "Directory to write the archive to (current directory if omitted)"
        )]
        output: Option<PathBuf>,
    },

    /// Wipe the store
    Reset,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct TransformArgs {
    #[arg(
        long,
        conflicts_with = "add_unique_ids",
        help = "Emit `id:` from each element's qmlId"
    )]
    pub add_ids: bool,

    #[arg(long, help = "Emit `id:` from each element's uuid")]
    pub add_unique_ids: bool,

    #[arg(long, help = "Emit `objectName:` from each element's name")]
    pub add_object_names: bool,

    #[arg(long, help = "Download referenced font families from Google Fonts")]
    pub download_fonts: bool,
}

impl TransformArgs {
    pub fn options(self) -> TransformationOptions {
        TransformationOptions {
            add_ids: self.add_ids,
            add_unique_ids: self.add_unique_ids,
            add_object_names: self.add_object_names,
            download_fonts: self.download_fonts,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_command_uses_defaults() {
        let cli = Cli::parse_from(["qmlbridge", "process"]);

        assert!(!cli.verbose);
        assert!(cli.config.is_none());
        assert!(cli.store_dir.is_none());
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Process { transform } => {
                assert_eq!(transform.options(), TransformationOptions::default());
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn process_command_respects_flags() {
        let cli = Cli::parse_from([
            "qmlbridge",
            "process",
            "--add-unique-ids",
            "--add-object-names",
            "--download-fonts",
            "--store-dir",
            "/tmp/store",
            "--format",
            "pretty",
        ]);

        assert_eq!(cli.store_dir, Some(PathBuf::from("/tmp/store")));
        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::Process { transform } => {
                let options = transform.options();
                assert!(!options.add_ids);
                assert!(options.add_unique_ids);
                assert!(options.add_object_names);
                assert!(options.download_fonts);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn id_flags_conflict() {
        let result = Cli::try_parse_from(["qmlbridge", "process", "--add-ids", "--add-unique-ids"]);
        assert!(result.is_err());
    }

    #[test]
    fn convert_command_takes_file_and_output() {
        let cli = Cli::parse_from([
            "qmlbridge",
            "--verbose",
            "convert",
            "landing.qtbridge",
            "--add-ids",
            "--output",
            "dist",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Convert {
                file,
                transform,
                output,
            } => {
                assert_eq!(file, PathBuf::from("landing.qtbridge"));
                assert!(transform.add_ids);
                assert_eq!(output, Some(PathBuf::from("dist")));
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn upload_requires_a_file() {
        assert!(Cli::try_parse_from(["qmlbridge", "upload"]).is_err());
    }
}
