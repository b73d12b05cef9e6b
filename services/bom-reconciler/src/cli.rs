use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bomfill-reconciler",
    version,
    about = "Fill comparison spreadsheets from BOM report PDFs"
)]
pub struct Cli {
    /// Configuration file layered over config/ and the built-in defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse one BOM report and print its sections, colorways and label choices
    Inspect(InspectArgs),
    /// Fill a comparison file from one or more BOM reports
    Reconcile(ReconcileArgs),
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    pub pdf: PathBuf,

    /// Write one CSV per section plus report.json here
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// BOM report PDFs; rows are routed to the report with the matching style
    #[arg(long = "pdf", required = true, num_args = 1..)]
    pub pdfs: Vec<PathBuf>,

    /// Comparison file (csv, xlsx or xls)
    #[arg(long)]
    pub comparison: PathBuf,

    /// Where the filled CSV goes
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long)]
    pub style_column: Option<String>,

    #[arg(long)]
    pub color_column: Option<String>,

    /// Main label component as "<component> - <material code>"
    #[arg(long)]
    pub main_label: Option<String>,

    /// Care label component as "<component> - <material code>"
    #[arg(long)]
    pub care_label: Option<String>,

    /// Validate comparison rows on the rayon pool
    #[arg(long)]
    pub parallel: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reconcile() {
        let cli = Cli::try_parse_from([
            "bomfill-reconciler",
            "reconcile",
            "--pdf",
            "a.pdf",
            "b.pdf",
            "--comparison",
            "cmp.xlsx",
            "-o",
            "out.csv",
            "--main-label",
            "Label 1 - 003287",
            "--parallel",
        ])
        .unwrap();

        match cli.command {
            Commands::Reconcile(args) => {
                assert_eq!(args.pdfs, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
                assert_eq!(args.main_label.as_deref(), Some("Label 1 - 003287"));
                assert!(args.care_label.is_none());
                assert!(args.parallel);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from([
            "bomfill-reconciler",
            "inspect",
            "report.pdf",
            "--config",
            "custom.toml",
            "--export-dir",
            "out",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Inspect(ref args) if args.export_dir.is_some()));
    }

    #[test]
    fn test_reconcile_requires_a_pdf() {
        let result = Cli::try_parse_from([
            "bomfill-reconciler",
            "reconcile",
            "--comparison",
            "cmp.csv",
            "-o",
            "out.csv",
        ]);
        assert!(result.is_err());
    }
}
