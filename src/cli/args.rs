use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "climate-index")]
#[command(about = "Build the location index for the Atlantic Canada climate dashboard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Hide the progress bar")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Subcommand to run; a bare invocation generates with defaults
    pub fn resolved_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Generate(GenerateArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Scan the corpus and write the location index (default)
    Generate(GenerateArgs),

    /// Scan the corpus and report rejections without writing anything
    Validate(GenerateArgs),

    /// Summarise an existing index file
    Info {
        #[arg(short, long, help = "Index file to inspect [default: locations.json]")]
        index: Option<PathBuf>,

        #[arg(short, long, default_value = "5", help = "Locations to list per province")]
        sample: usize,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct GenerateArgs {
    #[arg(short = 'r', long, help = "Corpus root directory or .zip archive [default: climate_data]")]
    pub corpus_root: Option<PathBuf>,

    #[arg(short, long, help = "Output index path [default: locations.json]")]
    pub output: Option<PathBuf>,

    #[arg(short, long, help = "Configuration file (TOML, JSON or YAML)")]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Province codes to index (NB, NL, NS, PEI) [default: all]"
    )]
    pub province: Vec<String>,

    #[arg(short, long, help = "Output format: index or manifest")]
    pub format: Option<String>,

    #[arg(long, help = "CSV of station coordinates keyed by location id")]
    pub stations_file: Option<PathBuf>,

    #[arg(long, help = "Worker threads for extraction [default: number of CPUs]")]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Memory-map corpus files instead of reading them")]
    pub mmap: bool,

    #[arg(long, help = "Exit with status 2 when any file is rejected")]
    pub strict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_means_generate() {
        let cli = Cli::try_parse_from(["climate-index"]).unwrap();
        assert_eq!(cli.resolved_command(), Commands::Generate(GenerateArgs::default()));
    }

    #[test]
    fn test_province_list_and_repeats() {
        let cli = Cli::try_parse_from([
            "climate-index",
            "generate",
            "--province",
            "NB,NS",
            "-p",
            "PEI",
            "--strict",
            "--max-workers",
            "2",
        ])
        .unwrap();

        match cli.resolved_command() {
            Commands::Generate(args) => {
                assert_eq!(args.province, vec!["NB", "NS", "PEI"]);
                assert!(args.strict);
                assert_eq!(args.max_workers, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["climate-index", "validate", "-r", "corpus.zip", "--quiet"])
                .unwrap();
        assert!(cli.quiet);
        assert!(matches!(
            cli.resolved_command(),
            Commands::Validate(args) if args.corpus_root == Some(PathBuf::from("corpus.zip"))
        ));
    }
}
