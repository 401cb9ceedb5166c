use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::Level;

use vulcanize::core::{print_error_message, vulcanize, write_output, Excludes, VulcanizeOptions};
use vulcanize::error::VulcanizeResult;
use vulcanize::utils::Exclusions;

/// Flatten HTML imports into a single file.
#[derive(Parser, Debug)]
#[command(name = "vulcanize", version, about)]
struct Cli {
    /// Root document to flatten
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File to write the result to
    #[arg(short, long, default_value = "vulcanized.html")]
    output: PathBuf,

    /// Regex of import hrefs to leave in place
    #[arg(long = "exclude-imports", value_name = "REGEX")]
    exclude_imports: Vec<String>,

    /// Regex of stylesheet hrefs to leave external
    #[arg(long = "exclude-styles", value_name = "REGEX")]
    exclude_styles: Vec<String>,

    /// Regex of script srcs to leave external
    #[arg(long = "exclude-scripts", value_name = "REGEX")]
    exclude_scripts: Vec<String>,

    /// Inline external scripts
    #[arg(long)]
    inline: bool,

    /// Move inline scripts into a separate file for Content Security Policy
    #[arg(long)]
    csp: bool,

    /// Remove comments and insignificant whitespace
    #[arg(long)]
    strip: bool,

    /// Log every step
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> VulcanizeResult<VulcanizeOptions> {
        Ok(VulcanizeOptions {
            input: self.input,
            output: self.output,
            output_dir: None,
            excludes: Excludes {
                imports: Exclusions::new(self.exclude_imports.as_slice())?,
                styles: Exclusions::new(self.exclude_styles.as_slice())?,
                scripts: Exclusions::new(self.exclude_scripts.as_slice())?,
            },
            inline: self.inline,
            csp: self.csp,
            csp_file: None,
            strip: self.strip,
            verbose: self.verbose,
        })
    }
}

fn run(cli: Cli) -> VulcanizeResult<()> {
    let options = cli.into_options()?;
    let html = vulcanize(&options)?;
    write_output(&options.output, &html)
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        print_error_message(&format!("Error: {e}"));
        process::exit(1);
    }
}
