use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use oasconv_core::config::{self, CONFIG_FILE_NAME, ConvertConfig};
use oasconv_core::format;
use oasconv_core::{SpecVersion, TextFormat};

#[derive(Parser)]
#[command(
    name = "oasconv",
    about = "Convert API descriptions between Swagger 2.0, OpenAPI 3.0 and OpenAPI 3.1",
    version,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Args, Debug, Default)]
struct ConvertArgs {
    /// Input document (YAML or JSON); `-` or nothing reads standard input
    input: Option<PathBuf>,

    /// Write the result here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target dialect: swagger, 3.0 or 3.1 [default: 3.1]
    #[arg(short, long)]
    target: Option<SpecVersion>,

    /// Output text format: json or yaml [default: json]
    #[arg(short, long)]
    format: Option<TextFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dialect of a document
    Detect {
        /// Input document; `-` or nothing reads standard input
        input: Option<PathBuf>,
    },

    /// Initialize a new oasconv configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Detect { input }) => {
            let version = cmd_detect(input.as_deref())?;
            println!("{version}");
            Ok(())
        }

        Some(Commands::Init { force }) => cmd_init(Path::new(CONFIG_FILE_NAME), force),

        Some(Commands::Completions { shell }) => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oasconv", &mut std::io::stdout());
            Ok(())
        }

        None => {
            let config = try_load_config()?.unwrap_or_default();
            cmd_convert(cli.convert, &config)
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<ConvertConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn is_stdio(path: Option<&Path>) -> bool {
    path.is_none_or(|p| p.as_os_str() == "-")
}

/// Read the whole input document from a file or standard input.
fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) if !is_stdio(Some(path)) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut data = Vec::new();
            std::io::stdin()
                .read_to_end(&mut data)
                .context("failed to read standard input")?;
            Ok(data)
        }
    }
}

fn write_output(output: Option<&Path>, data: &[u8]) -> Result<()> {
    match output {
        Some(path) if !is_stdio(Some(path)) => {
            fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
            log::info!("wrote {}", path.display());
            Ok(())
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data).context("failed to write standard output")?;
            stdout.flush().context("failed to write standard output")
        }
    }
}

/// Convert one document. Flags override the config file.
fn cmd_convert(args: ConvertArgs, config: &ConvertConfig) -> Result<()> {
    let target = args.target.unwrap_or(config.target);
    let text_format = args.format.unwrap_or(config.format);
    let output = args
        .output
        .or_else(|| config.output.as_ref().map(PathBuf::from));

    let data = read_input(args.input.as_deref())?;
    let converted = oasconv_core::convert(&data, target).context("conversion failed")?;
    let rendered = format::reencode(converted, text_format)
        .with_context(|| format!("failed to write the result as {}", text_format.as_str()))?;
    write_output(output.as_deref(), &rendered)
}

fn cmd_detect(input: Option<&Path>) -> Result<SpecVersion> {
    let data = read_input(input)?;
    oasconv_core::detect(&data).context("cannot detect the document version")
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
