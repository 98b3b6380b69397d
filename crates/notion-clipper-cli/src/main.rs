use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use notion_clipper_config::Config;
use notion_clipper_engine::{ContentType, ModernParser, ParseOptions, generate_api_instructions};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ContentTypeArg {
    Auto,
    Markdown,
    Text,
    Code,
    Url,
}

impl From<ContentTypeArg> for ContentType {
    fn from(arg: ContentTypeArg) -> Self {
        match arg {
            ContentTypeArg::Auto => ContentType::Auto,
            ContentTypeArg::Markdown => ContentType::Markdown,
            ContentTypeArg::Text => ContentType::Text,
            ContentTypeArg::Code => ContentType::Code,
            ContentTypeArg::Url => ContentType::Url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Blocks and metadata as returned by the parser
    Result,
    /// Root blocks plus the child append operations
    Instructions,
    /// Lexer tokens
    Tokens,
    /// Syntax tree before block conversion
    Ast,
}

#[derive(Debug, Parser)]
#[command(name = "notion-clipper")]
#[command(about = "Compile clipped text or markdown into document API blocks")]
struct Args {
    /// File to read; standard input when omitted or "-"
    input: Option<PathBuf>,

    /// How to interpret the input
    #[arg(short = 't', long, value_enum)]
    content_type: Option<ContentTypeArg>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Result)]
    format: OutputFormat,

    /// Keep at most this many top-level blocks
    #[arg(long)]
    max_blocks: Option<usize>,

    /// Truncate code blocks to this many characters
    #[arg(long)]
    max_code_length: Option<usize>,

    /// Language for code blocks the heuristic cannot place
    #[arg(long)]
    default_code_language: Option<String>,

    #[arg(long)]
    no_tables: bool,
    #[arg(long)]
    no_callouts: bool,
    #[arg(long)]
    no_toggles: bool,
    #[arg(long)]
    no_media: bool,
    #[arg(long)]
    no_equations: bool,

    /// Write output here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Store the effective parse settings in the config file and exit
    #[arg(long)]
    save_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    init_logging(config.log_level.as_deref());

    let options = parse_options(&args, &config.parse);
    if args.save_config {
        config.parse = options;
        let path = args.config.clone().unwrap_or_else(Config::config_path);
        config
            .save_to_path(&path)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        log::info!("Saved settings to {}", path.display());
        return Ok(());
    }

    let content = read_input(args.input.as_deref())?;
    let rendered = render(args.format, &content, &options)?;

    match &args.output {
        Some(path) => {
            let path = config.resolve_output(path);
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => match Config::load_from_path(path)? {
            Some(config) => Ok(config),
            None => bail!("Config file {} does not exist", path.display()),
        },
        None => Ok(Config::load()?.unwrap_or_default()),
    }
}

/// `RUST_LOG` wins over the configured level, which wins over `warn`.
fn init_logging(level: Option<&str>) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn);
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.parse_default_env();
    builder.init();
}

/// Command-line flags layered over the configured settings.
fn parse_options(args: &Args, base: &ParseOptions) -> ParseOptions {
    let mut options = base.clone();
    if let Some(content_type) = args.content_type {
        options.content_type = content_type.into();
    }
    if let Some(max_blocks) = args.max_blocks {
        options.max_blocks = max_blocks;
    }
    if let Some(max_code_length) = args.max_code_length {
        options.max_code_length = max_code_length;
    }
    if let Some(language) = &args.default_code_language {
        options.formatting.default_code_language = Some(language.clone());
    }
    let conversion = &mut options.conversion;
    conversion.tables &= !args.no_tables;
    conversion.callouts &= !args.no_callouts;
    conversion.toggles &= !args.no_toggles;
    conversion.media &= !args.no_media;
    conversion.equations &= !args.no_equations;
    options
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read standard input")?;
            Ok(content)
        }
    }
}

fn render(format: OutputFormat, content: &str, options: &ParseOptions) -> Result<String> {
    let parser = ModernParser::validated()?;
    let json = match format {
        OutputFormat::Result => {
            let result = parser.parse(content, options);
            if let Some(error) = &result.error {
                log::warn!("{error}");
            }
            serde_json::to_string_pretty(&result)?
        }
        OutputFormat::Instructions => {
            let result = parser.parse(content, options);
            serde_json::to_string_pretty(&generate_api_instructions(&result.blocks))?
        }
        OutputFormat::Tokens => serde_json::to_string_pretty(&parser.tokenize(content).tokens())?,
        OutputFormat::Ast => {
            serde_json::to_string_pretty(&parser.parse_nodes(content, options))?
        }
    };
    Ok(json)
}
