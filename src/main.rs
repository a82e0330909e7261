use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::Parser as ClapParser;
use jack_analyzer::{collect_sources, compile_source, dump_tokens, CompilerError, Config, SourceFile, XmlWriter};
use tracing::debug;

#[derive(ClapParser)]
#[command(author, version, about = "Jack syntax analyzer")]
struct Cli {
    /// A .jack file, or a directory of them
    path: PathBuf,
    /// Emit the flat token stream instead of the parse trace
    #[arg(long)]
    tokens: bool,
    /// Write one XML file per source into this directory instead of stdout
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,
    /// Spaces per indentation level
    #[arg(long, value_name = "N")]
    indent: Option<usize>,
    /// Leave <, >, & and " unescaped in token text
    #[arg(long)]
    no_escape: bool,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn process_file<W: Write>(source: &SourceFile, cli: &Cli, config: &Config, out: W) -> Result<(), CompilerError> {
    let mut writer = XmlWriter::new(out)
        .with_indent(config.indent.clone())
        .with_escape(config.escape);

    let result = if cli.tokens {
        dump_tokens(source, &mut writer)
    } else {
        compile_source(source, &mut writer)
    };

    // Whatever was emitted before a failure stays visible.
    writer.flush()?;
    result
}

fn output_path(dir: &Path, stem: &str, tokens: bool) -> PathBuf {
    if tokens {
        dir.join(format!("{}T.xml", stem))
    } else {
        dir.join(format!("{}.xml", stem))
    }
}

fn run(cli: &Cli) -> Result<(), CompilerError> {
    let mut config = Config::load()?;
    if let Some(width) = cli.indent {
        config.indent = " ".repeat(width);
    }
    if cli.no_escape {
        config.escape = false;
    }

    let sources = collect_sources(&cli.path, &config.extension)?;
    debug!(count = sources.len(), "analyzing");

    for path in &sources {
        let source = SourceFile::load(path)?;
        match &cli.out_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| CompilerError::io(dir, e))?;
                let target = output_path(dir, &source.stem(), cli.tokens);
                let file = fs::File::create(&target).map_err(|e| CompilerError::io(&target, e))?;
                process_file(&source, cli, &config, BufWriter::new(file))?;
                debug!(output = %target.display(), "written");
            }
            None => {
                let stdout = io::stdout();
                process_file(&source, cli, &config, BufWriter::new(stdout.lock()))?;
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
