use std::fs;
use std::process::ExitCode;

use clap::Parser;

use thirc_backend::OptLevel;
use thirc_cli::{compile, ThircOptions};

#[derive(Parser, Debug)]
#[command(name = "thirc", about = "a small ahead-of-time compiler", version)]
struct Cli {
    /// Source file to compile.
    input: String,

    /// Select the release optimization level threaded through to the
    /// backend. The shipped `TextIrBackend` accepts but does not act on
    /// this — optimization passes are out of scope.
    #[arg(short = 'r', long = "release", default_value_t = false)]
    release: bool,

    /// Write the emitted textual IR to this file instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<String>,

    /// Print the lowered THIR (pretty-printed) to stderr before emitting IR.
    #[arg(long = "print-thir", default_value_t = false)]
    print_thir: bool,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let source = fs::read_to_string(&cli.input)
        .map_err(|e| anyhow::anyhow!("failed to read '{}': {}", cli.input, e))?;

    let opts = ThircOptions {
        input: cli.input.clone(),
        output: cli.output.clone(),
        opt_level: if cli.release { OptLevel::Release } else { OptLevel::Debug },
        print_thir: cli.print_thir,
    };

    let ir = compile(&opts, &source).map_err(|e| anyhow::anyhow!("{}", e))?;

    match &opts.output {
        Some(path) => {
            fs::write(path, &ir).map_err(|e| anyhow::anyhow!("failed to write '{}': {}", path, e))?;
            tracing::info!("wrote {}", path);
        }
        None => println!("{}", ir),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
