use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "tdt")]
#[command(about = "Tag Data Translation engine CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate a single identifier to a target representation
    Translate(cmd::translate::TranslateArgs),

    /// List every known (scheme, level, option) triple from a scheme directory
    Schemes(cmd::schemes::SchemesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Translate(args) => cmd::translate::run(args),
        Commands::Schemes(args) => cmd::schemes::run(args),
    }
}
