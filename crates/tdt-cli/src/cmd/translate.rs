use std::path::PathBuf;

use clap::Args;
use tdt_core::engine::Engine;
use tdt_core::model::CompanyPrefixTable;

#[derive(Args, Debug)]
pub struct TranslateArgs {
    /// Directory of scheme XML files to load
    #[arg(long)]
    pub schemes: PathBuf,

    /// Optional GS1 ManagerTranslation.xml company-prefix table
    #[arg(long)]
    pub company_prefix_table: Option<PathBuf>,

    /// Identifier to translate
    #[arg(long)]
    pub identifier: String,

    /// Selection hints, `;`-separated `key=value` pairs (e.g. `taglength=96;filter=3`)
    #[arg(long, default_value = "")]
    pub hints: String,

    /// Target representation (BINARY, TAG_ENCODING, PURE_IDENTITY, LEGACY, LEGACY_AI, ONS_HOSTNAME)
    #[arg(long)]
    pub target: String,
}

pub fn run(args: TranslateArgs) -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = std::fs::read_dir(&args.schemes)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;

    let scheme_set = tdt_loader::load_dir(&paths)?;
    let company_prefixes = match &args.company_prefix_table {
        Some(path) => tdt_loader::load_company_prefix_table(path)?,
        None => CompanyPrefixTable::new(),
    };

    let engine = Engine::new(scheme_set, company_prefixes);
    let output = engine.translate_str(&args.identifier, &args.hints, &args.target)?;

    println!("{output}");
    Ok(())
}
