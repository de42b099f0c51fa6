use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct SchemesArgs {
    /// Directory of scheme XML files to load
    #[arg(long)]
    pub schemes: PathBuf,
}

pub fn run(args: SchemesArgs) -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = std::fs::read_dir(&args.schemes)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;

    let scheme_set = tdt_loader::load_dir(&paths)?;

    for scheme in &scheme_set.schemes {
        println!("{} (tagLength={}, optionKey={:?})", scheme.name, scheme.tag_length, scheme.option_key);
        for level in &scheme.levels {
            for option in &level.options {
                println!(
                    "  {:<14} optionKey={:<8} pattern=/{}/",
                    level.level_type.as_str(),
                    option.option_key.as_deref().unwrap_or("-"),
                    option.pattern_source
                );
            }
        }
    }

    Ok(())
}
