//! `titta-build data-files` command

use anyhow::Result;

use crate::cli::DataFilesArgs;

pub fn execute(args: DataFilesArgs) -> Result<()> {
    let config = super::load_config()?;
    let settings = super::settings(&args.target, &config)?;
    let data_files = settings.profile.data_files(settings.platform);

    if data_files.is_empty() {
        eprintln!(
            "No data files for {} on {}",
            settings.profile, settings.platform
        );
        return Ok(());
    }

    for (dest, files) in data_files.iter() {
        for file in files {
            println!("{}\t{}", dest, file.display());
        }
    }

    Ok(())
}
