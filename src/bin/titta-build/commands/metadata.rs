//! `titta-build metadata` command

use anyhow::Result;

use crate::cli::MetadataArgs;

pub fn execute(args: MetadataArgs) -> Result<()> {
    let config = super::load_config()?;
    let profile = super::profile(args.profile.as_deref(), &config)?;
    let metadata = profile.metadata();

    if args.pkg_info {
        print!("{}", metadata.to_pkg_info());
        return Ok(());
    }

    println!("Name:         {}", metadata.name);
    println!("Version:      {}", metadata.version);
    println!("Summary:      {}", metadata.description);
    println!("Author:       {} <{}>", metadata.author, metadata.author_email);
    println!("Home page:    {}", metadata.url);
    println!("Keywords:     {}", metadata.keywords);
    if let Some(ref py) = metadata.python_requires {
        println!("Requires:     Python {}", py.req);
    }
    for req in &metadata.setup_requires {
        println!("Build needs:  {}", req);
    }
    for req in &metadata.install_requires {
        println!("Install needs: {}", req);
    }
    for package in &metadata.packages {
        println!(
            "Package:      {} (from {})",
            package.name,
            package.root.display()
        );
    }
    if let Some(zip_safe) = metadata.zip_safe {
        println!("Zip safe:     {}", zip_safe);
    }

    Ok(())
}
