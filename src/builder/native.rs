//! Native build execution.
//!
//! Runs a [`BuildPlan`]: compiles sources in parallel, links the module,
//! then copies everything into the install root.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::builder::plan::{
    BuildPlan, BuildStep, CompileStep, InstallKind, InstallStep, LinkStep, MetadataStep,
};
use crate::util::fs::{copy_dir_all, copy_file, ensure_dir, relative_path, write_string};
use crate::util::hash::sha256_file;
use crate::util::process::ProcessBuilder;

/// A file written into the install root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledFile {
    pub path: PathBuf,
    pub sha256: String,
}

/// Result of executing a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutput {
    /// The linked module in the output directory
    pub module: PathBuf,
    /// Files installed, in install order
    pub installed: Vec<InstalledFile>,
}

/// Executes build plans.
pub struct NativeBuilder {
    jobs: Option<usize>,
    verbose: bool,
}

impl NativeBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        NativeBuilder {
            jobs: None,
            verbose: false,
        }
    }

    /// Limit the number of parallel compiles.
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Log every command instead of drawing a progress bar.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Execute the build plan.
    ///
    /// Compile steps run in parallel; the link, install and metadata steps
    /// run afterwards in plan order.
    pub fn execute(&self, plan: &BuildPlan) -> Result<BuildOutput> {
        let start = Instant::now();
        let cwd = &plan.layout.project_root;

        ensure_dir(&plan.layout.obj_dir())?;

        let compile_steps: Vec<&CompileStep> = plan.compile_steps().collect();
        if !compile_steps.is_empty() {
            tracing::info!("Compiling {} file(s) for {}", compile_steps.len(), plan.module);
            self.compile_all(&compile_steps, cwd)?;
        }

        let mut module = None;
        let mut installed = Vec::new();

        for step in &plan.steps {
            match step {
                BuildStep::Compile(_) => {
                    // Already handled above
                }
                BuildStep::Link(s) => {
                    link(s, cwd)?;
                    module = Some(s.output.clone());
                }
                BuildStep::Install(s) => {
                    installed.extend(install(s)?);
                }
                BuildStep::Metadata(s) => {
                    let written = write_metadata(s, &installed)?;
                    installed.extend(written);
                }
            }
        }

        let module = module.context("build plan has no link step")?;

        tracing::info!(
            "Finished {} in {:.2}s",
            module.display(),
            start.elapsed().as_secs_f64()
        );

        Ok(BuildOutput { module, installed })
    }

    fn compile_all(&self, steps: &[&CompileStep], cwd: &Path) -> Result<()> {
        let pb = if !self.verbose && steps.len() > 1 {
            let pb = ProgressBar::new(steps.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let run = || -> Vec<Result<()>> {
            steps
                .par_iter()
                .map(|step| {
                    let result = compile(step, cwd);
                    if let Some(ref pb) = pb {
                        pb.set_message(file_label(&step.source));
                        pb.inc(1);
                    }
                    result
                })
                .collect()
        };

        let results = match self.jobs {
            Some(jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("failed to create compile thread pool")?
                .install(run),
            None => run(),
        };

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        for result in results {
            result?;
        }
        Ok(())
    }
}

impl Default for NativeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a single source file.
fn compile(step: &CompileStep, cwd: &Path) -> Result<()> {
    if let Some(parent) = step.output.parent() {
        ensure_dir(parent)?;
    }

    let cmd = ProcessBuilder::from_spec(&step.command).cwd(cwd);
    tracing::debug!("{}", cmd.display_command());

    cmd.exec_and_check()
        .with_context(|| format!("compilation failed for {}", step.source.display()))?;
    Ok(())
}

/// Link the extension module.
fn link(step: &LinkStep, cwd: &Path) -> Result<()> {
    if let Some(parent) = step.output.parent() {
        ensure_dir(parent)?;
    }

    let cmd = ProcessBuilder::from_spec(&step.command).cwd(cwd);
    tracing::info!("Linking {}", file_label(&step.output));
    tracing::debug!("{}", cmd.display_command());

    cmd.exec_and_check()
        .with_context(|| format!("linking failed for {}", step.output.display()))?;
    Ok(())
}

/// Copy one install step's files.
fn install(step: &InstallStep) -> Result<Vec<InstalledFile>> {
    let written = match step.kind {
        InstallKind::Module | InstallKind::DataFile => {
            copy_file(&step.source, &step.destination)?;
            vec![step.destination.clone()]
        }
        InstallKind::Package => copy_dir_all(&step.source, &step.destination)?,
    };

    tracing::debug!(
        "Installed {} -> {}",
        step.source.display(),
        step.destination.display()
    );

    written.into_iter().map(record_file).collect()
}

/// Write `PKG-INFO`, the zip-safety marker and the list of installed files.
fn write_metadata(step: &MetadataStep, installed: &[InstalledFile]) -> Result<Vec<InstalledFile>> {
    let mut written = Vec::new();

    let pkg_info = step.egg_info.join("PKG-INFO");
    write_string(&pkg_info, &step.pkg_info)?;
    written.push(pkg_info);

    if step.zip_safe == Some(false) {
        let marker = step.egg_info.join("not-zip-safe");
        write_string(&marker, "\n")?;
        written.push(marker);
    }

    let mut listing = String::new();
    let files = installed
        .iter()
        .map(|f| f.path.as_path())
        .chain(written.iter().map(PathBuf::as_path));
    for file in files {
        listing.push_str(&relative_path(&step.egg_info, file).display().to_string());
        listing.push('\n');
    }
    let record = step.egg_info.join("installed-files.txt");
    write_string(&record, &listing)?;
    written.push(record);

    written.into_iter().map(record_file).collect()
}

fn record_file(path: PathBuf) -> Result<InstalledFile> {
    let sha256 = sha256_file(&path)?;
    Ok(InstalledFile { path, sha256 })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::plan::BuildLayout;
    use crate::builder::toolchain::CommandSpec;
    use crate::core::{CompilerFamily, Platform};
    use std::fs;
    use tempfile::TempDir;

    fn plan_with(steps: Vec<BuildStep>, root: &Path) -> BuildPlan {
        BuildPlan {
            module: "TittaPy".to_string(),
            platform: Platform::Linux,
            family: CompilerFamily::Unix,
            fingerprint: "0".repeat(64),
            layout: BuildLayout::new(root, Path::new("build"), Some(Path::new("prefix"))),
            steps,
        }
    }

    #[test]
    fn test_plan_without_link_fails() {
        let tmp = TempDir::new().unwrap();
        let plan = plan_with(Vec::new(), tmp.path());

        let err = NativeBuilder::new().execute(&plan).unwrap_err();
        assert!(err.to_string().contains("no link step"));
    }

    #[test]
    #[cfg(unix)]
    fn test_execute_runs_link_install_and_metadata() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let layout = BuildLayout::new(root, Path::new("build"), Some(Path::new("prefix")));
        let module = layout.out_dir.join("TittaPy.so");
        let site = root.join("prefix/lib/site-packages");

        fs::create_dir_all(root.join("TittaMex/64/OSX")).unwrap();
        fs::write(root.join("TittaMex/64/OSX/libtobii_research.dylib"), "dylib").unwrap();

        let steps = vec![
            BuildStep::Link(LinkStep {
                objects: Vec::new(),
                output: module.clone(),
                command: CommandSpec::new("sh")
                    .args(["-c", "echo module > \"$0\""])
                    .arg(module.display().to_string()),
            }),
            BuildStep::Install(InstallStep {
                kind: InstallKind::Module,
                source: module.clone(),
                destination: site.join("TittaPy.so"),
            }),
            BuildStep::Install(InstallStep {
                kind: InstallKind::DataFile,
                source: root.join("TittaMex/64/OSX/libtobii_research.dylib"),
                destination: site.join("libtobii_research.dylib"),
            }),
            BuildStep::Metadata(MetadataStep {
                egg_info: site.join("TittaPy-1.0.0rc1.egg-info"),
                pkg_info: "Metadata-Version: 2.1\nName: TittaPy\n".to_string(),
                zip_safe: Some(false),
            }),
        ];

        let output = NativeBuilder::new()
            .verbose(true)
            .execute(&plan_with(steps, root))
            .unwrap();

        assert_eq!(output.module, module);
        assert_eq!(fs::read_to_string(site.join("TittaPy.so")).unwrap(), "module\n");
        assert!(site.join("libtobii_research.dylib").exists());

        let egg_info = site.join("TittaPy-1.0.0rc1.egg-info");
        assert!(egg_info.join("not-zip-safe").exists());
        let listing = fs::read_to_string(egg_info.join("installed-files.txt")).unwrap();
        assert_eq!(
            listing,
            "../TittaPy.so\n../libtobii_research.dylib\nPKG-INFO\nnot-zip-safe\n"
        );

        assert_eq!(output.installed.len(), 5);
        assert!(output.installed.iter().all(|f| f.sha256.len() == 64));
    }

    #[test]
    #[cfg(unix)]
    fn test_compile_failure_names_source() {
        let tmp = TempDir::new().unwrap();
        let steps = vec![BuildStep::Compile(CompileStep {
            source: PathBuf::from("src/Titta.cpp"),
            output: tmp.path().join("build/obj/src/Titta.o"),
            command: CommandSpec::new("sh").args(["-c", "echo 'error: boom' >&2; exit 1"]),
        })];

        let err = NativeBuilder::new()
            .jobs(Some(1))
            .execute(&plan_with(steps, tmp.path()))
            .unwrap_err();

        assert!(format!("{:#}", err).contains("src/Titta.cpp"));
        assert!(format!("{:#}", err).contains("boom"));
    }
}
