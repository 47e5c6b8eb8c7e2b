//! Build plan generation.
//!
//! A BuildPlan describes every command and file copy needed to turn a
//! [`Configuration`] into an installed extension module. Planning runs no
//! processes, so a plan can be printed or written out as
//! `compile_commands.json` without building anything.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::configure::Configuration;
use crate::builder::python::PythonEnv;
use crate::builder::toolchain::{CommandSpec, CompileInput, LinkInput, Toolchain};
use crate::core::data_files::{destination_path, normalize_source};
use crate::core::{CompilerFamily, Platform};
use crate::util::config::ToolchainSettings;
use crate::util::fs::resolve_against;

/// Directories a build works in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLayout {
    /// Directory relative sources, include and library paths are resolved from
    pub project_root: PathBuf,
    /// Directory receiving objects and the linked module
    pub out_dir: PathBuf,
    /// Install prefix; nothing is installed when unset
    pub install_root: Option<PathBuf>,
}

impl BuildLayout {
    /// Layout for a project, with relative directories resolved against its root.
    pub fn new(project_root: &Path, out_dir: &Path, install_root: Option<&Path>) -> Self {
        BuildLayout {
            project_root: project_root.to_path_buf(),
            out_dir: resolve_against(project_root, out_dir),
            install_root: install_root.map(|p| resolve_against(project_root, p)),
        }
    }

    /// Directory holding object files.
    pub fn obj_dir(&self) -> PathBuf {
        self.out_dir.join("obj")
    }
}

/// A complete build plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Extension module name
    pub module: String,
    pub platform: Platform,
    pub family: CompilerFamily,
    /// Fingerprint of the configuration the plan was made from
    pub fingerprint: String,
    pub layout: BuildLayout,
    /// All build steps in execution order
    pub steps: Vec<BuildStep>,
}

/// A build step in the plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildStep {
    /// Compile a source file to an object file
    Compile(CompileStep),
    /// Link objects into the extension module
    Link(LinkStep),
    /// Copy a file or package into the install root
    Install(InstallStep),
    /// Write distribution metadata into the install root
    Metadata(MetadataStep),
}

/// A step compiling one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileStep {
    /// Source file, as listed by the extension
    pub source: PathBuf,
    /// Object file
    pub output: PathBuf,
    pub command: CommandSpec,
}

/// The step linking the extension module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkStep {
    pub objects: Vec<PathBuf>,
    /// Module file
    pub output: PathBuf,
    pub command: CommandSpec,
}

/// What an install step copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallKind {
    /// The linked extension module
    Module,
    /// A file from the data-file manifest
    DataFile,
    /// A pure-Python package directory
    Package,
}

/// A step copying build output or project files into the install root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallStep {
    pub kind: InstallKind,
    /// File, or package directory
    pub source: PathBuf,
    /// Destination file, or package directory
    pub destination: PathBuf,
}

/// The step writing `PKG-INFO` and the install record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataStep {
    /// `<name>-<version>.egg-info` directory
    pub egg_info: PathBuf,
    /// Rendered core metadata
    pub pkg_info: String,
    /// Writes a `not-zip-safe` marker when `Some(false)`
    pub zip_safe: Option<bool>,
}

/// A compile_commands.json entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CompileCommand {
    directory: String,
    file: String,
    arguments: Vec<String>,
    output: Option<String>,
}

impl BuildPlan {
    /// Create a build plan.
    ///
    /// `extra` carries flags from the config files; they are appended after
    /// the configured flags so they can override them.
    pub fn new(
        config: &Configuration,
        toolchain: &dyn Toolchain,
        python: &PythonEnv,
        layout: BuildLayout,
        extra: &ToolchainSettings,
    ) -> Result<Self> {
        let settings = config.settings;
        if toolchain.family() != settings.family {
            bail!(
                "configuration targets {} compilers, but the toolchain `{}` is {}",
                settings.family,
                toolchain.compiler_path().display(),
                toolchain.family()
            );
        }

        let extension = &config.extension;
        let descriptor = &extension.descriptor;
        if descriptor.sources.is_empty() {
            bail!("extension `{}` has no sources", descriptor.name);
        }

        let root = &layout.project_root;
        let include_dirs: Vec<PathBuf> = python
            .resolve_include_dirs(&descriptor.include_dirs)?
            .iter()
            .map(|dir| resolve_against(root, dir))
            .collect();

        let mut lib_dirs: Vec<PathBuf> = descriptor
            .library_dirs
            .iter()
            .map(|dir| resolve_against(root, dir))
            .collect();
        lib_dirs.extend(python.library_dirs(settings.platform));

        let mut cflags = extension.extra_compile_args.clone();
        cflags.extend(extra.cflags.iter().cloned());
        let mut ldflags = extension.extra_link_args.clone();
        ldflags.extend(extra.ldflags.iter().cloned());

        let mut steps = Vec::new();

        // Compile
        let obj_dir = layout.obj_dir();
        let mut objects = Vec::with_capacity(descriptor.sources.len());
        for source in &descriptor.sources {
            let output = obj_dir
                .join(normalize_source(source))
                .with_extension(toolchain.object_extension());
            if objects.contains(&output) {
                bail!(
                    "two sources of `{}` compile to {}",
                    descriptor.name,
                    output.display()
                );
            }

            let input = CompileInput {
                source: resolve_against(root, source),
                output: output.clone(),
                include_dirs: include_dirs.clone(),
                cflags: cflags.clone(),
            };

            steps.push(BuildStep::Compile(CompileStep {
                source: source.clone(),
                output: output.clone(),
                command: toolchain.compile_command(&input),
            }));
            objects.push(output);
        }

        // Link
        let module_file = python.module_file_name(&descriptor.name, settings.platform);
        let module_path = layout.out_dir.join(&module_file);
        let input = LinkInput {
            objects: objects.clone(),
            output: module_path.clone(),
            lib_dirs,
            ldflags,
            export_symbol: descriptor.init_symbol(),
            temp_dir: obj_dir,
        };
        steps.push(BuildStep::Link(LinkStep {
            objects,
            output: module_path.clone(),
            command: toolchain.link_extension_command(&input),
        }));

        // Install
        if let Some(ref prefix) = layout.install_root {
            let site_packages = prefix.join(&python.site_packages);

            steps.push(BuildStep::Install(InstallStep {
                kind: InstallKind::Module,
                source: module_path,
                destination: site_packages.join(&module_file),
            }));

            for package in &config.metadata.packages {
                steps.push(BuildStep::Install(InstallStep {
                    kind: InstallKind::Package,
                    source: resolve_against(root, &package.root.join(&package.name)),
                    destination: site_packages.join(&package.name),
                }));
            }

            for (destination, files) in config.data_files.iter() {
                let dest_dir = prefix.join(destination_path(destination));
                for file in files {
                    let source = resolve_against(root, &normalize_source(file));
                    let file_name = source
                        .file_name()
                        .with_context(|| format!("data file has no file name: {}", file.display()))?;
                    steps.push(BuildStep::Install(InstallStep {
                        kind: InstallKind::DataFile,
                        destination: dest_dir.join(file_name),
                        source,
                    }));
                }
            }

            let metadata = &config.metadata;
            steps.push(BuildStep::Metadata(MetadataStep {
                egg_info: site_packages
                    .join(format!("{}-{}.egg-info", metadata.name, metadata.version)),
                pkg_info: metadata.to_pkg_info(),
                zip_safe: metadata.zip_safe,
            }));
        }

        tracing::debug!(
            "Planned {} step(s) for {} ({} on {})",
            steps.len(),
            descriptor.name,
            settings.family,
            settings.platform
        );

        Ok(BuildPlan {
            module: descriptor.name.clone(),
            platform: settings.platform,
            family: settings.family,
            fingerprint: config.fingerprint(),
            layout,
            steps,
        })
    }

    /// Compile steps in plan order.
    pub fn compile_steps(&self) -> impl Iterator<Item = &CompileStep> {
        self.steps.iter().filter_map(|s| match s {
            BuildStep::Compile(c) => Some(c),
            _ => None,
        })
    }

    /// The link step.
    pub fn link_step(&self) -> Option<&LinkStep> {
        self.steps.iter().find_map(|s| match s {
            BuildStep::Link(l) => Some(l),
            _ => None,
        })
    }

    /// Install steps in plan order.
    pub fn install_steps(&self) -> impl Iterator<Item = &InstallStep> {
        self.steps.iter().filter_map(|s| match s {
            BuildStep::Install(i) => Some(i),
            _ => None,
        })
    }

    /// The metadata step, when the plan installs.
    pub fn metadata_step(&self) -> Option<&MetadataStep> {
        self.steps.iter().find_map(|s| match s {
            BuildStep::Metadata(m) => Some(m),
            _ => None,
        })
    }

    /// Emit compile_commands.json for IDE integration.
    pub fn emit_compile_commands(&self, path: &Path) -> Result<()> {
        let directory = self.layout.project_root.display().to_string();
        let commands: Vec<CompileCommand> = self
            .compile_steps()
            .map(|step| CompileCommand {
                directory: directory.clone(),
                file: resolve_against(&self.layout.project_root, &step.source)
                    .display()
                    .to_string(),
                arguments: step.command.argv(),
                output: Some(step.output.display().to_string()),
            })
            .collect();

        let json = serde_json::to_string_pretty(&commands)?;
        crate::util::fs::write_string(path, &json)?;

        tracing::info!("Wrote {}", path.display());
        Ok(())
    }

    /// The plan as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
