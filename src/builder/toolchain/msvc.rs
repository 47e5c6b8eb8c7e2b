//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::CompilerFamily;

use super::{CommandSpec, CompileInput, LinkInput, Toolchain};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe (compiler)
    pub cl: PathBuf,
    /// Path to link.exe (linker)
    pub link: PathBuf,
}

impl MsvcToolchain {
    /// Create a new MSVC toolchain.
    pub fn new(cl: PathBuf, link: PathBuf) -> Self {
        MsvcToolchain { cl, link }
    }
}

impl Toolchain for MsvcToolchain {
    fn family(&self) -> CompilerFamily {
        CompilerFamily::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cl);

        // Quiet logo, compile only
        cmd = cmd.arg("/nologo");
        cmd = cmd.arg("/c");

        // Include directories
        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("/I{}", dir.display()));
        }

        // Custom flags
        cmd = cmd.args(input.cflags.iter().cloned());

        // Input, forced to C++
        cmd = cmd.arg(format!("/Tp{}", input.source.display()));

        // Output
        cmd = cmd.arg(format!("/Fo{}", input.output.display()));

        cmd
    }

    fn link_extension_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.link);

        cmd = cmd.arg("/nologo");
        cmd = cmd.arg("/INCREMENTAL:NO");
        cmd = cmd.arg("/DLL");

        // Library search paths
        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("/LIBPATH:{}", dir.display()));
        }

        cmd = cmd.arg(format!("/EXPORT:{}", input.export_symbol));

        // Object files
        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        // Custom flags
        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd = cmd.arg(format!("/OUT:{}", input.output.display()));

        // Keep the import library out of the install tree
        let stem = input
            .output
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.split('.').next())
            .unwrap_or("module");
        cmd = cmd.arg(format!(
            "/IMPLIB:{}",
            input.temp_dir.join(format!("{}.lib", stem)).display()
        ));

        cmd
    }

    fn object_extension(&self) -> &str {
        "obj"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain() -> MsvcToolchain {
        MsvcToolchain::new(PathBuf::from("cl.exe"), PathBuf::from("link.exe"))
    }

    #[test]
    fn test_compile_command() {
        let input = CompileInput {
            source: PathBuf::from("src/Titta.cpp"),
            output: PathBuf::from("obj/Titta.obj"),
            include_dirs: vec![PathBuf::from("deps/include")],
            cflags: vec!["/O2".to_string(), "/DVERSION_INFO=\"1.0.0rc1\"".to_string()],
        };

        let cmd = toolchain().compile_command(&input);
        assert_eq!(cmd.program, PathBuf::from("cl.exe"));
        assert_eq!(
            cmd.args,
            vec![
                "/nologo",
                "/c",
                "/Ideps/include",
                "/O2",
                "/DVERSION_INFO=\"1.0.0rc1\"",
                "/Tpsrc/Titta.cpp",
                "/Foobj/Titta.obj",
            ]
        );
    }

    #[test]
    fn test_link_command_exports_init_symbol() {
        let input = LinkInput {
            objects: vec![PathBuf::from("obj/Titta.obj")],
            output: PathBuf::from("out/TittaPy.cp311-win_amd64.pyd"),
            lib_dirs: vec![PathBuf::from("deps/lib")],
            ldflags: vec!["/LTCG".to_string()],
            export_symbol: "PyInit_TittaPy".to_string(),
            temp_dir: PathBuf::from("obj"),
        };

        let cmd = toolchain().link_extension_command(&input);
        assert_eq!(cmd.program, PathBuf::from("link.exe"));
        assert!(cmd.args.contains(&"/DLL".to_string()));
        assert!(cmd.args.contains(&"/LIBPATH:deps/lib".to_string()));
        assert!(cmd.args.contains(&"/EXPORT:PyInit_TittaPy".to_string()));
        assert!(cmd.args.contains(&"/OUT:out/TittaPy.cp311-win_amd64.pyd".to_string()));

        let implib = cmd.args.last().unwrap();
        assert!(implib.starts_with("/IMPLIB:"));
        assert!(implib.ends_with("TittaPy.lib"));
    }
}
