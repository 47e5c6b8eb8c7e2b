//! `titta-build toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use titta_build::builder::python::{find_interpreter, PythonEnv};
use titta_build::builder::toolchain::detect_toolchain;
use titta_build::core::Platform;
use titta_build::util::process::ProcessBuilder;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let config = super::load_config()?;
    let platform = Platform::host()?;

    println!("Toolchain:");
    println!();
    println!("  Platform: {}", platform);

    match detect_toolchain(&config.toolchain, platform) {
        Ok(toolchain) => {
            let cxx = toolchain.compiler_path();
            println!("  CXX:      {}", cxx.display());
            println!("  Family:   {}", toolchain.family());

            // cl prints its banner on stderr and rejects --version
            let version = ProcessBuilder::new(cxx).arg("--version").exec();
            if let Ok(output) = version {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if let Some(first_line) = stdout.lines().chain(stderr.lines()).next() {
                    println!("            {}", first_line.trim());
                }
            }
        }
        Err(e) => println!("  CXX:      not found ({})", first_line(&format!("{:#}", e))),
    }

    println!();
    println!("Python:");
    println!();

    let interpreter = args
        .python
        .as_deref()
        .or(config.python.interpreter.as_deref());
    let inspected = find_interpreter(interpreter).and_then(|path| PythonEnv::inspect(&path));
    match inspected {
        Ok(python) => {
            println!("  Interpreter: {}", python.interpreter.display());
            println!("  Version:     {}", python.version);
            println!("  Include:     {}", python.include.display());
            println!("  Suffix:      {}", python.ext_suffix);
            match python.pybind11 {
                Some(ref pybind11) => println!(
                    "  pybind11:    {} ({})",
                    pybind11.version,
                    pybind11.include.display()
                ),
                None => println!("  pybind11:    not installed"),
            }
        }
        Err(e) => println!("  not available ({})", first_line(&format!("{:#}", e))),
    }

    println!();

    println!("Environment:");
    for var in ["CC", "CXX", "PYTHON"] {
        if let Ok(value) = std::env::var(var) {
            println!("  {}={}", var, value);
        }
    }

    Ok(())
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}
