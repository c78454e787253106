//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# async-naming configuration

# Exit with a non-zero status when a finding reaches this severity
fail_on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./src"

# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/vendor/**",
]

# Respect .gitignore files
respect_gitignore = true

# Worker threads (default: one per CPU)
# parallelism = 4

[generated]
# Leading comments containing any of these mark a file as generated
markers = ["<auto-generated"]

[rules.avoid-async-suffix]
enabled = true
# severity = "warning"  # Override default severity
# suffix = "Async"
# Return types that count as asynchronous handles
handle_types = ["std::future::Future"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("async-naming.toml"), force)?;

    println!("Created async-naming.toml");
    println!("\nNext steps:");
    println!("  1. Edit async-naming.toml to configure rules");
    println!("  2. Run: async-naming check");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
