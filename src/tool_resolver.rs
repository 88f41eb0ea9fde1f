//! # Tool Path Resolver
//!
//! Trova i tool di compressione esterni:
//! - directory configurata (`Config::tools_dir`)
//! - variabile d'ambiente `TOOLS_DIR`
//! - `PATH` di sistema

use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Every external tool the codec may invoke
pub const KNOWN_TOOLS: &[(&str, &str)] = &[
    ("jpegtran", "JPEG lossless"),
    ("jpegoptim", "JPEG lossy"),
    ("optipng", "PNG lossless"),
    ("svgo", "SVG minification"),
];

/// Locates optimization tools on disk
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    search_dirs: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver that looks in `tools_dir` and `TOOLS_DIR` before `PATH`
    pub fn new(tools_dir: Option<PathBuf>) -> Self {
        let mut search_dirs = Vec::new();
        if let Some(dir) = tools_dir {
            search_dirs.push(dir);
        }
        if let Some(dir) = env::var_os("TOOLS_DIR") {
            search_dirs.push(PathBuf::from(dir));
        }
        if let Some(path) = env::var_os("PATH") {
            search_dirs.extend(env::split_paths(&path));
        }

        Self { search_dirs }
    }

    /// Resolver over an explicit list of directories, `PATH` ignored
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let file_name = executable_name(tool_name);
        let found = self
            .search_dirs
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file());

        match found {
            Some(ref path) => debug!("Resolved tool {} -> {}", tool_name, path.display()),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Check if a specific tool is available
    pub fn is_tool_available(&self, tool_name: &str) -> bool {
        self.resolve_tool(tool_name).is_some()
    }

    /// Get a report of tool availability
    pub fn tools_report(&self) -> String {
        let mut report = String::from("Optimization tools:\n");
        for (tool, purpose) in KNOWN_TOOLS {
            match self.resolve_tool(tool) {
                Some(path) => {
                    report.push_str(&format!("  ✅ {} ({}) -> {}\n", tool, purpose, path.display()));
                }
                None => {
                    report.push_str(&format!(
                        "  ❌ {} ({}) - install with: {}\n",
                        tool,
                        purpose,
                        install_instructions(tool)
                    ));
                }
            }
        }
        report
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new(None)
    }
}

pub(crate) fn executable_name(tool_name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

/// Installation hint for a missing tool
pub fn install_instructions(tool_name: &str) -> String {
    match tool_name {
        "jpegtran" => "sudo apt-get install libjpeg-turbo-progs".to_string(),
        "jpegoptim" => "sudo apt-get install jpegoptim".to_string(),
        "optipng" => "sudo apt-get install optipng".to_string(),
        "svgo" => "npm install -g svgo".to_string(),
        _ => format!("sudo apt-get install {}", tool_name),
    }
}
