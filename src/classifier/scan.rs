//! SDK source tree discovery.

use super::outline::{parse_module, MethodOutline};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Client modules are named `<service>_client.py`
pub const CLIENT_MODULE_SUFFIX: &str = "_client.py";
/// Client classes are named `<Service>Client`
pub const CLIENT_CLASS_SUFFIX: &str = "Client";

/// Shared plumbing modules that match the naming convention but hold no service client
const IGNORED_MODULES: &[&str] = &["base_client.py"];

/// One client class found in the SDK
#[derive(Debug, Clone)]
pub struct ScannedClient {
    pub class_name: String,
    pub module_path: PathBuf,
    /// Public methods defined directly on the class
    pub methods: Vec<MethodOutline>,
}

/// Everything found under an SDK root
#[derive(Debug, Default)]
pub struct SdkScan {
    pub clients: Vec<ScannedClient>,
    pub files_scanned: usize,
    /// Unreadable entries and unparsable modules, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

impl SdkScan {
    /// Walk `root`, parsing every client module. Unreadable directories and
    /// unreadable or unparsable files are recorded and skipped.
    pub fn scan(root: &Path) -> Self {
        let mut scan = SdkScan::default();

        let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                    scan.skipped.push((path, e.to_string()));
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_client_module(path) {
                continue;
            }

            scan.files_scanned += 1;
            match scan_module(path) {
                Ok(clients) => {
                    debug!(path = %path.display(), clients = clients.len(), "scanned client module");
                    scan.clients.extend(clients);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unparsable module");
                    scan.skipped.push((path.to_path_buf(), format!("{:#}", e)));
                }
            }
        }

        scan.clients.sort_by(|a, b| a.class_name.cmp(&b.class_name));
        scan
    }

    pub fn method_count(&self) -> usize {
        self.clients.iter().map(|c| c.methods.len()).sum()
    }
}

/// Whether `path` follows the client module naming convention
pub fn is_client_module(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(CLIENT_MODULE_SUFFIX) && !IGNORED_MODULES.contains(&name)
}

fn scan_module(path: &Path) -> Result<Vec<ScannedClient>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let classes = parse_module(&source)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(classes
        .into_iter()
        .filter(|class| class.name.ends_with(CLIENT_CLASS_SUFFIX))
        .map(|class| ScannedClient {
            class_name: class.name,
            module_path: path.to_path_buf(),
            methods: class.methods.into_iter().filter(|m| m.is_public()).collect(),
        })
        .collect())
}
