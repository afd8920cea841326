//! Offline SDK method classifier.
//!
//! Sorts every public client method of an SDK into `list`, `destructive` or
//! `other`, to seed an allow/deny policy for agent-initiated calls. Unknown
//! verbs land in `destructive`: a method is unsafe until its name or doc
//! says otherwise.
//!
//! Rules, first match wins:
//!
//! ```text
//! 1. name starts with a listing prefix             -> list
//! 2. doc mentions pagination                       -> list
//! 3. get_* whose doc talks about many results      -> list
//! 4. first token is a safe verb, or connectivity   -> other
//! 5. any token is a destructive verb               -> destructive
//! 6. anything else                                 -> destructive
//! ```

pub mod outline;
pub mod report;
pub mod scan;

pub use report::{render_deny_list, render_report, ReportMeta};
pub use scan::{SdkScan, ScannedClient};

use crate::naming::{first_token, tokens};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const LIST_PREFIXES: &[&str] = &["list_", "summarize_"];

const PAGINATION_PHRASES: &[&str] = &[
    "paginated",
    "lists all",
    "page token",
    "opc-next-page",
    "list pagination",
    "next page",
];

const BULK_PHRASES: &[&str] = &["list of", "all the", "collection of", "multiple"];

const SAFE_TOKENS: &[&str] = &[
    "get", "fetch", "search", "list", "describe", "head", "summarize", "validate", "view",
    "query", "retrieve", "read", "lookup", "preview",
];

const DESTRUCTIVE_TOKENS: &[&str] = &["delete", "terminate"];

static CONNECTIVITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^test(_[a-z0-9]+)*_connect(ion|ivity)$|_connectivity$").expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    List,
    Destructive,
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::List, Category::Destructive, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::List => "list",
            Category::Destructive => "destructive",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub client: String,
    pub method: String,
    pub category: Category,
    pub takes_payload: bool,
    pub first_token: String,
}

/// Classify a method from its name and doc comment
pub fn classify(method_name: &str, doc: Option<&str>) -> Category {
    let doc = doc.unwrap_or("").to_lowercase();
    let first = first_token(method_name);

    if LIST_PREFIXES.iter().any(|p| method_name.starts_with(p)) {
        return Category::List;
    }
    if PAGINATION_PHRASES.iter().any(|p| doc.contains(p)) {
        return Category::List;
    }
    if method_name.starts_with("get_") && BULK_PHRASES.iter().any(|p| doc.contains(p)) {
        return Category::List;
    }
    if SAFE_TOKENS.contains(&first) || CONNECTIVITY_RE.is_match(method_name) {
        return Category::Other;
    }
    if tokens(method_name).any(|t| DESTRUCTIVE_TOKENS.contains(&t)) {
        return Category::Destructive;
    }
    // Unknown verb
    Category::Destructive
}

/// Classify every method of every scanned client
pub fn classify_scan(scan: &SdkScan) -> Vec<ClassificationRecord> {
    scan.clients
        .iter()
        .flat_map(|client| {
            client.methods.iter().map(move |method| ClassificationRecord {
                client: client.class_name.clone(),
                method: method.name.clone(),
                category: classify(&method.name, method.doc.as_deref()),
                takes_payload: method.takes_payload(),
                first_token: first_token(&method.name).to_string(),
            })
        })
        .collect()
}
