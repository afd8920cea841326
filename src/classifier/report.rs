//! Text report and deny-list rendering.

use super::{Category, ClassificationRecord};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::path::PathBuf;

/// Run details printed in the report header
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub sdk_root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub files_scanned: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
struct DenyFragment<'a> {
    policy: DenyTable<'a>,
}

#[derive(Serialize)]
struct DenyTable<'a> {
    deny: Vec<&'a str>,
}

/// Render the classification report
pub fn render_report(records: &[ClassificationRecord], meta: &ReportMeta) -> String {
    let mut grouped: BTreeMap<Category, BTreeMap<&str, Vec<&ClassificationRecord>>> =
        BTreeMap::new();
    let mut first_tokens: BTreeMap<Category, BTreeSet<&str>> = BTreeMap::new();

    for record in records {
        grouped
            .entry(record.category)
            .or_default()
            .entry(record.client.as_str())
            .or_default()
            .push(record);
        first_tokens
            .entry(record.category)
            .or_default()
            .insert(record.first_token.as_str());
    }

    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "SDK method classification");
    let _ = writeln!(out, "SDK root: {}", meta.sdk_root.display());
    let _ = writeln!(out, "Generated: {}", meta.generated_at.to_rfc3339());
    let _ = writeln!(
        out,
        "Client modules scanned: {} ({} skipped)",
        meta.files_scanned, meta.skipped
    );

    for category in Category::ALL {
        let _ = writeln!(out);
        let _ = writeln!(out, "== {} ==", category.as_str().to_uppercase());
        let Some(clients) = grouped.get(&category) else {
            let _ = writeln!(out, "(none)");
            continue;
        };
        for (client, methods) in clients {
            let _ = writeln!(out, "{}", client);
            for record in methods {
                let marker = if record.takes_payload { " [payload]" } else { "" };
                let _ = writeln!(out, "  - {}{}", record.method, marker);
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "== SUMMARY ==");
    for category in Category::ALL {
        let count = grouped
            .get(&category)
            .map(|clients| clients.values().map(Vec::len).sum())
            .unwrap_or(0usize);
        let _ = writeln!(out, "{:<12} {}", category.as_str(), count);
    }
    let _ = writeln!(out, "{:<12} {}", "total", records.len());

    let _ = writeln!(out);
    let _ = writeln!(out, "== FIRST TOKENS BY CATEGORY ==");
    for category in Category::ALL {
        let tokens = first_tokens
            .get(&category)
            .map(|set| set.iter().copied().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        let _ = writeln!(out, "{}: {}", category.as_str(), tokens);
    }

    out
}

/// Render a `[policy]` TOML fragment denying every destructive method
pub fn render_deny_list(records: &[ClassificationRecord]) -> Result<String> {
    let rules: BTreeSet<String> = records
        .iter()
        .filter(|r| r.category == Category::Destructive)
        .map(|r| format!("{}.{}", r.client, r.method))
        .collect();

    let fragment = DenyFragment {
        policy: DenyTable {
            deny: rules.iter().map(String::as_str).collect(),
        },
    };
    toml::to_string_pretty(&fragment).context("Failed to render deny list")
}
