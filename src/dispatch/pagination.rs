//! Pagination detection and page draining.

use crate::config::DispatchConfig;
use crate::error::SdkError;
use crate::sdk::{CallArgs, Operation, SdkResponse, SdkValue};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Argument carrying the page cursor
pub const PAGE_PARAM: &str = "page";
/// Argument carrying the caller's item limit
pub const LIMIT_PARAM: &str = "limit";

const LISTING_PREFIXES: &[&str] = &["list_", "summarize_"];

/// Paginated operations whose signatures cannot be introspected reliably
const KNOWN_PAGINATED: &[&str] = &[
    "search_resources",
    "request_summarized_usages",
    "request_summarized_configurations",
    "list_logs",
];

static PAGING_DOC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(:param\s+(?:\w+\s+)?(?:page|limit)\s*:|opc-next-page)")
        .expect("static regex")
});

/// Cursor state derived from one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub has_next_page: bool,
    pub next_page_token: Option<String>,
}

impl PageCursor {
    pub fn from_response(response: &SdkResponse) -> Self {
        Self {
            has_next_page: response.has_next_page,
            next_page_token: response.next_page.clone(),
        }
    }

    /// Token for the next call; `None` once exhausted or when the token did not move
    pub fn next_token(&self, previous: Option<&str>) -> Option<&str> {
        if !self.has_next_page {
            return None;
        }
        let token = self.next_page_token.as_deref().filter(|t| !t.is_empty())?;
        (Some(token) != previous).then_some(token)
    }
}

/// Result of a (possibly multi-page) call
#[derive(Debug, Clone)]
pub struct PagedResult {
    /// Single-call data, or the concatenated items of every page
    pub data: SdkValue,
    pub request_id: Option<String>,
    pub pages: usize,
    pub paginated: bool,
}

/// Whether `operation` should be drained page by page
pub fn supports_pagination(operation: &Operation, operation_name: &str) -> bool {
    let allowlisted = KNOWN_PAGINATED.contains(&operation_name);
    let Some(signature) = operation.signature() else {
        return allowlisted;
    };

    if LISTING_PREFIXES.iter().any(|p| operation_name.starts_with(p)) {
        return true;
    }
    if signature.has_param(PAGE_PARAM) || signature.has_param(LIMIT_PARAM) {
        return true;
    }
    if operation.doc().is_some_and(|doc| PAGING_DOC.is_match(doc)) {
        return true;
    }
    allowlisted
}

/// Call once, or drain every page when the operation is paginated.
///
/// A positive `limit` argument stops the drain as soon as enough items are
/// collected and truncates to exactly `limit`. An operation whose known
/// signature cannot take a `page` argument is called once.
pub fn invoke_with_pagination(
    operation: &Operation,
    args: &CallArgs,
    operation_name: &str,
    settings: &DispatchConfig,
) -> Result<PagedResult, SdkError> {
    let header = settings.request_id_header.as_str();

    if !supports_pagination(operation, operation_name) {
        let response = operation.call(args)?;
        return Ok(PagedResult {
            request_id: response.header(header).map(String::from),
            data: response.data,
            pages: 1,
            paginated: false,
        });
    }

    let limit = args
        .get(LIMIT_PARAM)
        .and_then(SdkValue::as_i64)
        .filter(|l| *l > 0)
        .map(|l| l as usize);
    let mut previous_token = args
        .get(PAGE_PARAM)
        .and_then(SdkValue::as_str)
        .map(String::from);
    let accepts_page = operation
        .signature()
        .map_or(true, |signature| signature.accepts(PAGE_PARAM));
    let mut call_args = args.clone();
    let mut items = Vec::new();
    let mut request_id = None;
    let mut pages = 0;

    loop {
        let response = operation.call(&call_args)?;
        pages += 1;

        if let Some(id) = response.header(header) {
            request_id = Some(id.to_string());
        }
        let cursor = PageCursor::from_response(&response);

        match response.data {
            SdkValue::List(page) | SdkValue::Tuple(page) => items.extend(page),
            SdkValue::Null => {}
            other => items.push(other),
        }

        if let Some(limit) = limit {
            if items.len() >= limit {
                items.truncate(limit);
                break;
            }
        }
        if settings.max_pages.is_some_and(|max| pages >= max) {
            warn!(operation = operation_name, pages, "page cap reached, result is partial");
            break;
        }

        let Some(token) = cursor.next_token(previous_token.as_deref()).map(String::from) else {
            break;
        };
        if !accepts_page {
            warn!(operation = operation_name, "more pages available but operation takes no page argument");
            break;
        }
        debug!(operation = operation_name, page = %token, "fetching next page");
        call_args.insert(PAGE_PARAM.to_string(), SdkValue::Str(token.clone()));
        previous_token = Some(token);
    }

    Ok(PagedResult {
        data: SdkValue::List(items),
        request_id,
        pages,
        paginated: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::Signature;

    fn op(name: &str) -> Operation {
        Operation::new(name, |_| Ok(SdkResponse::new(SdkValue::Null)))
    }

    #[test]
    fn test_listing_prefix_is_paginated() {
        let list = op("list_vcns").with_signature(Signature::new(["compartment_id"]));
        assert!(supports_pagination(&list, "list_vcns"));
        let summarize = op("summarize_metrics_data").with_signature(Signature::new(["x"]));
        assert!(supports_pagination(&summarize, "summarize_metrics_data"));
    }

    #[test]
    fn test_page_or_limit_param_is_paginated() {
        let fetch = op("fetch_things").with_signature(Signature::new(["limit"]));
        assert!(supports_pagination(&fetch, "fetch_things"));
        let fetch = op("fetch_things").with_signature(Signature::new(["page"]));
        assert!(supports_pagination(&fetch, "fetch_things"));
    }

    #[test]
    fn test_doc_mention_is_paginated() {
        let fetch = op("fetch_things")
            .with_signature(Signature::new(["compartment_id"]).with_kwargs())
            .with_doc(":param str page: (optional)\n    For list pagination.");
        assert!(supports_pagination(&fetch, "fetch_things"));
    }

    #[test]
    fn test_plain_get_is_not_paginated() {
        let get = op("get_vcn")
            .with_signature(Signature::new(["vcn_id"]))
            .with_doc("Gets the specified VCN's information.");
        assert!(!supports_pagination(&get, "get_vcn"));
    }

    #[test]
    fn test_uninspectable_signature_uses_allowlist_only() {
        assert!(supports_pagination(&op("search_resources"), "search_resources"));
        assert!(!supports_pagination(&op("list_vcns"), "list_vcns"));
    }

    #[test]
    fn test_cursor_termination() {
        let cursor = PageCursor {
            has_next_page: true,
            next_page_token: Some("np1".into()),
        };
        assert_eq!(cursor.next_token(None), Some("np1"));
        assert_eq!(cursor.next_token(Some("np1")), None);

        let done = PageCursor {
            has_next_page: false,
            next_page_token: Some("np2".into()),
        };
        assert_eq!(done.next_token(None), None);

        let missing = PageCursor {
            has_next_page: true,
            next_page_token: None,
        };
        assert_eq!(missing.next_token(None), None);
    }

    #[test]
    fn test_max_pages_caps_drain() {
        let endless = Operation::new("list_forever", |args| {
            let n = args.get(PAGE_PARAM).and_then(SdkValue::as_i64).unwrap_or(0);
            Ok(SdkResponse::new(SdkValue::List(vec![SdkValue::Int(n)]))
                .with_next_page(&(n + 1).to_string()))
        })
        .with_signature(Signature::new(["page"]));

        let settings = DispatchConfig {
            max_pages: Some(3),
            ..DispatchConfig::default()
        };
        let result =
            invoke_with_pagination(&endless, &CallArgs::new(), "list_forever", &settings).unwrap();
        assert_eq!(result.pages, 3);
        let SdkValue::List(items) = result.data else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_single_call_keeps_data_shape() {
        let get = Operation::new("get_vcn", |_| {
            Ok(SdkResponse::new(SdkValue::from("vcn")).with_header("opc-request-id", "r1"))
        })
        .with_signature(Signature::new(["vcn_id"]));
        let result =
            invoke_with_pagination(&get, &CallArgs::new(), "get_vcn", &DispatchConfig::default())
                .unwrap();
        assert!(!result.paginated);
        assert_eq!(result.data.as_str(), Some("vcn"));
        assert_eq!(result.request_id.as_deref(), Some("r1"));
    }

    #[test]
    fn test_listing_without_page_param_stops_after_first_page() {
        let list = Operation::new("list_things", |args| {
            let page = args.get(PAGE_PARAM).and_then(SdkValue::as_str).unwrap_or("first");
            Ok(SdkResponse::new(SdkValue::List(vec![SdkValue::from(page)])).with_next_page("np1"))
        })
        .with_signature(Signature::new(["compartment_id"]));

        let result =
            invoke_with_pagination(&list, &CallArgs::new(), "list_things", &DispatchConfig::default())
                .unwrap();
        assert!(result.paginated);
        assert_eq!(result.pages, 1);
        let SdkValue::List(items) = result.data else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_str(), Some("first"));
    }
}
