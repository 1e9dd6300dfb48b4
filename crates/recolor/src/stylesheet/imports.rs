//! `@import` resolution.
//!
//! Imports are resolved before filtering: each top-level [`RuleNode::Import`]
//! is fetched, parsed and attached so the walker can splice it in. An import
//! that cannot be resolved stays `sheet: None` and contributes nothing.

use futures::future::{FutureExt, LocalBoxFuture};
use url::Url;

use crate::fetch::Fetch;

use super::{parse_stylesheet, RuleNode, Stylesheet};

/// Longest chain of nested imports that is followed.
pub const MAX_IMPORT_DEPTH: usize = 8;

/// Fetches and attaches every top-level `@import` of `sheet`, recursively.
///
/// Hrefs are resolved against `base_url`, and nested imports against their
/// own sheet's URL. Fetch failures, unresolvable hrefs, import cycles and
/// chains beyond [`MAX_IMPORT_DEPTH`] leave the import unresolved.
pub async fn resolve_imports<F>(sheet: &mut Stylesheet, fetcher: &F, base_url: &str)
where
    F: Fetch + ?Sized,
{
    let mut chain = vec![base_url.to_string()];
    resolve_level(sheet, fetcher, base_url, &mut chain).await;
}

fn resolve_level<'a, F>(
    sheet: &'a mut Stylesheet,
    fetcher: &'a F,
    base_url: &'a str,
    chain: &'a mut Vec<String>,
) -> LocalBoxFuture<'a, ()>
where
    F: Fetch + ?Sized,
{
    async move {
        for rule in sheet.rules.iter_mut() {
            let RuleNode::Import {
                href,
                sheet: imported,
                ..
            } = rule
            else {
                continue;
            };

            let Some(url) = resolve_href(base_url, href) else {
                tracing::debug!(%href, %base_url, "cannot resolve import href");
                continue;
            };
            if chain.contains(&url) {
                tracing::debug!(%url, "import cycle, leaving import unresolved");
                continue;
            }
            if chain.len() > MAX_IMPORT_DEPTH {
                tracing::debug!(%url, depth = chain.len(), "import chain too deep");
                continue;
            }

            let text = match fetcher.fetch(&url).await {
                Ok(text) => text,
                Err(error) => {
                    tracing::warn!(%url, %error, "imported stylesheet unavailable");
                    continue;
                }
            };

            let mut child = parse_stylesheet(&text);
            chain.push(url.clone());
            resolve_level(&mut child, fetcher, &url, chain).await;
            chain.pop();
            *imported = Some(child);
        }
    }
    .boxed_local()
}

/// Resolves `href` against `base`. Absolute hrefs stand on their own.
pub(crate) fn resolve_href(base: &str, href: &str) -> Option<String> {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .or_else(|_| Url::parse(href))
        .ok()
        .map(String::from)
}
