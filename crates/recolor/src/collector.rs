//! Order-preserving collection of stylesheet text.
//!
//! A page's CSS comes from resident text (already available) and linked
//! sheets (fetched). Fetches settle in any order; the caller still receives
//! one sequence in enumeration order: resident sources first, then linked
//! sources by their index.
//!
//! [`JoinBarrier`] is the synchronous core: it counts outstanding sources,
//! records each settlement and fires its callback exactly once when the count
//! reaches zero (immediately if there was nothing to wait for).
//! [`SourceCollector`] drives the fetches and feeds the barrier. A failed
//! fetch settles its slot with empty text.
//!
//! # Example
//!
//! ```rust
//! use recolor::{MapFetcher, SourceCollector};
//!
//! # futures::executor::block_on(async {
//! let fetcher = MapFetcher::new().with("https://a.test/site.css", "a { color: red }");
//! let texts = SourceCollector::new()
//!     .resident("b { color: blue }")
//!     .linked("https://a.test/site.css")
//!     .linked("https://a.test/missing.css")
//!     .gather_texts(&fetcher)
//!     .await;
//! assert_eq!(texts, vec!["b { color: blue }", "a { color: red }", ""]);
//! # });
//! ```

use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};

use crate::fetch::Fetch;

/// Where a source's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Text already present in the page.
    Resident,
    /// A linked sheet, by URL.
    Linked(String),
}

/// One origin of CSS text.
///
/// `order_index` is the source's position among its siblings of the same
/// origin kind, fixed at enumeration. `text` is `None` until settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetSource {
    pub order_index: usize,
    pub origin: SourceOrigin,
    pub text: Option<String>,
}

impl StylesheetSource {
    pub fn resident(order_index: usize, text: impl Into<String>) -> Self {
        Self {
            order_index,
            origin: SourceOrigin::Resident,
            text: Some(text.into()),
        }
    }

    pub fn linked(order_index: usize, url: impl Into<String>) -> Self {
        Self {
            order_index,
            origin: SourceOrigin::Linked(url.into()),
            text: None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.text.is_some()
    }

    /// The settled text, or empty.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Waits for a known number of pending sources, then delivers every source
/// in enumeration order to a callback, once.
pub struct JoinBarrier<C>
where
    C: FnOnce(Vec<StylesheetSource>),
{
    resident: Vec<StylesheetSource>,
    pending: Vec<StylesheetSource>,
    remaining: usize,
    on_ready: Option<C>,
}

impl<C> JoinBarrier<C>
where
    C: FnOnce(Vec<StylesheetSource>),
{
    /// Arms the barrier over `pending` sources. With nothing pending the
    /// callback fires before this returns.
    pub fn new(resident: Vec<StylesheetSource>, pending: Vec<StylesheetSource>, on_ready: C) -> Self {
        let remaining = pending.iter().filter(|s| !s.is_settled()).count();
        let mut barrier = Self {
            resident,
            pending,
            remaining,
            on_ready: Some(on_ready),
        };
        if barrier.remaining == 0 {
            barrier.finalize();
        }
        barrier
    }

    /// Records the text of the pending source at `index`.
    ///
    /// Settling an unknown or already settled index, or settling after the
    /// barrier fired, is ignored. Returns whether this settlement fired the
    /// callback.
    pub fn settle(&mut self, index: usize, text: String) -> bool {
        if self.is_complete() {
            tracing::debug!(index, "settlement after the barrier fired, ignoring");
            return false;
        }
        let Some(source) = self
            .pending
            .iter_mut()
            .find(|s| s.order_index == index && !s.is_settled())
        else {
            tracing::debug!(index, "unknown or repeated settlement, ignoring");
            return false;
        };
        source.text = Some(text);
        self.remaining -= 1;
        if self.remaining == 0 {
            self.finalize();
            return true;
        }
        false
    }

    /// Sources still outstanding.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// True once the callback has fired.
    pub fn is_complete(&self) -> bool {
        self.on_ready.is_none()
    }

    fn finalize(&mut self) {
        let Some(on_ready) = self.on_ready.take() else {
            return;
        };
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by_key(|s| s.order_index);
        let mut sources = std::mem::take(&mut self.resident);
        sources.extend(pending);
        on_ready(sources);
    }
}

/// Gathers a page's CSS sources for one pass.
#[derive(Debug, Clone, Default)]
pub struct SourceCollector {
    resident: Vec<String>,
    linked: Vec<String>,
}

impl SourceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds already available CSS text.
    pub fn resident(mut self, css: impl Into<String>) -> Self {
        self.resident.push(css.into());
        self
    }

    /// Adds a linked stylesheet URL to fetch.
    pub fn linked(mut self, url: impl Into<String>) -> Self {
        self.linked.push(url.into());
        self
    }

    pub fn len(&self) -> usize {
        self.resident.len() + self.linked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetches every linked source and hands all sources, in enumeration
    /// order, to `on_ready` once the last fetch settles.
    ///
    /// Indices are assigned before any fetch is issued. With no linked
    /// sources `on_ready` runs before this returns; the returned future then
    /// completes immediately.
    pub fn collect_sources<'a, F, C>(self, fetcher: &'a F, on_ready: C) -> LocalBoxFuture<'a, ()>
    where
        F: Fetch + ?Sized,
        C: FnOnce(Vec<StylesheetSource>) + 'a,
    {
        let resident = self
            .resident
            .into_iter()
            .enumerate()
            .map(|(index, text)| StylesheetSource::resident(index, text))
            .collect();
        let pending: Vec<StylesheetSource> = self
            .linked
            .iter()
            .enumerate()
            .map(|(index, url)| StylesheetSource::linked(index, url.clone()))
            .collect();
        let mut barrier = JoinBarrier::new(resident, pending, on_ready);

        let mut in_flight: FuturesUnordered<_> = self
            .linked
            .into_iter()
            .enumerate()
            .map(|(index, url)| async move {
                let result = fetcher.fetch(&url).await;
                (index, url, result)
            })
            .collect();

        async move {
            while let Some((index, url, result)) = in_flight.next().await {
                let text = match result {
                    Ok(text) => text,
                    Err(error) => {
                        tracing::warn!(%url, %error, "stylesheet unavailable, contributing empty text");
                        String::new()
                    }
                };
                barrier.settle(index, text);
            }
        }
        .boxed_local()
    }

    /// Like [`collect_sources`](Self::collect_sources), delivering only the
    /// texts.
    pub fn collect<'a, F, C>(self, fetcher: &'a F, on_ready: C) -> LocalBoxFuture<'a, ()>
    where
        F: Fetch + ?Sized,
        C: FnOnce(Vec<String>) + 'a,
    {
        self.collect_sources(fetcher, move |sources| {
            on_ready(
                sources
                    .into_iter()
                    .map(|s| s.text.unwrap_or_default())
                    .collect(),
            )
        })
    }

    /// Awaits every source, in enumeration order.
    pub async fn gather<F>(self, fetcher: &F) -> Vec<StylesheetSource>
    where
        F: Fetch + ?Sized,
    {
        let mut delivered = None;
        self.collect_sources(fetcher, |sources| delivered = Some(sources))
            .await;
        delivered.unwrap_or_default()
    }

    /// Awaits every source's text, in enumeration order.
    pub async fn gather_texts<F>(self, fetcher: &F) -> Vec<String>
    where
        F: Fetch + ?Sized,
    {
        self.gather(fetcher)
            .await
            .into_iter()
            .map(|s| s.text.unwrap_or_default())
            .collect()
    }
}
