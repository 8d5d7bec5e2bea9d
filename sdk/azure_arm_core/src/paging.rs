//! Lazy pagination over list operations.
//!
//! ARM list operations return results one page at a time, each page
//! carrying a `nextLink` continuation URL while more results exist.
//! [`Pager`] walks those pages on demand: nothing is fetched until the
//! caller asks for a page, continuation links are followed verbatim,
//! and each link is requested exactly once. A pager that has run out
//! of pages, or that has surfaced an error, stays exhausted.

use crate::error::{ArmError, ArmResult};
use futures::future::BoxFuture;
use futures::stream::{self, Stream, TryStreamExt};
use serde::Deserialize;

/// A single page of results from a list operation.
pub trait Page {
    /// The element type carried in the page.
    type Item;

    /// Consume the page, yielding its items in service order.
    fn into_items(self) -> Vec<Self::Item>;

    /// The continuation link for the next page, if the service
    /// advertised one.
    fn next_link(&self) -> Option<&str>;
}

/// The standard ARM list envelope: a `value` array plus an optional
/// `nextLink`.
///
/// Most list operations can use this directly; operations with a
/// non-standard envelope implement [`Page`] on their own response type.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemList<T> {
    /// The items on this page.
    #[serde(default)]
    pub value: Vec<T>,
    /// Continuation link to the next page, absent on the last page.
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

impl<T> Page for ItemList<T> {
    type Item = T;

    fn into_items(self) -> Vec<T> {
        self.value
    }

    fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref()
    }
}

type PageFetcher<P> = Box<dyn FnMut(Option<String>) -> BoxFuture<'static, ArmResult<P>> + Send>;

enum PagerState {
    Start,
    Next(String),
    Exhausted,
}

/// A lazy, pull-based iterator over the pages of a list operation.
///
/// Constructing a pager performs no I/O. Each call to
/// [`next_page`](Self::next_page) fetches exactly one page; the
/// continuation link from that page decides whether another call will
/// fetch again. After the last page, an error, or an empty page with no
/// link, the pager is exhausted for good.
pub struct Pager<P> {
    fetch: PageFetcher<P>,
    state: PagerState,
}

impl<P: Page> Pager<P> {
    /// Create a pager over a fetch function.
    ///
    /// `fetch` receives the continuation link of the previous page
    /// (`None` for the first call) and returns the next page. The
    /// function is not called until the first
    /// [`next_page`](Self::next_page).
    pub fn new<F>(fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> BoxFuture<'static, ArmResult<P>> + Send + 'static,
    {
        Self {
            fetch: Box::new(fetch),
            state: PagerState::Start,
        }
    }

    /// Fetch the next page, or `None` once the pager is exhausted.
    ///
    /// An `Err` page exhausts the pager: the error is yielded once and
    /// every later call returns `None`. Partial results consumed before
    /// the error remain valid.
    pub async fn next_page(&mut self) -> Option<ArmResult<P>> {
        let cursor = match &self.state {
            PagerState::Start => None,
            PagerState::Next(link) => Some(link.clone()),
            PagerState::Exhausted => return None,
        };

        match (self.fetch)(cursor).await {
            Ok(page) => {
                self.state = match page.next_link() {
                    Some(link) => PagerState::Next(link.to_string()),
                    None => PagerState::Exhausted,
                };
                Some(Ok(page))
            }
            Err(e) => {
                self.state = PagerState::Exhausted;
                Some(Err(e))
            }
        }
    }

    /// Convert into a [`Stream`] of pages.
    pub fn into_stream(self) -> impl Stream<Item = ArmResult<P>> + Send
    where
        P: Send + 'static,
    {
        stream::unfold(self, |mut pager| async move {
            pager.next_page().await.map(|item| (item, pager))
        })
    }

    /// Convert into a [`Stream`] of individual items, flattening pages
    /// in service order. Page boundaries disappear; a fetch error ends
    /// the stream after it is yielded.
    pub fn into_items(self) -> impl Stream<Item = ArmResult<P::Item>> + Send
    where
        P: Send + 'static,
        P::Item: Send + 'static,
    {
        self.into_stream()
            .map_ok(|page| stream::iter(page.into_items().into_iter().map(Ok::<_, ArmError>)))
            .try_flatten()
    }
}
