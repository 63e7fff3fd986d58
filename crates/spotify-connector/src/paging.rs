//! Lazy stream over the paged episode listing
//!
//! Pages are fetched on demand: the next request is only issued once the
//! consumer has drained every episode from the previous page. Each fetch
//! goes through the [`RequestExecutor`], so it inherits retries and
//! re-authentication. The stream ends when the page just fetched is the
//! last one reported by `totalPages`, or when a page comes back empty.

use std::collections::VecDeque;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::{RequestDescriptor, RequestExecutor};
use crate::types::{Episode, EpisodeQuery, EpisodesPage};

struct PageCursor {
    next_page: u32,
    total_pages: Option<u32>,
    buffered: VecDeque<Episode>,
    finished: bool,
}

impl PageCursor {
    fn starting_at(page: u32) -> Self {
        Self {
            next_page: page,
            total_pages: None,
            buffered: VecDeque::new(),
            finished: false,
        }
    }

    /// Take in the page just fetched and decide whether another one follows.
    fn advance(&mut self, page: u32, listing: EpisodesPage) {
        self.total_pages = Some(listing.total_pages);
        self.finished = listing.episodes.is_empty()
            || self.total_pages.is_some_and(|total| page >= total);
        self.next_page = page + 1;
        self.buffered.extend(listing.episodes);
    }
}

struct EpisodePager {
    executor: RequestExecutor,
    url: String,
    query: EpisodeQuery,
    cursor: PageCursor,
}

impl EpisodePager {
    async fn next_episode(&mut self) -> Result<Option<Episode>> {
        loop {
            if let Some(episode) = self.cursor.buffered.pop_front() {
                return Ok(Some(episode));
            }
            if self.cursor.finished {
                return Ok(None);
            }
            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let page = self.cursor.next_page;
        let request =
            RequestDescriptor::new(self.url.as_str()).params(self.query.params_for_page(page));

        let payload = self.executor.execute(&request).await?;
        let listing: EpisodesPage = serde_json::from_value(payload)
            .map_err(|e| Error::Decode(format!("episode page {page}: {e}")))?;

        debug!(
            page,
            total_pages = listing.total_pages,
            episodes = listing.episodes.len(),
            "fetched episode page"
        );

        self.cursor.advance(page, listing);
        Ok(())
    }
}

/// Stream of episodes starting at `query.page`. Each call starts a fresh
/// cursor; the stream stops after the first error.
pub fn episode_stream(
    executor: RequestExecutor,
    url: String,
    query: EpisodeQuery,
) -> BoxStream<'static, Result<Episode>> {
    let pager = EpisodePager {
        executor,
        url,
        cursor: PageCursor::starting_at(query.page),
        query,
    };

    stream::try_unfold(pager, |mut pager| async move {
        let next = pager.next_episode().await?;
        Ok(next.map(|episode| (episode, pager)))
    })
    .boxed()
}
