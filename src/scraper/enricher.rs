use crate::scraper::{
    Result, ScraperError,
    cache::RawDataRetriever,
    parser::{DetailOutcome, enrich_media},
    types::{Media, WatchlistCategory},
};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

impl WatchlistCategory {
    /// Enrich every entry with data from its detail page.
    ///
    /// See [`WatchlistCategory::load_extra_data_with_cancel`].
    pub async fn load_extra_data(&mut self, retriever: Arc<dyn RawDataRetriever>) -> Result<()> {
        self.load_extra_data_with_cancel(retriever, CancellationToken::new())
            .await
    }

    /// Enrich every entry concurrently, one worker task per entry.
    ///
    /// A no-op once the category has been enriched. The first fatal error
    /// (retrieval, parsing, captcha, or `cancel` firing) cancels the
    /// remaining workers and is returned once all of them have finished;
    /// the category then stays unloaded so the call can be retried.
    /// Unusable detail pages are not errors; those entries keep default
    /// detail fields.
    pub async fn load_extra_data_with_cancel(
        &mut self,
        retriever: Arc<dyn RawDataRetriever>,
        cancel: CancellationToken,
    ) -> Result<()> {
        if self.extra_data_loaded {
            debug!("Extra data already loaded, skipping");
            return Ok(());
        }

        // A child token, so that a failing worker does not cancel the caller
        let token = cancel.child_token();
        let mut workers = JoinSet::new();
        for (index, media) in self.entries.iter().enumerate() {
            workers.spawn(run_worker(
                index,
                media.without_details(),
                retriever.clone(),
                token.clone(),
            ));
        }

        let mut first_error: Option<ScraperError> = None;
        let mut unusable = 0;
        while let Some(joined) = workers.join_next().await {
            let result = joined
                .map_err(|e| ScraperError::Worker(e.to_string()))
                .and_then(|result| result);

            match result {
                Ok((index, enriched, outcome)) => {
                    if matches!(outcome, DetailOutcome::Unusable(_)) {
                        unusable += 1;
                    }
                    self.entries[index].apply_details(enriched);
                }
                Err(ScraperError::Cancelled) if first_error.is_some() => {}
                Err(e) => {
                    if first_error.is_none() {
                        warn!("Enrichment failed, cancelling remaining workers: {}", e);
                        token.cancel();
                        first_error = Some(e);
                    } else {
                        debug!("Additional enrichment failure: {}", e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        self.extra_data_loaded = true;
        info!(
            "Loaded extra data for {} entries ({} unusable)",
            self.entries.len(),
            unusable
        );
        Ok(())
    }
}

async fn run_worker(
    index: usize,
    mut media: Media,
    retriever: Arc<dyn RawDataRetriever>,
    token: CancellationToken,
) -> Result<(usize, Media, DetailOutcome)> {
    let outcome = tokio::select! {
        biased;
        () = token.cancelled() => return Err(ScraperError::Cancelled),
        outcome = enrich_entry(retriever.as_ref(), &mut media) => outcome?,
    };
    Ok((index, media, outcome))
}

async fn enrich_entry(retriever: &dyn RawDataRetriever, media: &mut Media) -> Result<DetailOutcome> {
    let page = retriever.retrieve(media).await?;
    enrich_media(media, page).await
}
