//! OAB listing enumeration
//!
//! The public search by attorney registration (OAB) is paginated and does not
//! say how many pages exist. Asking for an absurdly high page number makes the
//! portal render its last real page, whose pagination control shows the
//! number of the page before it.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_text};
use crate::crawler::parser::{extract_penultimate_page, extract_seeds};
use crate::crawler::CrawlContext;
use crate::process::ProcessSeed;
use crate::{EsajError, Step};
use reqwest::Client;
use url::Url;

/// Page number past any real listing
const OVERFLOW_PAGE: u32 = 1_000_000_000;

/// Walks every page of the OAB search listing
///
/// The listing needs no session, so the enumerator carries no credentials.
#[derive(Debug, Clone)]
pub struct OabEnumerator {
    http: Client,
    base_url: Url,
}

impl OabEnumerator {
    pub fn new(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn from_config(config: &Config) -> Result<Self, EsajError> {
        let http = build_http_client(&config.portal)?;
        let base_url =
            Url::parse(&config.portal.base_url).map_err(|source| EsajError::InvalidUrl {
                url: config.portal.base_url.clone(),
                source,
            })?;
        Ok(Self::new(http, base_url))
    }

    fn page_url(&self, page: u32, oab: &str, with_conversation: bool) -> Result<Url, EsajError> {
        let mut url = self
            .base_url
            .join("/cpopg/trocarPagina.do")
            .map_err(|source| EsajError::InvalidUrl {
                url: "/cpopg/trocarPagina.do".to_string(),
                source,
            })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("paginaConsulta", &page.to_string());
            if with_conversation {
                query.append_pair("conversationId", "");
            }
            query
                .append_pair("cbPesquisa", "NUMOAB")
                .append_pair("dadosConsulta.valorConsulta", oab)
                .append_pair("cdForo", "-1");
        }

        Ok(url)
    }

    /// Number of listing pages for `oab`
    ///
    /// A blank or missing pagination control means everything fits on one
    /// page.
    pub async fn page_count(&self, ctx: &CrawlContext, oab: &str) -> Result<u32, EsajError> {
        let url = self.page_url(OVERFLOW_PAGE, oab, true)?;
        let body = fetch_text(&self.http, ctx, Step::Enumerate, &url, None).await?;

        Ok(match extract_penultimate_page(&body)? {
            // The control on the last page shows the page before it.
            Some(penultimate) => penultimate.saturating_add(1),
            None => 1,
        })
    }

    /// Collects the seeds of every listing page, in page-then-row order
    ///
    /// # Arguments
    ///
    /// * `ctx` - Deadline and cancellation of the enumeration
    /// * `oab` - Attorney registration number, e.g. `"103289"`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ProcessSeed>)` - All seeds; an empty listing is valid
    /// * `Err(EsajError)` - The first page that failed, aborting the walk
    #[tracing::instrument(skip(self, ctx))]
    pub async fn search_by_oab(
        &self,
        ctx: &CrawlContext,
        oab: &str,
    ) -> Result<Vec<ProcessSeed>, EsajError> {
        let last_page = self.page_count(ctx, oab).await?;
        tracing::info!(pages = last_page, "Enumerating OAB listing");

        let mut seeds = Vec::new();
        for page in 1..=last_page {
            let url = self.page_url(page, oab, false)?;
            let body = fetch_text(&self.http, ctx, Step::Enumerate, &url, None).await?;
            let page_seeds = extract_seeds(&body, &self.base_url, oab)?;

            tracing::info!(page, seeds = page_seeds.len(), "Listing page parsed");
            seeds.extend(page_seeds);
        }

        tracing::info!(seeds = seeds.len(), "Enumeration complete");
        Ok(seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_urls() {
        let enumerator = OabEnumerator::new(
            Client::new(),
            Url::parse("https://esaj.tjsp.jus.br").unwrap(),
        );

        let overflow = enumerator.page_url(OVERFLOW_PAGE, "103289", true).unwrap();
        assert_eq!(
            overflow.as_str(),
            "https://esaj.tjsp.jus.br/cpopg/trocarPagina.do?paginaConsulta=1000000000&conversationId=&cbPesquisa=NUMOAB&dadosConsulta.valorConsulta=103289&cdForo=-1"
        );

        let page = enumerator.page_url(3, "103289", false).unwrap();
        assert_eq!(
            page.as_str(),
            "https://esaj.tjsp.jus.br/cpopg/trocarPagina.do?paginaConsulta=3&cbPesquisa=NUMOAB&dadosConsulta.valorConsulta=103289&cdForo=-1"
        );
    }
}
