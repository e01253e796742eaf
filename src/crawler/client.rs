//! Crawl client for the e-SAJ first-instance portal
//!
//! A crawl goes process number → internal process code → digital folder →
//! selected PDF documents. Every step depends on the previous one and runs
//! under the same session cookies. The portal reports expired sessions with
//! HTTP 200 pages, so each authenticated body goes through the sentinel
//! detector before anything is extracted from it.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_bytes, fetch_text};
use crate::crawler::folder::{DigitalFolderNode, StatusAllowList};
use crate::crawler::parser::{
    extract_basic_info, extract_folder_path, extract_process_code, extract_request_scope,
};
use crate::crawler::CrawlContext;
use crate::process::{ProcessBasicInfo, ProcessId};
use crate::session::{ensure_session, ensure_session_bytes, SessionCredentials};
use crate::{EsajError, Step};
use reqwest::Client;
use std::collections::HashMap;
use url::Url;

/// One PDF produced by a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedDocument {
    /// Title of the folder node, unique within one crawl
    pub title: String,
    pub bytes: Vec<u8>,
}

/// Client for the authenticated crawl steps
///
/// Holds no mutable state; clones share the underlying connection pool and
/// can run concurrent crawls.
#[derive(Debug, Clone)]
pub struct EsajClient {
    http: Client,
    base_url: Url,
    credentials: SessionCredentials,
    allow_list: StatusAllowList,
}

impl EsajClient {
    pub fn new(
        http: Client,
        base_url: Url,
        credentials: SessionCredentials,
        allow_list: StatusAllowList,
    ) -> Self {
        Self {
            http,
            base_url,
            credentials,
            allow_list,
        }
    }

    /// Builds the HTTP client and the client itself from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, EsajError> {
        let http = build_http_client(&config.portal)?;
        let base_url = parse_url(&config.portal.base_url)?;
        let credentials = SessionCredentials::new(
            config.session.cookie_session.clone(),
            config.session.cookie_pdf_session.clone(),
        );
        let allow_list = StatusAllowList::new(&config.crawler.allowed_statuses);
        Ok(Self::new(http, base_url, credentials, allow_list))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn allow_list(&self) -> &StatusAllowList {
        &self.allow_list
    }

    fn endpoint(&self, path: &str) -> Result<Url, EsajError> {
        self.base_url.join(path).map_err(|source| EsajError::InvalidUrl {
            url: path.to_string(),
            source,
        })
    }

    /// Puts a path and query from a response body on the configured host
    ///
    /// `Url::join` would follow a `//host/...` path to another host, and the
    /// download cookie must only ever reach the portal.
    fn same_host_url(&self, path_and_query: &str) -> Url {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(query);
        url
    }

    /// Finds the internal process code (e.g. `1H000H91J0000`) of a process
    ///
    /// # Arguments
    ///
    /// * `ctx` - Deadline and cancellation of the current crawl
    /// * `id` - Public process number
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The code used by every other portal page
    /// * `Err(EsajError::NotFound)` - The search page links no document
    /// * `Err(EsajError::SessionExpired)` - The search cookie is no longer valid
    #[tracing::instrument(skip(self, ctx), fields(process_id = %id))]
    pub async fn locate_process_code(
        &self,
        ctx: &CrawlContext,
        id: &ProcessId,
    ) -> Result<String, EsajError> {
        let step = Step::LocateProcessCode;
        let mut url = self.endpoint("/cpopg/search.do")?;
        url.query_pairs_mut()
            .append_pair("conversationId", "")
            .append_pair("cbPesquisa", "NUMPROC")
            .append_pair("numeroDigitoAnoUnificado", id.number_year())
            .append_pair("foroNumeroUnificado", id.forum_code())
            .append_pair("dadosConsulta.valorConsultaNuUnificado", id.as_str())
            .append_pair("dadosConsulta.valorConsultaNuUnificado", "UNIFICADO")
            .append_pair("dadosConsulta.valorConsulta", "")
            .append_pair("dadosConsulta.tipoNuProcesso", "UNIFICADO");

        let body = fetch_text(&self.http, ctx, step, &url, self.credentials.search()).await?;
        ensure_session(step, &body)?;

        let code = extract_process_code(&body)?;
        tracing::info!(process_code = %code, "Located process code");
        Ok(code)
    }

    /// Resolves and loads the digital folder of a process
    ///
    /// The first request answers with the folder URL as plain text. Its path
    /// is replayed against our own base URL with the download cookie, and the
    /// resulting page embeds the document tree in a script.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn open_digital_folder(
        &self,
        ctx: &CrawlContext,
        process_code: &str,
    ) -> Result<Vec<DigitalFolderNode>, EsajError> {
        let mut url = self.endpoint("/cpopg/abrirPastaDigital.do")?;
        url.query_pairs_mut()
            .append_pair("processo.codigo", process_code);

        let step = Step::OpenFolder;
        let body = fetch_text(&self.http, ctx, step, &url, self.credentials.search()).await?;
        ensure_session(step, &body)?;
        let folder_path = extract_folder_path(&body)?;
        let folder_url = self.same_host_url(&folder_path);
        tracing::debug!(url = %folder_url, "Resolved digital folder");

        let step = Step::LoadFolder;
        let page = fetch_text(
            &self.http,
            ctx,
            step,
            &folder_url,
            self.credentials.download(),
        )
        .await?;
        ensure_session(step, &page)?;

        let nodes = extract_request_scope(&page)?;
        tracing::info!(nodes = nodes.len(), "Loaded digital folder");
        Ok(nodes)
    }

    /// Downloads the PDF behind one folder node
    ///
    /// The node's `parametros` string is appended verbatim to `getPDF.do`.
    /// An expiry page is never returned as document bytes.
    #[tracing::instrument(skip(self, ctx, node), fields(title = %node.title()))]
    pub async fn download_document(
        &self,
        ctx: &CrawlContext,
        node: &DigitalFolderNode,
    ) -> Result<Vec<u8>, EsajError> {
        let step = Step::DownloadDocument;
        let cookie = self
            .credentials
            .download()
            .ok_or(EsajError::MissingCredential {
                step,
                which: "download",
            })?;
        let parameters = node
            .download_parameters()
            .ok_or_else(|| EsajError::not_found(step, "node carries no download parameters"))?;

        let mut url = self.endpoint("/pastadigital/getPDF.do")?;
        url.set_query(Some(parameters));

        let bytes = fetch_bytes(&self.http, ctx, step, &url, Some(cookie)).await?;
        ensure_session_bytes(step, &bytes)?;

        tracing::info!(bytes = bytes.len(), "Downloaded document");
        Ok(bytes)
    }

    /// Reads the header data of a process from its "show" page
    ///
    /// `url` is the link found in a listing (or built by
    /// [`fetch_basic_info_by_id`](Self::fetch_basic_info_by_id)); only its
    /// `processo.codigo` and `processo.foro` parameters are used.
    #[tracing::instrument(skip(self, ctx, url), fields(process_id = %id))]
    pub async fn fetch_basic_info(
        &self,
        ctx: &CrawlContext,
        url: &str,
        id: &ProcessId,
    ) -> Result<ProcessBasicInfo, EsajError> {
        let step = Step::FetchBasicInfo;
        let source = parse_url(url)?;
        let query: HashMap<_, _> = source.query_pairs().into_owned().collect();
        let code = query
            .get("processo.codigo")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EsajError::parse(step, format!("no processo.codigo in {}", url)))?;
        let forum = query
            .get("processo.foro")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| EsajError::parse(step, format!("no processo.foro in {}", url)))?;

        let mut show_url = self.endpoint("/cpopg/show.do")?;
        show_url
            .query_pairs_mut()
            .append_pair("processo.codigo", code)
            .append_pair("processo.foro", forum)
            .append_pair("processo.numero", id.as_str());

        let body = fetch_text(&self.http, ctx, step, &show_url, self.credentials.search()).await?;
        ensure_session(step, &body)?;
        let fields = extract_basic_info(&body)?;

        tracing::info!(forum = %fields.forum_name, "Fetched basic info");
        Ok(ProcessBasicInfo {
            oab: String::new(),
            process_id: id.to_string(),
            forum_code: forum.clone(),
            forum_name: fields.forum_name,
            process_code: code.clone(),
            judge: fields.judge,
            class: fields.class,
            claimant: fields.claimant,
            defendant: fields.defendant,
            court_section: fields.court_section,
            url: url.to_string(),
        })
    }

    /// Locates the process and reads its "show" page without a listing URL
    pub async fn fetch_basic_info_by_id(
        &self,
        ctx: &CrawlContext,
        id: &ProcessId,
    ) -> Result<ProcessBasicInfo, EsajError> {
        let code = self.locate_process_code(ctx, id).await?;

        let mut url = self.endpoint("/cpopg/show.do")?;
        url.query_pairs_mut()
            .append_pair("processo.codigo", &code)
            .append_pair("processo.foro", portal_forum_code(id.forum_code()))
            .append_pair("processo.numero", id.as_str());

        self.fetch_basic_info(ctx, url.as_str(), id).await
    }

    /// Runs a full crawl for one process
    ///
    /// Locates the process, opens its folder and downloads every document
    /// under an allowed status, in folder order. The first failure aborts
    /// the crawl and nothing is returned.
    #[tracing::instrument(skip(self, ctx), fields(process_id = %id))]
    pub async fn run(
        &self,
        ctx: &CrawlContext,
        id: &ProcessId,
    ) -> Result<Vec<DownloadedDocument>, EsajError> {
        let code = self.locate_process_code(ctx, id).await?;
        let folder = self.open_digital_folder(ctx, &code).await?;

        let selected = self.allow_list.select(&folder);
        tracing::info!(
            selected = selected.len(),
            "Selected documents under allowed statuses"
        );

        let mut titles = TitleDeduplicator::default();
        let mut documents = Vec::with_capacity(selected.len());
        for node in selected {
            let bytes = self.download_document(ctx, node).await?;
            documents.push(DownloadedDocument {
                title: titles.unique(node.title()),
                bytes,
            });
        }

        tracing::info!(documents = documents.len(), "Crawl complete");
        Ok(documents)
    }
}

fn parse_url(url: &str) -> Result<Url, EsajError> {
    Url::parse(url).map_err(|source| EsajError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}

/// Listing links carry the forum without leading zeros ("0053" → "53")
fn portal_forum_code(forum_code: &str) -> &str {
    let trimmed = forum_code.trim_start_matches('0');
    if trimmed.is_empty() {
        "0"
    } else {
        trimmed
    }
}

/// Appends " (2)", " (3)"… to repeated titles
#[derive(Debug, Default)]
struct TitleDeduplicator {
    seen: HashMap<String, usize>,
}

impl TitleDeduplicator {
    fn unique(&mut self, title: &str) -> String {
        let count = self.seen.entry(title.to_string()).or_insert(0);
        *count += 1;
        if *count == 1 {
            title.to_string()
        } else {
            format!("{} ({})", title, count)
        }
    }
}
