//! HTML extraction for the portal's pages
//!
//! Every selector and pattern the crawl depends on lives behind one function
//! here. When the portal changes its markup, the failure surfaces as a
//! `NotFound` or `Parse` error from exactly one of these functions and the
//! step that called it.

use crate::crawler::folder::DigitalFolderNode;
use crate::process::ProcessSeed;
use crate::{EsajError, Step};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Href fragment of the anchors that link a movement document to its process
pub const LINKED_DOCUMENT_HREF: &str = "abrirDocumentoVinculadoMovimentacao.do";

static PROCESS_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"processo\.codigo=(\w+)").expect("process code regex"));

static REQUEST_SCOPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var\s+requestScope\s*=\s*").expect("requestScope regex"));

/// Fields read from a process "show" page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicInfoFields {
    pub class: String,
    pub forum_name: String,
    pub court_section: String,
    pub judge: String,
    pub claimant: String,
    pub defendant: String,
}

fn selector(step: Step, css: &str) -> Result<Selector, EsajError> {
    Selector::parse(css)
        .map_err(|e| EsajError::parse(step, format!("invalid selector '{}': {:?}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Collapses whitespace runs into one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes every whitespace character
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Finds the internal process code on a search result page
///
/// Looks for the first anchor linking a movement document and reads its
/// `processo.codigo` query parameter.
///
/// # Example
///
/// ```
/// use esaj_crawler::crawler::extract_process_code;
///
/// let html = r#"<table><tr><td>
///   <a class="linkMovVincProc" href="abrirDocumentoVinculadoMovimentacao.do?processo.codigo=1H000QWJM0000">Doc</a>
/// </td></tr></table>"#;
/// assert_eq!(extract_process_code(html).unwrap(), "1H000QWJM0000");
/// ```
pub fn extract_process_code(html: &str) -> Result<String, EsajError> {
    let step = Step::LocateProcessCode;
    let document = Html::parse_document(html);
    let anchors = selector(step, "a[href]")?;

    let href = document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.contains(LINKED_DOCUMENT_HREF))
        .ok_or_else(|| EsajError::not_found(step, "no linked movement document anchor"))?;

    PROCESS_CODE_RE
        .captures(href)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| EsajError::not_found(step, format!("no processo.codigo in '{}'", href)))
}

/// Reads the digital folder location out of the `abrirPastaDigital.do` body
///
/// The portal answers with a page whose whole text is the next URL, usually
/// broken across lines. Returns the path and query, to be resolved against
/// the configured base URL.
pub fn extract_folder_path(body: &str) -> Result<String, EsajError> {
    let step = Step::OpenFolder;
    let document = Html::parse_document(body);
    let body_selector = selector(step, "body")?;

    let text = document
        .select(&body_selector)
        .next()
        .map(|b| b.text().collect::<String>())
        .unwrap_or_default();
    let link = strip_whitespace(&text);

    if link.is_empty() {
        return Err(EsajError::not_found(step, "empty folder link"));
    }

    // Scheme-relative links name a host; only their path is kept, like
    // absolute ones.
    let absolute = if link.starts_with("//") {
        format!("https:{}", link)
    } else if link.starts_with('/') {
        return Ok(link);
    } else {
        link
    };

    match Url::parse(&absolute) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            let mut path = url.path().to_string();
            if let Some(query) = url.query() {
                path.push('?');
                path.push_str(query);
            }
            Ok(path)
        }
        _ => Err(EsajError::not_found(
            step,
            format!("folder link is not a URL: '{}'", absolute),
        )),
    }
}

/// Decodes the folder tree embedded behind `var requestScope = ` in a script
pub fn extract_request_scope(html: &str) -> Result<Vec<DigitalFolderNode>, EsajError> {
    let step = Step::LoadFolder;
    let document = Html::parse_document(html);
    let scripts = selector(step, "script")?;

    let mut saw_script = false;
    for script in document.select(&scripts) {
        saw_script = true;
        let content = script.text().collect::<String>();
        let Some(prefix) = REQUEST_SCOPE_RE.find(&content) else {
            continue;
        };

        // Reads exactly one JSON value; whatever follows the literal is ignored.
        let mut values = serde_json::Deserializer::from_str(&content[prefix.end()..])
            .into_iter::<Vec<DigitalFolderNode>>();
        return match values.next() {
            Some(Ok(nodes)) => Ok(nodes),
            Some(Err(e)) => Err(EsajError::parse(
                step,
                format!("undecodable requestScope: {}", e),
            )),
            None => Err(EsajError::parse(step, "empty requestScope")),
        };
    }

    if saw_script {
        Err(EsajError::parse(step, "no requestScope in any script"))
    } else {
        Err(EsajError::parse(step, "no script tag found"))
    }
}

/// Extracts the header fields of a process "show" page
///
/// Every real process has a claimant and a defendant, so fewer than two
/// party cells means the page is not what we expected.
pub fn extract_basic_info(html: &str) -> Result<BasicInfoFields, EsajError> {
    let step = Step::FetchBasicInfo;
    let document = Html::parse_document(html);

    let first_text = |css: &str| -> Result<String, EsajError> {
        let sel = selector(step, css)?;
        Ok(document
            .select(&sel)
            .next()
            .map(element_text)
            .unwrap_or_default())
    };

    let class = first_text("#classeProcesso")?;
    let forum_name = first_text("#foroProcesso")?;
    let court_section = first_text("#varaProcesso")?;
    let judge = first_text("#juizProcesso")?;

    let party_selector = selector(step, "td.nomeParteEAdvogado")?;
    let mut parties = document.select(&party_selector).map(element_text);

    let (Some(claimant), Some(defendant)) = (parties.next(), parties.next()) else {
        return Err(EsajError::parse(step, "fewer than two party cells"));
    };

    Ok(BasicInfoFields {
        class,
        forum_name,
        court_section,
        judge,
        claimant,
        defendant,
    })
}

/// Reads the page number shown on the last pagination anchor
///
/// Returns `None` when the control is absent or blank, which is how the
/// portal renders single-page result sets.
pub fn extract_penultimate_page(html: &str) -> Result<Option<u32>, EsajError> {
    let step = Step::Enumerate;
    let document = Html::parse_document(html);
    let pagination = selector(step, "a.paginacao")?;

    let text = document
        .select(&pagination)
        .last()
        .map(|a| strip_whitespace(&a.text().collect::<String>()))
        .unwrap_or_default();

    if text.is_empty() {
        return Ok(None);
    }

    text.parse::<u32>()
        .map(Some)
        .map_err(|e| EsajError::parse(step, format!("pagination value '{}': {}", text, e)))
}

/// Turns every process anchor of a listing page into a seed, in row order
///
/// A row without text or with an unusable href is logged and skipped; the
/// rest of the page is still good.
pub fn extract_seeds(html: &str, base_url: &Url, oab: &str) -> Result<Vec<ProcessSeed>, EsajError> {
    let document = Html::parse_document(html);
    let links = selector(Step::Enumerate, "a.linkProcesso")?;

    Ok(document
        .select(&links)
        .filter_map(|anchor| {
            let process_id = strip_whitespace(&anchor.text().collect::<String>());
            if process_id.is_empty() {
                tracing::warn!(oab, "Skipping process anchor without text");
                return None;
            }

            let Some(href) = anchor.value().attr("href") else {
                tracing::warn!(oab, %process_id, "Skipping process anchor without href");
                return None;
            };
            let url = match base_url.join(href.trim()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(
                        oab,
                        %process_id,
                        href,
                        error = %e,
                        "Skipping unresolvable process href"
                    );
                    return None;
                }
            };

            Some(ProcessSeed {
                process_id,
                oab: oab.to_string(),
                url: url.to_string(),
            })
        })
        .collect())
}
