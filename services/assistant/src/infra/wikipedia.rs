use serde::Deserialize;
use std::collections::HashMap;
use url::Url;

use crate::domain::collaborators::{CollaboratorError, Encyclopedia, SummaryLookup};

/// Wikipedia lookup: search for the best title, fetch its REST summary and
/// list links when the page is a disambiguation page.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    pub client: reqwest::Client,
    /// Subdomain language code, e.g. `es`.
    pub language: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct PageSummary {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    extract: String,
}

#[derive(Deserialize)]
struct LinksResponse {
    query: LinksQuery,
}

#[derive(Deserialize)]
struct LinksQuery {
    pages: HashMap<String, LinksPage>,
}

#[derive(Deserialize)]
struct LinksPage {
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Deserialize)]
struct PageLink {
    title: String,
}

/// Leading `n` sentences of `text`, ending at `.`, `!` or `?` followed by
/// whitespace or the end of the text.
pub fn first_sentences(text: &str, n: usize) -> String {
    let mut count = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            count += 1;
            if count == n {
                return text[..i + c.len_utf8()].trim().to_owned();
            }
        }
    }
    text.trim().to_owned()
}

impl WikipediaClient {
    fn base(&self) -> String {
        format!("https://{}.wikipedia.org", self.language)
    }

    fn api_url(&self, params: &[(&str, &str)]) -> Result<Url, CollaboratorError> {
        Url::parse_with_params(&format!("{}/w/api.php", self.base()), params)
            .map_err(CollaboratorError::failed)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, CollaboratorError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(CollaboratorError::failed)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(CollaboratorError::failed)?;
        response.json().await.map(Some).map_err(CollaboratorError::failed)
    }

    async fn best_title(&self, query: &str) -> Result<Option<String>, CollaboratorError> {
        let url = self.api_url(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", "1"),
            ("format", "json"),
        ])?;
        let found: Option<SearchResponse> = self.get_json(url).await?;
        Ok(found.and_then(|r| r.query.search.into_iter().next().map(|hit| hit.title)))
    }

    async fn page_summary(&self, title: &str) -> Result<Option<PageSummary>, CollaboratorError> {
        let mut url = Url::parse(&format!("{}/api/rest_v1/page/summary/", self.base()))
            .map_err(CollaboratorError::failed)?;
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::Failed("summary URL cannot take a path".into()))?
            .pop_if_empty()
            .push(&title.replace(' ', "_"));
        self.get_json(url).await
    }

    async fn page_links(&self, title: &str) -> Result<Vec<String>, CollaboratorError> {
        let url = self.api_url(&[
            ("action", "query"),
            ("prop", "links"),
            ("titles", title),
            ("plnamespace", "0"),
            ("pllimit", "20"),
            ("format", "json"),
        ])?;
        let found: Option<LinksResponse> = self.get_json(url).await?;
        Ok(found
            .map(|r| {
                r.query
                    .pages
                    .into_values()
                    .flat_map(|page| page.links)
                    .map(|link| link.title)
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Encyclopedia for WikipediaClient {
    async fn summary(
        &self,
        query: &str,
        sentences: usize,
    ) -> Result<SummaryLookup, CollaboratorError> {
        let Some(title) = self.best_title(query).await? else {
            return Ok(SummaryLookup::NotFound);
        };
        let Some(page) = self.page_summary(&title).await? else {
            return Ok(SummaryLookup::NotFound);
        };
        if page.kind == "disambiguation" {
            let options = self.page_links(&title).await?;
            return Ok(SummaryLookup::Disambiguation(options));
        }
        if page.extract.trim().is_empty() {
            return Ok(SummaryLookup::NotFound);
        }
        Ok(SummaryLookup::Summary(first_sentences(&page.extract, sentences)))
    }
}
