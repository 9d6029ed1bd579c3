//! Wire types for the EuropePMC search response envelope.

use serde::Deserialize;

/// One article row kept from a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// PMID when present, otherwise the EuropePMC internal id.
    pub id: String,
    pub title: String,
    pub abstract_text: String,
}

/// One page of search results plus the cursor for the next page.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub articles: Vec<Article>,
    /// Cursor for the following page; `None` when the listing is exhausted.
    pub next_cursor: Option<String>,
    /// Total hits reported by the API for the whole query.
    pub hit_count: u64,
}

/// Raw search response envelope as returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(rename = "hitCount", default)]
    pub hit_count: u64,
    #[serde(rename = "nextCursorMark")]
    pub next_cursor_mark: Option<String>,
    #[serde(rename = "resultList", default)]
    pub result_list: ResultList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResultList {
    #[serde(default)]
    pub result: Vec<RawArticle>,
}

/// One raw result entry. Fields are optional because `resultType=lite`
/// entries and preprint records omit several of them.
#[derive(Debug, Deserialize)]
pub(crate) struct RawArticle {
    pub id: Option<String>,
    pub pmid: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstractText")]
    pub abstract_text: Option<String>,
}

impl RawArticle {
    /// Converts the raw entry to an [`Article`], preferring the PMID as the
    /// stable identifier. Entries with neither identifier are dropped by the
    /// caller.
    pub(crate) fn into_article(self) -> Option<Article> {
        let id = self.pmid.or(self.id)?;
        Some(Article {
            id,
            title: self.title.unwrap_or_default(),
            abstract_text: self.abstract_text.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_article_prefers_pmid() {
        let raw = RawArticle {
            id: Some("PPR123".to_owned()),
            pmid: Some("456".to_owned()),
            title: Some("A title".to_owned()),
            abstract_text: None,
        };
        let article = raw.into_article().unwrap();
        assert_eq!(article.id, "456");
        assert_eq!(article.abstract_text, "");
    }

    #[test]
    fn raw_article_falls_back_to_internal_id() {
        let raw = RawArticle {
            id: Some("PPR123".to_owned()),
            pmid: None,
            title: None,
            abstract_text: Some("text".to_owned()),
        };
        assert_eq!(raw.into_article().unwrap().id, "PPR123");
    }

    #[test]
    fn raw_article_without_any_id_is_dropped() {
        let raw = RawArticle {
            id: None,
            pmid: None,
            title: Some("orphan".to_owned()),
            abstract_text: None,
        };
        assert!(raw.into_article().is_none());
    }
}
