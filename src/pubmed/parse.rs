//! XML parsing for E-utilities responses
//!
//! Path-agnostic element lookup: `<Id>` anywhere in the esearch
//! document, and per-`<PubmedArticle>` extraction of the first `PMID`,
//! `ArticleTitle` and `AbstractText` in the efetch document. Inline
//! markup inside titles (`<i>`, `<sup>`, ...) is flattened to text.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::PubMedArticle;
use crate::errors::AppError;
use crate::xml::read_flat_text;

/// Extract the id list from an esearch response.
pub fn esearch_ids(xml: &str) -> Result<Vec<String>, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut ids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Id" => {
                let id = read_flat_text(&mut reader, b"Id")
                    .map_err(|e| malformed("esearch", e))?;
                if !id.is_empty() {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("esearch", e)),
            _ => {}
        }
    }
    Ok(ids)
}

/// Extract article entries from an efetch response.
pub fn efetch_articles(xml: &str) -> Result<Vec<PubMedArticle>, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut current: Option<PubMedArticle> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"PubmedArticle" => {
                    current = Some(PubMedArticle {
                        pmid: String::new(),
                        title: None,
                        abstract_text: None,
                    });
                }
                // Articles reference other PMIDs (corrections, comments);
                // only the first one identifies the article itself.
                b"PMID" => {
                    let text = read_flat_text(&mut reader, b"PMID")
                        .map_err(|e| malformed("efetch", e))?;
                    if let Some(a) = current.as_mut() {
                        if a.pmid.is_empty() {
                            a.pmid = text;
                        }
                    }
                }
                b"ArticleTitle" => {
                    let text = read_flat_text(&mut reader, b"ArticleTitle")
                        .map_err(|e| malformed("efetch", e))?;
                    if let Some(a) = current.as_mut() {
                        if a.title.is_none() {
                            a.title = Some(text);
                        }
                    }
                }
                b"AbstractText" => {
                    let text = read_flat_text(&mut reader, b"AbstractText")
                        .map_err(|e| malformed("efetch", e))?;
                    if let Some(a) = current.as_mut() {
                        if a.abstract_text.is_none() {
                            a.abstract_text = Some(text);
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"PubmedArticle" => {
                if let Some(a) = current.take() {
                    articles.push(a);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed("efetch", e)),
            _ => {}
        }
    }
    Ok(articles)
}

fn malformed(endpoint: &str, e: quick_xml::Error) -> AppError {
    AppError::FetchFailed(format!("malformed {endpoint} response: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esearch_extracts_all_ids() {
        let xml = r#"<?xml version="1.0"?>
            <eSearchResult>
                <Count>2</Count>
                <IdList>
                    <Id>111</Id>
                    <Id>222</Id>
                </IdList>
            </eSearchResult>"#;
        assert_eq!(esearch_ids(xml).unwrap(), vec!["111", "222"]);
    }

    #[test]
    fn esearch_empty_id_list() {
        let xml = "<eSearchResult><Count>0</Count><IdList></IdList></eSearchResult>";
        assert!(esearch_ids(xml).unwrap().is_empty());
    }

    #[test]
    fn esearch_rejects_malformed_xml() {
        assert!(esearch_ids("<eSearchResult><IdList></a>").is_err());
    }

    #[test]
    fn efetch_extracts_title_and_abstract() {
        let xml = r#"
            <PubmedArticleSet>
                <PubmedArticle>
                    <MedlineCitation>
                        <PMID Version="1">111</PMID>
                        <Article>
                            <ArticleTitle>Paper A</ArticleTitle>
                            <Abstract>
                                <AbstractText>First abstract.</AbstractText>
                                <AbstractText>Second part.</AbstractText>
                            </Abstract>
                        </Article>
                    </MedlineCitation>
                </PubmedArticle>
            </PubmedArticleSet>"#;
        let articles = efetch_articles(xml).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].pmid, "111");
        assert_eq!(articles[0].title.as_deref(), Some("Paper A"));
        // Structured abstracts keep only the first section, as the
        // first-match lookup did upstream.
        assert_eq!(articles[0].abstract_text.as_deref(), Some("First abstract."));
    }

    #[test]
    fn efetch_flattens_inline_markup_in_titles() {
        let xml = r#"
            <PubmedArticleSet>
                <PubmedArticle>
                    <MedlineCitation>
                        <PMID>333</PMID>
                        <Article>
                            <ArticleTitle>Role of <i>E. coli</i> in gut flora</ArticleTitle>
                        </Article>
                    </MedlineCitation>
                </PubmedArticle>
            </PubmedArticleSet>"#;
        let articles = efetch_articles(xml).unwrap();
        assert_eq!(
            articles[0].title.as_deref(),
            Some("Role of E. coli in gut flora")
        );
        assert_eq!(articles[0].abstract_text, None);
    }

    #[test]
    fn efetch_keeps_first_pmid_only() {
        let xml = r#"
            <PubmedArticleSet>
                <PubmedArticle>
                    <MedlineCitation>
                        <PMID>444</PMID>
                        <CommentsCorrectionsList>
                            <CommentsCorrections><PMID>999</PMID></CommentsCorrections>
                        </CommentsCorrectionsList>
                        <Article><ArticleTitle>T</ArticleTitle></Article>
                    </MedlineCitation>
                </PubmedArticle>
            </PubmedArticleSet>"#;
        assert_eq!(efetch_articles(xml).unwrap()[0].pmid, "444");
    }

    #[test]
    fn efetch_article_without_title() {
        let xml = r#"
            <PubmedArticleSet>
                <PubmedArticle>
                    <MedlineCitation><PMID>555</PMID></MedlineCitation>
                </PubmedArticle>
                <PubmedArticle>
                    <MedlineCitation>
                        <PMID>666</PMID>
                        <Article><ArticleTitle>Kept</ArticleTitle></Article>
                    </MedlineCitation>
                </PubmedArticle>
            </PubmedArticleSet>"#;
        let articles = efetch_articles(xml).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, None);
        assert_eq!(articles[1].title.as_deref(), Some("Kept"));
    }
}
