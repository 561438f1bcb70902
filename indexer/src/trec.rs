//! Reader for TREC-style article dumps:
//!
//! ```text
//! <DOC>
//!   <DOCNO>12</DOCNO>
//!   <HEADLINE>Arara</HEADLINE>
//!   <P>...</P>
//! </DOC>
//! ```

use crate::normalize::unescape_xml;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOC_RE: Regex = Regex::new(r"(?s)<DOC>(.*?)</DOC>").expect("valid regex");
    static ref DOCNO_RE: Regex = Regex::new(r"(?s)<DOCNO>(.*?)</DOCNO>").expect("valid regex");
    static ref HEADLINE_RE: Regex = Regex::new(r"(?s)<HEADLINE>(.*?)</HEADLINE>").expect("valid regex");
    static ref P_RE: Regex = Regex::new(r"(?s)<P>(.*?)</P>").expect("valid regex");
}

/// One `<DOC>` element with entities decoded; the body is still raw wiki text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrecArticle {
    pub doc_no: String,
    pub headline: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct TrecParse {
    pub articles: Vec<TrecArticle>,
    /// `<DOC>` elements skipped for lacking a `DOCNO`.
    pub skipped: usize,
}

fn capture(re: &Regex, doc: &str) -> Option<String> {
    re.captures(doc).map(|c| unescape_xml(c[1].trim()))
}

pub fn parse_trec(input: &str) -> TrecParse {
    let mut parsed = TrecParse::default();
    for doc in DOC_RE.captures_iter(input) {
        let doc = &doc[1];
        let Some(doc_no) = capture(&DOCNO_RE, doc).filter(|d| !d.is_empty()) else {
            parsed.skipped += 1;
            continue;
        };
        parsed.articles.push(TrecArticle {
            doc_no,
            headline: capture(&HEADLINE_RE, doc).unwrap_or_default(),
            text: capture(&P_RE, doc).unwrap_or_default(),
        });
    }
    parsed
}
