//! MEDLINE text format parser
//!
//! A record is a run of `TAG - value` lines terminated by a blank line:
//! - the tag occupies columns 0..4 (right-padded with spaces)
//! - columns 4..6 hold `"- "`
//! - lines starting with six spaces continue the previous value
//!
//! Field order is preserved because author blocks (`FAU`, `AU`, `AD`) are only
//! meaningful in sequence.

use crate::records::{AuthorRecord, DateSource};
use crate::score::extract_email;

/// One parsed citation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedlineRecord {
    fields: Vec<(String, String)>,
}

/// Author fields of a citation before they are attached to a PMID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthor {
    pub short_name: Option<String>,
    pub full_name: Option<String>,
    pub affiliation: Option<String>,
}

impl MedlineRecord {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First value of a tag
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a tag, in record order
    pub fn all(&self, tag: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pmid(&self) -> Option<&str> {
        self.first("PMID")
    }

    /// Publication date with its provenance
    ///
    /// Falls back to the index submission date, then to `"?"`.
    pub fn publication_date(&self) -> (String, DateSource) {
        if let Some(dp) = self.first("DP") {
            (dp.to_string(), DateSource::ExplicitPublicationDate)
        } else if let Some(edat) = self.first("EDAT") {
            (edat.to_string(), DateSource::RecordSubmissionDate)
        } else {
            ("?".to_string(), DateSource::ExplicitPublicationDate)
        }
    }

    /// Groups author fields into one entry per author
    ///
    /// `FAU` opens an author; an `AU` directly after it completes the same
    /// author, otherwise it opens a new one. `AD` lines attach to the most
    /// recent author and are joined with `"; "` when repeated.
    pub fn authors(&self) -> Vec<ParsedAuthor> {
        let mut authors: Vec<ParsedAuthor> = Vec::new();

        for (tag, value) in &self.fields {
            match tag.as_str() {
                "FAU" => authors.push(ParsedAuthor {
                    short_name: None,
                    full_name: Some(value.clone()),
                    affiliation: None,
                }),
                "AU" => match authors.last_mut() {
                    Some(last) if last.short_name.is_none() && last.affiliation.is_none() => {
                        last.short_name = Some(value.clone());
                    }
                    _ => authors.push(ParsedAuthor {
                        short_name: Some(value.clone()),
                        full_name: None,
                        affiliation: None,
                    }),
                },
                "AD" => {
                    if let Some(last) = authors.last_mut() {
                        last.affiliation = Some(match last.affiliation.take() {
                            Some(existing) => format!("{}; {}", existing, value),
                            None => value.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        authors
    }

    /// Author rows for this citation
    ///
    /// A missing short or full name is substituted by the other one, or `"?"`.
    pub fn author_records(&self, pmid: &str) -> Vec<AuthorRecord> {
        let (publication_date, _) = self.publication_date();
        self.authors()
            .into_iter()
            .map(|author| {
                let short = author
                    .short_name
                    .clone()
                    .or_else(|| author.full_name.clone())
                    .unwrap_or_else(|| "?".to_string());
                let full = author
                    .full_name
                    .or(author.short_name)
                    .unwrap_or_else(|| "?".to_string());
                let email = author.affiliation.as_deref().and_then(extract_email);
                AuthorRecord {
                    author_short_name: short,
                    author_full_name: full,
                    affiliation: author.affiliation,
                    pmid: pmid.to_string(),
                    publication_date: publication_date.clone(),
                    email,
                }
            })
            .collect()
    }
}

/// Splits a `TAG - value` line
fn split_tag(line: &str) -> Option<(&str, &str)> {
    if line.get(4..6)? != "- " {
        return None;
    }
    let tag = line.get(..4)?.trim_end();
    if tag.is_empty() {
        return None;
    }
    Some((tag, line.get(6..)?.trim_end()))
}

/// Parses every record in a MEDLINE text payload
pub fn parse_records(text: &str) -> Vec<MedlineRecord> {
    let mut records = Vec::new();
    let mut current = MedlineRecord::default();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with("      ") {
            if let Some((_, value)) = current.fields.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }

        if let Some((tag, value)) = split_tag(line) {
            current.fields.push((tag.to_string(), value.to_string()));
        }
    }

    if !current.is_empty() {
        records.push(current);
    }
    records
}
