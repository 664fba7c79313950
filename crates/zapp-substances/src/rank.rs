//! Case-insensitive tiered ranking for substance suggestions. Prefix
//! matches on the label beat substring matches; labels beat synonyms;
//! synonyms beat external identifiers. Ties are broken by label.

use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::SubstanceRecord;

/// Match quality buckets, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    LabelPrefix,
    LabelSubstring,
    SynonymPrefix,
    SynonymSubstring,
    IdPrefix,
    IdSubstring,
}

/// CAS registry number shape: 2-7 digits, 2 digits, check digit.
pub fn is_cas_number(text: &str) -> bool {
    static CAS: OnceLock<Regex> = OnceLock::new();
    CAS.get_or_init(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").unwrap())
        .is_match(text)
}

fn field_tier(field: &str, query: &str, prefix: MatchTier, substring: MatchTier) -> Option<MatchTier> {
    let field = field.to_lowercase();
    if field.starts_with(query) {
        Some(prefix)
    } else if field.contains(query) {
        Some(substring)
    } else {
        None
    }
}

/// The best tier the record reaches for a lowercased query, or `None`
/// when nothing matches.
pub fn match_tier(record: &SubstanceRecord, query: &str) -> Option<MatchTier> {
    let mut best: Option<MatchTier> = None;
    let mut consider = |tier: Option<MatchTier>| {
        if let Some(tier) = tier {
            if best.map_or(true, |b| tier < b) {
                best = Some(tier);
            }
        }
    };

    consider(field_tier(
        &record.label,
        query,
        MatchTier::LabelPrefix,
        MatchTier::LabelSubstring,
    ));
    for synonym in &record.synonyms {
        consider(field_tier(
            synonym,
            query,
            MatchTier::SynonymPrefix,
            MatchTier::SynonymSubstring,
        ));
    }
    for id in record.identifiers() {
        consider(field_tier(id, query, MatchTier::IdPrefix, MatchTier::IdSubstring));
    }
    best
}

/// Ranked search over the catalog records. A CAS-shaped query gets no
/// special handling; identifiers simply match in the id tiers.
pub fn search<'a>(
    records: &'a [SubstanceRecord],
    query: &str,
    limit: usize,
) -> Vec<&'a SubstanceRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(MatchTier, &SubstanceRecord)> = records
        .iter()
        .filter_map(|r| match_tier(r, &query).map(|tier| (tier, r)))
        .collect();
    hits.sort_by(|(ta, ra), (tb, rb)| ta.cmp(tb).then_with(|| ra.label.cmp(&rb.label)));
    hits.into_iter().take(limit).map(|(_, r)| r).collect()
}
