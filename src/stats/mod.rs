//! Statistics engine: a pure aggregation over collection records. No I/O,
//! no clock reads; every age is measured against the record's own
//! `collected_at`, so the same records always produce the same snapshot.

pub mod report;

use crate::record::{CollectionRecord, CookieRecord, SameSite, StorageKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A count plus its share of the relevant total, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountPct {
    pub count: usize,
    pub pct: f64,
}

impl CountPct {
    fn of(count: usize, total: usize) -> Self {
        let pct = if total == 0 {
            0.0
        } else {
            (count as f64 * 1000.0 / total as f64).round() / 10.0
        };
        Self { count, pct }
    }
}

/// SameSite distribution over a set of cookies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SameSiteBreakdown {
    pub none: CountPct,
    pub lax: CountPct,
    pub strict: CountPct,
    pub unspecified: CountPct,
}

impl SameSiteBreakdown {
    fn over<'a>(cookies: impl Iterator<Item = &'a CookieRecord>) -> Self {
        let mut none = 0;
        let mut lax = 0;
        let mut strict = 0;
        let mut unspecified = 0;
        let mut total = 0;
        for cookie in cookies {
            total += 1;
            match cookie.same_site {
                SameSite::None => none += 1,
                SameSite::Lax => lax += 1,
                SameSite::Strict => strict += 1,
                SameSite::Unspecified => unspecified += 1,
            }
        }
        Self {
            none: CountPct::of(none, total),
            lax: CountPct::of(lax, total),
            strict: CountPct::of(strict, total),
            unspecified: CountPct::of(unspecified, total),
        }
    }
}

/// Lifetime bucket of a cookie, measured at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeCategory {
    Session,
    Expired,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

/// Whether a cookie belongs to a different party than the visited site.
/// First-party means the two domains share a suffix relationship
/// (`example.com` on `www.example.com` and vice versa); anything else,
/// like `tracker.net` on `example.com`, is third-party.
pub fn is_third_party(cookie_domain: &str, site_domain: &str) -> bool {
    if cookie_domain.is_empty() || site_domain.is_empty() {
        return false;
    }
    !(cookie_domain == site_domain
        || site_domain.ends_with(&format!(".{cookie_domain}"))
        || cookie_domain.ends_with(&format!(".{site_domain}")))
}

/// Remaining lifetime of a cookie in fractional days at collection time.
/// `None` for session cookies; negative when already expired.
pub fn age_days(cookie: &CookieRecord, collected_at: DateTime<Utc>) -> Option<f64> {
    cookie
        .expires
        .map(|expires| (expires - collected_at).num_milliseconds() as f64 / 86_400_000.0)
}

/// Bucket a remaining lifetime. Boundaries are inclusive on the short side:
/// exactly 30 days is short-term, exactly 180 is medium-term.
pub fn categorize(age: Option<f64>) -> AgeCategory {
    match age {
        None => AgeCategory::Session,
        Some(d) if d <= 0.0 => AgeCategory::Expired,
        Some(d) if d <= 30.0 => AgeCategory::ShortTerm,
        Some(d) if d <= 180.0 => AgeCategory::MediumTerm,
        Some(_) => AgeCategory::LongTerm,
    }
}

/// Cookie counts per lifetime bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AgeCategories {
    pub session: usize,
    pub expired: usize,
    pub short_term: usize,
    pub medium_term: usize,
    pub long_term: usize,
}

/// One row of the per-domain totals table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainRow {
    pub domain: String,
    pub cookies: usize,
    pub storage_items: usize,
    pub total: usize,
}

/// SameSite distribution for one domain's cookies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainSameSite {
    pub domain: String,
    pub breakdown: SameSiteBreakdown,
}

/// Everything the statistics pass derives from a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_domains: usize,
    pub total_cookies: usize,
    pub local_storage_items: usize,
    pub session_storage_items: usize,

    pub secure_cookies: CountPct,
    pub http_only_cookies: CountPct,
    pub script_accessible_cookies: CountPct,
    /// Cookies whose domain has no suffix relationship with the visited
    /// domain.
    pub third_party_cookies: CountPct,
    pub session_cookies: CountPct,
    pub persistent_cookies: CountPct,

    pub same_site: SameSiteBreakdown,
    pub same_site_by_domain: Vec<DomainSameSite>,

    pub age_categories: AgeCategories,
    /// Mean remaining lifetime over persistent cookies, expired clamped to
    /// zero. `None` when there are no persistent cookies.
    pub avg_age_days: Option<f64>,
    pub max_age_days: Option<f64>,
    /// Cookie count per whole day of remaining lifetime (floor, clamped at
    /// zero), persistent cookies only. Sorted by day.
    pub age_histogram: Vec<(i64, usize)>,

    pub top_cookie_names: Vec<(String, usize)>,
    /// Storage keys prefixed with their area (`local:` / `session:`).
    pub top_storage_keys: Vec<(String, usize)>,

    /// Per-domain totals, busiest domain first, ties broken alphabetically.
    pub per_domain: Vec<DomainRow>,
}

/// Aggregate a set of records. Deterministic: the same records in the same
/// order always produce an identical snapshot.
pub fn compute(records: &[CollectionRecord], top_n: usize) -> StatisticsSnapshot {
    let cookies: Vec<&CookieRecord> = records.iter().flat_map(|r| &r.cookies).collect();
    let total_cookies = cookies.len();

    let local_storage_items = records
        .iter()
        .flat_map(|r| &r.storage_items)
        .filter(|i| i.kind == StorageKind::Local)
        .count();
    let session_storage_items = records
        .iter()
        .flat_map(|r| &r.storage_items)
        .filter(|i| i.kind == StorageKind::Session)
        .count();

    let secure = cookies.iter().filter(|c| c.secure).count();
    let http_only = cookies.iter().filter(|c| c.http_only).count();
    let session = cookies.iter().filter(|c| c.is_session()).count();
    let third_party = records
        .iter()
        .flat_map(|r| r.cookies.iter().map(move |c| (r, c)))
        .filter(|(r, c)| is_third_party(&c.domain, &r.domain))
        .count();

    let mut age_categories = AgeCategories::default();
    let mut clamped_ages: Vec<f64> = Vec::new();
    let mut histogram: BTreeMap<i64, usize> = BTreeMap::new();
    for record in records {
        for cookie in &record.cookies {
            let age = age_days(cookie, record.collected_at);
            match categorize(age) {
                AgeCategory::Session => age_categories.session += 1,
                AgeCategory::Expired => age_categories.expired += 1,
                AgeCategory::ShortTerm => age_categories.short_term += 1,
                AgeCategory::MediumTerm => age_categories.medium_term += 1,
                AgeCategory::LongTerm => age_categories.long_term += 1,
            }
            if let Some(days) = age {
                let clamped = days.max(0.0);
                clamped_ages.push(clamped);
                *histogram.entry(clamped.floor() as i64).or_insert(0) += 1;
            }
        }
    }

    let avg_age_days = if clamped_ages.is_empty() {
        None
    } else {
        Some(clamped_ages.iter().sum::<f64>() / clamped_ages.len() as f64)
    };
    let max_age_days = clamped_ages
        .iter()
        .copied()
        .fold(None, |max: Option<f64>, d| {
            Some(max.map_or(d, |m| m.max(d)))
        });

    let top_cookie_names = ranked(cookies.iter().map(|c| c.name.clone()), top_n);
    let top_storage_keys = ranked(
        records
            .iter()
            .flat_map(|r| &r.storage_items)
            .map(|i| format!("{}:{}", i.kind, i.key)),
        top_n,
    );

    // Several records can describe the same domain (one snapshot per run),
    // so domain-keyed tables group first.
    let mut groups: Vec<(String, Vec<&CollectionRecord>)> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    for record in records {
        match group_index.get(&record.domain) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                group_index.insert(record.domain.clone(), groups.len());
                groups.push((record.domain.clone(), vec![record]));
            }
        }
    }

    let mut per_domain: Vec<DomainRow> = groups
        .iter()
        .map(|(domain, group)| {
            let cookie_count: usize = group.iter().map(|r| r.cookies.len()).sum();
            let storage_count: usize = group.iter().map(|r| r.storage_items.len()).sum();
            DomainRow {
                domain: domain.clone(),
                cookies: cookie_count,
                storage_items: storage_count,
                total: cookie_count + storage_count,
            }
        })
        .collect();
    per_domain.sort_by(|a, b| b.total.cmp(&a.total).then(a.domain.cmp(&b.domain)));

    let mut same_site_by_domain: Vec<DomainSameSite> = groups
        .iter()
        .filter(|(_, group)| group.iter().any(|r| !r.cookies.is_empty()))
        .map(|(domain, group)| DomainSameSite {
            domain: domain.clone(),
            breakdown: SameSiteBreakdown::over(group.iter().flat_map(|r| r.cookies.iter())),
        })
        .collect();
    same_site_by_domain.sort_by(|a, b| a.domain.cmp(&b.domain));

    StatisticsSnapshot {
        total_domains: groups.len(),
        total_cookies,
        local_storage_items,
        session_storage_items,
        secure_cookies: CountPct::of(secure, total_cookies),
        http_only_cookies: CountPct::of(http_only, total_cookies),
        script_accessible_cookies: CountPct::of(total_cookies - http_only, total_cookies),
        third_party_cookies: CountPct::of(third_party, total_cookies),
        session_cookies: CountPct::of(session, total_cookies),
        persistent_cookies: CountPct::of(total_cookies - session, total_cookies),
        same_site: SameSiteBreakdown::over(cookies.into_iter()),
        same_site_by_domain,
        age_categories,
        avg_age_days,
        max_age_days,
        age_histogram: histogram.into_iter().collect(),
        top_cookie_names,
        top_storage_keys,
        per_domain,
    }
}

/// Count occurrences and keep the `top_n` most frequent. First-seen order
/// breaks ties, so the result is stable across runs.
fn ranked(values: impl Iterator<Item = String>, top_n: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values {
        match index.get(&value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_n);
    counts
}
