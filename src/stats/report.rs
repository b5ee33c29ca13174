//! Plain-text rendering of a statistics snapshot for the terminal.

use super::{CountPct, SameSiteBreakdown, StatisticsSnapshot};
use std::fmt::Write;

const HISTOGRAM_WIDTH: usize = 40;

/// Render a snapshot as the human-readable report printed by `crumb stats`.
pub fn render(snapshot: &StatisticsSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Browser Storage Statistics ===");
    let _ = writeln!(out, "Total domains analyzed: {}", snapshot.total_domains);
    let _ = writeln!(out);

    let _ = writeln!(out, "--- Cookie Statistics ---");
    let _ = writeln!(out, "Total cookies found: {}", snapshot.total_cookies);
    if snapshot.total_cookies > 0 {
        let _ = writeln!(out, "Secure cookies: {}", flag(&snapshot.secure_cookies));
        let _ = writeln!(out, "HttpOnly cookies: {}", flag(&snapshot.http_only_cookies));
        let _ = writeln!(
            out,
            "Third-party cookies: {}",
            flag(&snapshot.third_party_cookies)
        );
        let _ = writeln!(
            out,
            "Script-accessible cookies: {}",
            flag(&snapshot.script_accessible_cookies)
        );

        let _ = writeln!(out, "\n--- SameSite Cookie Statistics ---");
        write_breakdown(&mut out, &snapshot.same_site, "");
        if !snapshot.same_site_by_domain.is_empty() {
            let _ = writeln!(out, "\nSameSite Statistics by Domain:");
            for entry in &snapshot.same_site_by_domain {
                let _ = writeln!(out, "\n  {}:", entry.domain);
                write_breakdown(&mut out, &entry.breakdown, "    ");
            }
        }

        let _ = writeln!(out, "\n--- Cookie Age Statistics ---");
        let _ = writeln!(out, "Session cookies: {}", flag(&snapshot.session_cookies));
        let _ = writeln!(
            out,
            "Persistent cookies: {}",
            flag(&snapshot.persistent_cookies)
        );
        if let (Some(avg), Some(max)) = (snapshot.avg_age_days, snapshot.max_age_days) {
            let _ = writeln!(out, "Average age of persistent cookies: {avg:.1} days");
            let _ = writeln!(out, "Maximum age of persistent cookies: {max:.1} days");
        }

        let _ = writeln!(out, "\nCookie age categories:");
        let total = snapshot.total_cookies;
        for (label, count) in [
            ("Session", snapshot.age_categories.session),
            ("Expired", snapshot.age_categories.expired),
            ("Short term", snapshot.age_categories.short_term),
            ("Medium term", snapshot.age_categories.medium_term),
            ("Long term", snapshot.age_categories.long_term),
        ] {
            if count > 0 {
                let _ = writeln!(out, "  {label}: {}", flag(&CountPct::of(count, total)));
            }
        }

        if snapshot.age_histogram.len() > 1 {
            let _ = writeln!(out, "\nCookie Age Distribution (days):");
            write_histogram(&mut out, &snapshot.age_histogram);
        }

        let _ = writeln!(
            out,
            "\nTop {} most common cookie names:",
            snapshot.top_cookie_names.len()
        );
        for (name, count) in &snapshot.top_cookie_names {
            let _ = writeln!(out, "  {name}: {count}");
        }
    } else {
        let _ = writeln!(out, "No cookies found");
    }

    if snapshot.local_storage_items + snapshot.session_storage_items > 0 {
        let _ = writeln!(out, "\n--- Web Storage Statistics ---");
        let _ = writeln!(
            out,
            "Total localStorage items: {}",
            snapshot.local_storage_items
        );
        let _ = writeln!(
            out,
            "Total sessionStorage items: {}",
            snapshot.session_storage_items
        );
        let _ = writeln!(
            out,
            "\nTop {} most common storage keys:",
            snapshot.top_storage_keys.len()
        );
        for (key, count) in &snapshot.top_storage_keys {
            let _ = writeln!(out, "  {key}: {count}");
        }
    } else {
        let _ = writeln!(out, "\nNo Web Storage items found");
    }

    let _ = writeln!(out, "\n--- Per-Domain Statistics ---");
    write_domain_table(&mut out, snapshot);

    out
}

fn flag(value: &CountPct) -> String {
    format!("{} ({:.1}% of total)", value.count, value.pct)
}

fn write_breakdown(out: &mut String, breakdown: &SameSiteBreakdown, indent: &str) {
    for (label, value) in [
        ("None", breakdown.none),
        ("Lax", breakdown.lax),
        ("Strict", breakdown.strict),
        ("Unspecified", breakdown.unspecified),
    ] {
        if value.count > 0 {
            let _ = writeln!(out, "{indent}{label}: {}", flag(&value));
        }
    }
}

/// Bars scaled to the busiest bucket. With many distinct day values the
/// buckets collapse into coarse calendar ranges; otherwise one row per day.
fn write_histogram(out: &mut String, histogram: &[(i64, usize)]) {
    let max_count = histogram.iter().map(|&(_, c)| c).max().unwrap_or(1);
    let scale = HISTOGRAM_WIDTH.min(max_count);

    if histogram.len() > 10 {
        let ranges: [(i64, i64, &str); 7] = [
            (0, 1, "<1 day"),
            (1, 7, "1-7 days"),
            (7, 30, "7-30 days"),
            (30, 90, "1-3 months"),
            (90, 180, "3-6 months"),
            (180, 365, "6-12 months"),
            (365, i64::MAX, ">1 year"),
        ];
        for (lo, hi, label) in ranges {
            let count: usize = histogram
                .iter()
                .filter(|&&(day, _)| day >= lo && day < hi)
                .map(|&(_, c)| c)
                .sum();
            if count > 0 {
                let bar = "█".repeat(count * scale / max_count);
                let _ = writeln!(out, "  {label:10} | {bar} {count}");
            }
        }
    } else {
        for &(day, count) in histogram {
            let bar = "█".repeat(count * scale / max_count);
            let _ = writeln!(out, "  {day:10} | {bar} {count}");
        }
    }
}

fn write_domain_table(out: &mut String, snapshot: &StatisticsSnapshot) {
    let domain_width = snapshot
        .per_domain
        .iter()
        .map(|row| row.domain.len())
        .chain(std::iter::once("Domain".len()))
        .max()
        .unwrap_or(6);

    let _ = writeln!(
        out,
        "{:<domain_width$}  {:>8}  {:>14}  {:>12}",
        "Domain", "Cookies", "Storage Items", "Total Items"
    );
    let _ = writeln!(
        out,
        "{}  {}  {}  {}",
        "-".repeat(domain_width),
        "-".repeat(8),
        "-".repeat(14),
        "-".repeat(12)
    );
    for row in &snapshot.per_domain {
        let _ = writeln!(
            out,
            "{:<domain_width$}  {:>8}  {:>14}  {:>12}",
            row.domain, row.cookies, row.storage_items, row.total
        );
    }
}
