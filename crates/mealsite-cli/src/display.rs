//! Plain-text rendering of canonical sites and collected meals.

use std::fmt::Write;

use mealsite_core::{CanonicalSite, Meal, total_meals};

const MAX_LIST_ITEMS: usize = 10;
const MAX_DESCRIPTION: usize = 60;

// ── Site list ──

/// Render the canonical site list with the total meal count.
pub fn render_sites(sites: &[CanonicalSite]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<26} {:>7}  sources", "key", "name", "meals");
    for site in sites {
        let _ = writeln!(
            out,
            "{:<20} {:<26} {:>7}  {}",
            site.site_id,
            site.display_name,
            site.meal_count,
            summarize_ids(&site.constituent_site_ids)
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} sites, {} meals indexed",
        sites.len(),
        total_meals(sites)
    );
    out
}

fn summarize_ids(ids: &[String]) -> String {
    if ids.len() <= MAX_LIST_ITEMS {
        return ids.join(", ");
    }
    format!(
        "{}, ... and {} more",
        ids[..MAX_LIST_ITEMS].join(", "),
        ids.len() - MAX_LIST_ITEMS
    )
}

// ── Meals ──

/// Render a site header followed by one block per meal.
pub fn render_meals(site: &CanonicalSite, meals: &[Meal]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", site.display_name);
    if let Some(page) = &site.source_page {
        let _ = writeln!(out, "{page}");
    }
    let _ = writeln!(out, "{} meals", meals.len());
    let _ = writeln!(out);

    for meal in meals {
        let _ = writeln!(out, "  {}", meal.title);
        if let Some(category) = meal.category.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "    {:<12} {}", "category", category);
        }
        if !meal.description.is_empty() {
            let _ = writeln!(
                out,
                "    {:<12} {}",
                "description",
                shorten(&meal.description, MAX_DESCRIPTION)
            );
        }
        let _ = writeln!(out, "    {:<12} {}", "source id", meal.site_id);
    }
    out
}

/// Truncate to `max` characters, marking the cut with "...".
fn shorten(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let kept: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
