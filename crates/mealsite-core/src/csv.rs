//! CSV export of collected meals.
//!
//! Every value is quoted, embedded quotes are doubled, and rows are joined by
//! `\n` with no trailing newline, so the same meals always produce the same
//! bytes.

use std::fmt;
use std::io::{self, Write};

use crate::model::Meal;

/// A meal column that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealField {
    Id,
    Title,
    Description,
    Category,
    SourcePage,
    SiteName,
    SiteId,
}

/// Columns exported when the caller does not choose any.
pub const DEFAULT_FIELDS: &[MealField] = &[
    MealField::Title,
    MealField::Description,
    MealField::Category,
    MealField::SourcePage,
    MealField::SiteName,
    MealField::SiteId,
];

impl MealField {
    /// Header name of the column.
    pub fn name(self) -> &'static str {
        match self {
            MealField::Id => "id",
            MealField::Title => "title",
            MealField::Description => "description",
            MealField::Category => "category",
            MealField::SourcePage => "sourcePage",
            MealField::SiteName => "siteName",
            MealField::SiteId => "siteId",
        }
    }

    /// Parse a column name, ignoring case, `_` and `-`.
    pub fn parse(s: &str) -> Option<Self> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.trim() {
            "id" => Some(MealField::Id),
            "title" => Some(MealField::Title),
            "description" => Some(MealField::Description),
            "category" => Some(MealField::Category),
            "sourcepage" => Some(MealField::SourcePage),
            "sitename" => Some(MealField::SiteName),
            "siteid" => Some(MealField::SiteId),
            _ => None,
        }
    }

    fn value(self, meal: &Meal) -> &str {
        match self {
            MealField::Id => meal.id.as_deref().unwrap_or_default(),
            MealField::Title => &meal.title,
            MealField::Description => &meal.description,
            MealField::Category => meal.category.as_deref().unwrap_or_default(),
            MealField::SourcePage => meal.source_page.as_deref().unwrap_or_default(),
            MealField::SiteName => &meal.site_name,
            MealField::SiteId => &meal.site_id,
        }
    }
}

impl fmt::Display for MealField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn escape(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn header(fields: &[MealField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(",")
}

fn row(meal: &Meal, fields: &[MealField]) -> String {
    fields
        .iter()
        .map(|f| escape(f.value(meal)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Serialize meals to CSV text with the given columns.
pub fn to_csv(meals: &[Meal], fields: &[MealField]) -> String {
    let mut lines = Vec::with_capacity(meals.len() + 1);
    lines.push(header(fields));
    lines.extend(meals.iter().map(|m| row(m, fields)));
    lines.join("\n")
}

/// Stream the output of [`to_csv`] to a writer.
pub fn write_csv<W: Write>(mut w: W, meals: &[Meal], fields: &[MealField]) -> io::Result<()> {
    w.write_all(header(fields).as_bytes())?;
    for meal in meals {
        w.write_all(b"\n")?;
        w.write_all(row(meal, fields).as_bytes())?;
    }
    w.flush()
}
