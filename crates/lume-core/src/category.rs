//! Fixed task categories used by day and week reports.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::report::TaskSummary;

/// Report section a task is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dev,
    Meetings,
    Knowledge,
    Misc,
}

impl Category {
    /// Render order.
    pub const ALL: [Self; 4] = [Self::Dev, Self::Meetings, Self::Knowledge, Self::Misc];

    /// Categories matched against tags, highest priority first.
    const TAGGED: [Self; 3] = [Self::Dev, Self::Meetings, Self::Knowledge];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Meetings => "meetings",
            Self::Knowledge => "knowledge",
            Self::Misc => "misc",
        }
    }

    /// Section heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Dev => "Dev",
            Self::Meetings => "Meetings",
            Self::Knowledge => "Knowledge",
            Self::Misc => "Misc",
        }
    }

    /// Picks a category from a tag set, case-insensitively.
    ///
    /// A task tagged with several category names goes to the first of
    /// `dev`, `meetings`, `knowledge`; anything else is `misc`.
    pub fn of(tags: &BTreeSet<String>) -> Self {
        let lowered: BTreeSet<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        Self::TAGGED
            .into_iter()
            .find(|c| lowered.contains(c.as_str()))
            .unwrap_or(Self::Misc)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "meetings" => Ok(Self::Meetings),
            "knowledge" => Ok(Self::Knowledge),
            "misc" => Ok(Self::Misc),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Tasks split by category, each list longest first.
#[derive(Debug, Default)]
pub struct Categorized<'a> {
    groups: [Vec<&'a TaskSummary>; 4],
}

impl<'a> Categorized<'a> {
    pub fn get(&self, category: Category) -> &[&'a TaskSummary] {
        &self.groups[category.index()]
    }

    /// Categories in render order, including empty ones.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[&'a TaskSummary])> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

/// Assigns every task to exactly one category.
pub fn categorize(tasks: &[TaskSummary]) -> Categorized<'_> {
    let mut categorized = Categorized::default();
    for task in tasks {
        categorized.groups[Category::of(&task.tags).index()].push(task);
    }
    for group in &mut categorized.groups {
        group.sort_by(|a, b| TaskSummary::cmp_by_time(a, b));
    }
    categorized
}
