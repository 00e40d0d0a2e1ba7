//! Client-side partitioning of a match collection for the list screen.
//!
//! Years are always derived from the match date in the viewer's time zone,
//! never stored, so every call recomputes them from the collection it is given.
use crate::{Match, MatchType};
use chrono::{Datelike, Local, TimeZone};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SportFilter {
    #[default]
    All,
    Football,
    Cricket,
}

impl SportFilter {
    pub fn label(&self) -> &'static str {
        match self {
            SportFilter::All => "All",
            SportFilter::Football => "Football",
            SportFilter::Cricket => "Cricket",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SportFilter::All => SportFilter::Football,
            SportFilter::Football => SportFilter::Cricket,
            SportFilter::Cricket => SportFilter::All,
        }
    }

    pub fn accepts(&self, m: &Match) -> bool {
        match self {
            SportFilter::All => true,
            SportFilter::Football => m.match_type == MatchType::Football,
            SportFilter::Cricket => m.match_type == MatchType::Cricket,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YearFilter {
    #[default]
    All,
    Year(i32),
}

impl YearFilter {
    pub fn label(&self) -> String {
        match self {
            YearFilter::All => "All".to_string(),
            YearFilter::Year(y) => y.to_string(),
        }
    }

    /// Step through `All` followed by each offered year, wrapping around.
    /// A selected year that is no longer offered restarts at `All`.
    pub fn next(self, options: &[i32]) -> Self {
        match self {
            YearFilter::All => options.first().map_or(YearFilter::All, |y| YearFilter::Year(*y)),
            YearFilter::Year(current) => options
                .iter()
                .position(|y| *y == current)
                .and_then(|idx| options.get(idx + 1))
                .map_or(YearFilter::All, |y| YearFilter::Year(*y)),
        }
    }
}

pub fn local_year_in<Tz: TimeZone>(m: &Match, tz: &Tz) -> i32 {
    m.date.with_timezone(tz).year()
}

/// Distinct years among non-live matches, most recent first.
pub fn year_options_in<Tz: TimeZone>(matches: &[Match], tz: &Tz) -> Vec<i32> {
    let mut years: Vec<i32> = matches
        .iter()
        .filter(|m| !m.is_live)
        .map(|m| local_year_in(m, tz))
        .collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

pub fn year_options(matches: &[Match]) -> Vec<i32> {
    year_options_in(matches, &Local)
}

#[derive(Debug, Default)]
pub struct MatchSections<'a> {
    pub live: Vec<&'a Match>,
    pub past: Vec<&'a Match>,
}

impl<'a> MatchSections<'a> {
    /// Sub-list of one section for one sport heading, order preserved.
    pub fn of_type(list: &[&'a Match], sport: MatchType) -> Vec<&'a Match> {
        list.iter().copied().filter(|m| m.match_type == sport).collect()
    }
}

/// Split by liveness, then apply the sport filter to both sections and the
/// year filter to the past section only.
pub fn partition_in<'a, Tz: TimeZone>(
    matches: &'a [Match],
    sport: SportFilter,
    year: YearFilter,
    tz: &Tz,
) -> MatchSections<'a> {
    let mut sections = MatchSections::default();
    for m in matches.iter().filter(|m| sport.accepts(m)) {
        if m.is_live {
            sections.live.push(m);
            continue;
        }
        let year_ok = match year {
            YearFilter::All => true,
            YearFilter::Year(y) => local_year_in(m, tz) == y,
        };
        if year_ok {
            sections.past.push(m);
        }
    }
    sections
}

pub fn partition(matches: &[Match], sport: SportFilter, year: YearFilter) -> MatchSections<'_> {
    partition_in(matches, sport, year, &Local)
}
