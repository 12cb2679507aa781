use chrono::{Months, NaiveDate};

/// Source clause every select expression starts from
pub const SELECT_ALL: &str = "SELECT * FROM S3Object s";

/// Age (in years) separating the two age-bracket tags
pub const AGE_THRESHOLD_YEARS: u32 = 30;

/// Placeholder replaced by the age cutoff date in relative-date clauses
const CUTOFF: &str = "{cutoff}";

/// How a filter tag contributes to the predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRule {
    /// Fixed comparison clause
    Clause(&'static str),
    /// Clause on the birthday column relative to today minus
    /// [`AGE_THRESHOLD_YEARS`]; `{cutoff}` is replaced by that date
    RelativeDate(&'static str),
    /// Letters added to the single cup membership clause
    Cups(&'static [&'static str]),
}

static TAG_RULES: &[(&str, TagRule)] = &[
    ("低身長", TagRule::Clause("CAST(s.height AS INT) < 150")),
    ("高身長", TagRule::Clause("CAST(s.height AS INT) >= 170")),
    ("くびれ", TagRule::Clause("CAST(s.waist AS INT) <= 58")),
    ("安産型", TagRule::Clause("CAST(s.hip AS INT) >= 90")),
    ("熟女", TagRule::RelativeDate("s.birthday <> '' AND s.birthday <= '{cutoff}'")),
    ("若手", TagRule::RelativeDate("s.birthday > '{cutoff}'")),
    ("貧乳", TagRule::Cups(&["A", "B"])),
    ("美乳", TagRule::Cups(&["C", "D"])),
    ("巨乳", TagRule::Cups(&["E", "F", "G"])),
    ("爆乳", TagRule::Cups(&["G", "H", "I", "J", "K"])),
];

/// Look up the rule for a filter tag
pub fn rule_for(tag: &str) -> Option<TagRule> {
    TAG_RULES
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, rule)| *rule)
}

/// Split the raw `params` value into filter tags
///
/// Tokens are trimmed and empty tokens dropped, so `""` and `",,"` both mean
/// "no filter".
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Birthdays on or before this date belong to people at least
/// [`AGE_THRESHOLD_YEARS`] old
pub fn age_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(AGE_THRESHOLD_YEARS * 12))
        .unwrap_or(NaiveDate::MIN)
}

/// Build the filter predicate for a list of tags
///
/// Clauses keep the order of the tags. Cup tags are collected into one
/// `s.cup IN (...)` clause placed last; letters are neither sorted nor
/// de-duplicated. Unknown tags contribute nothing. An empty string means no
/// filter.
pub fn build_predicate<S: AsRef<str>>(tags: &[S], today: NaiveDate) -> String {
    let cutoff = age_cutoff(today).format("%Y-%m-%d").to_string();
    let mut clauses = Vec::with_capacity(tags.len());
    let mut cups: Vec<&str> = Vec::new();

    for tag in tags {
        let tag = tag.as_ref();
        match rule_for(tag) {
            Some(TagRule::Clause(clause)) => clauses.push(clause.to_string()),
            Some(TagRule::RelativeDate(template)) => {
                clauses.push(template.replace(CUTOFF, &cutoff))
            }
            Some(TagRule::Cups(letters)) => cups.extend_from_slice(letters),
            None => tracing::debug!("Ignoring unknown filter tag: {}", tag),
        }
    }

    if !cups.is_empty() {
        let letters = cups
            .iter()
            .map(|letter| format!("'{}'", letter))
            .collect::<Vec<_>>()
            .join(",");
        clauses.push(format!("s.cup IN ({})", letters));
    }

    clauses.join(" AND ")
}

/// Build the full select expression for a list of tags
pub fn build_expression<S: AsRef<str>>(tags: &[S], today: NaiveDate) -> String {
    let predicate = build_predicate(tags, today);
    if predicate.is_empty() {
        SELECT_ALL.to_string()
    } else {
        format!("{} WHERE {}", SELECT_ALL, predicate)
    }
}
