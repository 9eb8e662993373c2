//! Multi-column stable sorting of work items.
//!
//! A [`SortConfig`] is an ordered stack of criteria; the first criterion is
//! the primary key and each later one only breaks ties left by the ones
//! before it. Every (field, direction) pair resolves to a plain comparator
//! through [`comparator`], so custom orders live in one lookup table instead
//! of being special-cased in the sort loop.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::work_item::{Priority, Status, WorkItem};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("unknown sort field '{0}'")]
    UnknownField(String),
    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),
    #[error("direction '{direction}' is not available for field '{field}'")]
    UnsupportedDirection {
        field: SortField,
        direction: SortDirection,
    },
    #[error("field '{0}' appears more than once")]
    DuplicateField(SortField),
    #[error("malformed sort criterion '{0}', expected field:direction")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Title,
    Status,
    Priority,
    DueDate,
    Project,
}

impl SortField {
    /// Table column order.
    pub const ALL: [SortField; 5] = [
        SortField::Title,
        SortField::Status,
        SortField::Priority,
        SortField::DueDate,
        SortField::Project,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::DueDate => "due_date",
            SortField::Project => "project",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Title => "Title",
            SortField::Status => "Status",
            SortField::Priority => "Priority",
            SortField::DueDate => "Due",
            SortField::Project => "Project",
        }
    }

    /// The field's domain-specific order, if it has one.
    pub fn custom_direction(&self) -> Option<SortDirection> {
        match self {
            SortField::Status => Some(SortDirection::OnHoldFirst),
            SortField::Priority => Some(SortDirection::MediumFirst),
            _ => None,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            "due_date" | "due" => Ok(SortField::DueDate),
            "project" => Ok(SortField::Project),
            other => Err(SortError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
    /// Status only: items on hold (not yet started) first.
    OnHoldFirst,
    /// Priority only: medium-priority items first.
    MediumFirst,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
            SortDirection::OnHoldFirst => "on_hold_first",
            SortDirection::MediumFirst => "medium_first",
        }
    }

    /// Glyph used in table headers.
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
            SortDirection::OnHoldFirst | SortDirection::MediumFirst => "◆",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            "on_hold_first" => Ok(SortDirection::OnHoldFirst),
            "medium_first" => Ok(SortDirection::MediumFirst),
            other => Err(SortError::UnknownDirection(other.to_string())),
        }
    }
}

pub type Comparator = fn(&WorkItem, &WorkItem) -> Ordering;

/// Lookup from (field, direction) to its comparator. `None` means the
/// combination is not a valid criterion.
pub fn comparator(field: SortField, direction: SortDirection) -> Option<Comparator> {
    use SortDirection as D;
    use SortField as F;

    let cmp: Comparator = match (field, direction) {
        (F::Title, D::Ascending) => title_order,
        (F::Title, D::Descending) => |a, b| title_order(b, a),
        (F::Status, D::Ascending) => |a, b| a.status.cmp(&b.status),
        (F::Status, D::Descending) => |a, b| b.status.cmp(&a.status),
        (F::Status, D::OnHoldFirst) => on_hold_first,
        (F::Priority, D::Ascending) => |a, b| a.priority.cmp(&b.priority),
        (F::Priority, D::Descending) => |a, b| b.priority.cmp(&a.priority),
        (F::Priority, D::MediumFirst) => medium_first,
        (F::DueDate, D::Ascending) => |a, b| due_date_order(a, b, false),
        (F::DueDate, D::Descending) => |a, b| due_date_order(a, b, true),
        (F::Project, D::Ascending) => |a, b| a.project.name.cmp(&b.project.name),
        (F::Project, D::Descending) => |a, b| b.project.name.cmp(&a.project.name),
        _ => return None,
    };
    Some(cmp)
}

fn title_order(a: &WorkItem, b: &WorkItem) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

// Undated items go last whichever way the dates run.
fn due_date_order(a: &WorkItem, b: &WorkItem, descending: bool) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Pending is the on-hold bucket: accepted but not yet picked up.
fn on_hold_first(a: &WorkItem, b: &WorkItem) -> Ordering {
    pinned_first(a.status == Status::Pending, b.status == Status::Pending)
}

fn medium_first(a: &WorkItem, b: &WorkItem) -> Ordering {
    pinned_first(a.priority == Priority::Medium, b.priority == Priority::Medium)
}

fn pinned_first(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

#[derive(Debug, Clone, Copy)]
pub struct SortCriterion {
    field: SortField,
    direction: SortDirection,
    cmp: Comparator,
}

impl SortCriterion {
    pub fn new(field: SortField, direction: SortDirection) -> Result<Self, SortError> {
        let cmp = comparator(field, direction)
            .ok_or(SortError::UnsupportedDirection { field, direction })?;
        Ok(Self {
            field,
            direction,
            cmp,
        })
    }

    pub fn field(&self) -> SortField {
        self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn compare(&self, a: &WorkItem, b: &WorkItem) -> Ordering {
        (self.cmp)(a, b)
    }
}

impl PartialEq for SortCriterion {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.direction == other.direction
    }
}

impl Eq for SortCriterion {}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.direction)
    }
}

impl FromStr for SortCriterion {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((f, d)) if f.trim().is_empty() || d.trim().is_empty() => {
                return Err(SortError::Malformed(s.to_string()))
            }
            Some((f, d)) => (f.parse()?, d.parse()?),
            None if !s.trim().is_empty() => (s.parse()?, SortDirection::Ascending),
            None => return Err(SortError::Malformed(s.to_string())),
        };
        SortCriterion::new(field, direction)
    }
}

/// Ordered sort criteria; index 0 has the highest precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortConfig {
    criteria: Vec<SortCriterion>,
}

impl SortConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_criteria(criteria: Vec<SortCriterion>) -> Result<Self, SortError> {
        let mut config = Self::new();
        for criterion in criteria {
            if config.get(criterion.field).is_some() {
                return Err(SortError::DuplicateField(criterion.field));
            }
            config.criteria.push(criterion);
        }
        Ok(config)
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn get(&self, field: SortField) -> Option<&SortCriterion> {
        self.criteria.iter().find(|c| c.field == field)
    }

    /// 1-based precedence of `field`, for header labels.
    pub fn rank(&self, field: SortField) -> Option<usize> {
        self.criteria
            .iter()
            .position(|c| c.field == field)
            .map(|i| i + 1)
    }

    /// Advance `field` one step through its header cycle:
    /// absent → ascending → descending → custom order (if any) → absent.
    /// A field keeps its precedence slot while it cycles; removing it closes
    /// the gap without reordering the rest.
    pub fn toggle(&mut self, field: SortField) {
        let Some(index) = self.criteria.iter().position(|c| c.field == field) else {
            self.push(field, SortDirection::Ascending);
            return;
        };

        let next = match self.criteria[index].direction {
            SortDirection::Ascending => Some(SortDirection::Descending),
            SortDirection::Descending => field.custom_direction(),
            SortDirection::OnHoldFirst | SortDirection::MediumFirst => None,
        };

        match next.and_then(|d| SortCriterion::new(field, d).ok()) {
            Some(criterion) => self.criteria[index] = criterion,
            None => {
                self.criteria.remove(index);
            }
        }
    }

    fn push(&mut self, field: SortField, direction: SortDirection) {
        if let Ok(criterion) = SortCriterion::new(field, direction) {
            self.criteria.push(criterion);
        }
    }

    /// Compare two items under every criterion in precedence order.
    pub fn compare(&self, a: &WorkItem, b: &WorkItem) -> Ordering {
        self.criteria
            .iter()
            .map(|c| c.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for SortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.criteria.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

impl FromStr for SortConfig {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let criteria = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<SortCriterion>, _>>()?;
        SortConfig::from_criteria(criteria)
    }
}

/// Order `items` under `config`. Returns a new sequence of references; the
/// input is left as it was. Ties keep input order.
pub fn sort_items<'a>(config: &SortConfig, items: &'a [WorkItem]) -> Vec<&'a WorkItem> {
    let mut sorted: Vec<&WorkItem> = items.iter().collect();
    if !config.is_empty() {
        sorted.sort_by(|a, b| config.compare(a, b));
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{due, ids, item};
    use crate::model::work_item::{Priority as P, Status as S};
    use proptest::prelude::*;

    fn config(s: &str) -> SortConfig {
        s.parse().unwrap()
    }

    fn mixed() -> Vec<WorkItem> {
        vec![
            item(1, "delta", S::Completed, P::Low),
            item(2, "Alpha", S::Pending, P::High),
            item(3, "charlie", S::InProgress, P::Medium),
            item(4, "bravo", S::Pending, P::Medium),
            item(5, "echo", S::InProgress, P::High),
            item(6, "foxtrot", S::Pending, P::Low),
        ]
    }

    #[test]
    fn empty_config_keeps_input_order() {
        let items = mixed();
        let sorted = sort_items(&SortConfig::new(), &items);
        assert_eq!(ids(&sorted), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn input_is_not_reordered() {
        let items = mixed();
        let before = items.clone();
        let _ = sort_items(&config("title:asc"), &items);
        assert_eq!(items, before);
    }

    #[test]
    fn title_is_case_insensitive() {
        let items = mixed();
        let sorted = sort_items(&config("title:asc"), &items);
        assert_eq!(ids(&sorted), vec![2, 4, 3, 1, 5, 6]);
        let sorted = sort_items(&config("title:desc"), &items);
        assert_eq!(ids(&sorted), vec![6, 5, 1, 3, 4, 2]);
    }

    #[test]
    fn status_then_priority_precedence() {
        let items = mixed();
        let sorted = sort_items(&config("status:asc,priority:desc"), &items);
        // pending: 2 (high), 4 (medium), 6 (low); in progress: 5, 3; completed: 1
        assert_eq!(ids(&sorted), vec![2, 4, 6, 5, 3, 1]);
    }

    #[test]
    fn medium_first_keeps_others_in_input_order() {
        let items = mixed();
        let sorted = sort_items(&config("priority:medium_first"), &items);
        assert_eq!(ids(&sorted), vec![3, 4, 1, 2, 5, 6]);
    }

    #[test]
    fn on_hold_first_pins_pending() {
        let items = mixed();
        let sorted = sort_items(&config("status:on_hold_first"), &items);
        assert_eq!(ids(&sorted), vec![2, 4, 6, 1, 3, 5]);
    }

    #[test]
    fn custom_order_defers_to_later_criteria() {
        let items = mixed();
        let sorted = sort_items(&config("priority:medium_first,title:asc"), &items);
        assert_eq!(ids(&sorted), vec![4, 3, 2, 1, 5, 6]);
    }

    #[test]
    fn undated_items_sort_last_both_ways() {
        let items = vec![
            item(1, "a", S::Pending, P::Low),
            due(item(2, "b", S::Pending, P::Low), 2024, 5, 1),
            due(item(3, "c", S::Pending, P::Low), 2024, 1, 1),
            item(4, "d", S::Pending, P::Low),
        ];
        let sorted = sort_items(&config("due_date:asc"), &items);
        assert_eq!(ids(&sorted), vec![3, 2, 1, 4]);
        let sorted = sort_items(&config("due_date:desc"), &items);
        assert_eq!(ids(&sorted), vec![2, 3, 1, 4]);
    }

    #[test]
    fn custom_direction_needs_matching_field() {
        let err = SortCriterion::new(SortField::Title, SortDirection::MediumFirst).unwrap_err();
        assert!(matches!(err, SortError::UnsupportedDirection { .. }));
        assert!("status:medium_first".parse::<SortConfig>().is_err());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            "owner:asc".parse::<SortConfig>(),
            Err(SortError::UnknownField("owner".into()))
        );
        assert_eq!(
            "title:sideways".parse::<SortConfig>(),
            Err(SortError::UnknownDirection("sideways".into()))
        );
        assert_eq!(
            "status:".parse::<SortConfig>(),
            Err(SortError::Malformed("status:".into()))
        );
        assert_eq!(
            "title, :desc".parse::<SortConfig>(),
            Err(SortError::Malformed(":desc".into()))
        );
        assert_eq!(
            "title,title:desc".parse::<SortConfig>(),
            Err(SortError::DuplicateField(SortField::Title))
        );
    }

    #[test]
    fn display_round_trips_text_form() {
        let text = "status:asc,priority:medium_first,due_date:desc";
        assert_eq!(config(text).to_string(), text);
        assert_eq!(config("").to_string(), "");
    }

    #[test]
    fn toggle_cycles_plain_field() {
        let mut cfg = SortConfig::new();
        cfg.toggle(SortField::Title);
        assert_eq!(cfg.to_string(), "title:asc");
        cfg.toggle(SortField::Title);
        assert_eq!(cfg.to_string(), "title:desc");
        cfg.toggle(SortField::Title);
        assert!(cfg.is_empty());
    }

    #[test]
    fn toggle_visits_custom_order() {
        let mut cfg = SortConfig::new();
        for expected in ["priority:asc", "priority:desc", "priority:medium_first", ""] {
            cfg.toggle(SortField::Priority);
            assert_eq!(cfg.to_string(), expected);
        }
    }

    #[test]
    fn toggle_appends_and_removal_keeps_precedence() {
        let mut cfg = config("status:asc,title:desc,project:asc");
        cfg.toggle(SortField::Priority);
        assert_eq!(cfg.rank(SortField::Priority), Some(4));
        cfg.toggle(SortField::Title);
        assert_eq!(cfg.rank(SortField::Title), None);
        assert_eq!(cfg.to_string(), "status:asc,project:asc,priority:asc");
    }

    fn arb_items() -> impl Strategy<Value = Vec<WorkItem>> {
        let status = prop_oneof![Just(S::Pending), Just(S::InProgress), Just(S::Completed)];
        let priority = prop_oneof![Just(P::Low), Just(P::Medium), Just(P::High)];
        let title = prop_oneof![Just("a"), Just("B"), Just("c")];
        let day = prop::option::of(1u32..4);
        prop::collection::vec((status, priority, title, day), 0..24).prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (s, p, t, d))| {
                    let it = item(i as u64, t, s, p);
                    match d {
                        Some(day) => due(it, 2024, 1, day),
                        None => it,
                    }
                })
                .collect()
        })
    }

    fn arb_criterion() -> impl Strategy<Value = SortCriterion> {
        let pairs: Vec<SortCriterion> = SortField::ALL
            .iter()
            .flat_map(|f| {
                [
                    SortDirection::Ascending,
                    SortDirection::Descending,
                    SortDirection::OnHoldFirst,
                    SortDirection::MediumFirst,
                ]
                .into_iter()
                .filter_map(move |d| SortCriterion::new(*f, d).ok())
            })
            .collect();
        prop::sample::select(pairs)
    }

    proptest! {
        #[test]
        fn equal_keys_keep_input_order(items in arb_items(), criterion in arb_criterion()) {
            let cfg = SortConfig::from_criteria(vec![criterion]).unwrap();
            let sorted = sort_items(&cfg, &items);
            prop_assert_eq!(sorted.len(), items.len());
            for pair in sorted.windows(2) {
                let ord = criterion.compare(pair[0], pair[1]);
                prop_assert!(ord.is_le());
                if ord.is_eq() {
                    // ids are input positions
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }
        }
    }
}
