use rayon::prelude::*;
use serde_json::Value;
use std::cmp::Ordering;

// One flat row of data, keyed by column.
pub type Record = serde_json::Map<String, Value>;

pub const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub key: String,
    pub display_name: String,
    pub sortable: bool,
}

impl ColumnDefinition {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        ColumnDefinition {
            key: key.into(),
            display_name: display_name.into(),
            sortable: true,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column_key: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
}

/// The mutable filter/sort/pagination parameters of a view. All mutations go
/// through the methods below, which enforce the clamping rules, so a
/// ViewState can never hold an out-of-range page or a non-sortable sort key.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub filter_text: String,
    pub sort: Option<SortSpec>,
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            filter_text: String::new(),
            sort: None,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    // A filter change always snaps back to the first page, so a shrinking
    // result set can not leave the view on an out-of-range page.
    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter_text = text.into();
        self.page_index = 0;
    }

    // Cycles unsorted -> ascending -> descending -> unsorted on the active
    // column. Any other column starts over at ascending.
    pub fn toggle_sort(&mut self, column: &ColumnDefinition) {
        if !column.sortable {
            return;
        }
        self.sort = match self.sort.take() {
            Some(spec) if spec.column_key == column.key => match spec.direction {
                SortDirection::Ascending => Some(SortSpec {
                    column_key: spec.column_key,
                    direction: SortDirection::Descending,
                }),
                SortDirection::Descending => None,
            },
            _ => Some(SortSpec {
                column_key: column.key.clone(),
                direction: SortDirection::Ascending,
            }),
        };
    }

    // Sizes outside PAGE_SIZES are rejected, not clamped.
    pub fn set_page_size(&mut self, size: usize, row_count: usize) {
        if !PAGE_SIZES.contains(&size) {
            return;
        }
        self.page_size = size;
        self.clamp_page(row_count);
    }

    pub fn navigate(&mut self, nav: PageNav, row_count: usize) {
        let last = page_count(row_count, self.page_size) - 1;
        self.page_index = match nav {
            PageNav::First => 0,
            PageNav::Prev => self.page_index.saturating_sub(1),
            PageNav::Next => std::cmp::min(last, self.page_index + 1),
            PageNav::Last => last,
        };
    }

    // Called whenever the row count may have shrunk under the view, e.g.
    // after a refresh replaced the record store.
    pub fn clamp_page(&mut self, row_count: usize) {
        self.page_index = std::cmp::min(self.page_index, page_count(row_count, self.page_size) - 1);
    }

    /// Header sort indicator for a column, derived from the sort spec at
    /// query time. There is deliberately no per-column flag to go stale.
    pub fn indicator(&self, column_key: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|spec| spec.column_key == column_key)
            .map(|spec| spec.direction)
    }
}

/// One page of a filtered+sorted view. Rows are indices into the record
/// store, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<usize>,
    pub page_count: usize,
    pub can_prev: bool,
    pub can_next: bool,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn cell_text(record: &Record, key: &str) -> String {
    record.get(key).map(value_text).unwrap_or_default()
}

fn haystack(record: &Record, columns: &[ColumnDefinition]) -> String {
    let cells: Vec<String> = columns.iter().map(|c| cell_text(record, &c.key)).collect();
    cells.join(" ").to_lowercase()
}

/// Keep the rows whose concatenated column values contain `filter_text`,
/// case-insensitively. Returns indices into `records`, source order kept.
pub fn filter(records: &[Record], filter_text: &str, columns: &[ColumnDefinition]) -> Vec<usize> {
    if filter_text.is_empty() {
        return (0..records.len()).collect();
    }
    let needle = filter_text.to_lowercase();
    records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| haystack(record, columns).contains(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn sort_value<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

// Ascending comparison of two cells. Missing cells always come first; both
// cells numeric (a JSON number or a numeric string) compare numerically,
// anything else compares as code-point strings.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => value_text(a).cmp(&value_text(b)),
        },
    }
}

/// Stable sort of `rows` by the value under the spec's column. `None` keeps
/// the incoming order (the order of the record source).
pub fn sort(records: &[Record], mut rows: Vec<usize>, spec: Option<&SortSpec>) -> Vec<usize> {
    let Some(spec) = spec else {
        return rows;
    };
    rows.sort_by(|&a, &b| {
        let ordering = compare_cells(
            sort_value(&records[a], &spec.column_key),
            sort_value(&records[b], &spec.column_key),
        );
        match spec.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    rows
}

pub fn page_count(row_count: usize, page_size: usize) -> usize {
    std::cmp::max(1, row_count.div_ceil(page_size))
}

/// Slice one page out of the filtered+sorted row set. Pagination is always
/// the last stage; an empty set yields a single empty page.
pub fn paginate(rows: &[usize], page_index: usize, page_size: usize) -> Page {
    let page_count = page_count(rows.len(), page_size);
    let begin = std::cmp::min(page_index * page_size, rows.len());
    let end = std::cmp::min(begin + page_size, rows.len());
    Page {
        rows: rows[begin..end].to_vec(),
        page_count,
        can_prev: page_index > 0,
        can_next: page_index + 1 < page_count,
    }
}
