use super::record::ResultRecord;
use super::sort::{SortDirection, SortSpec};
use serde::Serialize;
use tracing::debug;

/// Records shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Group key for records whose group field is missing, null or empty.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Records of one page that share a group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultGroup<'a> {
    pub key: String,
    pub records: Vec<&'a ResultRecord>,
}

/// Snapshot of the result set as it should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView<'a> {
    pub sorted: &'a [ResultRecord],
    pub sort: Option<&'a SortSpec>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub groups: Vec<ResultGroup<'a>>,
}

/// Sorted, paginated list of search results.
///
/// The whole list is sorted (never a single page); grouping only ever looks at
/// the current page, so a group that straddles a page boundary shows up on both
/// pages as two independent groups.
#[derive(Debug, Clone)]
pub struct ResultSet {
    records: Vec<ResultRecord>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
    total_pages: usize,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSet {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// A zero page size is treated as one.
    pub fn with_page_size(page_size: usize) -> Self {
        Self { records: Vec::new(), sort: None, page: 1, page_size: page_size.max(1), total_pages: 1 }
    }

    /// Replace the list. The active sort is re-applied and the first page shown.
    pub fn set_results(&mut self, records: Vec<ResultRecord>) {
        self.records = records;
        self.apply_sort();
        self.page = 1;
        self.total_pages = self.records.len().div_ceil(self.page_size).max(1);
        debug!(records = self.records.len(), total_pages = self.total_pages, "result set replaced");
    }

    /// Sort the whole list by `field` and remember the key for later results.
    pub fn sort(&mut self, field: &str, direction: SortDirection) {
        self.sort = Some(SortSpec::new(field, direction));
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        if let Some(spec) = &self.sort {
            spec.sort(&mut self.records);
        }
    }

    /// Go to page `n` (1-based). Out-of-range requests are ignored.
    pub fn set_page(&mut self, n: usize) -> bool {
        if n < 1 || n > self.total_pages {
            return false;
        }
        self.page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.page > 1 && self.set_page(self.page - 1)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }

    /// Records on the current page, in sorted order.
    pub fn page_slice(&self) -> &[ResultRecord] {
        let start = ((self.page - 1) * self.page_size).min(self.records.len());
        let end = (start + self.page_size).min(self.records.len());
        &self.records[start..end]
    }

    /// Current page grouped by `group_field`, groups in first-encounter order.
    pub fn current_page_view(&self, group_field: &str) -> Vec<ResultGroup<'_>> {
        let mut groups: Vec<ResultGroup<'_>> = Vec::new();
        for record in self.page_slice() {
            let value = record.field(group_field);
            let key = if value.is_blank() { UNCATEGORIZED.to_string() } else { value.text().into_owned() };
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.records.push(record),
                None => groups.push(ResultGroup { key, records: vec![record] }),
            }
        }
        groups
    }

    pub fn view(&self, group_field: &str) -> ResultView<'_> {
        ResultView {
            sorted: &self.records,
            sort: self.sort.as_ref(),
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            groups: self.current_page_view(group_field),
        }
    }
}
