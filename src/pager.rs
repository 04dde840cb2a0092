use crate::model::{Table, TripRecord};

/// Records shown per page of raw data.
pub const PAGE_SIZE: usize = 5;

/// Walks a table's records in load order, [`PAGE_SIZE`] at a time.
#[derive(Debug, Clone)]
pub struct Pager<'a> {
    records: &'a [TripRecord],
    cursor: usize,
}

impl<'a> Pager<'a> {
    pub fn new(table: &'a Table) -> Self {
        Pager {
            records: table.records(),
            cursor: 0,
        }
    }

    /// Number of records already handed out.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.records.len()
    }
}

impl<'a> Iterator for Pager<'a> {
    type Item = &'a [TripRecord];

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }
        let end = (self.cursor + PAGE_SIZE).min(self.records.len());
        let page = &self.records[self.cursor..end];
        self.cursor = end;
        Some(page)
    }
}
