use std::iter::FusedIterator;

use crate::{
    conversion::SqlText,
    error::ResultError,
    field::FieldView,
    raw::Oid,
    results::{ColumnRef, ResultBuffer},
};

/// One row of a [`ResultBuffer`].
#[derive(Clone, Copy)]
pub struct RowView<'r> {
    results: &'r ResultBuffer,
    row: usize,
}

impl<'r> RowView<'r> {
    pub(crate) fn new(results: &'r ResultBuffer, row: usize) -> Self {
        Self { results, row }
    }

    pub fn row_number(&self) -> usize {
        self.row
    }

    pub fn results(&self) -> &'r ResultBuffer {
        self.results
    }

    pub fn size(&self) -> usize {
        self.results.columns()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Field `column`, without a range check; reading it panics if the
    /// column does not exist.
    pub fn field(&self, column: usize) -> FieldView<'r> {
        FieldView::new(self.results, self.row, column)
    }

    pub fn at(&self, column: impl ColumnRef) -> Result<FieldView<'r>, ResultError> {
        let column = column.resolve(self.results)?;
        Ok(self.field(column))
    }

    pub fn get<T: SqlText>(&self, column: impl ColumnRef) -> Result<T, ResultError> {
        self.at(column)?.get()
    }

    pub fn get_opt<T: SqlText>(&self, column: impl ColumnRef) -> Result<Option<T>, ResultError> {
        self.at(column)?.get_opt()
    }

    pub fn column_number(&self, name: &str) -> Result<usize, ResultError> {
        self.results.column_number(name)
    }

    pub fn column_type(&self, column: impl ColumnRef) -> Result<Oid, ResultError> {
        self.results.column_type(column)
    }

    pub fn iter(&self) -> Fields<'r> {
        Fields {
            row: *self,
            next: 0,
            end: self.size(),
        }
    }
}

/// Rows are equal when they have the same number of fields and equal
/// fields.
impl PartialEq for RowView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.iter().zip(other.iter()).all(|(me, other)| me == other)
    }
}

impl Eq for RowView<'_> {}

impl std::fmt::Debug for RowView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

pub struct Fields<'r> {
    row: RowView<'r>,
    next: usize,
    end: usize,
}

impl<'r> Iterator for Fields<'r> {
    type Item = FieldView<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            let field = self.row.field(self.next);
            self.next += 1;
            Some(field)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.next;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Fields<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            self.end -= 1;
            Some(self.row.field(self.end))
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Fields<'_> {}

impl FusedIterator for Fields<'_> {}

impl<'r> IntoIterator for RowView<'r> {
    type Item = FieldView<'r>;
    type IntoIter = Fields<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
