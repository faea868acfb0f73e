use bson::Document;
use sift_query::{Sort, SortDirection};

use super::eval;

/// Stable multi-key sort: each key extracts a column from every row,
/// ties break on the next key in declaration order. Null and missing
/// values sort first on an ascending key.
pub(crate) fn sort_rows<T>(rows: &mut [(T, Document)], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    rows.sort_by(|(_, a), (_, b)| {
        for sort in sorts {
            let a_field = eval::get_path(a, &sort.field);
            let b_field = eval::get_path(b, &sort.field);
            let mut ord = eval::compare_field_values(a_field, b_field);
            if sort.direction == SortDirection::Desc {
                ord = ord.reverse();
            }
            if ord != std::cmp::Ordering::Equal {
                return ord;
            }
        }
        std::cmp::Ordering::Equal
    });
}
