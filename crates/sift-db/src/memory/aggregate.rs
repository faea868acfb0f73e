use bson::{Bson, Document};

use super::eval;

/// Aggregate reductions over one extracted column. Count and exists are
/// separate terminals on the query; they short-circuit instead of
/// reducing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Min,
    Max,
    /// With `coalesce` false, null values leave both the numerator and
    /// the denominator; with true they count as zero.
    Avg { coalesce: bool },
}

pub(crate) fn reduce(rows: &[Document], column: &str, aggregate: Aggregate) -> Bson {
    match aggregate {
        Aggregate::Sum => sum(rows, column),
        Aggregate::Min => extremum(rows, column, std::cmp::Ordering::Less),
        Aggregate::Max => extremum(rows, column, std::cmp::Ordering::Greater),
        Aggregate::Avg { coalesce } => avg(rows, column, coalesce),
    }
}

/// Integral until a double appears; null/missing and non-numeric values
/// are skipped. The empty sum is integral zero.
fn sum(rows: &[Document], column: &str) -> Bson {
    let mut int_total = 0i64;
    let mut float_total = 0f64;
    let mut saw_float = false;
    for row in rows {
        match eval::get_path(row, column) {
            Some(Bson::Int32(n)) => int_total += i64::from(*n),
            Some(Bson::Int64(n)) => int_total += *n,
            Some(Bson::Double(n)) => {
                float_total += *n;
                saw_float = true;
            }
            _ => {}
        }
    }
    if saw_float {
        Bson::Double(float_total + int_total as f64)
    } else {
        Bson::Int64(int_total)
    }
}

fn extremum(rows: &[Document], column: &str, keep: std::cmp::Ordering) -> Bson {
    let mut best: Option<&Bson> = None;
    for row in rows {
        let Some(value) = eval::get_path(row, column) else {
            continue;
        };
        best = match best {
            None => Some(value),
            Some(current) => {
                if eval::compare_two(value, current) == keep {
                    Some(value)
                } else {
                    Some(current)
                }
            }
        };
    }
    best.cloned().unwrap_or(Bson::Null)
}

fn avg(rows: &[Document], column: &str, coalesce: bool) -> Bson {
    let mut total = 0f64;
    let mut count = 0u64;
    for row in rows {
        match eval::get_path(row, column).and_then(eval::numeric) {
            Some(n) => {
                total += n;
                count += 1;
            }
            // A null row either counts as zero or is excluded entirely.
            None if coalesce => count += 1,
            None => {}
        }
    }
    if count == 0 {
        return Bson::Null;
    }
    Bson::Double(total / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn rows() -> Vec<Document> {
        vec![
            doc! { "n": 10 },
            doc! { "n": 20 },
            doc! { "n": Bson::Null },
            doc! { "m": 1 },
        ]
    }

    #[test]
    fn sum_skips_nulls_and_stays_integral() {
        assert_eq!(reduce(&rows(), "n", Aggregate::Sum), Bson::Int64(30));
    }

    #[test]
    fn sum_promotes_to_double() {
        let rows = vec![doc! { "n": 1 }, doc! { "n": 2.5 }];
        assert_eq!(reduce(&rows, "n", Aggregate::Sum), Bson::Double(3.5));
    }

    #[test]
    fn empty_sum_is_integral_zero() {
        assert_eq!(reduce(&[], "n", Aggregate::Sum), Bson::Int64(0));
    }

    #[test]
    fn min_max_use_the_sort_ordering() {
        assert_eq!(reduce(&rows(), "n", Aggregate::Min), Bson::Int32(10));
        assert_eq!(reduce(&rows(), "n", Aggregate::Max), Bson::Int32(20));
        assert_eq!(reduce(&[], "n", Aggregate::Min), Bson::Null);
    }

    #[test]
    fn avg_excludes_nulls_without_coalesce() {
        // Two numeric rows out of four: (10 + 20) / 2.
        assert_eq!(
            reduce(&rows(), "n", Aggregate::Avg { coalesce: false }),
            Bson::Double(15.0)
        );
    }

    #[test]
    fn avg_counts_nulls_as_zero_with_coalesce() {
        // Null and missing rows join the denominator: (10 + 20) / 4.
        assert_eq!(
            reduce(&rows(), "n", Aggregate::Avg { coalesce: true }),
            Bson::Double(7.5)
        );
    }

    #[test]
    fn empty_avg_is_null() {
        assert_eq!(
            reduce(&[], "n", Aggregate::Avg { coalesce: true }),
            Bson::Null
        );
    }
}
