use std::cmp::Ordering;

use bson::{Bson, Document};

/// Walk a dot-separated path through nested documents. An explicit
/// `Bson::Null` resolves to `None`, same as a missing field — null
/// handling stays in one place.
pub(crate) fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = doc;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let value = current.get(segment)?;
        if segments.peek().is_none() {
            return match value {
                Bson::Null => None,
                other => Some(other),
            };
        }
        match value {
            Bson::Document(sub) => current = sub,
            _ => return None,
        }
    }
    None
}

/// Equality between a stored row value and a query value.
pub(crate) fn value_eq(store_val: &Bson, query_val: &Bson) -> bool {
    match (store_val, query_val) {
        // ── Direct type matches ─────────────────────────────────
        (Bson::String(a), Bson::String(b)) => a == b,
        (Bson::Int32(a), Bson::Int32(b)) => a == b,
        (Bson::Int32(a), Bson::Int64(b)) => i64::from(*a) == *b,
        (Bson::Int64(a), Bson::Int64(b)) => a == b,
        (Bson::Int64(a), Bson::Int32(b)) => *a == i64::from(*b),
        (Bson::Double(a), Bson::Double(b)) => a == b,
        (Bson::Double(a), Bson::Int64(b)) => *a == (*b as f64),
        (Bson::Double(a), Bson::Int32(b)) => *a == f64::from(*b),
        (Bson::Int64(a), Bson::Double(b)) => (*a as f64) == *b,
        (Bson::Int32(a), Bson::Double(b)) => f64::from(*a) == *b,
        (Bson::Boolean(a), Bson::Boolean(b)) => a == b,
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            a.timestamp_millis() == b.timestamp_millis()
        }

        // ── Cross-type coercion: query string → stored type ─────
        (Bson::Int32(a), Bson::String(s)) => {
            s.parse::<i64>().is_ok_and(|b| i64::from(*a) == b)
        }
        (Bson::Int64(a), Bson::String(s)) => s.parse::<i64>().is_ok_and(|b| *a == b),
        (Bson::Double(a), Bson::String(s)) => s.parse::<f64>().is_ok_and(|b| *a == b),
        (Bson::Boolean(a), Bson::String(s)) => match s.as_str() {
            "true" => *a,
            "false" => !*a,
            _ => false,
        },

        // ── Incompatible types: silent exclusion ────────────────
        _ => false,
    }
}

/// Ordering comparison between a stored row value and a query value.
/// Missing fields and incompatible types never match.
pub(crate) fn value_cmp(
    field_value: Option<&Bson>,
    query_val: &Bson,
    predicate: fn(Ordering) -> bool,
) -> bool {
    let Some(store_val) = field_value else {
        return false;
    };
    match (store_val, query_val) {
        // A query string coerces toward a numeric stored value.
        (Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_), Bson::String(s)) => {
            let Some(a) = numeric(store_val) else {
                return false;
            };
            s.parse::<f64>()
                .is_ok_and(|b| predicate(a.partial_cmp(&b).unwrap_or(Ordering::Equal)))
        }
        (Bson::Int32(_), _)
        | (Bson::Int64(_), _)
        | (Bson::Double(_), _)
        | (_, Bson::Int32(_))
        | (_, Bson::Int64(_))
        | (_, Bson::Double(_)) => match (numeric(store_val), numeric(query_val)) {
            (Some(a), Some(b)) => predicate(a.partial_cmp(&b).unwrap_or(Ordering::Equal)),
            _ => false,
        },
        (Bson::String(a), Bson::String(b)) => predicate(a.as_str().cmp(b.as_str())),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            predicate(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        (Bson::Boolean(a), Bson::Boolean(b)) => predicate(a.cmp(b)),
        _ => false,
    }
}

/// Cross-type ordering used by the multi-key sorter and by min/max:
/// null/missing first, then per-type-pair comparison, equal across
/// unrelated types.
pub(crate) fn compare_field_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(Bson::Null), None) | (None, Some(Bson::Null)) => Ordering::Equal,
        (Some(Bson::Null), Some(Bson::Null)) => Ordering::Equal,
        (None, Some(_)) | (Some(Bson::Null), Some(_)) => Ordering::Less,
        (Some(_), None) | (Some(_), Some(Bson::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => compare_two(a, b),
    }
}

pub(crate) fn compare_two(a: &Bson, b: &Bson) -> Ordering {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            a.timestamp_millis().cmp(&b.timestamp_millis())
        }
        _ => match (numeric(a), numeric(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

/// Numeric view of a value, if it has one.
pub(crate) fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

/// Canonical string form used by pattern operators: strings as-is,
/// numbers through their display form, everything else unmatchable.
pub(crate) fn value_text(value: &Bson) -> Option<String> {
    match value {
        Bson::String(s) => Some(s.clone()),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn path_walks_nested_documents() {
        let doc = doc! { "address": { "city": "Austin" }, "name": "Acme" };
        assert_eq!(
            get_path(&doc, "address.city"),
            Some(&Bson::String("Austin".into()))
        );
        assert_eq!(get_path(&doc, "name"), Some(&Bson::String("Acme".into())));
        assert_eq!(get_path(&doc, "address.zip"), None);
        assert_eq!(get_path(&doc, "missing"), None);
    }

    #[test]
    fn explicit_null_reads_as_missing() {
        let doc = doc! { "gone": Bson::Null };
        assert_eq!(get_path(&doc, "gone"), None);
    }

    #[test]
    fn equality_coerces_across_numeric_widths() {
        assert!(value_eq(&Bson::Int32(5), &Bson::Int64(5)));
        assert!(value_eq(&Bson::Double(5.0), &Bson::Int32(5)));
        assert!(value_eq(&Bson::Int64(5), &Bson::String("5".into())));
        assert!(!value_eq(&Bson::Int64(5), &Bson::String("five".into())));
        assert!(!value_eq(&Bson::String("5".into()), &Bson::Boolean(true)));
    }

    #[test]
    fn comparison_handles_mixed_numerics() {
        let gt = |o: Ordering| o == Ordering::Greater;
        assert!(value_cmp(Some(&Bson::Int64(10)), &Bson::Double(9.5), gt));
        assert!(!value_cmp(Some(&Bson::Int64(9)), &Bson::Double(9.5), gt));
        assert!(value_cmp(Some(&Bson::Int64(10)), &Bson::String("9".into()), gt));
        assert!(!value_cmp(Some(&Bson::Int64(10)), &Bson::String("x".into()), gt));
        assert!(!value_cmp(None, &Bson::Int32(1), gt));
        assert!(!value_cmp(Some(&Bson::String("x".into())), &Bson::Int32(1), gt));
    }

    #[test]
    fn field_ordering_puts_nulls_first() {
        assert_eq!(compare_field_values(None, Some(&Bson::Int32(1))), Ordering::Less);
        assert_eq!(
            compare_field_values(Some(&Bson::Null), Some(&Bson::Int32(1))),
            Ordering::Less
        );
        assert_eq!(compare_field_values(None, None), Ordering::Equal);
        assert_eq!(
            compare_field_values(Some(&Bson::Int32(2)), Some(&Bson::Int32(1))),
            Ordering::Greater
        );
    }

    #[test]
    fn text_form_covers_numbers() {
        assert_eq!(value_text(&Bson::Int64(42)), Some("42".to_string()));
        assert_eq!(value_text(&Bson::String("x".into())), Some("x".to_string()));
        assert_eq!(value_text(&Bson::Boolean(true)), None);
    }
}
