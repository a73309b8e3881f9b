//! Canonical ordering for nested groups.
//!
//! The store keeps no ordering guarantee for nested collections, so every
//! document is normalized before it is written and again after it is read.

use super::entities::Document;

/// Reorder `document.groups` by descending sort key.
///
/// The sort is stable: groups sharing a sort key keep their input order.
/// Nothing else on the document is touched, and applying it twice is the same
/// as applying it once.
pub fn normalize_document(document: &mut Document) {
    if document.groups.len() <= 1 {
        return;
    }

    document
        .groups
        .sort_by(|left, right| right.sort.cmp(&left.sort));
}

pub fn normalize_documents(documents: &mut [Document]) {
    for document in documents {
        normalize_document(document);
    }
}

/// Whether groups are already in canonical order.
pub fn is_normalized(document: &Document) -> bool {
    document
        .groups
        .windows(2)
        .all(|pair| pair[0].sort >= pair[1].sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Entry, Group};

    fn group(sort: i32, name: &str) -> Group {
        Group {
            sort,
            name: name.to_string(),
            internal_note: String::new(),
            entries: Vec::new(),
        }
    }

    fn names(document: &Document) -> Vec<&str> {
        document.groups.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn orders_groups_by_descending_sort() {
        let mut document = Document {
            title: "doc".into(),
            groups: vec![group(1, "b"), group(5, "a")],
            ..Default::default()
        };

        normalize_document(&mut document);

        assert_eq!(names(&document), vec!["a", "b"]);
        assert_eq!(document.groups[0].sort, 5);
        assert_eq!(document.groups[1].sort, 1);
    }

    #[test]
    fn equal_sort_keys_keep_input_order() {
        let mut document = Document {
            groups: vec![group(3, "x"), group(3, "y")],
            ..Default::default()
        };

        normalize_document(&mut document);

        assert_eq!(names(&document), vec!["x", "y"]);
    }

    #[test]
    fn stable_across_mixed_keys() {
        let mut document = Document {
            groups: vec![
                group(2, "p"),
                group(7, "q"),
                group(2, "r"),
                group(-1, "s"),
                group(7, "t"),
            ],
            ..Default::default()
        };

        normalize_document(&mut document);

        assert_eq!(names(&document), vec!["q", "t", "p", "r", "s"]);
        assert!(is_normalized(&document));
    }

    #[test]
    fn normalizing_twice_matches_once() {
        let mut once = Document {
            groups: vec![group(0, "a"), group(9, "b"), group(0, "c"), group(4, "d")],
            ..Default::default()
        };
        normalize_document(&mut once);

        let mut twice = once.clone();
        normalize_document(&mut twice);

        assert_eq!(once, twice);
    }

    #[test]
    fn leaves_other_fields_untouched() {
        let mut document = Document {
            id: 11,
            title: "title".into(),
            internal_note: "note".into(),
            groups: vec![
                Group {
                    sort: 1,
                    name: "low".into(),
                    internal_note: "g".into(),
                    entries: vec![Entry {
                        key: "k".into(),
                        value: "v".into(),
                        internal_note: "e".into(),
                    }],
                },
                group(2, "high"),
            ],
        };

        normalize_document(&mut document);

        assert_eq!(document.id, 11);
        assert_eq!(document.title, "title");
        assert_eq!(document.internal_note, "note");
        assert_eq!(document.groups[1].entries[0].key, "k");
        assert_eq!(document.groups[1].internal_note, "g");
    }

    #[test]
    fn normalizes_every_document_in_a_slice() {
        let mut documents = vec![
            Document {
                groups: vec![group(1, "a"), group(2, "b")],
                ..Default::default()
            },
            Document {
                groups: vec![group(0, "c"), group(8, "d")],
                ..Default::default()
            },
        ];

        normalize_documents(&mut documents);

        assert!(documents.iter().all(is_normalized));
    }
}
