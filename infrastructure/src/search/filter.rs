use domain::{Document, SearchRequest};
use tracing::trace;

/// Checks a document against every constraint present in `request`.
///
/// Fields are tested in declaration order and the first failing one ends the
/// check. A document without `created` never satisfies a date bound.
pub(crate) fn check_doc_matches_request(doc: &Document, request: &SearchRequest) -> bool {
    if let Some(prefixes) = &request.title_prefixes {
        if !prefixes.iter().any(|prefix| doc.title.starts_with(prefix.as_str())) {
            trace!(title = %doc.title, "Title prefix filter not met");
            return false;
        }
    }

    if let Some(needles) = &request.contains_contents {
        if !needles.iter().any(|needle| doc.content.contains(needle.as_str())) {
            trace!("Content filter not met");
            return false;
        }
    }

    if let Some(author_ids) = &request.author_ids {
        if !author_ids.contains(&doc.author.id) {
            trace!(author_id = %doc.author.id, "Author filter not met");
            return false;
        }
    }

    if let Some(from) = request.created_from {
        if !doc.created.is_some_and(|created| created >= from) {
            trace!("created_from filter not met");
            return false;
        }
    }

    if let Some(to) = request.created_to {
        if !doc.created.is_some_and(|created| created <= to) {
            trace!("created_to filter not met");
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use domain::Author;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 14, 8, 30, 0).unwrap()
    }

    fn doc(title: &str, content: &str, author_id: &str) -> Document {
        Document::new(title, content, Author::new(author_id, "Someone"))
            .with_id(title)
            .with_created(t0())
    }

    #[test]
    fn unconstrained_request_matches() {
        assert!(check_doc_matches_request(
            &doc("Any", "thing", "a1"),
            &SearchRequest::new()
        ));
    }

    #[test]
    fn title_prefixes_are_or_combined() {
        let request = SearchRequest::new().with_title_prefixes(["Banana", "Apple"]);
        assert!(check_doc_matches_request(&doc("Apple pie", "", "a"), &request));
        assert!(check_doc_matches_request(&doc("Banana split", "", "a"), &request));
        assert!(!check_doc_matches_request(&doc("Cherry", "", "a"), &request));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let request = SearchRequest::new().with_title_prefixes(["apple"]);
        assert!(!check_doc_matches_request(&doc("Apple pie", "", "a"), &request));
    }

    #[test]
    fn empty_value_list_matches_nothing() {
        let request = SearchRequest::new().with_contains_contents(Vec::<String>::new());
        assert!(!check_doc_matches_request(&doc("T", "body", "a"), &request));
    }

    #[test]
    fn content_needle_matches_anywhere() {
        let request = SearchRequest::new().with_contains_contents(["missing", "dle of"]);
        assert!(check_doc_matches_request(
            &doc("T", "in the middle of it", "a"),
            &request
        ));
    }

    #[test]
    fn author_ids_require_exact_membership() {
        let request = SearchRequest::new().with_author_ids(["a1", "a2"]);
        assert!(check_doc_matches_request(&doc("T", "", "a2"), &request));
        assert!(!check_doc_matches_request(&doc("T", "", "a"), &request));
        assert!(!check_doc_matches_request(&doc("T", "", "a10"), &request));
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let d = doc("T", "", "a");
        let exact = SearchRequest::new()
            .with_created_from(t0())
            .with_created_to(t0());
        assert!(check_doc_matches_request(&d, &exact));

        let later = SearchRequest::new().with_created_from(t0() + Duration::seconds(1));
        assert!(!check_doc_matches_request(&d, &later));

        let earlier = SearchRequest::new().with_created_to(t0() - Duration::seconds(1));
        assert!(!check_doc_matches_request(&d, &earlier));
    }

    #[test]
    fn missing_created_fails_date_bounds_only() {
        let mut d = doc("T", "", "a");
        d.created = None;
        assert!(check_doc_matches_request(
            &d,
            &SearchRequest::new().with_title_prefixes(["T"])
        ));
        assert!(!check_doc_matches_request(
            &d,
            &SearchRequest::new().with_created_to(t0())
        ));
    }

    #[test]
    fn fields_are_and_combined() {
        let request = SearchRequest::new()
            .with_title_prefixes(["Report"])
            .with_author_ids(["a1"]);
        assert!(check_doc_matches_request(&doc("Report A", "", "a1"), &request));
        assert!(!check_doc_matches_request(&doc("Report A", "", "a2"), &request));
        assert!(!check_doc_matches_request(&doc("Memo", "", "a1"), &request));
    }
}
