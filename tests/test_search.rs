//! Search boundary: term search, field search and error handling.

mod common;

use car_catalog::domain::Paging;
use car_catalog::search::service::{search_by_fields, search_by_term};
use car_catalog::search::CarSearchTerms;
use common::{document, FailingIndex, InMemoryIndex};

fn civic_index() -> InMemoryIndex {
    InMemoryIndex::with_docs(vec![document(
        1,
        2020,
        (7, "civic"),
        (1, "honda"),
        (1, "sedan"),
        (3, "blue"),
    )])
}

#[tokio::test]
async fn term_prefix_matches_flattened_make() {
    let index = civic_index();

    let page = search_by_term(&index, "hond", Paging::default()).await;
    assert_eq!(page.total, 1);
    let car = &page.results[0];
    assert_eq!(car.id, 1);
    assert_eq!(car.model.name, "civic");
    assert_eq!(car.model.make.as_ref().unwrap().name, "honda");
    assert_eq!(car.color.name, "blue");

    let page = search_by_term(&index, "toyota", Paging::default()).await;
    assert_eq!(page.total, 0);
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn term_search_is_case_insensitive_and_covers_year() {
    let index = civic_index();
    assert_eq!(search_by_term(&index, "CIV", Paging::default()).await.total, 1);
    assert_eq!(search_by_term(&index, "202", Paging::default()).await.total, 1);
}

#[tokio::test]
async fn blank_term_lists_everything() {
    let index = InMemoryIndex::with_docs(vec![
        document(1, 2020, (7, "civic"), (1, "honda"), (1, "sedan"), (3, "blue")),
        document(2, 2019, (8, "mustang"), (2, "ford"), (2, "coupe"), (4, "red")),
    ]);

    for term in ["", "   "] {
        let page = search_by_term(&index, term, Paging::default()).await;
        assert_eq!(page.total, 2);
    }
    assert_eq!(
        index.calls(),
        vec!["match_all".to_string(), "match_all".to_string()]
    );
}

#[tokio::test]
async fn paging_limits_results_but_not_total() {
    let index = InMemoryIndex::with_docs(
        (1..=5)
            .map(|id| document(id, 2020, (7, "civic"), (1, "honda"), (1, "sedan"), (3, "blue")))
            .collect(),
    );

    let page = search_by_term(&index, "honda", Paging::new(3, 2)).await;
    assert_eq!(page.total, 5);
    let ids: Vec<i64> = page.results.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![4, 5]);
}

#[tokio::test]
async fn field_search_matches_any_given_field() {
    let index = InMemoryIndex::with_docs(vec![
        document(1, 2020, (7, "civic"), (1, "honda"), (1, "sedan"), (3, "blue")),
        document(2, 2019, (8, "mustang"), (2, "ford"), (2, "coupe"), (4, "red")),
        document(3, 2018, (9, "golf"), (3, "volkswagen"), (3, "hatchback"), (5, "white")),
    ]);

    let terms = CarSearchTerms {
        make: Some("ford".into()),
        color: Some("blu".into()),
        ..Default::default()
    };
    let page = search_by_fields(&index, &terms, Paging::default()).await;
    let ids: Vec<i64> = page.results.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);

    let terms = CarSearchTerms {
        year: Some(2018),
        ..Default::default()
    };
    let page = search_by_fields(&index, &terms, Paging::default()).await;
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].id, 3);
}

#[tokio::test]
async fn index_failure_yields_empty_page() {
    let index = FailingIndex::default();

    let page = search_by_term(&index, "honda", Paging::default()).await;
    assert_eq!(page.total, 0);
    assert!(page.results.is_empty());

    let page = search_by_fields(&index, &CarSearchTerms::default(), Paging::default()).await;
    assert_eq!(page.total, 0);
    assert_eq!(index.attempts(), 2);
}
