// Unit tests for Pawmatch

use pawmatch::core::query::to_query_string;
use pawmatch::core::FavoritesTracker;
use pawmatch::services::{FileStorage, SessionStore, Storage};
use pawmatch::{build_search_query, extract_from_cursor, AppError, FilterState, Session, SortSpec};
use std::sync::Arc;

fn values<'a>(params: &'a [(&str, String)], key: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

#[test]
fn test_default_query_has_only_sort_and_size() {
    let params = build_search_query(&FilterState::default(), 20, None);
    assert_eq!(
        params,
        vec![("sort", "breed:asc".to_string()), ("size", "20".to_string())]
    );
}

#[test]
fn test_one_parameter_per_selected_breed() {
    let mut filters = FilterState::default();
    filters.set_breeds(["Pug", "Beagle", "Labrador"]);

    let params = build_search_query(&filters, 20, None);
    assert_eq!(values(&params, "breeds"), vec!["Beagle", "Labrador", "Pug"]);
}

#[test]
fn test_age_bounds_only_when_set() {
    let mut filters = FilterState::default();
    filters.set_age_range(Some(3), None).unwrap();

    let params = build_search_query(&filters, 20, None);
    assert_eq!(values(&params, "ageMin"), vec!["3"]);
    assert!(values(&params, "ageMax").is_empty());
}

#[test]
fn test_zip_codes_repeat() {
    let mut filters = FilterState::default();
    filters.set_zip_codes(["60614", " 10001 ", ""]).unwrap();

    let params = build_search_query(&filters, 20, None);
    assert_eq!(values(&params, "zipCodes"), vec!["10001", "60614"]);
}

#[test]
fn test_from_comes_last() {
    let filters = FilterState::with_sort("name:desc".parse().unwrap());
    let params = build_search_query(&filters, 25, Some("50"));

    assert_eq!(params.last().unwrap(), &("from", "50".to_string()));
    assert_eq!(values(&params, "sort"), vec!["name:desc"]);
    assert_eq!(values(&params, "size"), vec!["25"]);
}

#[test]
fn test_query_string_is_encoded() {
    let mut filters = FilterState::default();
    filters.set_breeds(["Chesapeake Bay Retriever"]);

    let query = to_query_string(&build_search_query(&filters, 20, None));
    assert_eq!(query, "breeds=Chesapeake%20Bay%20Retriever&sort=breed%3Aasc&size=20");
}

#[test]
fn test_cursor_extraction() {
    assert_eq!(
        extract_from_cursor("/dogs/search?size=25&from=25&sort=breed:asc").unwrap(),
        "25"
    );
    assert_eq!(
        extract_from_cursor("https://frontend-take-home-service.fetch.com/dogs/search?from=50").unwrap(),
        "50"
    );
    assert!(matches!(
        extract_from_cursor("/dogs/search?size=25"),
        Err(AppError::NoSuchPage)
    ));
    assert!(matches!(extract_from_cursor("/dogs/search?from="), Err(AppError::NoSuchPage)));
}

#[test]
fn test_sort_options_round_trip_through_text() {
    for (spec, label) in SortSpec::OPTIONS {
        assert!(!label.is_empty());
        assert_eq!(spec.to_string().parse::<SortSpec>().unwrap(), spec);
    }
    assert!(matches!("zip:asc".parse::<SortSpec>(), Err(AppError::InvalidFilter(_))));
}

#[test]
fn test_invalid_age_range_leaves_filters_unchanged() {
    let mut filters = FilterState::default();
    filters.set_age_range(Some(1), Some(4)).unwrap();

    assert!(filters.set_age_range(Some(8), Some(2)).is_err());
    assert_eq!(filters.age_min(), Some(1));
    assert_eq!(filters.age_max(), Some(4));
}

#[test]
fn test_file_storage_survives_restart() {
    let path = std::env::temp_dir().join(format!("pawmatch-unit-{}.json", uuid::Uuid::new_v4()));

    {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&path));
        SessionStore::new(storage.clone())
            .save(&Session::new("Ada", "ada@example.com"))
            .unwrap();
        let favorites = FavoritesTracker::load(storage);
        tokio_test::block_on(async {
            assert!(favorites.toggle("d1").await.unwrap());
            assert!(favorites.toggle("d2").await.unwrap());
            assert!(!favorites.toggle("d1").await.unwrap());
        });
    }

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&path));
    let session = SessionStore::new(storage.clone()).load().unwrap();
    assert_eq!(session.name, "Ada");

    let favorites = FavoritesTracker::load(storage);
    let ids = tokio_test::block_on(favorites.snapshot());
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["d2".to_string()]);

    let _ = std::fs::remove_file(&path);
}
