use reqwest::Url;

use crate::error::AppError;
use crate::models::FilterState;

/// Base used to resolve cursor URLs that come back relative, e.g. `/dogs/search?from=25`
const CURSOR_BASE: &str = "http://cursor.invalid/";

/// Encode filter state as `GET /dogs/search` query parameters
///
/// Breeds and zip codes become repeated `breeds` / `zipCodes` parameters, age
/// bounds appear only when set, `sort` and `size` are always present, and
/// `from` is appended last when paging.
pub fn build_search_query(filters: &FilterState, page_size: u32, from: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(filters.breeds().len() + filters.zip_codes().len() + 5);

    for breed in filters.breeds() {
        params.push(("breeds", breed.clone()));
    }

    for zip in filters.zip_codes() {
        params.push(("zipCodes", zip.clone()));
    }

    if let Some(min) = filters.age_min() {
        params.push(("ageMin", min.to_string()));
    }

    if let Some(max) = filters.age_max() {
        params.push(("ageMax", max.to_string()));
    }

    params.push(("sort", filters.sort().to_string()));
    params.push(("size", page_size.to_string()));

    if let Some(from) = from {
        params.push(("from", from.to_string()));
    }

    params
}

/// Pull the opaque `from` token out of a cursor URL returned by the service
///
/// Everything else in the cursor is discarded; a cursor without `from` cannot be followed.
pub fn extract_from_cursor(cursor: &str) -> Result<String, AppError> {
    let url = Url::parse(CURSOR_BASE)
        .and_then(|base| base.join(cursor))
        .map_err(|e| {
            tracing::warn!("Unparseable cursor {:?}: {}", cursor, e);
            AppError::NoSuchPage
        })?;

    url.query_pairs()
        .find(|(key, _)| key == "from")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(AppError::NoSuchPage)
}

/// Render parameters as a query string, mostly for logging
pub fn to_query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SortDirection, SortField, SortSpec};

    fn count(params: &[(&str, String)], key: &str) -> usize {
        params.iter().filter(|(k, _)| *k == key).count()
    }

    #[test]
    fn test_default_filters_encode_sort_and_size_only() {
        let params = build_search_query(&FilterState::default(), 20, None);
        assert_eq!(
            params,
            vec![("sort", "breed:asc".to_string()), ("size", "20".to_string())]
        );
    }

    #[test]
    fn test_one_parameter_per_breed_and_zip() {
        let mut filters = FilterState::with_sort(SortSpec::new(SortField::Age, SortDirection::Asc));
        filters.set_breeds(["Labrador", "Beagle", "Pug"]);
        filters.set_zip_codes(["60614", "10001"]).unwrap();
        filters.set_age_range(Some(2), None).unwrap();

        let params = build_search_query(&filters, 25, Some("50"));

        assert_eq!(count(&params, "breeds"), 3);
        assert_eq!(count(&params, "zipCodes"), 2);
        assert_eq!(count(&params, "ageMin"), 1);
        assert_eq!(count(&params, "ageMax"), 0);
        assert_eq!(count(&params, "sort"), 1);
        assert_eq!(count(&params, "size"), 1);
        assert_eq!(params.last(), Some(&("from", "50".to_string())));
    }

    #[test]
    fn test_extract_from_relative_cursor() {
        let from = extract_from_cursor("/dogs/search?size=25&from=25&sort=breed:asc").unwrap();
        assert_eq!(from, "25");
    }

    #[test]
    fn test_extract_from_absolute_cursor() {
        let from = extract_from_cursor("https://service.test/dogs/search?from=abc%3D%3D").unwrap();
        assert_eq!(from, "abc==");
    }

    #[test]
    fn test_cursor_without_from_is_no_such_page() {
        assert!(matches!(
            extract_from_cursor("/dogs/search?size=25"),
            Err(AppError::NoSuchPage)
        ));
        assert!(matches!(
            extract_from_cursor("/dogs/search?from="),
            Err(AppError::NoSuchPage)
        ));
    }

    #[test]
    fn test_query_string_encodes_values() {
        let params = vec![("breeds", "Chesapeake Bay Retriever".to_string()), ("sort", "age:asc".to_string())];
        assert_eq!(
            to_query_string(&params),
            "breeds=Chesapeake%20Bay%20Retriever&sort=age%3Aasc"
        );
    }
}
