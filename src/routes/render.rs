//! HTML for the entry, search and match views
//!
//! Pure functions of view-model snapshots; no state lives here.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::core::{SearchStatus, SearchView};
use crate::models::{DogRecord, Session, SortSpec};

const PLACEHOLDER_IMAGE: &str = "https://place-puppy.com/400x320";

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{} | Fetch Dog Adoption</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn plural(count: u64, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

pub fn entry_page(session: Option<&Session>, error: Option<&str>) -> String {
    let mut body = String::from("<h1>Find Your Perfect Dog</h1>\n");

    if let Some(error) = error {
        let _ = writeln!(body, "<div class=\"alert\" role=\"alert\"><p>{}</p></div>", escape(error));
    }

    if let Some(session) = session {
        let _ = writeln!(
            body,
            "<p>Signed in as {}. <a href=\"/search\">Continue to search</a></p>",
            escape(&session.name)
        );
    }

    body.push_str(
        "<form method=\"post\" action=\"/login\">\n\
         <label>Name <input type=\"text\" name=\"name\" required></label>\n\
         <label>Email <input type=\"email\" name=\"email\" required></label>\n\
         <button type=\"submit\">Log In</button>\n\
         </form>",
    );

    layout("Log In", &body)
}

fn header(session: Option<&Session>, title: &str) -> String {
    let mut out = format!("<header><h1>{}</h1>", escape(title));
    if let Some(session) = session {
        let _ = write!(out, "<span>Hello, {}</span>", escape(&session.name));
    }
    out.push_str("<form method=\"post\" action=\"/logout\"><button type=\"submit\">Logout</button></form></header>\n");
    out
}

fn breed_search_form(breed_term: &str) -> String {
    format!(
        "<form method=\"get\" action=\"/search\">\
         <input type=\"search\" name=\"breed\" value=\"{}\" placeholder=\"Search breeds...\">\
         <button type=\"submit\">Search</button></form>\n",
        escape(breed_term)
    )
}

fn filters_form(view: &SearchView, breeds: &[String]) -> String {
    let filters = &view.filters;
    let mut out = String::from("<form method=\"post\" action=\"/search/filters\">\n");

    out.push_str("<label>Sort By <select name=\"sort\">");
    for (spec, label) in SortSpec::OPTIONS {
        let selected = if spec == filters.sort() { " selected" } else { "" };
        let _ = write!(out, "<option value=\"{}\"{}>{}</option>", spec, selected, escape(label));
    }
    out.push_str("</select></label>\n");

    let _ = write!(
        out,
        "<fieldset><legend>Breeds{}</legend>",
        if filters.breeds().is_empty() {
            " (All Breeds)".to_string()
        } else {
            format!(" ({} selected)", filters.breeds().len())
        }
    );
    // keep selected breeds submitted even when the search box hides them
    for breed in filters.breeds().iter().filter(|b| !breeds.contains(b)) {
        let _ = write!(out, "<input type=\"hidden\" name=\"breeds\" value=\"{}\">", escape(breed));
    }
    if breeds.is_empty() {
        out.push_str("<p>No breeds match your search</p>");
    }
    for breed in breeds {
        let checked = if filters.breeds().contains(breed) { " checked" } else { "" };
        let _ = write!(
            out,
            "<label><input type=\"checkbox\" name=\"breeds\" value=\"{0}\"{1}> {0}</label>",
            escape(breed),
            checked
        );
    }
    out.push_str("</fieldset>\n");

    let age = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<fieldset><legend>Age Range ({} - {})</legend>\
         <input type=\"number\" min=\"0\" name=\"ageMin\" value=\"{}\" placeholder=\"Min\">\
         <input type=\"number\" min=\"0\" name=\"ageMax\" value=\"{}\" placeholder=\"Max\"></fieldset>\n",
        filters.age_min().map(|v| v.to_string()).unwrap_or_else(|| "Any".to_string()),
        filters.age_max().map(|v| v.to_string()).unwrap_or_else(|| "Any".to_string()),
        age(filters.age_min()),
        age(filters.age_max()),
    );

    let zips: Vec<&str> = filters.zip_codes().iter().map(String::as_str).collect();
    let _ = write!(
        out,
        "<fieldset><legend>ZIP Codes ({})</legend>\
         <input type=\"text\" name=\"zipCodes\" value=\"{}\" placeholder=\"60614, 10001\"></fieldset>\n",
        if zips.is_empty() {
            "All Locations".to_string()
        } else {
            format!("{} selected", zips.len())
        },
        escape(&zips.join(", "))
    );

    out.push_str("<button type=\"submit\">Apply Filters</button>\n</form>\n");
    out
}

fn dog_card(dog: &DogRecord, favorite: bool) -> String {
    let img = if dog.img.trim().is_empty() {
        PLACEHOLDER_IMAGE
    } else {
        dog.img.as_str()
    };
    let (label, mark) = if favorite {
        ("Remove from favorites", "&#9829;")
    } else {
        ("Add to favorites", "&#9825;")
    };

    format!(
        "<article class=\"dog\">\
         <img src=\"{img}\" alt=\"Photo of {name}\">\
         <form method=\"post\" action=\"/favorites/{id}\"><button type=\"submit\" aria-label=\"{label}\">{mark}</button></form>\
         <h3>{name}</h3><p>{breed}</p><p>{age} old</p><p>ZIP: {zip}</p>\
         </article>\n",
        img = escape(img),
        name = escape(&dog.name),
        id = urlencoding::encode(&dog.id),
        label = label,
        mark = mark,
        breed = escape(&dog.breed),
        age = plural(dog.age as u64, "year", "years"),
        zip = escape(&dog.zip_code),
    )
}

fn pagination(view: &SearchView) -> String {
    let disabled = |enabled: bool| if enabled { "" } else { " disabled" };
    format!(
        "<nav class=\"pagination\">\
         <form method=\"post\" action=\"/search/page/prev\"><button type=\"submit\"{}>Previous</button></form>\
         <span>Page {}</span>\
         <form method=\"post\" action=\"/search/page/next\"><button type=\"submit\"{}>Next</button></form>\
         </nav>\n",
        disabled(view.has_prev),
        view.page_number,
        disabled(view.has_next),
    )
}

pub fn search_page(
    session: Option<&Session>,
    view: &SearchView,
    favorites: &BTreeSet<String>,
    breed_term: &str,
    breeds: &[String],
) -> String {
    let mut body = header(session, "Find Your Perfect Dog");

    if let Some(notice) = &view.notice {
        let _ = writeln!(
            body,
            "<div class=\"alert\" role=\"alert\"><p>{}</p>\
             <form method=\"post\" action=\"/search/notice/dismiss\"><button type=\"submit\">Dismiss</button></form></div>",
            escape(notice)
        );
    }

    body.push_str("<aside>\n");
    body.push_str(&breed_search_form(breed_term));
    body.push_str(&filters_form(view, breeds));
    let _ = writeln!(
        body,
        "<section><h2>Favorites</h2><p>{} in your favorites</p>\
         <form method=\"get\" action=\"/match\"><button type=\"submit\"{}>Find My Match</button></form></section>",
        plural(favorites.len() as u64, "dog", "dogs"),
        if favorites.is_empty() { " disabled" } else { "" }
    );
    body.push_str("</aside>\n<main>\n");

    match (&view.status, view.dogs.is_empty()) {
        (SearchStatus::Loading, _) | (SearchStatus::Idle, _) => {
            body.push_str("<p>Loading dogs...</p>\n");
        }
        // the banner already explains a failed query
        (SearchStatus::Failed(_), true) => {}
        (_, true) => {
            body.push_str(
                "<div><h2>No dogs found</h2><p>Try adjusting your filters to see more results</p></div>\n",
            );
        }
        (_, false) => {
            let _ = writeln!(body, "<p>Showing {} of {} dogs</p>", view.dogs.len(), view.total);
            body.push_str("<div class=\"grid\">\n");
            for dog in &view.dogs {
                body.push_str(&dog_card(dog, favorites.contains(&dog.id)));
            }
            body.push_str("</div>\n");
            body.push_str(&pagination(view));
        }
    }

    body.push_str("</main>");
    layout("Search", &body)
}

pub fn match_page(session: Option<&Session>, outcome: Result<&DogRecord, &str>) -> String {
    let mut body = header(session, "Your Perfect Match");
    body.push_str("<p><a href=\"/search\">Back to Search</a></p>\n");

    match outcome {
        Ok(dog) => {
            body.push_str("<div class=\"match\"><p>Perfect Match!</p>\n");
            body.push_str(&dog_card(dog, true));
            let _ = write!(
                body,
                "<p>Congratulations! {name} is your perfect match. If this were a real adoption site, \
                 you'd find contact information for the shelter here.</p>\
                 <p><a href=\"https://maps.google.com/?q={zip}\" target=\"_blank\" rel=\"noopener\">View Location</a> \
                 <a href=\"/search\">Continue Searching</a></p></div>",
                name = escape(&dog.name),
                zip = urlencoding::encode(&dog.zip_code),
            );
        }
        Err(message) => {
            let _ = write!(
                body,
                "<div class=\"alert\" role=\"alert\"><p>{}</p></div>\n<p><a href=\"/match\">Try again</a></p>",
                escape(message)
            );
        }
    }

    layout("Match", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterState;

    fn dog(id: &str, age: u32) -> DogRecord {
        DogRecord {
            id: id.to_string(),
            img: format!("https://img.test/{}.jpg", id),
            name: format!("Dog <{}>", id),
            age,
            zip_code: "60614".to_string(),
            breed: "Labrador".to_string(),
        }
    }

    fn ready_view(dogs: Vec<DogRecord>, total: u64, has_next: bool, has_prev: bool) -> SearchView {
        SearchView {
            dogs,
            total,
            has_next,
            has_prev,
            page_number: 1,
            status: SearchStatus::Ready,
            filters: FilterState::default(),
            notice: None,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">Tom & Jerry's</a>"), "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;");
    }

    #[test]
    fn test_search_page_counts_and_disabled_buttons() {
        let view = ready_view(vec![dog("d1", 1), dog("d2", 4)], 2, false, false);
        let html = search_page(None, &view, &BTreeSet::new(), "", &[]);

        assert!(html.contains("Showing 2 of 2 dogs"));
        assert!(html.contains("Previous</button>"));
        assert_eq!(html.matches("<button type=\"submit\" disabled>").count(), 3); // prev, next, match
        assert!(html.contains("1 year old"));
        assert!(html.contains("4 years old"));
        assert!(html.contains("Dog &lt;d1&gt;"));
    }

    #[test]
    fn test_search_page_empty_state() {
        let view = ready_view(vec![], 0, false, false);
        let html = search_page(None, &view, &BTreeSet::new(), "", &[]);
        assert!(html.contains("No dogs found"));
    }

    #[test]
    fn test_favorites_count_and_placeholder() {
        let mut record = dog("d1", 2);
        record.img = String::new();
        let view = ready_view(vec![record], 1, true, false);
        let favorites: BTreeSet<String> = ["d1".to_string()].into_iter().collect();

        let html = search_page(None, &view, &favorites, "", &[]);
        assert!(html.contains("1 dog in your favorites"));
        assert!(html.contains(PLACEHOLDER_IMAGE));
        assert!(html.contains("Remove from favorites"));
    }

    #[test]
    fn test_match_page_links_location_and_search() {
        let html = match_page(None, Ok(&dog("d7", 3)));
        assert!(html.contains("Congratulations! Dog &lt;d7&gt; is your perfect match."));
        assert!(html.contains("href=\"https://maps.google.com/?q=60614\""));
        assert!(html.contains("View Location"));
        assert!(html.contains("Continue Searching"));
    }

    #[test]
    fn test_empty_breed_list_says_so() {
        let view = ready_view(vec![], 0, false, false);
        let html = search_page(None, &view, &BTreeSet::new(), "zzz", &[]);
        assert!(html.contains("No breeds match your search"));

        let html = search_page(None, &view, &BTreeSet::new(), "", &["Beagle".to_string()]);
        assert!(!html.contains("No breeds match your search"));
    }

    #[test]
    fn test_failed_first_query_shows_only_banner() {
        let mut view = ready_view(vec![], 0, false, false);
        view.status = SearchStatus::Failed("Error searching for dogs. Please try again.".to_string());
        view.notice = Some("Error searching for dogs. Please try again.".to_string());

        let html = search_page(None, &view, &BTreeSet::new(), "", &[]);
        assert!(html.contains("Error searching for dogs. Please try again."));
        assert!(!html.contains("No dogs found"));
    }

    #[test]
    fn test_match_page_error_offers_retry() {
        let html = match_page(None, Err(crate::core::matching::MATCH_FAILED));
        assert!(html.contains("Error generating match. Please try again."));
        assert!(html.contains("href=\"/match\""));
    }
}
