use anyhow::Result;
use axum::{Router, http::StatusCode, routing::get};

use gleaner::FailureKind;
use gleaner::directory::{DirectoryScraper, StaffRecord, parse_staff};

mod common;
use common::*;

const CONTAINER: &str = "div.text-only";

const STAFF_PAGE: &str = r#"<html><body>
<div class="header"><p>Welcome, visitor</p><p>ignored</p></div>
<div class="text-only">
  <p>  Ada Lovelace ,  Professor of Computing </p>
  <p> ada@example.edu | 555-0100 </p>
  <p>Alan Turing, Lecturer</p>
  <p><a href="mailto:alan@example.edu">alan@example.edu</a></p>
</div>
</body></html>"#;

fn staff(name: &str, title: &str, contact: &str) -> StaffRecord {
    StaffRecord {
        name: name.to_string(),
        title: title.to_string(),
        contact_info: contact.to_string(),
    }
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_well_formed_pairs_yield_trimmed_records() {
        let records = parse_staff(STAFF_PAGE, CONTAINER).unwrap();
        assert_eq!(
            records,
            vec![
                staff("Ada Lovelace", "Professor of Computing", "ada@example.edu | 555-0100"),
                staff("Alan Turing", "Lecturer", "alan@example.edu"),
            ]
        );
    }

    #[test]
    fn test_n_pairs_yield_n_records() {
        let mut html = String::from(r#"<div class="text-only">"#);
        for i in 0..7 {
            html.push_str(&format!("<p>Person {i}, Title {i}</p><p>person{i}@example.edu</p>"));
        }
        html.push_str("</div>");
        let records = parse_staff(&html, CONTAINER).unwrap();
        assert_eq!(records.len(), 7);
        for r in &records {
            assert!(!r.name.is_empty());
            assert!(!r.title.is_empty());
            assert!(!r.contact_info.is_empty());
        }
        assert_eq!(records[6], staff("Person 6", "Title 6", "person6@example.edu"));
    }

    #[test]
    fn test_paragraph_without_comma_is_skipped() {
        let html = r#"<div class="text-only">
            <p>Dr. Jane Smith</p>
            <p>Grace Hopper, Dean</p>
            <p>grace@example.edu</p>
        </div>"#;
        let records = parse_staff(html, CONTAINER).unwrap();
        assert_eq!(records, vec![staff("Grace Hopper", "Dean", "grace@example.edu")]);
    }

    #[test]
    fn test_paragraph_with_two_commas_is_skipped() {
        let html = r#"<div class="text-only">
            <p>Smith, Jane, PhD</p>
            <p>Barbara Liskov, Professor</p>
            <p>liskov@example.edu</p>
        </div>"#;
        let records = parse_staff(html, CONTAINER).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Barbara Liskov");
    }

    #[test]
    fn test_contact_paragraph_is_not_reused_as_header() {
        let html = r#"<div class="text-only">
            <p>Edsger Dijkstra, Professor</p>
            <p>Room 12, Building B</p>
            <p>Tony Hoare, Fellow</p>
            <p>hoare@example.edu</p>
        </div>"#;
        let records = parse_staff(html, CONTAINER).unwrap();
        assert_eq!(
            records,
            vec![
                staff("Edsger Dijkstra", "Professor", "Room 12, Building B"),
                staff("Tony Hoare", "Fellow", "hoare@example.edu"),
            ]
        );
    }

    #[test]
    fn test_trailing_header_without_contact_is_dropped() {
        let html = r#"<div class="text-only">
            <p>Ken Thompson, Engineer</p>
            <p>ken@example.edu</p>
            <p>Dennis Ritchie, Engineer</p>
        </div>"#;
        let records = parse_staff(html, CONTAINER).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ken Thompson");
    }

    #[test]
    fn test_missing_container_is_shape_failure() {
        let err = parse_staff("<html><body><p>A, B</p><p>c</p></body></html>", CONTAINER)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Shape);
    }

    #[test]
    fn test_container_without_entries_is_empty() {
        let err = parse_staff(r#"<div class="text-only"><p>Nothing here</p></div>"#, CONTAINER)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Empty);
    }

    #[test]
    fn test_custom_container() {
        let html = r#"<section id="people"><p>Linus Torvalds, Maintainer</p><p>linus@example.org</p></section>"#;
        let records = parse_staff(html, "section#people").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_invalid_selector_is_config_failure() {
        let err = parse_staff(STAFF_PAGE, "div[").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Config);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(staff("a", "b", "c")).unwrap();
        assert_eq!(json["contactInfo"], "c");
        assert_eq!(json["name"], "a");
    }
}

#[tokio::test]
async fn test_scrape_fetches_and_parses() -> Result<()> {
    let base = serve(Router::new().route("/staff", get(|| async { STAFF_PAGE }))).await;
    let scraper = DirectoryScraper::with_fetcher(format!("{base}/staff"), test_fetcher())
        .with_container(CONTAINER);

    let records = scraper.scrape().await?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].title, "Lecturer");
    Ok(())
}

#[tokio::test]
async fn test_scrape_non_200_is_status_failure() {
    let base = serve(Router::new().route(
        "/staff",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    ))
    .await;
    let scraper = DirectoryScraper::with_fetcher(format!("{base}/staff"), test_fetcher());

    let err = scraper.scrape().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Status);
}

#[tokio::test]
async fn test_scrape_missing_page_is_not_found() {
    let base = serve(Router::new()).await;
    let scraper = DirectoryScraper::with_fetcher(format!("{base}/nope"), test_fetcher());

    let err = scraper.scrape().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);
}

#[tokio::test]
async fn test_scrape_unreachable_host_is_transport_failure() {
    let base = dead_url().await;
    let scraper = DirectoryScraper::with_fetcher(format!("{base}/staff"), test_fetcher());

    let err = scraper.scrape().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
    assert!(err.is_transport());
}
