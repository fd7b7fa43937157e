use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use wreq::header::REFERER;
use wreq_util::Emulation;

use crate::{error::AppResult, models::RawRow};

pub fn build_client() -> AppResult<wreq::Client> {
    let client = wreq::Client::builder()
        .emulation(Emulation::Chrome131)
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

pub async fn fetch_listing_html(client: &wreq::Client, url: &str) -> AppResult<String> {
    debug!(url = %url, "fetching listing page");
    let html = client
        .get(url)
        .header(REFERER, "https://www.criterion.com/")
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(html)
}

/// Rows extracted from a listing page, plus how many rows were dropped for
/// lacking a title or poster.
#[derive(Debug, Default)]
pub struct Listing {
    pub rows: Vec<RawRow>,
    pub gaps: usize,
}

pub fn parse_listing(html: &str) -> Listing {
    let doc = Html::parse_document(html);
    let row_selector = Selector::parse("tr.gridFilm").unwrap();
    let title_selector = Selector::parse("td.g-title").unwrap();
    let img_selector = Selector::parse("td.g-img img").unwrap();
    let year_selector = Selector::parse("td.g-year").unwrap();
    let director_selector = Selector::parse("td.g-director").unwrap();
    let country_selector = Selector::parse("td.g-country").unwrap();

    let mut listing = Listing::default();

    for el in doc.select(&row_selector) {
        let title = cell_text(el, &title_selector).filter(|t| !t.is_empty());
        let poster = el
            .select(&img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty());

        let (Some(title), Some(poster)) = (title, poster) else {
            let snippet = el.html();
            warn!(html = %truncate(&snippet, 120), "skipped row: missing title or poster");
            listing.gaps += 1;
            continue;
        };

        listing.rows.push(RawRow {
            title,
            poster: poster.to_string(),
            year: cell_text(el, &year_selector).unwrap_or_default(),
            director: cell_text(el, &director_selector).unwrap_or_default(),
            country: cell_text(el, &country_selector).unwrap_or_default(),
        });
    }

    debug!(rows = listing.rows.len(), gaps = listing.gaps, "parsed listing page");
    listing
}

fn cell_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector).next().map(|cell| cell.text().collect::<String>().trim().to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body><table>
          <tr class="gridFilm">
            <td class="g-img"><img src="http://x/p.jpg"></td>
            <td class="g-title"><p>Seven Samurai (4K Restoration)</p></td>
            <td class="g-director">Akira Kurosawa</td>
            <td class="g-country">Japan,</td>
            <td class="g-year">1954 re-release</td>
          </tr>
          <tr class="gridFilm">
            <td class="g-img"><img src=""></td>
            <td class="g-title">No Poster</td>
            <td class="g-year">1999</td>
          </tr>
          <tr class="gridFilm">
            <td class="g-img"><img src="http://x/q.jpg"></td>
            <td class="g-title">  </td>
          </tr>
          <tr class="gridFilm">
            <td class="g-img"><img src="http://x/r.jpg"></td>
            <td class="g-title">Fallen Angels</td>
            <td class="g-year">1995</td>
          </tr>
          <tr class="other"><td class="g-title">Not a film</td></tr>
        </table></body></html>
    "#;

    #[test]
    fn extracts_rows_and_counts_gaps() {
        let listing = parse_listing(PAGE);

        assert_eq!(listing.gaps, 2);
        assert_eq!(listing.rows.len(), 2);

        let first = &listing.rows[0];
        assert_eq!(first.title, "Seven Samurai (4K Restoration)");
        assert_eq!(first.poster, "http://x/p.jpg");
        assert_eq!(first.year, "1954 re-release");
        assert_eq!(first.director, "Akira Kurosawa");
        assert_eq!(first.country, "Japan,");
    }

    #[test]
    fn optional_cells_default_to_empty() {
        let listing = parse_listing(PAGE);
        let second = &listing.rows[1];
        assert_eq!(second.title, "Fallen Angels");
        assert_eq!(second.director, "");
        assert_eq!(second.country, "");
    }

    #[test]
    fn empty_page_has_no_rows() {
        let listing = parse_listing("<html><body></body></html>");
        assert!(listing.rows.is_empty());
        assert_eq!(listing.gaps, 0);
    }
}
