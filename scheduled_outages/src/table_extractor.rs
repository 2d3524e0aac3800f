//! Extraction of daily schedules from the source's HTML page.
//!
//! The page layout is a contract: the first table on the page, two header
//! rows, then one row per day with the date in the first column and one
//! column per queue in the deployment-defined order.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use shared_kernel::queues::QUEUES;
use thiserror::Error;

use crate::contracts::DailySchedule;
use crate::hours::parse_hours;

/// Rows above the first data row (a title row and a queue-number row).
const HEADER_ROWS: usize = 2;

lazy_static! {
    static ref DATE_SHAPE: Regex =
        Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("DATE_SHAPE regex to compile");
    static ref BR_TAGS: Regex = Regex::new(r"(?i)<br\s*/?>").expect("BR_TAGS regex to compile");
    static ref OTHER_TAGS: Regex = Regex::new(r"<[^>]+>").expect("OTHER_TAGS regex to compile");
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no schedule table found in the document")]
    NoScheduleTable,
}

/// Parses the document into one `DailySchedule` per qualifying row.
/// Rows that do not carry a `dd.mm.yyyy` date or have too few cells are
/// skipped; only a missing table is an error.
pub fn extract(document: &str) -> Result<Vec<DailySchedule>, ExtractError> {
    let document = Html::parse_document(document);
    let table_selector = Selector::parse("table").expect("table selector to compile");
    let row_selector = Selector::parse("tr").expect("tr selector to compile");
    let cell_selector = Selector::parse("td").expect("td selector to compile");

    let table = document
        .select(&table_selector)
        .next()
        .ok_or(ExtractError::NoScheduleTable)?;

    let mut schedules = Vec::new();
    for row in table.select(&row_selector).skip(HEADER_ROWS) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.len() < QUEUES.len() + 1 {
            continue;
        }

        let date = cells[0].text().collect::<String>().trim().to_string();
        if !DATE_SHAPE.is_match(&date) {
            continue;
        }

        let mut schedule = DailySchedule::new(date);
        for (queue, cell) in QUEUES.iter().zip(cells.iter().skip(1)) {
            let raw = cell_text_with_breaks(cell);
            schedule.set_queue_hours(*queue, parse_hours(&raw));
        }
        schedules.push(schedule);
    }

    Ok(schedules)
}

/// Number of rows in the first table, used by connectivity diagnostics.
/// `None` when the document has no table at all.
pub fn table_row_count(document: &str) -> Option<usize> {
    let document = Html::parse_document(document);
    let table_selector = Selector::parse("table").expect("table selector to compile");
    let row_selector = Selector::parse("tr").expect("tr selector to compile");

    document
        .select(&table_selector)
        .next()
        .map(|table| table.select(&row_selector).count())
}

/// Cell content with soft line breaks preserved as newlines, so ranges
/// split across `<br>` tags are not glued into one token before parsing.
fn cell_text_with_breaks(cell: &ElementRef) -> String {
    let html = cell.inner_html();
    let with_breaks = BR_TAGS.replace_all(&html, "\n");
    let stripped = OTHER_TAGS.replace_all(&with_breaks, "");
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::{extract, table_row_count, ExtractError};

    fn page_with_rows(rows: &str) -> String {
        format!(
            r#"<html><body>
            <table>
              <tr><th colspan="13">Графіки погодинних відключень</th></tr>
              <tr><th>Дата</th><th>1.1</th><th>1.2</th><th>2.1</th><th>2.2</th>
                  <th>3.1</th><th>3.2</th><th>4.1</th><th>4.2</th>
                  <th>5.1</th><th>5.2</th><th>6.1</th><th>6.2</th></tr>
              {rows}
            </table>
            </body></html>"#
        )
    }

    fn data_row(date: &str, cell: &str) -> String {
        let cells: String = std::iter::repeat(format!("<td>{cell}</td>"))
            .take(12)
            .collect();
        format!("<tr><td>{date}</td>{cells}</tr>")
    }

    #[test]
    fn extracts_one_schedule_per_dated_row() {
        let page = page_with_rows(&format!(
            "{}{}",
            data_row("16.01.2026", "08:00 - 12:00"),
            data_row("17.01.2026", "")
        ));

        let schedules = extract(&page).unwrap();
        assert_eq!(schedules.len(), 2);

        let first = &schedules[0];
        assert_eq!(first.date(), "16.01.2026");
        assert_eq!(
            first.hours_for_queue("1.1"),
            Some(&["08:00 - 12:00".to_string()][..])
        );
        assert_eq!(first.hours_for_queue("6.2").map(<[_]>::len), Some(1));

        // A present-but-empty cell is a confirmed "no outage", not pending.
        assert_eq!(schedules[1].hours_for_queue("1.1"), Some(&[][..]));
    }

    #[test]
    fn soft_line_breaks_keep_ranges_apart() {
        let page = page_with_rows(&data_row("16.01.2026", "08:00 - 12:00<br>20:00 - 23:59"));

        let schedules = extract(&page).unwrap();
        assert_eq!(
            schedules[0].hours_for_queue("3.2"),
            Some(&["08:00 - 12:00".to_string(), "20:00 - 23:59".to_string()][..])
        );
    }

    #[test]
    fn nested_markup_is_stripped_before_parsing() {
        let page = page_with_rows(&data_row(
            "16.01.2026",
            "<span><b>08:00</b> - 12:00</span>",
        ));

        let schedules = extract(&page).unwrap();
        assert_eq!(
            schedules[0].hours_for_queue("1.1"),
            Some(&["08:00 - 12:00".to_string()][..])
        );
    }

    #[test]
    fn rows_without_a_date_are_skipped() {
        let page = page_with_rows(&format!(
            "{}{}",
            data_row("Завтра", "08:00 - 12:00"),
            data_row("16.01.2026", "08:00 - 12:00")
        ));

        let schedules = extract(&page).unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].date(), "16.01.2026");
    }

    #[test]
    fn short_rows_are_skipped() {
        let page = page_with_rows("<tr><td>16.01.2026</td><td>08:00 - 12:00</td></tr>");
        assert!(extract(&page).unwrap().is_empty());
    }

    #[test]
    fn missing_table_is_a_structural_error() {
        let err = extract("<html><body><p>technical works</p></body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::NoScheduleTable));
    }

    #[test]
    fn row_count_reflects_first_table() {
        let page = page_with_rows(&data_row("16.01.2026", ""));
        assert_eq!(table_row_count(&page), Some(3));
        assert_eq!(table_row_count("<html><body></body></html>"), None);
    }
}
