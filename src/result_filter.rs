use chrono::{DateTime, Datelike, NaiveDate};

use crate::dataset::Row;

/// Formats tried when a cell is not `DD/MM/YYYY`.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Keeps rows dated within the last calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    column: usize,
    cutoff: NaiveDate,
}

impl DateWindow {
    /// Window ending at `today`, starting on the same month/day one year
    /// earlier. 29 February rolls forward to 1 March of the previous year.
    pub fn ending(today: NaiveDate, column: usize) -> Self {
        DateWindow {
            column,
            cutoff: one_year_before(today),
        }
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    /// Rows with a missing or unparsable date are dropped.
    pub fn keeps(&self, row: &[String]) -> bool {
        row.get(self.column)
            .and_then(|cell| parse_date(cell))
            .map_or(false, |date| date >= self.cutoff)
    }

    pub fn apply(&self, rows: Vec<Row>) -> Vec<Row> {
        rows.into_iter().filter(|row| self.keeps(row)).collect()
    }
}

fn one_year_before(today: NaiveDate) -> NaiveDate {
    let year = today.year() - 1;
    NaiveDate::from_ymd_opt(year, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(today)
}

/// `DD/MM/YYYY` when the cell has exactly three slash-separated parts,
/// otherwise a handful of common textual forms.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }

    let parts: Vec<&str> = cell.split('/').collect();
    if parts.len() == 3 {
        let day = parts[0].trim().parse::<u32>().ok()?;
        let month = parts[1].trim().parse::<u32>().ok()?;
        let year = parts[2].trim().parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(cell) {
        return Some(dt.date_naive());
    }
    FALLBACK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: &str) -> Row {
        vec![date.to_string(), "X".to_string()]
    }

    #[test]
    fn parses_day_first_slashes() {
        assert_eq!(parse_date("01/02/2024"), Some(d(2024, 2, 1)));
        assert_eq!(parse_date(" 9/3/2023 "), Some(d(2023, 3, 9)));
    }

    #[test]
    fn falls_back_to_other_forms() {
        assert_eq!(parse_date("2024-05-06"), Some(d(2024, 5, 6)));
        assert_eq!(parse_date("2024-05-06T10:00:00-04:00"), Some(d(2024, 5, 6)));
        assert_eq!(parse_date("March 5, 2024"), Some(d(2024, 3, 5)));
        assert_eq!(parse_date("5 Mar 2024"), Some(d(2024, 3, 5)));
    }

    #[test]
    fn unparsable_dates_are_none() {
        for bad in ["", "Fecha", "31/02/2024", "ab/cd/efgh", "01/01/2024 10:30", "1/2"] {
            assert_eq!(parse_date(bad), None, "{:?}", bad);
        }
    }

    #[test]
    fn exactly_one_year_back_is_kept() {
        let window = DateWindow::ending(d(2024, 6, 1), 0);
        assert!(window.keeps(&row("01/06/2023")));
        assert!(!window.keeps(&row("31/05/2023")));
    }

    #[test]
    fn leap_day_cutoff_rolls_to_march() {
        let window = DateWindow::ending(d(2024, 2, 29), 0);
        assert_eq!(window.cutoff(), d(2023, 3, 1));
        assert!(window.keeps(&row("01/03/2023")));
        assert!(!window.keeps(&row("28/02/2023")));
    }

    #[test]
    fn calendar_subtraction_not_day_count() {
        // 365 days before 2025-01-01 would be 2024-01-02 (2024 is a leap year).
        let window = DateWindow::ending(d(2025, 1, 1), 0);
        assert!(window.keeps(&row("01/01/2024")));
    }

    #[test]
    fn missing_or_bad_cells_are_dropped() {
        let window = DateWindow::ending(d(2024, 6, 1), 4);
        assert!(!window.keeps(&row("01/01/2024")));
        let window = DateWindow::ending(d(2024, 6, 1), 0);
        assert!(!window.keeps(&row("sin fecha")));
    }

    #[test]
    fn filtering_is_idempotent() {
        let window = DateWindow::ending(d(2024, 6, 1), 0);
        let rows = vec![row("01/01/2024"), row("01/01/2020"), row("junk"), row("2024-05-31")];
        let once = window.apply(rows);
        let twice = window.apply(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
