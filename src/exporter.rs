use std::fs;
use std::path::Path;

use log::info;
use rust_xlsxwriter::Workbook;

use crate::dataset::AccumulatedDataset;
use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// `.csv` writes CSV; anything else is a workbook.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Xlsx,
        }
    }
}

/// Write the finished dataset to `path`, replacing any existing file.
pub fn export(dataset: &AccumulatedDataset, path: &Path, sheet_name: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match ExportFormat::from_path(path) {
        ExportFormat::Xlsx => write_xlsx(dataset, path, sheet_name)?,
        ExportFormat::Csv => write_csv(dataset, path)?,
    }

    info!(
        "Exported {} rows (+{} header) to {:?}",
        dataset.len(),
        usize::from(dataset.has_header()),
        path
    );
    Ok(())
}

fn write_xlsx(dataset: &AccumulatedDataset, path: &Path, sheet_name: &str) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (r, row) in dataset.to_rows().iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (row, col) = cell_position(r, c)?;
            sheet.write_string(row, col, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn cell_position(row: usize, col: usize) -> Result<(u32, u16), ExportError> {
    match (u32::try_from(row), u16::try_from(col)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(ExportError::OutOfRange { row, col }),
    }
}

fn write_csv(dataset: &AccumulatedDataset, path: &Path) -> Result<(), ExportError> {
    // Rows may differ in length if the host table changed shape mid-run.
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in dataset.to_rows() {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Reader, Xlsx};

    fn sample() -> AccumulatedDataset {
        let mut ds = AccumulatedDataset::new();
        ds.capture_header(vec!["Fecha".into(), "Tipo".into()]);
        ds.append(vec![vec!["01/01/2024".into(), "A".into()]]);
        ds
    }

    #[test]
    fn xlsx_has_one_named_sheet_with_header_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        export(&sample(), &path, "Resultados").unwrap();

        let mut book: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(book.sheet_names(), vec!["Resultados".to_string()]);
        let range = book.worksheet_range("Resultados").unwrap();
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        assert_eq!(rows, vec![vec!["Fecha", "Tipo"], vec!["01/01/2024", "A"]]);
    }

    #[test]
    fn csv_chosen_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        export(&sample(), &path, "Resultados").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Fecha,Tipo\n01/01/2024,A\n");
    }

    #[test]
    fn overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        export(&sample(), &path, "Resultados").unwrap();
        export(&AccumulatedDataset::new(), &path, "Resultados").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn cell_positions_never_wrap() {
        assert_eq!(cell_position(3, 2).unwrap(), (3, 2));
        assert_eq!(cell_position(0, 65_535).unwrap(), (0, 65_535));
        assert!(matches!(
            cell_position(0, 65_536),
            Err(ExportError::OutOfRange { row: 0, col: 65_536 })
        ));
    }

    #[test]
    fn empty_dataset_still_writes_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        export(&AccumulatedDataset::new(), &path, "Resultados").unwrap();
        assert!(path.exists());
    }
}
