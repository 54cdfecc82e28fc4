//! Serialization of the canonical table into interchange formats.
//!
//! Both exporters are pure functions of the table: no caching, no side
//! effects beyond producing a byte buffer. The presentation layer offers the
//! buffers as downloads named by [`csv_filename`]/[`xlsx_filename`] with the
//! [`CSV_MIME`]/[`XLSX_MIME`] content types.

use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::errors::ExportError;
use crate::models::{PriceHistory, Symbol, COLUMNS};

/// MIME type for the CSV download.
pub const CSV_MIME: &str = "text/csv";

/// MIME type for the XLSX download (Office Open XML spreadsheet).
pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download filename for the CSV export.
pub fn csv_filename(symbol: &Symbol) -> String {
    format!("{}_CleanedHistoricalData.csv", symbol)
}

/// Download filename for the XLSX export.
pub fn xlsx_filename(symbol: &Symbol) -> String {
    format!("{}_CleanedHistoricalData.xlsx", symbol)
}

/// Serialize the table as UTF-8 CSV bytes.
///
/// Header row is exactly the canonical column names; dates are `yyyy-mm-dd`;
/// unknown prices become empty fields.
pub fn to_csv(history: &PriceHistory) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for bar in &history.bars {
        writer.write_record(&[
            bar.date.format("%Y-%m-%d").to_string(),
            decimal_field(bar.open),
            decimal_field(bar.high),
            decimal_field(bar.low),
            decimal_field(bar.close),
            decimal_field(bar.adj_close),
            bar.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    debug!("Exported {} bars as {} CSV bytes", history.len(), bytes.len());
    Ok(bytes)
}

fn decimal_field(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// Serialize the table as a formatted XLSX byte stream.
///
/// Single sheet named "Data": column A is date-formatted (`yyyy-mm-dd`),
/// columns B-F are decimals with thousands separators and 2 fraction digits,
/// column G is an integer with thousands separators. Widths match the
/// reference layout but are cosmetic.
pub fn to_xlsx(history: &PriceHistory) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let price_format = Format::new().set_num_format("#,##0.00");
    let volume_format = Format::new().set_num_format("#,##0");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Data")?;
    for col in 0..=5u16 {
        worksheet.set_column_width(col, 12)?;
    }
    worksheet.set_column_width(6, 15)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (i, bar) in history.bars.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_datetime_with_format(row, 0, bar.date, &date_format)?;
        write_price(worksheet, row, 1, bar.open, &price_format)?;
        write_price(worksheet, row, 2, bar.high, &price_format)?;
        write_price(worksheet, row, 3, bar.low, &price_format)?;
        write_price(worksheet, row, 4, bar.close, &price_format)?;
        write_price(worksheet, row, 5, bar.adj_close, &price_format)?;
        worksheet.write_number_with_format(row, 6, bar.volume as f64, &volume_format)?;
    }

    let bytes = workbook.save_to_buffer()?;
    debug!("Exported {} bars as {} XLSX bytes", history.len(), bytes.len());
    Ok(bytes)
}

/// Write a price cell, leaving it blank when the value is unknown.
fn write_price(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<Decimal>,
    format: &Format,
) -> Result<(), ExportError> {
    if let Some(number) = value.and_then(|d| d.to_f64()) {
        worksheet.write_number_with_format(row, col, number, format)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyBar;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn symbol() -> Symbol {
        Symbol::from_quote_url("https://finance.yahoo.com/quote/TSLA/history").unwrap()
    }

    fn history() -> PriceHistory {
        PriceHistory {
            symbol: symbol(),
            bars: vec![
                DailyBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    open: Some(dec!(100.5)),
                    high: Some(dec!(102)),
                    low: Some(dec!(99.25)),
                    close: Some(dec!(101)),
                    adj_close: Some(dec!(101)),
                    volume: 1_000_000,
                },
                DailyBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    open: None,
                    high: Some(dec!(103)),
                    low: Some(dec!(100)),
                    close: Some(dec!(102.5)),
                    adj_close: Some(dec!(102.5)),
                    volume: 2_000_000,
                },
            ],
        }
    }

    #[test]
    fn test_csv_header_is_exact() {
        let bytes = to_csv(&history()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "Date,Open,High,Low,Close,Adj Close,Volume"
        );
    }

    #[test]
    fn test_csv_rows_and_date_format() {
        let bytes = to_csv(&history()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2024-01-02,100.5,102,99.25,101,101,1000000");
        // Unknown open renders as an empty field.
        assert_eq!(lines[2], "2024-01-03,,103,100,102.5,102.5,2000000");
    }

    #[test]
    fn test_csv_of_empty_history_is_header_only() {
        let empty = PriceHistory {
            symbol: symbol(),
            bars: Vec::new(),
        };
        let bytes = to_csv(&empty).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_xlsx_produces_zip_container() {
        let bytes = to_xlsx(&history()).unwrap();
        // XLSX is a zip archive; check the local file header magic.
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn test_download_names_and_mime_types() {
        assert_eq!(csv_filename(&symbol()), "TSLA_CleanedHistoricalData.csv");
        assert_eq!(xlsx_filename(&symbol()), "TSLA_CleanedHistoricalData.xlsx");
        assert_eq!(CSV_MIME, "text/csv");
        assert_eq!(
            XLSX_MIME,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
