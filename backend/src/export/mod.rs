//! CSV export of a filtered view.
//!
//! Output is comma-delimited UTF-8 with a header row, in the table's column
//! order. Date and sales cells are written in the canonical form produced by
//! the cleaner, so loading and cleaning an export yields the same records.

use csv::WriterBuilder;

use crate::error::{ExportError, ExportResult};
use crate::models::SalesView;

/// Default download name.
pub const EXPORT_FILE_NAME: &str = "filtered_sales_data.csv";

/// MIME type of the export.
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Serialize a view to CSV bytes.
pub fn export(view: &SalesView<'_>) -> ExportResult<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(view.headers())?;
    for record in view.iter() {
        writer.write_record(&record.cells)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesTable;
    use crate::parser::{load_bytes, parse_str};
    use crate::transform::clean::clean;
    use crate::transform::filter::{apply, FilterSelection};

    fn table() -> SalesTable {
        let csv = "Row ID,Order ID,Order Date,Customer Name,Segment,Region,Product Name,Category,Sub-Category,Sales\n\
                   1,CA-1,1/3/2023,Ann,Consumer,East,\"Chair, Oak\",Furniture,Chairs,100.50\n\
                   2,CA-2,15/03/2023,Bob,Corporate,West,Phone,Technology,Phones,50\n\
                   3,CA-3,02/04/2023,Cy,Consumer,East,\"Desk \"\"XL\"\"\",Furniture,Tables,0.1\n\
                   4,CA-4,03/04/2023,Dee,Home Office,South,Paper,Office Supplies,Paper,";
        let raw = parse_str(csv, ',', "utf-8".into()).unwrap();
        clean(&raw).unwrap().0
    }

    #[test]
    fn test_export_has_header_and_column_order() {
        let table = table();
        let bytes = export(&table.view()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Row ID,Order ID,Order Date,Customer Name,Segment,Region,Product Name,Category,Sub-Category,Sales"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,CA-1,01/03/2023,Ann,Consumer,East,\"Chair, Oak\",Furniture,Chairs,100.5"
        );
    }

    #[test]
    fn test_export_round_trips_filtered_view() {
        let table = table();
        let selection = FilterSelection::from_parts(&table, Some(vec!["East".into()]), None);
        let view = apply(&table, &selection);
        assert_eq!(view.len(), 2);

        let bytes = export(&view).unwrap();
        let (reloaded, report) = clean(&load_bytes(&bytes).unwrap()).unwrap();

        assert_eq!(report.rows_dropped(), 0);
        assert_eq!(reloaded.headers(), view.headers());
        assert_eq!(reloaded.len(), view.len());
        for (a, b) in reloaded.records().iter().zip(view.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_export_round_trips_rows_formatted_differently() {
        let csv = "Order ID,Order Date,Customer Name,Segment,Region,Product Name,Category,Sub-Category,Sales\n\
                   CA-1,01/03/2023,Ann,Consumer,East,Chair,Furniture,Chairs,100.5\n\
                   CA-1,1/3/2023,Ann,Consumer,East,Chair,Furniture,Chairs,100.50\n\
                   CA-2,02/03/2023,Bob,,NA,Phone,Technology,Phones,20\n\
                   CA-3,02/03/2023,Cy,null,,Phone,Technology,Phones,20";
        let (table, report) = clean(&parse_str(csv, ',', "utf-8".into()).unwrap()).unwrap();
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(table.len(), 3);

        let bytes = export(&table.view()).unwrap();
        let (reloaded, report) = clean(&load_bytes(&bytes).unwrap()).unwrap();

        assert_eq!(report.rows_dropped(), 0);
        assert_eq!(reloaded.len(), table.len());
        for (a, b) in reloaded.records().iter().zip(table.records()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_export_of_empty_view_is_header_only() {
        let table = table();
        let mut selection = FilterSelection::all(&table);
        selection.categories.clear();

        let bytes = export(&apply(&table, &selection)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
