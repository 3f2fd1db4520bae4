/// PDF export of the current sorted dataset, generated client-side and
/// delivered through a Blob download. No server round-trip.
use contracts::record::{NfeControleRecord, COLUMNS};
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

const REPORT_FILENAME: &str = "relatorio-nfe-controle.pdf";
const REPORT_TITLE: &str = "Relatório NFe Controle | Vertis";

// Landscape A4.
const PAGE_WIDTH_MM: f32 = 297.0;
const PAGE_HEIGHT_MM: f32 = 210.0;

/// Left edge of each column, in mm.
const COLUMN_X: [f32; 9] = [14.0, 34.0, 56.0, 118.0, 172.0, 194.0, 220.0, 244.0, 266.0];

/// Body cell character budget per column, so a long unit name cannot run
/// into the next column.
const COLUMN_CHARS: [usize; 9] = [11, 12, 36, 31, 13, 16, 14, 13, 11];

const ROW_STEP_MM: f32 = 6.0;
const BOTTOM_MARGIN_MM: f32 = 14.0;

/// Exports the full sorted (unpaginated) dataset. No-op on an empty dataset.
pub fn export_pdf(records: &[NfeControleRecord]) -> Result<(), String> {
    if records.is_empty() {
        return Ok(());
    }

    let bytes = generate_pdf_bytes(records)?;
    let blob = create_pdf_blob(&bytes)?;
    download_blob(&blob, REPORT_FILENAME)
}

fn push_line(
    layer: &printpdf::PdfLayerReference,
    font: &printpdf::IndirectFontRef,
    text: &str,
    font_size: f32,
    x: f32,
    y: f32,
) {
    use printpdf::Mm;
    layer.use_text(text, font_size, Mm(x), Mm(y), font);
}

fn truncate_cell(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

fn draw_header_row(
    layer: &printpdf::PdfLayerReference,
    font_bold: &printpdf::IndirectFontRef,
    y: f32,
) -> f32 {
    use printpdf::Mm;

    for (col, x) in COLUMNS.iter().zip(COLUMN_X) {
        push_line(layer, font_bold, col.label, 8.0, x, y);
    }

    let rule_y = y - 2.0;
    layer.add_line(printpdf::Line {
        points: vec![
            (printpdf::Point::new(Mm(COLUMN_X[0]), Mm(rule_y)), false),
            (printpdf::Point::new(Mm(PAGE_WIDTH_MM - 14.0), Mm(rule_y)), false),
        ],
        is_closed: false,
    });

    y - ROW_STEP_MM
}

/// Builds the report document in memory: title, header row from the column
/// labels, one body row per record through the same display rule as the
/// table. Overflowing rows continue on new pages with a repeated header.
pub fn generate_pdf_bytes(records: &[NfeControleRecord]) -> Result<Vec<u8>, String> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    let (doc, page1, layer1) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let mut layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    push_line(&layer, &font_bold, REPORT_TITLE, 16.0, COLUMN_X[0], 196.0);

    let mut y = draw_header_row(&layer, &font_bold, 186.0);

    for record in records {
        if y < BOTTOM_MARGIN_MM {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = draw_header_row(&layer, &font_bold, 198.0);
        }

        for ((col, x), max_chars) in COLUMNS.iter().zip(COLUMN_X).zip(COLUMN_CHARS) {
            let cell = truncate_cell(&record.field(col.key).display(), max_chars);
            push_line(&layer, &font, &cell, 8.0, x, y);
        }
        y -= ROW_STEP_MM;
    }

    let mut writer = std::io::BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(|e| e.to_string())?;
    writer.into_inner().map_err(|e| e.to_string())
}

fn create_pdf_blob(bytes: &[u8]) -> Result<Blob, String> {
    let array = js_sys::Array::new();
    array.push(&js_sys::Uint8Array::from(bytes));

    let properties = BlobPropertyBag::new();
    properties.set_type("application/pdf");

    Blob::new_with_u8_array_sequence_and_options(&array, &properties)
        .map_err(|e| format!("Failed to create blob: {:?}", e))
}

fn download_blob(blob: &Blob, filename: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("No window object")?;
    let document = window.document().ok_or("No document object")?;

    let url = Url::create_object_url_with_blob(blob)
        .map_err(|e| format!("Failed to create object URL: {:?}", e))?;

    let anchor = document
        .create_element("a")
        .map_err(|e| format!("Failed to create anchor: {:?}", e))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|e| format!("Failed to cast to anchor: {:?}", e))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor
        .style()
        .set_property("display", "none")
        .map_err(|e| format!("Failed to set style: {:?}", e))?;

    document
        .body()
        .ok_or("No body element")?
        .append_child(&anchor)
        .map_err(|e| format!("Failed to append anchor: {:?}", e))?;

    anchor.click();

    document
        .body()
        .ok_or("No body element")?
        .remove_child(&anchor)
        .map_err(|e| format!("Failed to remove anchor: {:?}", e))?;

    Url::revoke_object_url(&url).map_err(|e| format!("Failed to revoke URL: {:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::record::CellValue;

    fn record(i: usize) -> NfeControleRecord {
        NfeControleRecord {
            cod_unid_negoc: CellValue::Text(format!("{:02}", i)),
            cod_unid_oper: CellValue::Number(i as f64),
            nom_unid_oper: CellValue::Text(format!("Unidade {}", i)),
            nom_contato: CellValue::Text("Contato".to_string()),
            tem_certificado: CellValue::Text("S".to_string()),
            qr_code_homologacao: CellValue::Text("N".to_string()),
            qr_code_producao: CellValue::Bool(false),
            teste_cupom: CellValue::Null,
            teste_nfse: CellValue::Text("S".to_string()),
        }
    }

    #[test]
    fn test_generate_pdf_bytes_produces_a_pdf() {
        let bytes = generate_pdf_bytes(&[record(1)]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_generate_pdf_bytes_handles_page_overflow() {
        let records: Vec<_> = (0..120).map(record).collect();
        let many = generate_pdf_bytes(&records).unwrap();
        let few = generate_pdf_bytes(&records[..5]).unwrap();
        assert!(many.starts_with(b"%PDF"));
        assert!(many.len() > few.len());
    }

    #[test]
    fn test_truncate_cell_respects_char_budget() {
        assert_eq!(truncate_cell("Unidade", 10), "Unidade");
        assert_eq!(truncate_cell("Homologação extensa", 11), "Homologação");
        assert_eq!(truncate_cell("", 5), "");
    }

    #[test]
    fn test_column_layout_is_consistent() {
        assert_eq!(COLUMN_X.len(), COLUMNS.len());
        assert_eq!(COLUMN_CHARS.len(), COLUMNS.len());
        assert!(COLUMN_X.windows(2).all(|w| w[0] < w[1]));
        assert!(COLUMN_X[8] < PAGE_WIDTH_MM - 14.0);
    }
}
