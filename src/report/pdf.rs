use crate::error::ReportError;
use crate::models::QualifyingRecord;
use crate::report::report_lines;
use printpdf::*;
use std::io::BufWriter;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.0;
const WRAP_AT: usize = 90;

/// 生成客户报告 PDF, 返回字节
pub fn render_pdf(records: &[QualifyingRecord], title: &str, placeholder: &str) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("font error: {e}")))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = TOP;

    layer.use_text(title, 14.0, Mm(20.0), Mm(y), &bold);
    y -= LINE_HEIGHT * 2.0;

    let lines = report_lines(records, placeholder);
    if lines.is_empty() {
        layer.use_text("Nenhum cliente encontrado.", 10.0, Mm(20.0), Mm(y), &font);
    }

    for line in &lines {
        for part in wrap_text(line, WRAP_AT) {
            if y < BOTTOM {
                let (page, layer_idx) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                layer = doc.get_page(page).get_layer(layer_idx);
                y = TOP;
            }
            layer.use_text(&part, 10.0, Mm(20.0), Mm(y), &font);
            y -= LINE_HEIGHT;
        }
        y -= 2.0;
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::Buffer(e.to_string()))
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
