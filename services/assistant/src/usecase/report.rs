use chrono::{DateTime, Local, Utc};

use crate::domain::repository::HistoryRepository;
use crate::domain::types::{HistoryRecord, User};
use crate::error::AssistantError;
use crate::pdf::{self, Line};

/// Body lines per page, header included.
pub const LINES_PER_PAGE: usize = 40;

/// Characters per wrapped body line at the body font size.
const WRAP_WIDTH: usize = 90;

const TITLE_SIZE: u8 = 16;
const ENTRY_SIZE: u8 = 11;
const BODY_SIZE: u8 = 10;

/// A rendered PDF ready to download.
pub struct HistoryReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

fn local(ts: DateTime<Utc>) -> DateTime<Local> {
    ts.with_timezone(&Local)
}

fn push_wrapped(lines: &mut Vec<Line>, label: &str, text: &str) {
    let text = pdf::encodable(text);
    let mut wrapped = pdf::wrap(&format!("{label}: {text}"), WRAP_WIDTH).into_iter();
    if let Some(first) = wrapped.next() {
        lines.push(Line::new(first, BODY_SIZE));
    }
    lines.extend(wrapped.map(|rest| Line::new(format!("    {rest}"), BODY_SIZE)));
}

/// Download name for the report. The handle is reduced to `[A-Za-z0-9_-]`
/// so it can sit inside a quoted `Content-Disposition` filename.
pub fn report_filename(handle: &str, generated_at: DateTime<Local>) -> String {
    let safe: String = handle
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("historial_{safe}_{}.pdf", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Lay out the report as a flat list of lines, oldest record first.
pub fn report_lines(user: &User, records: &[HistoryRecord], generated_at: DateTime<Local>) -> Vec<Line> {
    let mut lines = vec![
        Line::new("Historial de comandos - Asistente Virtual", TITLE_SIZE),
        Line::new(format!("Usuario: {} ({})", user.full_name, user.handle), BODY_SIZE),
        Line::new(
            format!("Generado: {}", generated_at.format("%d/%m/%Y %H:%M")),
            BODY_SIZE,
        ),
        Line::new(format!("Total de registros: {}", records.len()), BODY_SIZE),
        Line::blank(),
    ];

    if records.is_empty() {
        lines.push(Line::new("No hay registros en el historial.", BODY_SIZE));
        return lines;
    }

    for (n, record) in records.iter().enumerate() {
        lines.push(Line::new(
            format!(
                "#{} - {} [{}]",
                n + 1,
                local(record.created_at).format("%d/%m/%Y %H:%M:%S"),
                record.classification
            ),
            ENTRY_SIZE,
        ));
        push_wrapped(&mut lines, "Usuario", &record.utterance);
        push_wrapped(&mut lines, "Asistente", &record.response);
        lines.push(Line::blank());
    }
    lines
}

/// Split lines into pages of [`LINES_PER_PAGE`] and render the PDF.
pub fn render_report(lines: Vec<Line>) -> Vec<u8> {
    let pages: Vec<Vec<Line>> = lines
        .chunks(LINES_PER_PAGE)
        .map(<[Line]>::to_vec)
        .collect();
    pdf::render(&pages, |n, m| format!("Página {n} de {m}"))
}

// ── GenerateReport ───────────────────────────────────────────────────────────

pub struct GenerateReportUseCase<R: HistoryRepository> {
    pub repo: R,
}

impl<R: HistoryRepository> GenerateReportUseCase<R> {
    pub async fn execute(&self, user: &User) -> Result<HistoryReport, AssistantError> {
        let records = self.repo.list_for_report(user.id).await?;
        let now = Local::now();
        let bytes = render_report(report_lines(user, &records, now));
        tracing::info!(user_id = %user.id, records = records.len(), "history report generated");
        Ok(HistoryReport {
            filename: report_filename(&user.handle, now),
            bytes,
        })
    }
}
