//! Export of a program analysis to CSV, JSON and a printable HTML document.
//!
//! Only string building lives here; turning the output into a browser
//! download is the frontend's job.

use super::analysis::{DomainResultRow, ProgramAnalysis};
use super::grading::{format_percentage, GradeView};
use crate::shared::lang::Lang;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// Bumped when the JSON export layout changes
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Print,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Print => "html",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Json => "application/json;charset=utf-8;",
            ExportFormat::Print => "text/html;charset=utf-8;",
        }
    }
}

/// Types that can be written as CSV rows
pub trait CsvExportable {
    /// Column headers
    fn headers() -> Vec<&'static str>;

    /// Cell values for one row
    fn to_csv_row(&self, lang: Lang) -> Vec<String>;
}

impl CsvExportable for DomainResultRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Domain",
            "Indicators",
            "Weight (%)",
            "Score (%)",
            "Weighted score",
            "Grade",
        ]
    }

    fn to_csv_row(&self, lang: Lang) -> Vec<String> {
        vec![
            self.label(lang).to_string(),
            self.indicator_count.to_string(),
            format!("{:.2}", self.domain_weight),
            format!("{:.2}", self.domain_score),
            format!("{:.2}", self.domain_weighted_score),
            grade_label(&GradeView::from_score(self.domain_score), lang).to_string(),
        ]
    }
}

fn grade_label(view: &GradeView, lang: Lang) -> &'static str {
    match lang {
        Lang::Ar => view.label_ar,
        Lang::En => view.label,
    }
}

/// Every field double-quoted, embedded quotes doubled
fn quote_csv_cell(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn push_csv_line(out: &mut String, cells: &[String]) {
    let line = cells
        .iter()
        .map(|c| quote_csv_cell(c))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// CSV with a header row, one row per domain and a trailing final-score row.
/// Starts with a UTF-8 BOM so spreadsheet apps pick up Arabic names.
pub fn to_csv(analysis: &ProgramAnalysis, lang: Lang) -> String {
    let mut out = String::from('\u{FEFF}');
    let headers: Vec<String> = DomainResultRow::headers()
        .into_iter()
        .map(str::to_string)
        .collect();
    push_csv_line(&mut out, &headers);

    for row in &analysis.rows {
        push_csv_line(&mut out, &row.to_csv_row(lang));
    }

    let final_view = GradeView::from_score(analysis.final_program_score);
    push_csv_line(
        &mut out,
        &[
            "Final score".to_string(),
            analysis.total_indicators().to_string(),
            format!("{:.2}", analysis.weight_total.total),
            String::new(),
            format!("{:.2}", analysis.final_program_score),
            grade_label(&final_view, lang).to_string(),
        ],
    );
    out
}

/// Full analysis plus export metadata
pub fn to_json(analysis: &ProgramAnalysis, exported_at: DateTime<Utc>) -> Value {
    json!({
        "export_metadata": {
            "exported_at": exported_at.to_rfc3339(),
            "program_id": analysis.program_id,
            "format_version": EXPORT_FORMAT_VERSION,
        },
        "analysis": analysis,
    })
}

/// File name like `program-12-results-2026-03-01.csv`
pub fn export_file_name(program_id: i64, format: ExportFormat, at: DateTime<Utc>) -> String {
    format!(
        "program-{}-results-{}.{}",
        program_id,
        at.format("%Y-%m-%d"),
        format.extension()
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Self-contained HTML page for the browser print dialog (and "save as PDF")
pub fn to_print_html(
    analysis: &ProgramAnalysis,
    program_name: &str,
    lang: Lang,
    generated_at: DateTime<Utc>,
) -> String {
    let final_view = GradeView::from_score(analysis.final_program_score);

    let mut rows_html = String::new();
    for row in &analysis.rows {
        let view = GradeView::from_score(row.domain_score);
        rows_html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td><td class=\"{}\">{}</td></tr>\n",
            escape_html(row.label(lang)),
            row.indicator_count,
            row.domain_weight,
            view.percentage,
            row.domain_weighted_score,
            view.color_class,
            grade_label(&view, lang),
        ));
    }

    let warnings_html = if analysis.warnings.is_empty() {
        String::new()
    } else {
        let items: String = analysis
            .warnings
            .iter()
            .map(|w| format!("<li>{}</li>", escape_html(&w.to_string())))
            .collect();
        format!("<ul class=\"warnings\">{}</ul>", items)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" dir="{dir}">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 24px; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #999; padding: 6px 8px; text-align: start; }}
tfoot td {{ font-weight: bold; }}
.grade--excellent {{ color: #1b7f3b; }}
.grade--good {{ color: #1d5fa8; }}
.grade--acceptable {{ color: #a86b00; }}
.grade--poor {{ color: #b42318; }}
.warnings {{ color: #a86b00; }}
@page {{ size: A4; margin: 15mm; }}
tr {{ page-break-inside: avoid; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>Program #{program_id} · generated {generated}</p>
{warnings}
<table>
<thead><tr><th>Domain</th><th>Indicators</th><th>Weight (%)</th><th>Score</th><th>Weighted score</th><th>Grade</th></tr></thead>
<tbody>
{rows}</tbody>
<tfoot><tr><td colspan="4">Final score</td><td>{final_pct}</td><td class="{final_class}">{final_label}</td></tr></tfoot>
</table>
</body>
</html>
"#,
        lang = lang.code(),
        dir = lang.dir(),
        title = escape_html(program_name),
        program_id = analysis.program_id,
        generated = generated_at.format("%Y-%m-%d %H:%M UTC"),
        warnings = warnings_html,
        rows = rows_html,
        final_pct = format_percentage(analysis.final_program_score),
        final_class = final_view.color_class,
        final_label = grade_label(&final_view, lang),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_program_results::aggregator::tests::{score, weight};
    use chrono::TimeZone;

    fn sample() -> ProgramAnalysis {
        let mut weights = vec![weight(1, 25.42), weight(2, 74.58)];
        weights[0].domain_en = "Teaching \"core\"".to_string();
        let scores = vec![score(1, 85.33), score(2, 90.00)];
        ProgramAnalysis::build(7, &weights, &scores, None).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv(&sample(), Lang::En);
        assert!(csv.starts_with('\u{FEFF}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(lines.len(), 4, "header + 2 domains + final row");
        assert_eq!(
            lines[0],
            "\"Domain\",\"Indicators\",\"Weight (%)\",\"Score (%)\",\"Weighted score\",\"Grade\""
        );
        assert_eq!(
            lines[1],
            "\"Teaching \"\"core\"\"\",\"10\",\"25.42\",\"85.33\",\"21.69\",\"Good\""
        );
        assert_eq!(
            lines[3],
            "\"Final score\",\"20\",\"100.00\",\"\",\"88.81\",\"Good\""
        );
    }

    #[test]
    fn test_json_carries_metadata() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let value = to_json(&sample(), at);
        assert_eq!(value["export_metadata"]["program_id"], 7);
        assert_eq!(
            value["export_metadata"]["exported_at"],
            "2026-03-01T12:00:00+00:00"
        );
        assert_eq!(value["analysis"]["final_grade"], "good");
        assert_eq!(value["analysis"]["rows"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_print_html_escapes_names() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let html = to_print_html(&sample(), "CS <BSc>", Lang::Ar, at);
        assert!(html.contains("<title>CS &lt;BSc&gt;</title>"));
        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("Teaching &quot;core&quot;"));
        assert!(html.contains("88.81%"));
        assert!(html.contains("جيد"));
    }

    #[test]
    fn test_print_html_is_a_complete_document_with_direction() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let arabic = to_print_html(&sample(), "CS", Lang::Ar, at);
        assert!(arabic.starts_with("<!DOCTYPE html>\n<html lang=\"ar\" dir=\"rtl\">"));
        assert!(arabic.trim_end().ends_with("</html>"));

        let english = to_print_html(&sample(), "CS", Lang::En, at);
        assert!(english.starts_with("<!DOCTYPE html>\n<html lang=\"en\" dir=\"ltr\">"));
    }

    #[test]
    fn test_export_file_name() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            export_file_name(12, ExportFormat::Csv, at),
            "program-12-results-2026-03-01.csv"
        );
    }
}
