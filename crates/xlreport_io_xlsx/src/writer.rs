//! XLSX writer kernel that replays resolved sheet layouts into a workbook.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use polars::prelude::{AnyValue, DataFrame};
use regex::Regex;
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, Table, TableColumn, TableStyle, Workbook, Worksheet,
};

use crate::conf::N_LEN_EXCEL_SHEET_NAME_MAX;
use crate::spec::{
    EnumBorderStyle, EnumCellValue, SpecCellFormat, SpecResolvedSheetLayout, SpecTable,
    SpecTablePlan, SpecXlsxReport, XlsxLayoutError,
};

static RE_TABLE_STYLE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^TableStyle(Light|Medium|Dark)(\d+)$"));

const TUP_TABLE_STYLES_LIGHT: [TableStyle; 21] = [
    TableStyle::Light1,
    TableStyle::Light2,
    TableStyle::Light3,
    TableStyle::Light4,
    TableStyle::Light5,
    TableStyle::Light6,
    TableStyle::Light7,
    TableStyle::Light8,
    TableStyle::Light9,
    TableStyle::Light10,
    TableStyle::Light11,
    TableStyle::Light12,
    TableStyle::Light13,
    TableStyle::Light14,
    TableStyle::Light15,
    TableStyle::Light16,
    TableStyle::Light17,
    TableStyle::Light18,
    TableStyle::Light19,
    TableStyle::Light20,
    TableStyle::Light21,
];

const TUP_TABLE_STYLES_MEDIUM: [TableStyle; 28] = [
    TableStyle::Medium1,
    TableStyle::Medium2,
    TableStyle::Medium3,
    TableStyle::Medium4,
    TableStyle::Medium5,
    TableStyle::Medium6,
    TableStyle::Medium7,
    TableStyle::Medium8,
    TableStyle::Medium9,
    TableStyle::Medium10,
    TableStyle::Medium11,
    TableStyle::Medium12,
    TableStyle::Medium13,
    TableStyle::Medium14,
    TableStyle::Medium15,
    TableStyle::Medium16,
    TableStyle::Medium17,
    TableStyle::Medium18,
    TableStyle::Medium19,
    TableStyle::Medium20,
    TableStyle::Medium21,
    TableStyle::Medium22,
    TableStyle::Medium23,
    TableStyle::Medium24,
    TableStyle::Medium25,
    TableStyle::Medium26,
    TableStyle::Medium27,
    TableStyle::Medium28,
];

const TUP_TABLE_STYLES_DARK: [TableStyle; 11] = [
    TableStyle::Dark1,
    TableStyle::Dark2,
    TableStyle::Dark3,
    TableStyle::Dark4,
    TableStyle::Dark5,
    TableStyle::Dark6,
    TableStyle::Dark7,
    TableStyle::Dark8,
    TableStyle::Dark9,
    TableStyle::Dark10,
    TableStyle::Dark11,
];

/// Stateful in-memory workbook writer.
///
/// Sheets are appended with [`Self::write_layout`]; the workbook is
/// serialized once with [`Self::save_to_buffer`].
pub struct XlsxWriter {
    workbook: Workbook,
    set_sheet_names_existing: BTreeSet<String>,
    set_table_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxWriter {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            set_sheet_names_existing: BTreeSet::new(),
            set_table_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
        }
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Serialize the workbook to xlsx bytes.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxLayoutError> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Append one worksheet built from `layout`.
    pub fn write_layout(&mut self, layout: &SpecResolvedSheetLayout) -> Result<(), XlsxLayoutError> {
        let l_formats: Vec<Format> = layout.formats.iter().map(derive_rust_xlsx_format).collect();

        let sheet_name_unique = self.derive_unique_sheet_name(&layout.sheet_name);
        let mut report = SpecXlsxReport {
            sheet_name: sheet_name_unique.clone(),
            n_rows: layout.rows.len(),
            table_range: None,
            warnings: layout.warnings.clone(),
        };
        if sheet_name_unique != layout.sheet_name {
            report.warn(format!(
                "Sheet name {:?} already used; written as {sheet_name_unique:?}.",
                layout.sheet_name
            ));
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        for (n_idx_row, row) in layout.rows.iter().enumerate() {
            for (n_idx_col, cell) in row.cells.iter().enumerate() {
                let format = l_formats
                    .get(cell.style)
                    .ok_or(XlsxLayoutError::UnknownStyleHandle(cell.style))?;
                write_cell_with_format(worksheet, n_idx_row, n_idx_col, &cell.value, format)?;
            }
        }

        if let Some(table_plan) = &layout.table {
            let table_name_unique = derive_unique_name(
                &mut self.set_table_names_existing,
                &table_plan.name,
                usize::MAX,
            );
            if table_name_unique != table_plan.name {
                report.warn(format!(
                    "Table name {:?} already used; registered as {table_name_unique:?}.",
                    table_plan.name
                ));
            }
            write_table(worksheet, layout, table_plan, &table_name_unique, &l_formats)?;
            report.table_range = Some(table_plan.range.to_string());
        }

        for (n_idx_col, n_width) in layout.column_widths.iter().enumerate() {
            worksheet.set_column_width(cast_col_num(n_idx_col)?, *n_width)?;
        }

        if let Some(freeze_pane) = layout.freeze_pane {
            worksheet.set_freeze_panes(freeze_pane.rows, cast_col_num(freeze_pane.cols as usize)?)?;
        }

        if let Some(addr) = layout.active_cell {
            let (n_row, n_col) = addr.to_zero_based();
            let n_col = cast_col_num(n_col as usize)?;
            worksheet.set_selection(n_row, n_col, n_row, n_col)?;
        }

        if let Some(sheet_view) = layout.sheet_view {
            if let Some(if_show) = sheet_view.show_grid_lines {
                worksheet.set_screen_gridlines(if_show);
            }
            if let Some(n_zoom) = sheet_view.zoom_scale {
                worksheet.set_zoom(n_zoom);
            }
            if let Some(if_rtl) = sheet_view.right_to_left {
                worksheet.set_right_to_left(if_rtl);
            }
        }

        tracing::info!(
            sheet = %sheet_name_unique,
            rows = layout.rows.len(),
            table = report.table_range.as_deref().unwrap_or("-"),
            "worksheet written"
        );
        self.l_reports.push(report);
        Ok(())
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        derive_unique_name(
            &mut self.set_sheet_names_existing,
            name,
            N_LEN_EXCEL_SHEET_NAME_MAX,
        )
    }
}

/// Claim `name` in `set_existing` (case-insensitive), appending `__N` on
/// collision and keeping the result within `n_len_max` characters.
fn derive_unique_name(set_existing: &mut BTreeSet<String>, name: &str, n_len_max: usize) -> String {
    if set_existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, n_len_max.saturating_sub(3)))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(n_len_max)
            .collect();
        if set_existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

/// Convert a dataframe into a row-major table of normalized cell values.
pub fn derive_table_from_dataframe(df: &DataFrame) -> Result<SpecTable, XlsxLayoutError> {
    let l_colnames: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();

    let l_cols = df.get_columns();
    let mut l_rows = Vec::with_capacity(df.height());
    for n_idx_row in 0..df.height() {
        let mut l_row = Vec::with_capacity(l_cols.len());
        for col in l_cols {
            l_row.push(derive_cell_value_from_any_value(col.get(n_idx_row)?));
        }
        l_rows.push(l_row);
    }

    Ok(SpecTable {
        columns: l_colnames,
        rows: l_rows,
    })
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn write_table(
    worksheet: &mut Worksheet,
    layout: &SpecResolvedSheetLayout,
    table_plan: &SpecTablePlan,
    table_name: &str,
    l_formats: &[Format],
) -> Result<(), XlsxLayoutError> {
    let (n_row_first, n_col_first) = table_plan.range.first.to_zero_based();
    let (n_row_last, n_col_last) = table_plan.range.last.to_zero_based();

    let row_header = layout.rows.get(n_row_first as usize);
    let l_table_columns: Vec<TableColumn> = table_plan
        .columns
        .iter()
        .enumerate()
        .map(|(n_idx_col, c_name)| {
            let column = TableColumn::new().set_header(c_name);
            match row_header
                .and_then(|row| row.cells.get(n_idx_col))
                .and_then(|cell| l_formats.get(cell.style))
            {
                Some(fmt_header) => column.set_header_format(fmt_header.clone()),
                None => column,
            }
        })
        .collect();

    let table = Table::new()
        .set_name(table_name)
        .set_style(derive_table_style(&table_plan.theme))
        .set_columns(&l_table_columns)
        .set_banded_rows(table_plan.options.show_row_stripes)
        .set_banded_columns(table_plan.options.show_column_stripes)
        .set_first_column(table_plan.options.show_first_column)
        .set_last_column(table_plan.options.show_last_column);

    worksheet.add_table(
        n_row_first,
        cast_col_num(n_col_first as usize)?,
        n_row_last,
        cast_col_num(n_col_last as usize)?,
        &table,
    )?;
    Ok(())
}

/// Map an Excel table style name onto `rust_xlsxwriter`'s enum.
///
/// Unknown or out-of-range names map to `TableStyleMedium9`.
pub fn derive_table_style(name: &str) -> TableStyle {
    let fallback = TableStyle::Medium9;
    let Ok(re) = RE_TABLE_STYLE.as_ref() else {
        return fallback;
    };
    let Some(caps) = re.captures(name.trim()) else {
        return fallback;
    };
    let Ok(n_idx) = caps[2].parse::<usize>() else {
        return fallback;
    };
    let l_styles: &[TableStyle] = match &caps[1] {
        "Light" => &TUP_TABLE_STYLES_LIGHT,
        "Medium" => &TUP_TABLE_STYLES_MEDIUM,
        _ => &TUP_TABLE_STYLES_DARK,
    };
    n_idx
        .checked_sub(1)
        .and_then(|n_pos| l_styles.get(n_pos))
        .copied()
        .unwrap_or(fallback)
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxLayoutError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) if !val.is_finite() => {
            worksheet.write_string_with_format(n_row, n_col, val.to_string(), format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Formula(val) => {
            worksheet.write_formula_with_format(n_row, n_col, val.as_str(), format)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_valign(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(color) = spec.bg_color.as_deref().and_then(derive_color) {
        format = format.set_background_color(color);
    }
    if let Some(color) = spec.font_color.as_deref().and_then(derive_color) {
        format = format.set_font_color(color);
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }
    if let Some(color) = spec.border_color.as_deref().and_then(derive_color) {
        format = format.set_border_color(color);
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

/// Parse `RRGGBB`, `#RRGGBB` or `AARRGGBB`; the alpha byte is dropped.
fn derive_color(text: &str) -> Option<Color> {
    let c_hex = text.trim().trim_start_matches('#');
    let c_rgb = match c_hex.len() {
        6 => c_hex,
        8 => c_hex.get(2..)?,
        _ => return None,
    };
    u32::from_str_radix(c_rgb, 16).ok().map(Color::RGB)
}

fn derive_format_border(border: EnumBorderStyle) -> FormatBorder {
    match border {
        EnumBorderStyle::None => FormatBorder::None,
        EnumBorderStyle::Thin => FormatBorder::Thin,
        EnumBorderStyle::Medium => FormatBorder::Medium,
        EnumBorderStyle::Dashed => FormatBorder::Dashed,
        EnumBorderStyle::Dotted => FormatBorder::Dotted,
        EnumBorderStyle::Thick => FormatBorder::Thick,
        EnumBorderStyle::Double => FormatBorder::Double,
        EnumBorderStyle::Hair => FormatBorder::Hair,
        EnumBorderStyle::MediumDashed => FormatBorder::MediumDashed,
        EnumBorderStyle::DashDot => FormatBorder::DashDot,
        EnumBorderStyle::MediumDashDot => FormatBorder::MediumDashDot,
        EnumBorderStyle::DashDotDot => FormatBorder::DashDotDot,
        EnumBorderStyle::MediumDashDotDot => FormatBorder::MediumDashDotDot,
        EnumBorderStyle::SlantDashDot => FormatBorder::SlantDashDot,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "distributed" => Some(FormatAlign::Distributed),
        _ => None,
    }
}

fn derive_format_valign(valign: &str) -> Option<FormatAlign> {
    let value = valign.trim().to_ascii_lowercase();
    match value.as_str() {
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "center" | "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        "justify" | "vjustify" | "vertical_justify" => Some(FormatAlign::VerticalJustify),
        "distributed" | "vdistributed" | "vertical_distributed" => {
            Some(FormatAlign::VerticalDistributed)
        }
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxLayoutError> {
    u32::try_from(value)
        .map_err(|_| XlsxLayoutError::IndexOverflow(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16, XlsxLayoutError> {
    u16::try_from(value)
        .map_err(|_| XlsxLayoutError::IndexOverflow(format!("column index overflow: {value}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use polars::prelude::{Column, DataFrame};

    use super::*;
    use crate::layout::{SpecLayoutContext, plan_sheet_layout};
    use crate::spec::SpecSheetConfig;

    fn ctx() -> SpecLayoutContext {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 8)
            .and_then(|d| d.and_hms_opt(9, 5, 0))
            .expect("valid date");
        SpecLayoutContext::new(ts)
    }

    fn table_scores() -> SpecTable {
        SpecTable {
            columns: vec!["Name".to_string(), "Score".to_string()],
            rows: vec![
                vec![EnumCellValue::String("ann".into()), EnumCellValue::Number(7.0)],
                vec![EnumCellValue::String("bob".into()), EnumCellValue::Number(9.5)],
            ],
        }
    }

    #[test]
    fn table_style_names_map_onto_enum() {
        assert!(derive_table_style("TableStyleMedium2") == TableStyle::Medium2);
        assert!(derive_table_style("TableStyleLight21") == TableStyle::Light21);
        assert!(derive_table_style("TableStyleDark11") == TableStyle::Dark11);
        assert!(derive_table_style("TableStyleDark12") == TableStyle::Medium9);
        assert!(derive_table_style("TableStyleMedium0") == TableStyle::Medium9);
        assert!(derive_table_style("fancy") == TableStyle::Medium9);
    }

    #[test]
    fn colors_accept_hash_and_alpha_prefixes() {
        assert_eq!(derive_color("4472C4"), Some(Color::RGB(0x4472C4)));
        assert_eq!(derive_color("#ffffff"), Some(Color::RGB(0xFFFFFF)));
        assert_eq!(derive_color("FF000000"), Some(Color::RGB(0x000000)));
        assert_eq!(derive_color("red"), None);
    }

    #[test]
    fn duplicate_sheet_names_get_suffix() {
        let mut writer = XlsxWriter::new();
        assert_eq!(writer.derive_unique_sheet_name("Data"), "Data");
        assert_eq!(writer.derive_unique_sheet_name("data"), "data__2");
        assert_eq!(writer.derive_unique_sheet_name("Data"), "Data__3");
    }

    #[test]
    fn layout_writes_into_a_valid_workbook() {
        let mut sheet = SpecSheetConfig::new("Scores");
        sheet.active_cell = Some("B2".parse().expect("parse"));
        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");

        let mut writer = XlsxWriter::new();
        writer.write_layout(&layout).expect("written");
        let v_bytes = writer.save_to_buffer().expect("saved");
        assert!(v_bytes.starts_with(b"PK"));

        let l_reports = writer.report();
        assert_eq!(l_reports.len(), 1);
        assert_eq!(l_reports[0].sheet_name, "Scores");
        assert_eq!(l_reports[0].table_range.as_deref(), Some("A3:B5"));
        assert_eq!(l_reports[0].n_rows, 5);
    }

    #[test]
    fn colliding_table_names_get_suffix() {
        let mut writer = XlsxWriter::new();
        for c_sheet in ["Q1 Scores", "Q1_Scores"] {
            let layout = plan_sheet_layout(
                &SpecSheetConfig::new(c_sheet),
                Some(&table_scores()),
                &ctx(),
            )
            .expect("layout");
            assert_eq!(layout.table.as_ref().expect("table").name, "q1_scores");
            writer.write_layout(&layout).expect("written");
        }
        assert!(writer.save_to_buffer().expect("saved").starts_with(b"PK"));

        let l_reports = writer.report();
        assert!(l_reports[0].warnings.is_empty());
        assert_eq!(
            l_reports[1].warnings,
            vec!["Table name \"q1_scores\" already used; registered as \"q1_scores__2\"."]
        );
    }

    #[test]
    fn vertical_alignment_is_separate_from_horizontal() {
        let fmt_valign = SpecCellFormat {
            valign: Some("center".to_string()),
            ..SpecCellFormat::default()
        };
        assert_eq!(
            derive_rust_xlsx_format(&fmt_valign),
            Format::new().set_align(FormatAlign::VerticalCenter)
        );
        assert_ne!(
            derive_rust_xlsx_format(&fmt_valign),
            Format::new().set_align(FormatAlign::Center)
        );

        let fmt_both = SpecCellFormat {
            align: Some("right".to_string()),
            valign: Some("top".to_string()),
            ..SpecCellFormat::default()
        };
        assert_eq!(
            derive_rust_xlsx_format(&fmt_both),
            Format::new()
                .set_align(FormatAlign::Right)
                .set_align(FormatAlign::Top)
        );
        assert_eq!(derive_format_align("top"), None);
        assert_eq!(derive_format_valign("left"), None);
        assert_eq!(
            derive_format_valign("Distributed"),
            Some(FormatAlign::VerticalDistributed)
        );
    }

    #[test]
    fn dataframe_cells_are_normalized() {
        let df = DataFrame::new(vec![
            Column::new("name".into(), ["a", "b"]),
            Column::new("n".into(), [1i64, 2]),
            Column::new("x".into(), [Some(0.5f64), None]),
        ])
        .expect("dataframe");

        let table = derive_table_from_dataframe(&df).expect("table");
        assert_eq!(table.columns, vec!["name", "n", "x"]);
        assert_eq!(
            table.rows[1],
            vec![
                EnumCellValue::String("b".into()),
                EnumCellValue::Number(2.0),
                EnumCellValue::None
            ]
        );
    }
}
