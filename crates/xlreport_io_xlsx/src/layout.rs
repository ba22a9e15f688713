//! Per-sheet layout assembler.
//!
//! Configuration and the source table go in, a [`SpecResolvedSheetLayout`]
//! comes out. Nothing here touches a workbook; the writer replays the
//! resolved layout afterwards.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::address::SpecCellAddress;
use crate::calc::build_calculated_table;
use crate::conf::{C_MSG_CALC_TABLE_ERROR, N_ZOOM_SCALE_MAX, N_ZOOM_SCALE_MIN, derive_base_font_format};
use crate::spec::{
    EnumCellValue, EnumFreezePanes, EnumHeaderFieldType, EnumTotalsPosition,
    SpecAutofitCellsPolicy, SpecCellFormat, SpecFreezePane, SpecHeaderStyles, SpecLayoutCell,
    SpecLayoutRow, SpecResolvedSheetLayout, SpecSheetConfig, SpecSheetView, SpecTable,
    SpecTablePlan, SpecTotalsStyles, XlsxLayoutError,
};
use crate::theme::{is_known_theme, resolve_header_styles, resolve_totals_styles, select_table_theme};
use crate::util::{
    derive_autofit_width, derive_pane_split, derive_table_name, derive_table_range,
    derive_time_stamp_text, estimate_width_len, validate_unique_columns,
};

/// Run-wide inputs shared by every sheet of one report.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecLayoutContext {
    /// Generation instant, captured once per report.
    pub time_stamp: NaiveDateTime,
    /// Width policy for columns without an explicit width.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl SpecLayoutContext {
    pub fn new(time_stamp: NaiveDateTime) -> Self {
        Self {
            time_stamp,
            policy_autofit: SpecAutofitCellsPolicy::default(),
        }
    }
}

/// Interns formats so identical styles share one handle.
#[derive(Debug, Default)]
struct SpecStyleRegistry {
    l_formats: Vec<SpecCellFormat>,
    dict_handles: HashMap<SpecCellFormat, usize>,
}

impl SpecStyleRegistry {
    fn add_style(&mut self, fmt: SpecCellFormat) -> usize {
        if let Some(n_handle) = self.dict_handles.get(&fmt) {
            return *n_handle;
        }
        let n_handle = self.l_formats.len();
        self.l_formats.push(fmt.clone());
        self.dict_handles.insert(fmt, n_handle);
        n_handle
    }

    fn into_formats(self) -> Vec<SpecCellFormat> {
        self.l_formats
    }
}

/// Body format and totals base format per emitted column.
struct SpecColumnStyles {
    l_fmts_body: Vec<SpecCellFormat>,
    l_fmts_totals_base: Vec<SpecCellFormat>,
}

fn cast_row_num(value: usize) -> Result<u32, XlsxLayoutError> {
    u32::try_from(value)
        .map_err(|_| XlsxLayoutError::IndexOverflow(format!("row index overflow: {value}")))
}

fn create_row(cells: impl IntoIterator<Item = (EnumCellValue, usize)>) -> SpecLayoutRow {
    SpecLayoutRow {
        cells: cells
            .into_iter()
            .map(|(value, style)| SpecLayoutCell { value, style })
            .collect(),
    }
}

fn resolve_column_styles(
    sheet: &SpecSheetConfig,
    columns: &[String],
    fmt_base: &SpecCellFormat,
) -> Result<SpecColumnStyles, XlsxLayoutError> {
    let Some(dict_column_styles) = &sheet.column_styles else {
        return Ok(SpecColumnStyles {
            l_fmts_body: vec![fmt_base.clone(); columns.len()],
            l_fmts_totals_base: vec![fmt_base.clone(); columns.len()],
        });
    };

    if !dict_column_styles.keys().eq(columns.iter()) {
        return Err(XlsxLayoutError::ColumnStyleMismatch {
            sheet: sheet.worksheet_name.clone(),
            expected: dict_column_styles.keys().cloned().collect(),
            found: columns.to_vec(),
        });
    }

    let mut l_fmts_body = Vec::with_capacity(columns.len());
    let mut l_fmts_totals_base = Vec::with_capacity(columns.len());
    for style_override in dict_column_styles.values() {
        match style_override {
            None => {
                l_fmts_body.push(fmt_base.clone());
                l_fmts_totals_base.push(fmt_base.clone());
            }
            Some(style_override) => {
                let fmt_column = fmt_base.merge(&style_override.style);
                let fmt_totals_base = if style_override.default_style {
                    fmt_column.without_borders()
                } else {
                    fmt_base.clone()
                };
                l_fmts_body.push(fmt_column);
                l_fmts_totals_base.push(fmt_totals_base);
            }
        }
    }

    Ok(SpecColumnStyles {
        l_fmts_body,
        l_fmts_totals_base,
    })
}

fn plan_header_block(
    sheet: &SpecSheetConfig,
    styles_header: &SpecHeaderStyles,
    ctx: &SpecLayoutContext,
    registry: &mut SpecStyleRegistry,
) -> Vec<SpecLayoutRow> {
    let c_time_stamp = derive_time_stamp_text(&ctx.time_stamp);
    let n_style_label = registry.add_style(styles_header.label.clone());

    let Some(dict_header) = &sheet.header else {
        return vec![
            create_row([(EnumCellValue::String(c_time_stamp), n_style_label)]),
            SpecLayoutRow::default(),
        ];
    };

    let mut l_rows = Vec::with_capacity(dict_header.len());
    // parity counts blank entries too
    for (n_idx_row, (c_label, field)) in dict_header.iter().enumerate() {
        let value = match field.field_type {
            EnumHeaderFieldType::Blank => {
                l_rows.push(SpecLayoutRow::default());
                continue;
            }
            EnumHeaderFieldType::TimeStamp => EnumCellValue::String(c_time_stamp.clone()),
            EnumHeaderFieldType::Value => field.value.clone(),
        };

        let fmt_value_role = styles_header.value_for_row(n_idx_row);
        let fmt_value = match &field.format {
            Some(style_override) => fmt_value_role.merge(&style_override.style),
            None => fmt_value_role.clone(),
        };
        let n_style_value = registry.add_style(fmt_value);
        l_rows.push(create_row([
            (EnumCellValue::String(c_label.clone()), n_style_label),
            (value, n_style_value),
        ]));
    }
    l_rows
}

fn plan_totals_row(
    sheet: &SpecSheetConfig,
    columns: &[String],
    styles_totals: &SpecTotalsStyles,
    l_fmts_totals_base: &[SpecCellFormat],
    registry: &mut SpecStyleRegistry,
) -> Option<SpecLayoutRow> {
    let dict_total_row = sheet.total_row.as_ref()?;
    let n_width = columns.len();

    let l_cells = columns.iter().zip(l_fmts_totals_base).enumerate().map(
        |(n_idx_col, (c_column, fmt_totals_base))| {
            let value = dict_total_row.get(c_column).cloned().unwrap_or_default();
            let position = EnumTotalsPosition::from_index(n_idx_col, n_width);
            let fmt_cell = styles_totals.get(position).merge(fmt_totals_base);
            (value, registry.add_style(fmt_cell))
        },
    );
    Some(create_row(l_cells.collect::<Vec<_>>()))
}

fn plan_sheet_view(
    sheet: &SpecSheetConfig,
    l_warnings: &mut Vec<String>,
) -> Option<SpecSheetView> {
    let mut sheet_view = sheet.sheet_view?;
    if let Some(n_zoom) = sheet_view.zoom_scale
        && !(N_ZOOM_SCALE_MIN..=N_ZOOM_SCALE_MAX).contains(&n_zoom)
    {
        l_warnings.push(format!(
            "zoom_scale {n_zoom} is outside {N_ZOOM_SCALE_MIN}..={N_ZOOM_SCALE_MAX}; ignored."
        ));
        sheet_view.zoom_scale = None;
    }
    Some(sheet_view)
}

fn plan_column_widths(
    sheet: &SpecSheetConfig,
    l_rows: &[SpecLayoutRow],
    columns: &[String],
    policy: &SpecAutofitCellsPolicy,
    l_warnings: &mut Vec<String>,
) -> Vec<f64> {
    let n_cols = l_rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    let mut l_width_recorded = vec![0usize; n_cols];
    for row in l_rows {
        for (n_idx_col, cell) in row.cells.iter().enumerate() {
            l_width_recorded[n_idx_col] =
                usize::max(l_width_recorded[n_idx_col], estimate_width_len(&cell.value));
        }
    }

    let mut l_widths: Vec<f64> = l_width_recorded
        .iter()
        .map(|n_width| derive_autofit_width(*n_width, policy))
        .collect();

    let Some(dict_widths) = &sheet.column_widths else {
        return l_widths;
    };
    for (c_column, width) in dict_widths {
        let Some(n_width) = width else {
            continue;
        };
        let Some(n_idx_col) = columns.iter().position(|c_name| c_name == c_column) else {
            l_warnings.push(format!(
                "column_widths: column {c_column:?} is not in the emitted table; ignored."
            ));
            continue;
        };
        if !n_width.is_finite() || *n_width < 0.0 {
            l_warnings.push(format!(
                "column_widths: width {n_width} for {c_column:?} is invalid; auto width kept."
            ));
            continue;
        }
        if n_idx_col >= l_widths.len() {
            l_widths.resize(n_idx_col + 1, derive_autofit_width(0, policy));
        }
        l_widths[n_idx_col] = *n_width;
    }
    l_widths
}

/// Assemble the complete layout of one worksheet.
///
/// `table_source` is the sheet's delimited source table; it is required
/// unless the sheet has a calculated table. A misconfigured calculated
/// table degrades to a single diagnostic row; a column-style mismatch and
/// malformed tables are errors.
pub fn plan_sheet_layout(
    sheet: &SpecSheetConfig,
    table_source: Option<&SpecTable>,
    ctx: &SpecLayoutContext,
) -> Result<SpecResolvedSheetLayout, XlsxLayoutError> {
    let c_sheet_name = sheet.worksheet_name.as_str();
    let mut registry = SpecStyleRegistry::default();
    let mut l_warnings = Vec::new();

    let fmt_base = derive_base_font_format();
    let n_style_base = registry.add_style(fmt_base.clone());

    let c_theme = sheet.table_theme_name();
    if !is_known_theme(c_theme) {
        tracing::debug!(sheet = c_sheet_name, theme = c_theme, "theme has no dedicated appearance; using default");
    }
    let theme = select_table_theme(c_theme);
    let styles_header = resolve_header_styles(theme, &fmt_base);
    let styles_totals = resolve_totals_styles(theme, &fmt_base);

    // 1. header block
    let mut l_rows = plan_header_block(sheet, &styles_header, ctx, &mut registry);
    let addr_anchor = SpecCellAddress::new(0, cast_row_num(l_rows.len() + 1)?);

    // 2. data table or diagnostic row
    let table_calc;
    let table_emitted = match &sheet.calculated_table {
        Some(dict_fields) => match build_calculated_table(dict_fields, table_source) {
            Ok(table) => {
                table_calc = table;
                Some(&table_calc)
            }
            Err(err) => {
                tracing::warn!(sheet = c_sheet_name, "calculated table misconfigured: {err}");
                l_warnings.push(format!("{C_MSG_CALC_TABLE_ERROR}: {err}"));
                l_rows.push(create_row([(
                    EnumCellValue::String(format!("{C_MSG_CALC_TABLE_ERROR}: {err}")),
                    n_style_base,
                )]));
                None
            }
        },
        None => Some(table_source.ok_or_else(|| XlsxLayoutError::MissingSourceTable {
            sheet: c_sheet_name.to_string(),
        })?),
    };

    let mut table_plan = None;
    let mut freeze_pane = None;
    let mut l_columns: &[String] = &[];
    if let Some(table) = table_emitted {
        l_columns = table.columns.as_slice();
        validate_unique_columns(&table.columns).map_err(|message| {
            XlsxLayoutError::InvalidTable {
                sheet: c_sheet_name.to_string(),
                message,
            }
        })?;
        let styles_column = resolve_column_styles(sheet, &table.columns, &fmt_base)?;
        let l_styles_body: Vec<usize> = styles_column
            .l_fmts_body
            .iter()
            .map(|fmt| registry.add_style(fmt.clone()))
            .collect();

        l_rows.push(create_row(
            table
                .columns
                .iter()
                .map(|c_name| (EnumCellValue::String(c_name.clone()), n_style_base)),
        ));
        for row in &table.rows {
            l_rows.push(create_row(
                row.iter().cloned().zip(l_styles_body.iter().copied()),
            ));
        }

        // 3. totals row
        let row_totals = plan_totals_row(
            sheet,
            &table.columns,
            &styles_totals,
            &styles_column.l_fmts_totals_base,
            &mut registry,
        );
        let if_has_totals = row_totals.is_some();
        if let Some(row_totals) = row_totals {
            l_rows.push(row_totals);
        }

        // 4. table registration
        let range = derive_table_range(addr_anchor, table.width(), table.height());
        if table.width() == 0 || table.height() == 0 {
            l_warnings.push(format!(
                "Table on sheet {c_sheet_name:?} has no data rows; table object not registered."
            ));
        } else {
            table_plan = Some(SpecTablePlan {
                range,
                name: derive_table_name(c_sheet_name),
                theme: c_theme.to_string(),
                columns: table.columns.clone(),
                options: sheet.table_options,
            });
        }

        if let Some(EnumFreezePanes::Table) = sheet.freeze_panes {
            let n_rows_totals = u32::from(if_has_totals);
            let addr_bottom_right = range.last.offset(0, n_rows_totals);
            freeze_pane = Some(derive_pane_split(
                addr_bottom_right.next_row().next_column(),
            ));
        }
    } else if let Some(EnumFreezePanes::Table) = sheet.freeze_panes {
        l_warnings.push(format!(
            "freeze_panes: table skipped on sheet {c_sheet_name:?}; no table was emitted."
        ));
    }

    if let Some(EnumFreezePanes::Cell(addr)) = sheet.freeze_panes {
        freeze_pane = Some(derive_pane_split(addr));
    }
    // a split at A1 freezes nothing
    if freeze_pane == Some(SpecFreezePane { rows: 0, cols: 0 }) {
        freeze_pane = None;
    }

    // 5. widths, view
    let column_widths = plan_column_widths(
        sheet,
        &l_rows,
        l_columns,
        &ctx.policy_autofit,
        &mut l_warnings,
    );
    let sheet_view = plan_sheet_view(sheet, &mut l_warnings);

    for c_warning in &l_warnings {
        tracing::warn!(sheet = c_sheet_name, "{c_warning}");
    }
    tracing::debug!(sheet = c_sheet_name, rows = l_rows.len(), "sheet layout planned");

    Ok(SpecResolvedSheetLayout {
        sheet_name: c_sheet_name.to_string(),
        formats: registry.into_formats(),
        rows: l_rows,
        table: table_plan,
        column_widths,
        freeze_pane,
        active_cell: sheet.active_cell,
        sheet_view,
        warnings: l_warnings,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::spec::{
        EnumBorderStyle, EnumCalcField, EnumSequenceSource, SpecHeaderField, SpecStyleOverride,
    };

    fn ctx() -> SpecLayoutContext {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 8)
            .and_then(|d| d.and_hms_opt(15, 30, 0))
            .expect("valid date");
        SpecLayoutContext::new(ts)
    }

    fn s(val: &str) -> EnumCellValue {
        EnumCellValue::String(val.to_string())
    }

    fn table_scores() -> SpecTable {
        SpecTable {
            columns: vec!["Name".to_string(), "Score".to_string()],
            rows: [("ann", 7.0), ("bob", 9.5), ("cy", 3.0), ("di", 4.0)]
                .iter()
                .map(|(name, score)| vec![s(name), EnumCellValue::Number(*score)])
                .collect(),
        }
    }

    fn sheet_scores() -> SpecSheetConfig {
        let mut sheet = SpecSheetConfig::new("Q1 Scores");
        let mut dict_styles = IndexMap::new();
        dict_styles.insert("Name".to_string(), None);
        dict_styles.insert(
            "Score".to_string(),
            Some(SpecStyleOverride {
                default_style: false,
                style: SpecCellFormat {
                    num_format: Some("0.00".to_string()),
                    ..Default::default()
                },
            }),
        );
        sheet.column_styles = Some(dict_styles);
        sheet.table_theme = Some("TableStyleMedium2".to_string());
        sheet
    }

    fn fmt_of<'a>(layout: &'a SpecResolvedSheetLayout, cell: &SpecLayoutCell) -> &'a SpecCellFormat {
        layout.format(cell.style).expect("registered style")
    }

    #[test]
    fn scores_sheet_registers_table_and_styles_totals_edges() {
        let mut sheet = sheet_scores();
        let mut dict_total = IndexMap::new();
        dict_total.insert("Name".to_string(), s("Total"));
        dict_total.insert("Score".to_string(), EnumCellValue::Number(42.0));
        sheet.total_row = Some(dict_total);

        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");

        let table = layout.table.as_ref().expect("table registered");
        assert_eq!(table.range.to_string(), "A3:B7");
        assert_eq!(table.name, "q1_scores");
        assert_eq!(table.theme, "TableStyleMedium2");

        // ts row, blank, header, 4 data rows, totals at row 8
        assert_eq!(layout.rows.len(), 8);
        let row_totals = &layout.rows[7];
        assert_eq!(row_totals.cells[0].value, s("Total"));
        assert_eq!(row_totals.cells[1].value, EnumCellValue::Number(42.0));

        let fmt_name = fmt_of(&layout, &row_totals.cells[0]);
        assert_eq!(fmt_name.left, Some(EnumBorderStyle::Thin));
        assert_eq!(fmt_name.right, None);
        assert_eq!(fmt_name.top, Some(EnumBorderStyle::Double));
        let fmt_score = fmt_of(&layout, &row_totals.cells[1]);
        assert_eq!(fmt_score.right, Some(EnumBorderStyle::Thin));
        assert_eq!(fmt_score.left, None);
        assert_eq!(fmt_score.num_format, None);
    }

    #[test]
    fn freeze_table_lands_past_last_row_and_column() {
        let mut sheet = sheet_scores();
        sheet.freeze_panes = Some(EnumFreezePanes::Table);
        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        assert_eq!(layout.freeze_pane, Some(SpecFreezePane { rows: 7, cols: 2 }));

        let mut dict_total = IndexMap::new();
        dict_total.insert("Name".to_string(), s("Total"));
        sheet.total_row = Some(dict_total);
        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        assert_eq!(layout.freeze_pane, Some(SpecFreezePane { rows: 8, cols: 2 }));
        assert_eq!(layout.rows[7].cells[1].value, EnumCellValue::None);
    }

    #[test]
    fn explicit_freeze_and_active_cell_pass_through() {
        let mut sheet = sheet_scores();
        sheet.freeze_panes = Some(EnumFreezePanes::Cell(
            SpecCellAddress::parse("C4").expect("parse"),
        ));
        sheet.active_cell = Some(SpecCellAddress::parse("B4").expect("parse"));
        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        assert_eq!(layout.freeze_pane, Some(SpecFreezePane { rows: 3, cols: 2 }));
        assert_eq!(layout.active_cell.map(|a| a.to_string()), Some("B4".to_string()));
    }

    #[test]
    fn header_rows_alternate_even_then_odd_counting_blanks() {
        let mut sheet = sheet_scores();
        let mut dict_header = IndexMap::new();
        dict_header.insert(
            "Report".to_string(),
            SpecHeaderField {
                value: s("Weekly"),
                ..Default::default()
            },
        );
        dict_header.insert(
            "Generated".to_string(),
            SpecHeaderField {
                field_type: EnumHeaderFieldType::TimeStamp,
                ..Default::default()
            },
        );
        dict_header.insert(
            "Spacer".to_string(),
            SpecHeaderField {
                field_type: EnumHeaderFieldType::Blank,
                ..Default::default()
            },
        );
        dict_header.insert(
            "Owner".to_string(),
            SpecHeaderField {
                value: s("ops"),
                format: Some(SpecStyleOverride {
                    default_style: false,
                    style: SpecCellFormat {
                        italic: Some(true),
                        ..Default::default()
                    },
                }),
                ..Default::default()
            },
        );
        sheet.header = Some(dict_header);

        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");

        assert_eq!(layout.rows[0].cells[0].value, s("Report"));
        assert_eq!(
            fmt_of(&layout, &layout.rows[0].cells[1]).bg_color.as_deref(),
            None
        );
        assert_eq!(layout.rows[1].cells[1].value, s("Mon, Jan 8, 2024 3:30 PM"));
        assert_eq!(
            fmt_of(&layout, &layout.rows[1].cells[1]).bg_color.as_deref(),
            Some("D9E1F2")
        );
        assert!(layout.rows[2].cells.is_empty());
        let fmt_owner = fmt_of(&layout, &layout.rows[3].cells[1]);
        assert_eq!(fmt_owner.bg_color.as_deref(), Some("D9E1F2"));
        assert_eq!(fmt_owner.italic, Some(true));
        assert_eq!(
            fmt_of(&layout, &layout.rows[3].cells[0]).bg_color.as_deref(),
            Some("4472C4")
        );

        let table = layout.table.as_ref().expect("table registered");
        assert_eq!(table.range.to_string(), "A5:B9");
    }

    #[test]
    fn missing_header_block_emits_time_stamp_and_blank_row() {
        let layout =
            plan_sheet_layout(&sheet_scores(), Some(&table_scores()), &ctx()).expect("layout");
        assert_eq!(layout.rows[0].cells.len(), 1);
        assert_eq!(layout.rows[0].cells[0].value, s("Mon, Jan 8, 2024 3:30 PM"));
        assert_eq!(
            fmt_of(&layout, &layout.rows[0].cells[0]).bold,
            Some(true)
        );
        assert!(layout.rows[1].cells.is_empty());
        assert_eq!(layout.rows[2].cells[0].value, s("Name"));
        let fmt_score = fmt_of(&layout, &layout.rows[3].cells[1]);
        assert_eq!(fmt_score.num_format.as_deref(), Some("0.00"));
        assert_eq!(fmt_score.font_name.as_deref(), Some("Calibri"));
    }

    #[test]
    fn calculated_table_without_collected_column_degrades_to_diagnostic_row() {
        let mut sheet = SpecSheetConfig::new("Calc");
        let mut dict_fields = IndexMap::new();
        dict_fields.insert("A".to_string(), EnumCalcField::Constant { value: s("x") });
        sheet.calculated_table = Some(dict_fields);
        sheet.freeze_panes = Some(EnumFreezePanes::Table);
        sheet.total_row = Some(IndexMap::new());

        let layout = plan_sheet_layout(&sheet, None, &ctx()).expect("layout");
        assert_eq!(layout.rows.len(), 3);
        assert_eq!(
            layout.rows[2].cells[0].value,
            s("CALCULATED TABLE CONFIGURATION ERROR: NO DESIGNATED \"COLLECTED\" COLUMN")
        );
        assert!(layout.table.is_none());
        assert!(layout.freeze_pane.is_none());
        assert_eq!(layout.warnings.len(), 2);
    }

    #[test]
    fn calculated_table_rows_follow_the_collected_sequence() {
        let mut sheet = SpecSheetConfig::new("Top Hosts");
        let mut dict_fields = IndexMap::new();
        dict_fields.insert(
            "Host".to_string(),
            EnumCalcField::Collected {
                sequence_source: EnumSequenceSource::Distinct("Name".to_string()),
            },
        );
        dict_fields.insert(
            "Hits".to_string(),
            EnumCalcField::Constant {
                value: EnumCellValue::from_text("=COUNTIF(Raw!A:A,[@Host])"),
            },
        );
        sheet.calculated_table = Some(dict_fields);

        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        let table = layout.table.as_ref().expect("table registered");
        assert_eq!(table.columns, vec!["Host", "Hits"]);
        assert_eq!(table.range.to_string(), "A3:B7");
        assert_eq!(table.name, "top_hosts");
        assert_eq!(
            layout.rows[3].cells[1].value,
            EnumCellValue::Formula("=COUNTIF(Raw!A:A,[@Host])".to_string())
        );
    }

    #[test]
    fn column_style_mismatch_is_fatal() {
        let mut sheet = sheet_scores();
        let mut table = table_scores();
        table.columns.reverse();
        let err = plan_sheet_layout(&sheet, Some(&table), &ctx()).expect_err("mismatch");
        assert!(matches!(err, XlsxLayoutError::ColumnStyleMismatch { .. }));

        sheet.column_styles = None;
        assert!(plan_sheet_layout(&sheet, Some(&table), &ctx()).is_ok());
        assert!(matches!(
            plan_sheet_layout(&sheet, None, &ctx()),
            Err(XlsxLayoutError::MissingSourceTable { .. })
        ));
    }

    #[test]
    fn headers_differing_only_in_case_are_an_invalid_table() {
        let mut sheet = sheet_scores();
        sheet.column_styles = None;
        let mut table = table_scores();
        table.columns = vec!["Name".to_string(), "name".to_string()];

        let err = plan_sheet_layout(&sheet, Some(&table), &ctx()).expect_err("duplicate");
        assert!(
            matches!(&err, XlsxLayoutError::InvalidTable { sheet, .. } if sheet == "Q1 Scores"),
            "{err}"
        );
    }

    #[test]
    fn default_style_carries_into_totals_without_borders() {
        let mut sheet = sheet_scores();
        let mut dict_styles = IndexMap::new();
        dict_styles.insert("Name".to_string(), None);
        dict_styles.insert(
            "Score".to_string(),
            Some(SpecStyleOverride {
                default_style: true,
                style: SpecCellFormat {
                    num_format: Some("0.00".to_string()),
                    border: Some(EnumBorderStyle::Dashed),
                    ..Default::default()
                },
            }),
        );
        sheet.column_styles = Some(dict_styles);
        sheet.table_theme = Some("NotATheme".to_string());
        let mut dict_total = IndexMap::new();
        dict_total.insert("Score".to_string(), EnumCellValue::from_text("=SUM(B4:B7)"));
        sheet.total_row = Some(dict_total);

        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        let row_totals = &layout.rows[7];
        assert_eq!(row_totals.cells[0].value, EnumCellValue::None);
        assert_eq!(
            row_totals.cells[1].value,
            EnumCellValue::Formula("=SUM(B4:B7)".to_string())
        );
        let fmt_score = fmt_of(&layout, &row_totals.cells[1]);
        assert_eq!(fmt_score.num_format.as_deref(), Some("0.00"));
        assert_eq!(fmt_score.border, None);
        assert_eq!(fmt_score.top, Some(EnumBorderStyle::Thick));
        assert_eq!(fmt_score.bg_color.as_deref(), Some("4472C4"));

        let fmt_body = fmt_of(&layout, &layout.rows[3].cells[1]);
        assert_eq!(fmt_body.border, Some(EnumBorderStyle::Dashed));
    }

    #[test]
    fn explicit_widths_override_autofit() {
        let mut sheet = sheet_scores();
        let mut dict_widths = IndexMap::new();
        dict_widths.insert("Name".to_string(), Some(24.0));
        dict_widths.insert("Score".to_string(), None);
        sheet.column_widths = Some(dict_widths);

        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        assert_eq!(layout.column_widths.len(), 2);
        assert_eq!(layout.column_widths[0], 24.0);
        assert_eq!(layout.column_widths[1], 8.0);
    }

    #[test]
    fn identical_formats_share_one_handle() {
        let layout =
            plan_sheet_layout(&sheet_scores(), Some(&table_scores()), &ctx()).expect("layout");
        let n_style_header = layout.rows[2].cells[0].style;
        let n_style_name = layout.rows[3].cells[0].style;
        assert_eq!(n_style_header, n_style_name);
        assert_eq!(n_style_header, 0);
    }

    #[test]
    fn zoom_outside_excel_bounds_is_dropped() {
        let mut sheet = sheet_scores();
        sheet.sheet_view = Some(SpecSheetView {
            show_grid_lines: Some(false),
            zoom_scale: Some(900),
            right_to_left: None,
        });
        let layout = plan_sheet_layout(&sheet, Some(&table_scores()), &ctx()).expect("layout");
        let sheet_view = layout.sheet_view.expect("view");
        assert_eq!(sheet_view.zoom_scale, None);
        assert_eq!(sheet_view.show_grid_lines, Some(false));
        assert_eq!(layout.warnings.len(), 1);
    }
}
