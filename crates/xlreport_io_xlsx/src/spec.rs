//! Shared report specification models.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::address::{SpecCellAddress, SpecCellRange};
use crate::conf::{C_FMT_TIME_STAMP_MOMENT, C_FREEZE_PANES_TABLE, C_TABLE_THEME_DEFAULT};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Border line style for one or more cell edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumBorderStyle {
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

/// Fixed-schema cell format.
///
/// Every attribute is optional so formats can be layered with [`Self::merge`]:
/// base font, then theme role, then user override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    #[serde(alias = "sz")]
    pub font_size: Option<i64>,
    /// Bold style.
    #[serde(alias = "b")]
    pub bold: Option<bool>,
    /// Italic style.
    #[serde(alias = "i")]
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<EnumBorderStyle>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<EnumBorderStyle>,
    /// Bottom border override.
    pub bottom: Option<EnumBorderStyle>,
    /// Left border override.
    pub left: Option<EnumBorderStyle>,
    /// Right border override.
    pub right: Option<EnumBorderStyle>,
    /// Color shared by every drawn border edge.
    pub border_color: Option<String>,

    /// Number format code.
    #[serde(alias = "format_code")]
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    #[serde(alias = "fg_color")]
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            border_color: other
                .border_color
                .clone()
                .or_else(|| self.border_color.clone()),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }

    /// Copy of `self` with every border attribute cleared.
    pub fn without_borders(&self) -> SpecCellFormat {
        SpecCellFormat {
            border: None,
            top: None,
            bottom: None,
            left: None,
            right: None,
            border_color: None,
            ..self.clone()
        }
    }
}

/// Normalized cell value during layout/write pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Formula text including the leading `=`.
    Formula(String),
}

impl EnumCellValue {
    /// Classify configured text: a leading `=` marks a formula.
    pub fn from_text(text: impl Into<String>) -> Self {
        let c_text = text.into();
        if c_text.starts_with('=') && c_text.len() > 1 {
            Self::Formula(c_text)
        } else {
            Self::String(c_text)
        }
    }

    /// Key used when counting value frequencies.
    pub(crate) fn frequency_key(&self) -> String {
        match self {
            Self::None => "\u{0}none".to_string(),
            Self::String(s) => format!("s:{s}"),
            Self::Formula(s) => format!("f:{s}"),
            Self::Number(n) => format!("n:{n}"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EnumScalarInput {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for EnumCellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<EnumScalarInput>::deserialize(deserializer)? {
            None => EnumCellValue::None,
            Some(EnumScalarInput::Bool(val)) => {
                EnumCellValue::String(if val { "True" } else { "False" }.to_string())
            }
            Some(EnumScalarInput::Int(val)) => EnumCellValue::Number(val as f64),
            Some(EnumScalarInput::Float(val)) => EnumCellValue::Number(val),
            Some(EnumScalarInput::Text(val)) => EnumCellValue::from_text(val),
        };
        Ok(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableSpecification

/// Row-major table with unique, ordered column names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    /// Header names in column order.
    pub columns: Vec<String>,
    /// Data rows; each row has `columns.len()` cells.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecTable {
    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows (header excluded).
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Zero-based index of column `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c_name| c_name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ThemeSpecification

/// Theme family; decides totals-row border pattern and fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumThemeFamily {
    /// `TableStyleMedium1`..`7`: double top border, thin side borders, no fill.
    Banded,
    /// `TableStyleMedium8`..`14` and unknown names: thick top border, colored fill.
    Filled,
}

/// Immutable theme record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecTableTheme {
    /// Excel table style name.
    pub name: &'static str,
    /// Theme family.
    pub family: EnumThemeFamily,
    /// Header border color.
    pub color_border: &'static str,
    /// Header label fill (also totals fill for the filled family).
    pub color_label_fill: &'static str,
    /// Fill of odd header value rows.
    pub color_odd_fill: &'static str,
    /// Fill of even header value rows, if any.
    pub color_even_fill: Option<&'static str>,
}

/// Resolved header block formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderStyles {
    /// Label cell format.
    pub label: SpecCellFormat,
    /// Value format for odd header rows.
    pub value_odd: SpecCellFormat,
    /// Value format for even header rows (the first row is even).
    pub value_even: SpecCellFormat,
}

impl SpecHeaderStyles {
    /// Value format for zero-based header row `n_idx_row`.
    pub fn value_for_row(&self, n_idx_row: usize) -> &SpecCellFormat {
        if n_idx_row % 2 == 0 {
            &self.value_even
        } else {
            &self.value_odd
        }
    }
}

/// Position of a totals-row cell within the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumTotalsPosition {
    /// First column.
    Left,
    /// Any column between first and last.
    Middle,
    /// Last column.
    Right,
}

impl EnumTotalsPosition {
    /// Position of column `n_idx_col` in a row of `n_width` cells.
    ///
    /// A single-column row is `Left`.
    pub fn from_index(n_idx_col: usize, n_width: usize) -> Self {
        if n_idx_col == 0 {
            Self::Left
        } else if n_idx_col + 1 == n_width {
            Self::Right
        } else {
            Self::Middle
        }
    }
}

/// Resolved totals-row formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTotalsStyles {
    /// Leftmost cell format.
    pub left: SpecCellFormat,
    /// Middle cells format.
    pub middle: SpecCellFormat,
    /// Rightmost cell format.
    pub right: SpecCellFormat,
}

impl SpecTotalsStyles {
    /// Format for `position`.
    pub fn get(&self, position: EnumTotalsPosition) -> &SpecCellFormat {
        match position {
            EnumTotalsPosition::Left => &self.left,
            EnumTotalsPosition::Middle => &self.middle,
            EnumTotalsPosition::Right => &self.right,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConfigSpecification

/// Whole report configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecReportConfig {
    /// Sheets in output order.
    pub sheets: Vec<SpecSheetConfig>,
    /// Output target(s).
    pub output: SpecOutputTarget,
}

/// One directory or a list of directories.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnumOutputDirs {
    /// Single output directory.
    One(PathBuf),
    /// Several output directories, written in order.
    Many(Vec<PathBuf>),
}

impl EnumOutputDirs {
    /// Flatten into an ordered list.
    pub fn to_vec(&self) -> Vec<PathBuf> {
        match self {
            Self::One(path) => vec![path.clone()],
            Self::Many(paths) => paths.clone(),
        }
    }
}

/// Output destination(s) and base name.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecOutputTarget {
    /// Destination directories.
    pub dir: EnumOutputDirs,
    /// File base name without extension.
    pub name: String,
    /// Append `-YYYYmmdd-HHMMSS` to the file name.
    #[serde(default)]
    pub timestamped: bool,
}

impl SpecOutputTarget {
    /// Output file name for a run generated at `time_stamp`.
    pub fn derive_file_name(&self, time_stamp: &NaiveDateTime) -> String {
        if self.timestamped {
            format!(
                "{}-{}.xlsx",
                self.name,
                time_stamp.format(C_FMT_TIME_STAMP_MOMENT)
            )
        } else {
            format!("{}.xlsx", self.name)
        }
    }
}

/// Header field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumHeaderFieldType {
    /// Literal configured value.
    #[default]
    Value,
    /// Report generation instant.
    TimeStamp,
    /// Empty spacer row.
    Blank,
}

/// Explicit style of a column or header field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SpecStyleOverride {
    /// For columns: also carry this style (minus borders) into the totals row.
    pub default_style: bool,
    /// Style attributes merged over the base font.
    pub style: SpecCellFormat,
}

/// One header block entry.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecHeaderField {
    /// Field kind.
    #[serde(rename = "type", default)]
    pub field_type: EnumHeaderFieldType,
    /// Literal value for [`EnumHeaderFieldType::Value`].
    #[serde(default)]
    pub value: EnumCellValue,
    /// Optional value-cell style merged over the theme value style.
    #[serde(default)]
    pub format: Option<SpecStyleOverride>,
}

/// Excel table object flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecTableOptions {
    /// Banded rows.
    pub show_row_stripes: bool,
    /// Banded columns.
    pub show_column_stripes: bool,
    /// Highlight first column.
    pub show_first_column: bool,
    /// Highlight last column.
    pub show_last_column: bool,
}

impl Default for SpecTableOptions {
    fn default() -> Self {
        Self {
            show_row_stripes: true,
            show_column_stripes: false,
            show_first_column: false,
            show_last_column: false,
        }
    }
}

/// Freeze pane request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum EnumFreezePanes {
    /// Freeze just below and right of the registered table.
    Table,
    /// Freeze with this cell as the top-left scrollable cell.
    Cell(SpecCellAddress),
}

impl TryFrom<String> for EnumFreezePanes {
    type Error = XlsxLayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim() == C_FREEZE_PANES_TABLE {
            return Ok(Self::Table);
        }
        SpecCellAddress::parse(&value).map(Self::Cell)
    }
}

/// Optional worksheet view settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct SpecSheetView {
    /// Show screen grid lines.
    pub show_grid_lines: Option<bool>,
    /// Zoom percentage.
    pub zoom_scale: Option<u16>,
    /// Right-to-left sheet direction.
    pub right_to_left: Option<bool>,
}

/// Source of the values of the one collected calculated-table column.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumSequenceSource {
    /// Literal values.
    Values(Vec<EnumCellValue>),
    /// Every value of a source column, in row order.
    Column(String),
    /// Unique values of a source column, in first-appearance order.
    Distinct(String),
    /// Most frequent values of a source column.
    TopByFrequency {
        /// Source column name.
        column: String,
        /// Maximum number of values.
        limit: usize,
    },
}

/// Calculated-table column kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field_type", rename_all = "snake_case")]
pub enum EnumCalcField {
    /// One value per row, taken from the sequence.
    Collected {
        /// Sequence supplying the row values.
        sequence_source: EnumSequenceSource,
    },
    /// The same value on every row.
    Constant {
        /// Repeated value; a leading `=` makes it a formula.
        #[serde(default)]
        value: EnumCellValue,
    },
}

/// One worksheet configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecSheetConfig {
    /// Worksheet name.
    pub worksheet_name: String,
    /// Directory holding the delimited source files.
    #[serde(default)]
    pub data_directory: Option<PathBuf>,
    /// Source file name prefix; the latest modified match is read.
    #[serde(default)]
    pub base_filename: Option<String>,
    /// Field delimiter of the source file.
    #[serde(default = "derive_default_delimiter")]
    pub delimiter: char,
    /// Header block entries, label -> field.
    #[serde(default)]
    pub header: Option<IndexMap<String, SpecHeaderField>>,
    /// Column -> explicit style or `null`; order is column order.
    #[serde(default)]
    pub column_styles: Option<IndexMap<String, Option<SpecStyleOverride>>>,
    /// Excel table style name.
    #[serde(default)]
    pub table_theme: Option<String>,
    /// Table object flags.
    #[serde(default)]
    pub table_options: SpecTableOptions,
    /// Column -> totals value.
    #[serde(default)]
    pub total_row: Option<IndexMap<String, EnumCellValue>>,
    /// Column -> calculated field.
    #[serde(default)]
    pub calculated_table: Option<IndexMap<String, EnumCalcField>>,
    /// Column -> width; `null` means auto.
    #[serde(default)]
    pub column_widths: Option<IndexMap<String, Option<f64>>>,
    /// Freeze panes request.
    #[serde(default)]
    pub freeze_panes: Option<EnumFreezePanes>,
    /// Cell selected when the sheet opens.
    #[serde(default)]
    pub active_cell: Option<SpecCellAddress>,
    /// View settings.
    #[serde(default)]
    pub sheet_view: Option<SpecSheetView>,
}

fn derive_default_delimiter() -> char {
    ','
}

impl SpecSheetConfig {
    /// Minimal sheet config with defaults for every optional setting.
    pub fn new(worksheet_name: impl Into<String>) -> Self {
        Self {
            worksheet_name: worksheet_name.into(),
            data_directory: None,
            base_filename: None,
            delimiter: derive_default_delimiter(),
            header: None,
            column_styles: None,
            table_theme: None,
            table_options: SpecTableOptions::default(),
            total_row: None,
            calculated_table: None,
            column_widths: None,
            freeze_panes: None,
            active_cell: None,
            sheet_view: None,
        }
    }

    /// Configured theme name, or the default theme.
    pub fn table_theme_name(&self) -> &str {
        self.table_theme.as_deref().unwrap_or(C_TABLE_THEME_DEFAULT)
    }

    /// Whether a delimited source file is configured.
    pub fn has_source(&self) -> bool {
        self.data_directory.is_some() && self.base_filename.is_some()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSpecification

/// Width inference policy for columns without an explicit width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// One written cell; `style` indexes [`SpecResolvedSheetLayout::formats`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecLayoutCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Style handle.
    pub style: usize,
}

/// One worksheet row starting at column `A`; an empty row writes nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecLayoutRow {
    /// Cells from column `A` rightwards.
    pub cells: Vec<SpecLayoutCell>,
}

/// Excel table object to register.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecTablePlan {
    /// Header row through last data row.
    pub range: SpecCellRange,
    /// Table name derived from the worksheet name.
    pub name: String,
    /// Excel table style name.
    pub theme: String,
    /// Header names.
    pub columns: Vec<String>,
    /// Table flags.
    pub options: SpecTableOptions,
}

/// Frozen rows/columns count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecFreezePane {
    /// Rows above the split.
    pub rows: u32,
    /// Columns left of the split.
    pub cols: u32,
}

/// Everything needed to write one worksheet; produced by
/// [`crate::layout::plan_sheet_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpecResolvedSheetLayout {
    /// Worksheet name.
    pub sheet_name: String,
    /// Interned formats; cells refer to them by index.
    pub formats: Vec<SpecCellFormat>,
    /// Rows; `rows[0]` is worksheet row 1.
    pub rows: Vec<SpecLayoutRow>,
    /// Registered table, if any.
    pub table: Option<SpecTablePlan>,
    /// Final width per column, from column `A`.
    pub column_widths: Vec<f64>,
    /// Frozen pane split.
    pub freeze_pane: Option<SpecFreezePane>,
    /// Active cell.
    pub active_cell: Option<SpecCellAddress>,
    /// View settings.
    pub sheet_view: Option<SpecSheetView>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<String>,
}

impl SpecResolvedSheetLayout {
    /// Format behind style handle `n_style`.
    pub fn format(&self, n_style: usize) -> Option<&SpecCellFormat> {
        self.formats.get(n_style)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-sheet write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Number of worksheet rows emitted.
    pub n_rows: usize,
    /// Registered table range in A1 notation.
    pub table_range: Option<String>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Layout and workbook write failures.
#[derive(Debug, Error)]
pub enum XlsxLayoutError {
    /// Text is not `<letters><digits>` with a row >= 1.
    #[error("Malformed cell address: {0:?}")]
    MalformedAddress(String),
    /// Sheet needs a source table but none was supplied.
    #[error("Sheet {sheet:?} has no source table")]
    MissingSourceTable {
        /// Worksheet name.
        sheet: String,
    },
    /// `column_styles` keys differ from the emitted table headers.
    #[error("Sheet {sheet:?}: column_styles {expected:?} do not match table columns {found:?}")]
    ColumnStyleMismatch {
        /// Worksheet name.
        sheet: String,
        /// Configured column order.
        expected: Vec<String>,
        /// Table column order.
        found: Vec<String>,
    },
    /// Emitted table is not a valid Excel table (e.g. duplicate headers).
    #[error("Sheet {sheet:?}: {message}")]
    InvalidTable {
        /// Worksheet name.
        sheet: String,
        /// Validation message.
        message: String,
    },
    /// A cell referenced a style handle that was never registered.
    #[error("Unknown style handle: {0}")]
    UnknownStyleHandle(usize),
    /// Row/column index exceeds the xlsx grid.
    #[error("{0}")]
    IndexOverflow(String),
    /// Error from `rust_xlsxwriter`.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    /// Error reading a table cell.
    #[error("Failed to read table cell: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Calculated-table misconfiguration; degrades to a diagnostic row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcTableError {
    /// No column is marked collected.
    #[error("NO DESIGNATED \"COLLECTED\" COLUMN")]
    NoCollectedColumn,
    /// More than one column is marked collected.
    #[error("MULTIPLE \"COLLECTED\" COLUMNS: {}", .0.join(", "))]
    MultipleCollectedColumns(Vec<String>),
    /// The sequence source names a column the source table lacks.
    #[error("UNKNOWN SOURCE COLUMN {0:?}")]
    UnknownSourceColumn(String),
    /// A column-based sequence source on a sheet without a source table.
    #[error("NO SOURCE TABLE FOR COLUMN {0:?}")]
    MissingSourceTable(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
