//! `xlreport_io_xlsx` v1:
//! Layout and style-resolution engine for configured xlsx reports.
//!
//! Modules:
//! - `conf`    : constants, base font, static theme table
//! - `spec`    : config models, resolved layout models, errors
//! - `address` : integer-backed A1 cell addresses
//! - `util`    : pure helper functions (ranges, panes, widths, names)
//! - `theme`   : theme name -> header/totals cell formats
//! - `calc`    : calculated-table synthesis
//! - `layout`  : per-sheet layout assembler
//! - `writer`  : `rust_xlsxwriter` workbook kernel
pub mod address;
pub mod calc;
pub mod conf;
pub mod layout;
pub mod spec;
pub mod theme;
pub mod util;
pub mod writer;

pub use address::{SpecCellAddress, SpecCellRange};
pub use calc::{build_calculated_table, evaluate_sequence_source};
pub use conf::{C_TABLE_THEME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
pub use layout::{SpecLayoutContext, plan_sheet_layout};
pub use spec::{
    CalcTableError, EnumBorderStyle, EnumCalcField, EnumCellValue, EnumFreezePanes,
    EnumHeaderFieldType, EnumOutputDirs, EnumSequenceSource, EnumThemeFamily,
    EnumTotalsPosition, SpecAutofitCellsPolicy, SpecCellFormat, SpecFreezePane,
    SpecHeaderField, SpecHeaderStyles, SpecLayoutCell, SpecLayoutRow, SpecOutputTarget,
    SpecReportConfig, SpecResolvedSheetLayout, SpecSheetConfig, SpecSheetView,
    SpecStyleOverride, SpecTable, SpecTableOptions, SpecTablePlan, SpecTableTheme,
    SpecTotalsStyles, SpecXlsxReport, XlsxLayoutError,
};
pub use theme::{resolve_header_styles, resolve_totals_styles, select_table_theme};
pub use util::{derive_pane_split, derive_table_range};
pub use writer::{XlsxWriter, derive_table_from_dataframe};
