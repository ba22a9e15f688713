//! Stateless helper utilities used by the layout assembler and writer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::address::{SpecCellAddress, SpecCellRange};
use crate::conf::{C_FMT_TIME_STAMP_PRETTY, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellValue, SpecAutofitCellsPolicy, SpecFreezePane};

////////////////////////////////////////////////////////////////////////////////
// #region RangeUtils

/// Range of a table anchored at `top_left` with a header row plus
/// `n_height` data rows and `n_width` columns.
pub fn derive_table_range(
    top_left: SpecCellAddress,
    n_width: usize,
    n_height: usize,
) -> SpecCellRange {
    let n_cols_extra = u32::try_from(n_width.saturating_sub(1)).unwrap_or(u32::MAX);
    let n_rows_extra = u32::try_from(n_height).unwrap_or(u32::MAX);
    SpecCellRange {
        first: top_left,
        last: top_left.offset(n_cols_extra, n_rows_extra),
    }
}

/// Frozen rows/columns for a split whose top-left scrollable cell is `addr`.
pub fn derive_pane_split(addr: SpecCellAddress) -> SpecFreezePane {
    SpecFreezePane {
        rows: addr.row - 1,
        cols: addr.col,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NameUtils

/// Table name: lower-cased worksheet name with whitespace runs joined by `_`.
///
/// Characters Excel rejects in defined names become `_`, and a name that
/// would not start with a letter or read as a cell reference gets a `_` prefix.
pub fn derive_table_name(worksheet_name: &str) -> String {
    let c_name = worksheet_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let mut c_name: String = c_name
        .chars()
        .map(|chr| {
            if chr.is_alphanumeric() || chr == '_' || chr == '.' {
                chr
            } else {
                '_'
            }
        })
        .collect();

    let if_bad_start = !c_name
        .chars()
        .next()
        .is_some_and(|chr| chr.is_alphabetic() || chr == '_');
    let if_cell_like = SpecCellAddress::parse(&c_name).is_ok() || c_name == "r" || c_name == "c";
    if if_bad_start || if_cell_like {
        c_name.insert(0, '_');
    }
    c_name
}

/// Validate an Excel worksheet name.
pub fn validate_sheet_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Worksheet name must not be empty.".to_string());
    }
    if name.chars().count() > N_LEN_EXCEL_SHEET_NAME_MAX {
        return Err(format!(
            "Worksheet name {name:?} exceeds {N_LEN_EXCEL_SHEET_NAME_MAX} characters."
        ));
    }
    if let Some(c_illegal) = TUP_EXCEL_ILLEGAL.iter().find(|c| name.contains(**c)) {
        return Err(format!(
            "Worksheet name {name:?} contains illegal character {c_illegal:?}."
        ));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(format!(
            "Worksheet name {name:?} must not start or end with an apostrophe."
        ));
    }
    Ok(())
}

/// Validate that `columns` has no duplicated names.
///
/// Excel table headers compare case-insensitively, so `Name` and `name`
/// collide.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), String> {
    let l_keys: Vec<String> = columns.iter().map(|c_name| c_name.to_lowercase()).collect();
    if l_keys.len() == l_keys.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_key) in l_keys.iter().enumerate() {
        dict_pos.entry(c_key.as_str()).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {:?}", l_pos.len(), l_pos))
        .collect::<Vec<_>>()
        .join("; ");

    Err(format!("Duplicate column names detected: {c_msg}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TextUtils

/// Header text of a time stamp field, e.g. `Mon, Jan 8, 2024 9:05 AM`.
pub fn derive_time_stamp_text(time_stamp: &NaiveDateTime) -> String {
    time_stamp.format(C_FMT_TIME_STAMP_PRETTY).to_string()
}

/// Estimate displayed width units for one cell value.
pub fn estimate_width_len(value: &EnumCellValue) -> usize {
    match value {
        EnumCellValue::None => 0,
        // formulas display their result; the source text overstates width
        EnumCellValue::Formula(_) => 0,
        EnumCellValue::String(s) => estimate_unicode_string_width(s),
        EnumCellValue::Number(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                (*n as i64).to_string().len()
            } else {
                n.to_string().len()
            }
        }
    }
}

pub(crate) fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Clamp a recorded content width into the policy bounds.
pub fn derive_autofit_width(n_width_recorded: usize, policy: &SpecAutofitCellsPolicy) -> f64 {
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    let n_width_final = usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy.width_cell_padding),
    );
    n_width_final as f64
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
