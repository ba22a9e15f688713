//! Report constants, base font preset and the static theme table.

use crate::spec::{EnumThemeFamily, SpecCellFormat, SpecTableTheme};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Font family merged under every resolved cell format.
pub const C_FONT_NAME_DEFAULT: &str = "Calibri";
/// Font size merged under every resolved cell format.
pub const N_FONT_SIZE_DEFAULT: i64 = 12;

/// Theme used when a sheet names none, and the appearance of unknown names.
pub const C_TABLE_THEME_DEFAULT: &str = "TableStyleMedium9";

/// Header time stamp, e.g. `Mon, Jan 8, 2024 9:05 AM`.
pub const C_FMT_TIME_STAMP_PRETTY: &str = "%a, %b %-d, %Y %-I:%M %p";
/// Compact time stamp appended to timestamped output names.
pub const C_FMT_TIME_STAMP_MOMENT: &str = "%Y%m%d-%H%M%S";

/// Token accepted by `freeze_panes` to freeze past the registered table.
pub const C_FREEZE_PANES_TABLE: &str = "table";

/// Prefix of the single row emitted for a misconfigured calculated table.
pub const C_MSG_CALC_TABLE_ERROR: &str = "CALCULATED TABLE CONFIGURATION ERROR";

/// Header label / totals font color.
pub const C_COLOR_FONT_LIGHT: &str = "FFFFFF";
/// Header value font color.
pub const C_COLOR_FONT_DARK: &str = "000000";
/// Border color of filled-family totals rows.
pub const C_COLOR_BORDER_FILLED: &str = "FFFFFF";

/// Excel zoom bounds accepted by `sheet_view.zoom_scale`.
pub const N_ZOOM_SCALE_MIN: u16 = 10;
/// See [`N_ZOOM_SCALE_MIN`].
pub const N_ZOOM_SCALE_MAX: u16 = 400;

const fn create_theme(
    name: &'static str,
    family: EnumThemeFamily,
    color_border: &'static str,
    color_label_fill: &'static str,
    color_odd_fill: &'static str,
    color_even_fill: Option<&'static str>,
) -> SpecTableTheme {
    SpecTableTheme {
        name,
        family,
        color_border,
        color_label_fill,
        color_odd_fill,
        color_even_fill,
    }
}

/// Named themes with dedicated header/totals appearance.
pub static TUP_TABLE_THEMES: [SpecTableTheme; 14] = [
    create_theme("TableStyleMedium1", EnumThemeFamily::Banded, "000000", "000000", "D9D9D9", None),
    create_theme("TableStyleMedium2", EnumThemeFamily::Banded, "8EA9DB", "4472C4", "D9E1F2", None),
    create_theme("TableStyleMedium3", EnumThemeFamily::Banded, "F4B084", "ED7D31", "FCE4D6", None),
    create_theme("TableStyleMedium4", EnumThemeFamily::Banded, "C9C9C9", "A5A5A5", "EDEDED", None),
    create_theme("TableStyleMedium5", EnumThemeFamily::Banded, "FFD966", "FFC000", "FFF2CC", None),
    create_theme("TableStyleMedium6", EnumThemeFamily::Banded, "9BC2E6", "5B9BD5", "DDEBF7", None),
    create_theme("TableStyleMedium7", EnumThemeFamily::Banded, "A9D08E", "70AD47", "E2EFDA", None),
    create_theme("TableStyleMedium8", EnumThemeFamily::Filled, "FFFFFF", "000000", "A6A6A6", Some("D9D9D9")),
    create_theme("TableStyleMedium9", EnumThemeFamily::Filled, "FFFFFF", "4472C4", "B4C6E7", Some("D9E1F2")),
    create_theme("TableStyleMedium10", EnumThemeFamily::Filled, "FFFFFF", "ED7D31", "F8CBAD", Some("FCE4D6")),
    create_theme("TableStyleMedium11", EnumThemeFamily::Filled, "FFFFFF", "A5A5A5", "DBDBDB", Some("EDEDED")),
    create_theme("TableStyleMedium12", EnumThemeFamily::Filled, "FFFFFF", "FFC000", "FFE699", Some("FFF2CC")),
    create_theme("TableStyleMedium13", EnumThemeFamily::Filled, "FFFFFF", "5B9BD5", "BDD7EE", Some("DDEBF7")),
    create_theme("TableStyleMedium14", EnumThemeFamily::Filled, "FFFFFF", "70AD47", "C6E0B4", Some("E2EFDA")),
];

/// Index of [`C_TABLE_THEME_DEFAULT`] in [`TUP_TABLE_THEMES`].
pub const N_IDX_TABLE_THEME_DEFAULT: usize = 8;

/// Base font format merged under every resolved style.
pub fn derive_base_font_format() -> SpecCellFormat {
    SpecCellFormat {
        font_name: Some(C_FONT_NAME_DEFAULT.to_string()),
        font_size: Some(N_FONT_SIZE_DEFAULT),
        ..Default::default()
    }
}
