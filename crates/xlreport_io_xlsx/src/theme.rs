//! Theme name -> header block and totals-row cell formats.

use crate::conf::{
    C_COLOR_BORDER_FILLED, C_COLOR_FONT_DARK, C_COLOR_FONT_LIGHT, N_IDX_TABLE_THEME_DEFAULT,
    TUP_TABLE_THEMES,
};
use crate::spec::{
    EnumBorderStyle, EnumThemeFamily, SpecCellFormat, SpecHeaderStyles, SpecTableTheme,
    SpecTotalsStyles,
};

/// Look up a theme record; unknown names fall back to the default theme.
pub fn select_table_theme(name: &str) -> &'static SpecTableTheme {
    TUP_TABLE_THEMES
        .iter()
        .find(|theme| theme.name == name)
        .unwrap_or(&TUP_TABLE_THEMES[N_IDX_TABLE_THEME_DEFAULT])
}

/// Whether `name` has a dedicated appearance record.
pub fn is_known_theme(name: &str) -> bool {
    TUP_TABLE_THEMES.iter().any(|theme| theme.name == name)
}

fn derive_boxed_border(color: &str) -> SpecCellFormat {
    SpecCellFormat {
        border: Some(EnumBorderStyle::Thin),
        border_color: Some(color.to_string()),
        ..Default::default()
    }
}

/// Header label/value formats, each layered over `fmt_base`.
///
/// Every role draws a thin box border in the theme border color.
pub fn resolve_header_styles(theme: &SpecTableTheme, fmt_base: &SpecCellFormat) -> SpecHeaderStyles {
    let fmt_boxed = fmt_base.merge(&derive_boxed_border(theme.color_border));

    let label = fmt_boxed.with_(SpecCellFormat {
        bold: Some(true),
        bg_color: Some(theme.color_label_fill.to_string()),
        font_color: Some(C_COLOR_FONT_LIGHT.to_string()),
        ..Default::default()
    });
    let value_odd = fmt_boxed.with_(SpecCellFormat {
        bg_color: Some(theme.color_odd_fill.to_string()),
        font_color: Some(C_COLOR_FONT_DARK.to_string()),
        ..Default::default()
    });
    let value_even = fmt_boxed.with_(SpecCellFormat {
        bg_color: theme.color_even_fill.map(str::to_string),
        font_color: Some(C_COLOR_FONT_DARK.to_string()),
        ..Default::default()
    });

    SpecHeaderStyles {
        label,
        value_odd,
        value_even,
    }
}

/// Totals-row formats for the left, middle and right cells.
pub fn resolve_totals_styles(theme: &SpecTableTheme, fmt_base: &SpecCellFormat) -> SpecTotalsStyles {
    match theme.family {
        EnumThemeFamily::Banded => {
            let fmt_role = fmt_base.with_(SpecCellFormat {
                top: Some(EnumBorderStyle::Double),
                bottom: Some(EnumBorderStyle::Thin),
                border_color: Some(theme.color_border.to_string()),
                ..Default::default()
            });
            SpecTotalsStyles {
                left: fmt_role.with_(SpecCellFormat {
                    left: Some(EnumBorderStyle::Thin),
                    ..Default::default()
                }),
                middle: fmt_role.clone(),
                right: fmt_role.with_(SpecCellFormat {
                    right: Some(EnumBorderStyle::Thin),
                    ..Default::default()
                }),
            }
        }
        EnumThemeFamily::Filled => {
            let fmt_role = fmt_base.with_(SpecCellFormat {
                top: Some(EnumBorderStyle::Thick),
                bold: Some(true),
                bg_color: Some(theme.color_label_fill.to_string()),
                font_color: Some(C_COLOR_FONT_LIGHT.to_string()),
                border_color: Some(C_COLOR_BORDER_FILLED.to_string()),
                ..Default::default()
            });
            SpecTotalsStyles {
                left: fmt_role.with_(SpecCellFormat {
                    right: Some(EnumBorderStyle::Thin),
                    ..Default::default()
                }),
                middle: fmt_role.with_(SpecCellFormat {
                    left: Some(EnumBorderStyle::Thin),
                    right: Some(EnumBorderStyle::Thin),
                    ..Default::default()
                }),
                right: fmt_role.with_(SpecCellFormat {
                    left: Some(EnumBorderStyle::Thin),
                    ..Default::default()
                }),
            }
        }
    }
}
