//! Report configuration loading and load-time validation.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use xlreport_io_xlsx::calc::select_collected_column;
use xlreport_io_xlsx::util::validate_sheet_name;
use xlreport_io_xlsx::{SpecReportConfig, SpecSheetConfig};

use crate::error::ReportError;

/// Read, parse and validate a YAML report configuration.
pub fn load_config<P>(path: P) -> Result<SpecReportConfig, ReportError>
where
    P: AsRef<Path>,
{
    let path_conf = path.as_ref();
    let config = read_config(path_conf)?;
    for c_warning in validate_config(&config)? {
        tracing::warn!(config = %path_conf.display(), "{c_warning}");
    }
    Ok(config)
}

/// Read and parse a YAML report configuration without validating it.
pub(crate) fn read_config(path_conf: &Path) -> Result<SpecReportConfig, ReportError> {
    let c_text = fs::read_to_string(path_conf).map_err(|source| ReportError::ConfigRead {
        path: path_conf.to_path_buf(),
        source,
    })?;
    let config: SpecReportConfig =
        serde_yaml::from_str(&c_text).map_err(|source| ReportError::ConfigParse {
            origin: path_conf.display().to_string(),
            source,
        })?;
    tracing::debug!(
        config = %path_conf.display(),
        sheets = config.sheets.len(),
        "config loaded"
    );
    Ok(config)
}

/// Parse and validate a YAML report configuration held in memory.
pub fn parse_config(text: &str) -> Result<SpecReportConfig, ReportError> {
    let config: SpecReportConfig =
        serde_yaml::from_str(text).map_err(|source| ReportError::ConfigParse {
            origin: "<memory>".to_string(),
            source,
        })?;
    for c_warning in validate_config(&config)? {
        tracing::warn!("{c_warning}");
    }
    Ok(config)
}

/// Field delimiter of `sheet` as a single byte.
pub fn derive_delimiter_byte(sheet: &SpecSheetConfig) -> Result<u8, ReportError> {
    if sheet.delimiter.is_ascii() {
        Ok(sheet.delimiter as u8)
    } else {
        Err(ReportError::ConfigInvalid(format!(
            "sheet {:?}: delimiter {:?} is not a single byte",
            sheet.worksheet_name, sheet.delimiter
        )))
    }
}

fn validate_subset_keys<'a>(
    sheet: &SpecSheetConfig,
    c_setting: &str,
    keys: impl Iterator<Item = &'a String>,
) -> Result<(), ReportError> {
    let Some(dict_column_styles) = &sheet.column_styles else {
        return Ok(());
    };
    let l_unknown: Vec<&String> = keys
        .filter(|c_key| !dict_column_styles.contains_key(*c_key))
        .collect();
    if l_unknown.is_empty() {
        return Ok(());
    }
    Err(ReportError::ConfigInvalid(format!(
        "sheet {:?}: {c_setting} names columns missing from column_styles: {l_unknown:?}",
        sheet.worksheet_name
    )))
}

fn validate_sheet(sheet: &SpecSheetConfig, l_warnings: &mut Vec<String>) -> Result<(), ReportError> {
    let c_sheet = &sheet.worksheet_name;
    validate_sheet_name(c_sheet).map_err(ReportError::ConfigInvalid)?;
    derive_delimiter_byte(sheet)?;

    if !sheet.has_source() {
        if sheet.data_directory.is_some() || sheet.base_filename.is_some() {
            return Err(ReportError::ConfigInvalid(format!(
                "sheet {c_sheet:?}: data_directory and base_filename must be given together"
            )));
        }
        if sheet.calculated_table.is_none() {
            return Err(ReportError::ConfigInvalid(format!(
                "sheet {c_sheet:?}: needs data_directory and base_filename, or a calculated_table"
            )));
        }
    }

    if let Some(dict_total_row) = &sheet.total_row {
        validate_subset_keys(sheet, "total_row", dict_total_row.keys())?;
    }
    if let Some(dict_widths) = &sheet.column_widths {
        validate_subset_keys(sheet, "column_widths", dict_widths.keys())?;
    }

    if let Some(dict_fields) = &sheet.calculated_table
        && let Err(err) = select_collected_column(dict_fields)
    {
        l_warnings.push(format!(
            "sheet {c_sheet:?}: calculated_table is misconfigured ({err}); a diagnostic row will be written"
        ));
    }
    Ok(())
}

/// Check the invariants serde cannot express.
///
/// Returns non-fatal warnings; zero or several collected columns in a
/// calculated table are warnings, everything else is an error.
pub fn validate_config(config: &SpecReportConfig) -> Result<Vec<String>, ReportError> {
    if config.sheets.is_empty() {
        return Err(ReportError::ConfigInvalid(
            "at least one sheet is required".to_string(),
        ));
    }
    if config.output.name.trim().is_empty() {
        return Err(ReportError::ConfigInvalid(
            "output.name must not be empty".to_string(),
        ));
    }
    if config.output.dir.to_vec().is_empty() {
        return Err(ReportError::ConfigInvalid(
            "output.dir must name at least one directory".to_string(),
        ));
    }

    let mut l_warnings = Vec::new();
    let mut set_names = BTreeSet::new();
    for sheet in &config.sheets {
        validate_sheet(sheet, &mut l_warnings)?;
        if !set_names.insert(sheet.worksheet_name.to_lowercase()) {
            return Err(ReportError::ConfigInvalid(format!(
                "duplicate worksheet name {:?}",
                sheet.worksheet_name
            )));
        }
    }
    Ok(l_warnings)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xlreport_io_xlsx::{
        EnumCalcField, EnumCellValue, EnumFreezePanes, EnumHeaderFieldType, EnumOutputDirs,
        EnumSequenceSource, SpecCellAddress,
    };

    use super::*;

    const C_YAML_FULL: &str = r##"
output:
  dir: [out_a, out_b]
  name: weekly_report
sheets:
  - worksheet_name: Scores
    data_directory: data
    base_filename: scores_
    delimiter: ";"
    header:
      Report: { type: value, value: "Weekly scores" }
      Generated: { type: time_stamp }
      Spacer: { type: blank }
      Owner: { value: 42, format: { style: { b: true, fg_color: "#FF0000" } } }
    column_styles:
      Name: null
      Score: { default_style: true, style: { format_code: "0.00", sz: 10, border: thin } }
    table_theme: TableStyleMedium2
    table_options: { show_row_stripes: false, show_first_column: true }
    total_row: { Name: Total, Score: "=SUM(B6:B9)" }
    column_widths: { Name: 24, Score: null }
    freeze_panes: table
    active_cell: b6
    sheet_view: { show_grid_lines: false, zoom_scale: 120 }
  - worksheet_name: Top Hosts
    calculated_table:
      Host: { field_type: collected, sequence_source: { values: [alpha, beta] } }
      Hits: { field_type: constant, value: "=COUNTIF(Scores!A:A,[@Host])" }
      Note: { field_type: constant }
    freeze_panes: C4
"##;

    #[test]
    fn full_document_parses_into_typed_models() {
        let config = parse_config(C_YAML_FULL).expect("valid config");
        assert_eq!(
            config.output.dir,
            EnumOutputDirs::Many(vec!["out_a".into(), "out_b".into()])
        );
        assert!(!config.output.timestamped);

        let sheet = &config.sheets[0];
        assert_eq!(derive_delimiter_byte(sheet).expect("byte"), b';');
        let dict_header = sheet.header.as_ref().expect("header");
        let l_types: Vec<EnumHeaderFieldType> =
            dict_header.values().map(|field| field.field_type).collect();
        assert_eq!(
            l_types,
            vec![
                EnumHeaderFieldType::Value,
                EnumHeaderFieldType::TimeStamp,
                EnumHeaderFieldType::Blank,
                EnumHeaderFieldType::Value
            ]
        );
        let field_owner = &dict_header["Owner"];
        assert_eq!(field_owner.value, EnumCellValue::Number(42.0));
        let style_owner = &field_owner.format.as_ref().expect("format").style;
        assert_eq!(style_owner.bold, Some(true));
        assert_eq!(style_owner.font_color.as_deref(), Some("#FF0000"));

        let dict_styles = sheet.column_styles.as_ref().expect("styles");
        assert_eq!(dict_styles.keys().collect::<Vec<_>>(), vec!["Name", "Score"]);
        assert!(dict_styles["Name"].is_none());
        let style_score = dict_styles["Score"].as_ref().expect("score style");
        assert!(style_score.default_style);
        assert_eq!(style_score.style.num_format.as_deref(), Some("0.00"));
        assert_eq!(style_score.style.font_size, Some(10));

        assert!(!sheet.table_options.show_row_stripes);
        assert!(sheet.table_options.show_first_column);
        assert_eq!(
            sheet.total_row.as_ref().expect("totals")["Score"],
            EnumCellValue::Formula("=SUM(B6:B9)".to_string())
        );
        assert_eq!(sheet.freeze_panes, Some(EnumFreezePanes::Table));
        assert_eq!(sheet.active_cell, Some(SpecCellAddress::new(1, 6)));
        assert_eq!(sheet.sheet_view.and_then(|v| v.zoom_scale), Some(120));

        let sheet_calc = &config.sheets[1];
        assert_eq!(sheet_calc.delimiter, ',');
        assert_eq!(sheet_calc.table_theme_name(), "TableStyleMedium9");
        let dict_fields = sheet_calc.calculated_table.as_ref().expect("calc");
        assert_eq!(
            dict_fields["Host"],
            EnumCalcField::Collected {
                sequence_source: EnumSequenceSource::Values(vec![
                    EnumCellValue::String("alpha".into()),
                    EnumCellValue::String("beta".into())
                ])
            }
        );
        assert_eq!(
            dict_fields["Note"],
            EnumCalcField::Constant {
                value: EnumCellValue::None
            }
        );
        assert_eq!(
            sheet_calc.freeze_panes,
            Some(EnumFreezePanes::Cell(SpecCellAddress::new(2, 4)))
        );
    }

    #[test]
    fn malformed_addresses_fail_to_parse() {
        let c_yaml = r#"
output: { dir: out, name: r }
sheets:
  - worksheet_name: S
    data_directory: d
    base_filename: f
    active_cell: "4C"
"#;
        assert!(matches!(
            parse_config(c_yaml),
            Err(ReportError::ConfigParse { .. })
        ));
    }

    #[test]
    fn unknown_calculated_field_type_fails_to_parse() {
        let c_yaml = r#"
output: { dir: out, name: r }
sheets:
  - worksheet_name: S
    calculated_table:
      A: { field_type: summed, value: 1 }
"#;
        assert!(matches!(
            parse_config(c_yaml),
            Err(ReportError::ConfigParse { .. })
        ));
    }

    #[test]
    fn structural_rules_are_enforced() {
        let l_cases = [
            // no sheets
            "output: { dir: out, name: r }\nsheets: []\n",
            // no source and no calculated table
            "output: { dir: out, name: r }\nsheets:\n  - worksheet_name: S\n",
            // half a source
            "output: { dir: out, name: r }\nsheets:\n  - { worksheet_name: S, data_directory: d }\n",
            // illegal sheet name
            "output: { dir: out, name: r }\nsheets:\n  - { worksheet_name: 'a/b', data_directory: d, base_filename: f }\n",
            // duplicate sheet names
            "output: { dir: out, name: r }\nsheets:\n  - { worksheet_name: S, data_directory: d, base_filename: f }\n  - { worksheet_name: s, data_directory: d, base_filename: f }\n",
            // total_row key outside column_styles
            "output: { dir: out, name: r }\nsheets:\n  - { worksheet_name: S, data_directory: d, base_filename: f, column_styles: { A: null }, total_row: { B: 1 } }\n",
            // multi-byte delimiter
            "output: { dir: out, name: r }\nsheets:\n  - { worksheet_name: S, data_directory: d, base_filename: f, delimiter: '§' }\n",
        ];
        for c_yaml in l_cases {
            assert!(
                matches!(parse_config(c_yaml), Err(ReportError::ConfigInvalid(_))),
                "{c_yaml}"
            );
        }
    }

    #[test]
    fn missing_collected_column_is_only_a_warning() {
        let c_yaml = r#"
output: { dir: out, name: r }
sheets:
  - worksheet_name: Calc
    calculated_table:
      A: { field_type: constant, value: x }
"#;
        let config: SpecReportConfig = serde_yaml::from_str(c_yaml).expect("parsed");
        let l_warnings = validate_config(&config).expect("valid");
        assert_eq!(l_warnings.len(), 1);
        assert!(l_warnings[0].contains("NO DESIGNATED"), "{}", l_warnings[0]);
    }
}
