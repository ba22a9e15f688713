//! Calculated-table synthesis from one collected column plus constants.

use indexmap::IndexMap;

use crate::spec::{CalcTableError, EnumCalcField, EnumCellValue, EnumSequenceSource, SpecTable};

/// Name of the single collected column.
///
/// Returns an error for zero or several collected columns; never guesses.
pub fn select_collected_column(
    fields: &IndexMap<String, EnumCalcField>,
) -> Result<&str, CalcTableError> {
    let l_collected: Vec<&str> = fields
        .iter()
        .filter(|(_, field)| matches!(field, EnumCalcField::Collected { .. }))
        .map(|(c_name, _)| c_name.as_str())
        .collect();

    match l_collected.as_slice() {
        [] => Err(CalcTableError::NoCollectedColumn),
        [c_name] => Ok(*c_name),
        _ => Err(CalcTableError::MultipleCollectedColumns(
            l_collected.iter().map(|c| c.to_string()).collect(),
        )),
    }
}

fn select_source_column<'a>(
    c_column: &str,
    table_source: Option<&'a SpecTable>,
) -> Result<impl Iterator<Item = &'a EnumCellValue>, CalcTableError> {
    let table = table_source.ok_or_else(|| CalcTableError::MissingSourceTable(c_column.to_string()))?;
    let n_idx_col = table
        .column_index(c_column)
        .ok_or_else(|| CalcTableError::UnknownSourceColumn(c_column.to_string()))?;
    Ok(table.rows.iter().filter_map(move |row| row.get(n_idx_col)))
}

/// Evaluate a sequence source into its ordered values.
///
/// `distinct` and `top_by_frequency` skip missing cells.
pub fn evaluate_sequence_source(
    source: &EnumSequenceSource,
    table_source: Option<&SpecTable>,
) -> Result<Vec<EnumCellValue>, CalcTableError> {
    match source {
        EnumSequenceSource::Values(l_values) => Ok(l_values.clone()),
        EnumSequenceSource::Column(c_column) => {
            Ok(select_source_column(c_column, table_source)?.cloned().collect())
        }
        EnumSequenceSource::Distinct(c_column) => {
            let mut dict_seen: IndexMap<String, EnumCellValue> = IndexMap::new();
            for value in select_source_column(c_column, table_source)? {
                if matches!(value, EnumCellValue::None) {
                    continue;
                }
                dict_seen
                    .entry(value.frequency_key())
                    .or_insert_with(|| value.clone());
            }
            Ok(dict_seen.into_values().collect())
        }
        EnumSequenceSource::TopByFrequency { column, limit } => {
            let mut dict_count: IndexMap<String, (EnumCellValue, usize)> = IndexMap::new();
            for value in select_source_column(column, table_source)? {
                if matches!(value, EnumCellValue::None) {
                    continue;
                }
                dict_count
                    .entry(value.frequency_key())
                    .or_insert_with(|| (value.clone(), 0))
                    .1 += 1;
            }
            let mut l_counted: Vec<(EnumCellValue, usize)> = dict_count.into_values().collect();
            // stable: equal counts keep first-appearance order
            l_counted.sort_by(|a, b| b.1.cmp(&a.1));
            Ok(l_counted
                .into_iter()
                .take(*limit)
                .map(|(value, _)| value)
                .collect())
        }
    }
}

/// Build the row-major table: one row per collected value, constants repeated.
///
/// Column order follows `fields` insertion order.
pub fn build_calculated_table(
    fields: &IndexMap<String, EnumCalcField>,
    table_source: Option<&SpecTable>,
) -> Result<SpecTable, CalcTableError> {
    let c_collected = select_collected_column(fields)?;
    let l_sequence = match fields.get(c_collected) {
        Some(EnumCalcField::Collected { sequence_source }) => {
            evaluate_sequence_source(sequence_source, table_source)?
        }
        _ => return Err(CalcTableError::NoCollectedColumn),
    };

    let l_rows = l_sequence
        .into_iter()
        .map(|value_collected| {
            fields
                .values()
                .map(|field| match field {
                    EnumCalcField::Collected { .. } => value_collected.clone(),
                    EnumCalcField::Constant { value } => value.clone(),
                })
                .collect()
        })
        .collect();

    tracing::debug!(column = c_collected, "calculated table built");
    Ok(SpecTable {
        columns: fields.keys().cloned().collect(),
        rows: l_rows,
    })
}
