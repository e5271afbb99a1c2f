use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::VisualizeError;

pub const ENTITIES_FILE: &str = "create_final_entities.parquet";
pub const RELATIONSHIPS_FILE: &str = "create_final_relationships.parquet";

const ENTITY_COLUMNS: &[&str] = &["name", "type", "description", "human_readable_id", "id"];
const RELATIONSHIP_COLUMNS: &[&str] = &["source", "target", "description", "human_readable_id"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRow {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub description: String,
    pub human_readable_id: i64,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipRow {
    pub source: String,
    pub target: String,
    pub description: String,
    /// Kept as text: it is compared against labels parsed out of a response.
    pub human_readable_id: String,
}

/// Load the entity table from an engine `output/` directory.
pub fn load_entities(output_dir: &Path) -> Result<Vec<EntityRow>, VisualizeError> {
    let path = output_dir.join(ENTITIES_FILE);
    let rows = read_table(&path, ENTITY_COLUMNS)?;

    let mut entities = Vec::with_capacity(rows.len());
    for values in rows {
        let Some(human_readable_id) = field_i64(&values[3]) else {
            warn!(path = ?path, value = %values[3], "Skipping entity without integer human_readable_id");
            continue;
        };
        entities.push(EntityRow {
            name: field_text(&values[0]),
            entity_type: field_text(&values[1]),
            description: field_text(&values[2]),
            human_readable_id,
            id: field_text(&values[4]),
        });
    }

    debug!(path = ?path, rows = entities.len(), "Loaded entities");
    Ok(entities)
}

/// Load the relationship table from an engine `output/` directory.
pub fn load_relationships(output_dir: &Path) -> Result<Vec<RelationshipRow>, VisualizeError> {
    let path = output_dir.join(RELATIONSHIPS_FILE);
    let rows = read_table(&path, RELATIONSHIP_COLUMNS)?;

    let relationships: Vec<RelationshipRow> = rows
        .into_iter()
        .map(|values| RelationshipRow {
            source: field_text(&values[0]),
            target: field_text(&values[1]),
            description: field_text(&values[2]),
            human_readable_id: field_text(&values[3]),
        })
        .collect();

    debug!(path = ?path, rows = relationships.len(), "Loaded relationships");
    Ok(relationships)
}

/// Read the named top-level columns of every row, in the order given.
fn read_table(path: &Path, columns: &[&str]) -> Result<Vec<Vec<Field>>, VisualizeError> {
    let file = File::open(path).map_err(|source| VisualizeError::OpenTable {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = SerializedFileReader::new(file).map_err(|source| read_error(path, source))?;

    let fields = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .root_schema()
        .get_fields();
    for column in columns {
        if !fields.iter().any(|f| f.name() == *column) {
            return Err(VisualizeError::MissingColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    let iter = reader
        .get_row_iter(None)
        .map_err(|source| read_error(path, source))?;

    for row in iter {
        let row = row.map_err(|source| read_error(path, source))?;
        let mut values = vec![Field::Null; columns.len()];
        for (name, field) in row.get_column_iter() {
            if let Some(idx) = columns.iter().position(|c| *c == name.as_str()) {
                values[idx] = field.clone();
            }
        }
        rows.push(values);
    }

    Ok(rows)
}

fn read_error(path: &Path, source: parquet::errors::ParquetError) -> VisualizeError {
    VisualizeError::ReadTable {
        path: PathBuf::from(path),
        source,
    }
}

fn field_text(field: &Field) -> String {
    match field {
        Field::Null => String::new(),
        Field::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_i64(field: &Field) -> Option<i64> {
    match field {
        Field::Byte(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Long(v) => Some(*v),
        Field::UByte(v) => Some(i64::from(*v)),
        Field::UShort(v) => Some(i64::from(*v)),
        Field::UInt(v) => Some(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v).ok(),
        Field::Str(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use std::sync::Arc;

    pub enum Column {
        Text(Vec<&'static str>),
        Int(Vec<i64>),
    }

    pub fn write_table(path: &Path, message: &str, columns: Vec<Column>) {
        let schema = Arc::new(parse_message_type(message).unwrap());
        let props = Arc::new(WriterProperties::builder().build());
        let file = File::create(path).unwrap();
        let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
        let mut row_group = writer.next_row_group().unwrap();

        let mut columns = columns.into_iter();
        while let Some(mut column) = row_group.next_column().unwrap() {
            match columns.next().unwrap() {
                Column::Text(values) => {
                    let values: Vec<ByteArray> = values.into_iter().map(ByteArray::from).collect();
                    column
                        .typed::<ByteArrayType>()
                        .write_batch(&values, None, None)
                        .unwrap();
                }
                Column::Int(values) => {
                    column
                        .typed::<Int64Type>()
                        .write_batch(&values, None, None)
                        .unwrap();
                }
            }
            column.close().unwrap();
        }

        row_group.close().unwrap();
        writer.close().unwrap();
    }

    /// Rows of (name, type, description, human_readable_id, id).
    pub fn write_entities(output_dir: &Path, rows: &[(&'static str, &'static str, &'static str, i64, &'static str)]) {
        write_table(
            &output_dir.join(ENTITIES_FILE),
            "message entities {
                REQUIRED BYTE_ARRAY name (UTF8);
                REQUIRED BYTE_ARRAY type (UTF8);
                REQUIRED BYTE_ARRAY description (UTF8);
                REQUIRED INT64 human_readable_id;
                REQUIRED BYTE_ARRAY id (UTF8);
            }",
            vec![
                Column::Text(rows.iter().map(|r| r.0).collect()),
                Column::Text(rows.iter().map(|r| r.1).collect()),
                Column::Text(rows.iter().map(|r| r.2).collect()),
                Column::Int(rows.iter().map(|r| r.3).collect()),
                Column::Text(rows.iter().map(|r| r.4).collect()),
            ],
        );
    }

    /// Rows of (source, target, description, human_readable_id).
    pub fn write_relationships(output_dir: &Path, rows: &[(&'static str, &'static str, &'static str, &'static str)]) {
        write_table(
            &output_dir.join(RELATIONSHIPS_FILE),
            "message relationships {
                REQUIRED BYTE_ARRAY source (UTF8);
                REQUIRED BYTE_ARRAY target (UTF8);
                REQUIRED BYTE_ARRAY description (UTF8);
                REQUIRED BYTE_ARRAY human_readable_id (UTF8);
            }",
            vec![
                Column::Text(rows.iter().map(|r| r.0).collect()),
                Column::Text(rows.iter().map(|r| r.1).collect()),
                Column::Text(rows.iter().map(|r| r.2).collect()),
                Column::Text(rows.iter().map(|r| r.3).collect()),
            ],
        );
    }
}
