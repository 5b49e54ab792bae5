//! Export serializers
//!
//! Every serializer writes columns in [`VIN_RECORD_COLUMNS`] order and
//! records in the order given.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::config::ExportFormat;
use crate::errors::{AppError, AppResult};
use crate::models::{VinRecord, VIN_RECORD_COLUMNS};

pub trait RecordSerializer: Send + Sync {
    fn serialize(&self, records: &[VinRecord]) -> AppResult<Vec<u8>>;
}

/// Single row group with one non-null Utf8 column per record field
pub struct ParquetSerializer;

impl ParquetSerializer {
    fn schema() -> Arc<Schema> {
        let fields: Vec<Field> = VIN_RECORD_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect();
        Arc::new(Schema::new(fields))
    }
}

impl RecordSerializer for ParquetSerializer {
    fn serialize(&self, records: &[VinRecord]) -> AppResult<Vec<u8>> {
        let schema = Self::schema();
        let columns: Vec<ArrayRef> = (0..VIN_RECORD_COLUMNS.len())
            .map(|index| {
                let values = records.iter().map(|record| record.columns()[index]);
                Arc::new(StringArray::from_iter_values(values)) as ArrayRef
            })
            .collect();

        let batch = RecordBatch::try_new(schema.clone(), columns)
            .map_err(|e| AppError::export(format!("failed to build record batch: {e}")))?;

        let mut writer = ArrowWriter::try_new(Vec::new(), schema, None)
            .map_err(|e| AppError::export(format!("failed to open parquet writer: {e}")))?;
        writer
            .write(&batch)
            .map_err(|e| AppError::export(format!("failed to write parquet rows: {e}")))?;
        writer
            .into_inner()
            .map_err(|e| AppError::export(format!("failed to finish parquet file: {e}")))
    }
}

/// Header row followed by one row per record
pub struct CsvSerializer;

impl RecordSerializer for CsvSerializer {
    fn serialize(&self, records: &[VinRecord]) -> AppResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(VIN_RECORD_COLUMNS)
            .map_err(|e| AppError::export(format!("failed to write csv header: {e}")))?;

        for record in records {
            writer.write_record(record.columns()).map_err(|e| {
                AppError::export(format!("failed to write csv row for {}: {e}", record.vin))
            })?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::export(format!("failed to flush csv writer: {e}")))
    }
}

/// One JSON object per line
pub struct JsonLinesSerializer;

impl RecordSerializer for JsonLinesSerializer {
    fn serialize(&self, records: &[VinRecord]) -> AppResult<Vec<u8>> {
        let mut buffer = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buffer, record).map_err(|e| {
                AppError::export(format!("failed to encode {}: {e}", record.vin))
            })?;
            buffer.push(b'\n');
        }
        Ok(buffer)
    }
}

pub fn serializer_for(format: ExportFormat) -> Box<dyn RecordSerializer> {
    match format {
        ExportFormat::Parquet => Box::new(ParquetSerializer),
        ExportFormat::Csv => Box::new(CsvSerializer),
        ExportFormat::Jsonl => Box::new(JsonLinesSerializer),
    }
}
