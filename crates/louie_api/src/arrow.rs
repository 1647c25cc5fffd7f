//! Decoding of the dataframe export endpoint. Responses are Arrow IPC, most
//! often in file format; the stream format is accepted as a fallback.

use std::io::Cursor;

use arrow_array::RecordBatch;
use arrow_ipc::reader::{FileReader, StreamReader};
use arrow_schema::{ArrowError, SchemaRef};
use louie_elements::Table;
use serde_json::{Map, Value};

use crate::error::LouieApiError;

/// Decode an Arrow IPC payload for `block_id` into a [`Table`].
pub fn decode_arrow_table(block_id: &str, bytes: &[u8]) -> Result<Table, LouieApiError> {
    let (schema, batches) = match read_file_format(bytes) {
        Ok(decoded) => decoded,
        Err(file_error) => read_stream_format(bytes).map_err(|stream_error| {
            LouieApiError::decode(
                block_id,
                format!("not Arrow IPC (file: {file_error}; stream: {stream_error})"),
            )
        })?,
    };

    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    let records = batches_to_records(&batches).map_err(|error| LouieApiError::decode(block_id, error))?;

    Ok(Table::from_records(columns, records))
}

fn read_file_format(bytes: &[u8]) -> Result<(SchemaRef, Vec<RecordBatch>), ArrowError> {
    let reader = FileReader::try_new(Cursor::new(bytes), None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn read_stream_format(bytes: &[u8]) -> Result<(SchemaRef, Vec<RecordBatch>), ArrowError> {
    let reader = StreamReader::try_new(Cursor::new(bytes), None)?;
    let schema = reader.schema();
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    Ok((schema, batches))
}

fn batches_to_records(batches: &[RecordBatch]) -> Result<Vec<Map<String, Value>>, String> {
    if batches.iter().all(|batch| batch.num_rows() == 0) {
        return Ok(Vec::new());
    }

    let mut writer = arrow_json::ArrayWriter::new(Vec::new());
    let refs: Vec<&RecordBatch> = batches.iter().collect();
    writer.write_batches(&refs).map_err(|error| error.to_string())?;
    writer.finish().map_err(|error| error.to_string())?;
    let json = writer.into_inner();

    serde_json::from_slice(&json).map_err(|error| error.to_string())
}
