#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use flate2::write::GzEncoder;
use parquet::arrow::ArrowWriter;
use zip::write::SimpleFileOptions;

/// Small metadata table with gaps in the journal, citation and date columns.
pub const METADATA_CSV: &str = "\
title,journal,source,publication_date,release_date,citations
Covid Spread Model,Lancet,PMC,2020-03-01,2020-03-05,5
covid vaccine trial,,Medline,2021-06-15,bad-date,
Masks and transmission,Lancet,PMC,2019-11-30,2020-01-01,7
,BMJ,WHO,not-a-date,,3
Long covid outcomes,BMJ,PMC,2021,2021-02-01,9
";

pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn write_zip(dir: &Path, name: &str, entry: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut zip = zip::ZipWriter::new(File::create(&path).unwrap());
    zip.start_file(entry, SimpleFileOptions::default()).unwrap();
    zip.write_all(contents.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

pub fn write_gzip(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), flate2::Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

pub fn write_parquet(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, true),
        Field::new("journal", DataType::Utf8, true),
        Field::new("citations", DataType::Int64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("A"), Some("B"), None])),
        Arc::new(StringArray::from(vec![None::<&str>, None, None])),
        Arc::new(Int64Array::from(vec![Some(1), None, Some(3)])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    path
}
