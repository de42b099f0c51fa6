//! Loads EPCglobal-TDT-shaped scheme XML and the GS1 company-prefix
//! auxiliary table into `tdt-core`'s data model (C8). This crate is the only
//! place in the workspace that touches a filesystem or an XML parser;
//! `tdt-core` itself knows nothing about either.

mod convert;
mod xml;

use std::path::{Path, PathBuf};

use tdt_core::errors::{Result, TdtError};
use tdt_core::model::{CompanyPrefixTable, Scheme, SchemeSet};
use tracing::{debug, instrument};

use crate::xml::{ManagerTranslationXml, TdtDocumentXml};

fn io_err(path: &Path, e: impl std::fmt::Display) -> TdtError {
    TdtError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn xml_err(path: &Path, e: impl std::fmt::Display) -> TdtError {
    TdtError::Xml {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn load_one_file(path: &Path) -> Result<Vec<Scheme>> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let doc: TdtDocumentXml = quick_xml::de::from_str(&contents).map_err(|e| xml_err(path, e))?;

    let path_str = path.display().to_string();
    doc.schemes
        .into_iter()
        .map(|s| convert::convert_scheme(s, &path_str))
        .collect()
}

/// Number of worker threads used to parse a batch of scheme files in
/// parallel, capped so a huge `paths` list never spawns more threads than
/// there are cores to run them on.
const MAX_LOAD_WORKERS: usize = 8;

/// Parses and converts every file in `paths`, merging their schemes into one
/// [`SchemeSet`] in file-list order. Files are parsed across a bounded pool
/// of worker threads; cross-file invariants (duplicate scheme names, etc.)
/// are checked once by [`SchemeSet::new`] after every file has parsed.
#[instrument(skip(paths), fields(file_count = paths.len()))]
pub fn load_dir(paths: &[PathBuf]) -> Result<SchemeSet> {
    let worker_count = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_LOAD_WORKERS)
        .max(1)
        .min(paths.len().max(1));

    let mut results: Vec<Option<Result<Vec<Scheme>>>> = (0..paths.len()).map(|_| None).collect();

    std::thread::scope(|scope| {
        let chunk_size = paths.len().div_ceil(worker_count).max(1);
        let mut handles = Vec::new();

        for (chunk_idx, chunk) in paths.chunks(chunk_size).enumerate() {
            let base = chunk_idx * chunk_size;
            handles.push((base, scope.spawn(move || chunk.iter().map(|p| load_one_file(p)).collect::<Vec<_>>())));
        }

        for (base, handle) in handles {
            let chunk_results = handle.join().expect("scheme-loading worker panicked");
            for (offset, result) in chunk_results.into_iter().enumerate() {
                results[base + offset] = Some(result);
            }
        }
    });

    let mut schemes = Vec::new();
    for (path, result) in paths.iter().zip(results) {
        let file_schemes = result.expect("every path gets exactly one result slot")?;
        debug!(path = %path.display(), scheme_count = file_schemes.len(), "loaded scheme file");
        schemes.extend(file_schemes);
    }

    SchemeSet::new(schemes)
}

/// Loads a GS1 `ManagerTranslation.xml`-shaped document into a lookup table
/// from index string to company-prefix string.
#[instrument]
pub fn load_company_prefix_table(path: &Path) -> Result<CompanyPrefixTable> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let doc: ManagerTranslationXml = quick_xml::de::from_str(&contents).map_err(|e| xml_err(path, e))?;

    let mut table = CompanyPrefixTable::new();
    for entry in doc.entries {
        table.insert(entry.index, entry.company_prefix);
    }
    Ok(table)
}
