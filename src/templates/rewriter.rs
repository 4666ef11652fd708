//! Token substitution inside a template archive.
//!
//! DOCX and ODT templates are ZIP containers. The rewriter opens the
//! text-bearing XML parts, substitutes tokens and repacks the container.
//! Members that are not rewritten are copied raw, so their compressed bytes,
//! compression method and CRC come out exactly as they went in.

use std::io::{Cursor, Read, Seek, Write};

use zip::read::ZipArchive;
use zip::result::ZipError;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use super::parts::TemplatePart;
use super::tokens::{substitute, SubstitutionValues};
use crate::core::{RenderError, RenderResult};

#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// The repacked container.
    pub archive: Vec<u8>,
    /// Token occurrences replaced across all parts.
    pub substitutions: usize,
    /// Parts whose content changed, in archive order.
    pub rewritten_parts: Vec<String>,
}

/// Rewrites every recognized part of `bytes` with `values`.
///
/// Fails with [`RenderError::UnrecognizedFormat`] when the container cannot
/// be read, holds no recognized part, or a recognized part decompresses to
/// more than `max_part_bytes`. Token content never causes failure.
pub fn rewrite_archive(
    bytes: &[u8],
    values: &SubstitutionValues,
    max_part_bytes: u64,
) -> RenderResult<RewriteOutcome> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(unreadable)?;

    let mut names = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let member = archive.by_index_raw(index).map_err(unreadable)?;
        names.push(member.name().to_owned());
    }

    if !names.iter().any(|name| TemplatePart::classify(name).is_some()) {
        return Err(RenderError::UnrecognizedFormat(
            "archive has no document, header, footer, content or styles part".to_string(),
        ));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(bytes.len())));
    let mut substitutions = 0;
    let mut rewritten_parts = Vec::new();

    for (index, name) in names.iter().enumerate() {
        if TemplatePart::classify(name).is_some() {
            let (content, method) = read_part(&mut archive, index, name, max_part_bytes)?;
            let (rewritten, hits) = substitute(&content, values);

            if hits > 0 {
                let options = SimpleFileOptions::default().compression_method(method);
                writer
                    .start_file(name.as_str(), options)
                    .map_err(repack_failed)?;
                writer
                    .write_all(&rewritten)
                    .map_err(|e| repack_failed(ZipError::Io(e)))?;

                tracing::debug!(part = %name, substitutions = hits, "rewrote template part");
                substitutions += hits;
                rewritten_parts.push(name.clone());
                continue;
            }
        }

        let member = archive.by_index_raw(index).map_err(unreadable)?;
        writer.raw_copy_file(member).map_err(repack_failed)?;
    }

    let archive = writer.finish().map_err(repack_failed)?.into_inner();

    Ok(RewriteOutcome {
        archive,
        substitutions,
        rewritten_parts,
    })
}

/// Reads at most `limit` decompressed bytes. The size declared in the
/// archive is never trusted for allocation.
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    name: &str,
    limit: u64,
) -> RenderResult<(Vec<u8>, CompressionMethod)> {
    let member = archive.by_index(index).map_err(unreadable)?;
    let method = member.compression();

    let mut content = Vec::new();
    member
        .take(limit.saturating_add(1))
        .read_to_end(&mut content)
        .map_err(|e| RenderError::UnrecognizedFormat(format!("{} is unreadable: {}", name, e)))?;

    if content.len() as u64 > limit {
        return Err(RenderError::UnrecognizedFormat(format!(
            "{} exceeds {} bytes once decompressed",
            name, limit
        )));
    }

    Ok((content, method))
}

fn unreadable(err: ZipError) -> RenderError {
    RenderError::UnrecognizedFormat(format!("unreadable archive: {}", err))
}

fn repack_failed(err: ZipError) -> RenderError {
    RenderError::ServerError(format!("failed to repack archive: {}", err))
}
