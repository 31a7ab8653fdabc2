use crate::parser::read_status;
use dart_core::{DartError, DartResult};
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::ZipArchive;

const ZIP_MAGIC: &[u8] = b"PK";

/// Pull the XML feed out of a downloaded registry archive.
///
/// The registry answers a bad request with a small XML or JSON status
/// document instead of a zip; that case surfaces as `DartError::Source`.
pub fn extract_feed(bytes: &[u8]) -> DartResult<String> {
    if !bytes.starts_with(ZIP_MAGIC) {
        return Err(status_document_error(bytes));
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DartError::Parse(format!("Invalid registry archive: {}", e)))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| DartError::Parse(format!("Unreadable archive entry {}: {}", i, e)))?;

        if !file.name().to_ascii_lowercase().ends_with(".xml") {
            continue;
        }

        debug!("Extracting {} ({} bytes)", file.name(), file.size());
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| DartError::Parse(format!("Archive entry is not UTF-8 XML: {}", e)))?;
        return Ok(content.trim_start_matches('\u{feff}').to_string());
    }

    Err(DartError::Parse("Registry archive contains no XML entry".to_string()))
}

fn status_document_error(bytes: &[u8]) -> DartError {
    let text = String::from_utf8_lossy(bytes);

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
        if let Some(status) = value.get("status").and_then(|s| s.as_str()) {
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_default();
            warn!("Registry returned status {} instead of an archive", status);
            return DartError::source_error(status, message);
        }
    }

    if let Some((status, message)) = read_status(&text) {
        warn!("Registry returned status {} instead of an archive", status);
        return DartError::source_error(status, message);
    }

    DartError::Parse("Download is neither a zip archive nor a status document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extracts_first_xml_entry() {
        let bytes = zip_with(&[
            ("README.txt", "ignore me"),
            ("CORPCODE.xml", "<result><list></list></result>"),
        ]);
        assert_eq!(extract_feed(&bytes).unwrap(), "<result><list></list></result>");
    }

    #[test]
    fn test_archive_without_xml_is_parse_error() {
        let bytes = zip_with(&[("README.txt", "nothing here")]);
        assert!(matches!(extract_feed(&bytes).unwrap_err(), DartError::Parse(_)));
    }

    #[test]
    fn test_xml_status_document_is_source_error() {
        let err = extract_feed(
            "<result><status>010</status><message>등록되지 않은 키입니다.</message></result>".as_bytes(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            DartError::Source {
                status: "010".to_string(),
                message: "등록되지 않은 키입니다.".to_string(),
            }
        );
    }

    #[test]
    fn test_json_status_document_is_source_error() {
        let err = extract_feed(br#"{"status":"020","message":"limit"}"#).unwrap_err();
        assert!(matches!(err, DartError::Source { ref status, .. } if status == "020"));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(extract_feed(b"garbage").unwrap_err(), DartError::Parse(_)));
    }
}
