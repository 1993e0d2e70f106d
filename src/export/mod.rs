// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Dhaara Labs

//! Portability export rendering.
//!
//! When an officer completes a portability request, the per-category data
//! bundle from the completion payload is rendered in the format the
//! principal asked for (json, csv or xml) and stored under `exports/`.
//! A SHA-256 checksum of the rendered bytes is recorded on the request so
//! the principal can verify the artifact they download.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::{DataCategory, ExportFormat};

/// Export rendering error.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("completion payload must be a JSON object keyed by data category")]
    NotAnObject,
    #[error("unknown data category in completion payload: {0}")]
    UnknownCategory(String),
    #[error("JSON rendering failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV rendering failed: {0}")]
    Csv(String),
    #[error("XML rendering failed: {0}")]
    Xml(String),
}

/// The data handed to a principal, grouped by category.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportBundle {
    pub request_id: String,
    pub principal_id: String,
    pub generated_at: DateTime<Utc>,
    pub categories: BTreeMap<DataCategory, serde_json::Value>,
}

/// A rendered export plus its integrity checksum.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub checksum: String,
}

impl ExportBundle {
    /// Build a bundle from an officer's completion payload.
    ///
    /// The payload must be an object keyed by category name; keys outside
    /// the fixed enumeration are refused rather than silently dropped.
    pub fn from_payload(
        request_id: &str,
        principal_id: &str,
        payload: &serde_json::Value,
    ) -> Result<Self, ExportError> {
        let map = payload.as_object().ok_or(ExportError::NotAnObject)?;

        let mut categories = BTreeMap::new();
        for (key, value) in map {
            let category: DataCategory =
                serde_json::from_value(serde_json::Value::String(key.clone()))
                    .map_err(|_| ExportError::UnknownCategory(key.clone()))?;
            categories.insert(category, value.clone());
        }

        Ok(Self {
            request_id: request_id.to_string(),
            principal_id: principal_id.to_string(),
            generated_at: Utc::now(),
            categories,
        })
    }

    /// Render the bundle in the requested format.
    pub fn render(&self, format: ExportFormat) -> Result<ExportArtifact, ExportError> {
        let bytes = match format {
            ExportFormat::Json => self.render_json()?,
            ExportFormat::Csv => self.render_csv()?,
            ExportFormat::Xml => self.render_xml()?,
        };

        let checksum = sha256_hex(&bytes);
        Ok(ExportArtifact {
            format,
            bytes,
            checksum,
        })
    }

    fn render_json(&self) -> Result<Vec<u8>, ExportError> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn render_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["category", "field", "value"])
            .map_err(|e| ExportError::Csv(e.to_string()))?;

        for (category, value) in &self.categories {
            match value {
                serde_json::Value::Object(fields) => {
                    for (field, v) in fields {
                        let rendered = scalar_to_string(v);
                        writer
                            .write_record([category.as_str(), field.as_str(), rendered.as_str()])
                            .map_err(|e| ExportError::Csv(e.to_string()))?;
                    }
                }
                serde_json::Value::Array(items) => {
                    for (index, v) in items.iter().enumerate() {
                        let index = index.to_string();
                        let rendered = scalar_to_string(v);
                        writer
                            .write_record([category.as_str(), index.as_str(), rendered.as_str()])
                            .map_err(|e| ExportError::Csv(e.to_string()))?;
                    }
                }
                other => {
                    let rendered = scalar_to_string(other);
                    writer
                        .write_record([category.as_str(), "", rendered.as_str()])
                        .map_err(|e| ExportError::Csv(e.to_string()))?;
                }
            }
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Csv(e.to_string()))
    }

    fn render_xml(&self) -> Result<Vec<u8>, ExportError> {
        let xml_err = |e: &dyn std::fmt::Display| ExportError::Xml(e.to_string());

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| xml_err(&e))?;

        let mut root = BytesStart::new("export");
        root.push_attribute(("request_id", self.request_id.as_str()));
        root.push_attribute(("principal_id", self.principal_id.as_str()));
        root.push_attribute(("generated_at", self.generated_at.to_rfc3339().as_str()));
        writer
            .write_event(Event::Start(root))
            .map_err(|e| xml_err(&e))?;

        for (category, value) in &self.categories {
            let mut elem = BytesStart::new("category");
            elem.push_attribute(("name", category.as_str()));
            writer
                .write_event(Event::Start(elem))
                .map_err(|e| xml_err(&e))?;

            match value {
                serde_json::Value::Object(fields) => {
                    for (field, v) in fields {
                        write_xml_field(&mut writer, field, &scalar_to_string(v))?;
                    }
                }
                serde_json::Value::Array(items) => {
                    for (index, v) in items.iter().enumerate() {
                        write_xml_field(&mut writer, &index.to_string(), &scalar_to_string(v))?;
                    }
                }
                other => {
                    writer
                        .write_event(Event::Text(BytesText::new(&scalar_to_string(other))))
                        .map_err(|e| xml_err(&e))?;
                }
            }

            writer
                .write_event(Event::End(BytesEnd::new("category")))
                .map_err(|e| xml_err(&e))?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("export")))
            .map_err(|e| xml_err(&e))?;

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

fn write_xml_field<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), ExportError> {
    let mut elem = BytesStart::new("field");
    elem.push_attribute(("name", name));
    writer
        .write_event(Event::Start(elem))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("field")))
        .map_err(|e| ExportError::Xml(e.to_string()))?;
    Ok(())
}

/// Strings render bare; everything else renders as compact JSON.
fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Lowercase hex SHA-256 of the rendered bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_bundle() -> ExportBundle {
        ExportBundle::from_payload(
            "req-1",
            "user-1",
            &json!({
                "profile": {"name": "Asha", "email": "asha@example.com"},
                "consents": [{"purpose": "kyc", "granted": true}],
                "reputation": 612
            }),
        )
        .unwrap()
    }

    #[test]
    fn from_payload_rejects_unknown_category() {
        let err = ExportBundle::from_payload("req-1", "user-1", &json!({"wallets": {}}))
            .unwrap_err();
        assert!(matches!(err, ExportError::UnknownCategory(k) if k == "wallets"));
    }

    #[test]
    fn from_payload_rejects_non_object() {
        let err = ExportBundle::from_payload("req-1", "user-1", &json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ExportError::NotAnObject));
    }

    #[test]
    fn json_render_parses_back() {
        let bundle = sample_bundle();
        let artifact = bundle.render(ExportFormat::Json).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(parsed["request_id"], "req-1");
        assert_eq!(parsed["categories"]["profile"]["name"], "Asha");
        assert_eq!(parsed["categories"]["reputation"], 612);
    }

    #[test]
    fn csv_render_has_header_and_rows() {
        let bundle = sample_bundle();
        let artifact = bundle.render(ExportFormat::Csv).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("category,field,value"));
        assert!(text.contains("profile,email,asha@example.com"));
        assert!(text.contains("reputation,,612"));
        // Array entries are indexed
        assert!(text.contains("consents,0,"));
    }

    #[test]
    fn xml_render_contains_categories_and_escapes() {
        let bundle = ExportBundle::from_payload(
            "req-2",
            "user-2",
            &json!({"profile": {"bio": "loves <rust> & tea"}}),
        )
        .unwrap();
        let artifact = bundle.render(ExportFormat::Xml).unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains(r#"<category name="profile">"#));
        assert!(text.contains(r#"<field name="bio">"#));
        assert!(text.contains("loves &lt;rust&gt; &amp; tea"));
        assert!(!text.contains("loves <rust>"));
    }

    #[test]
    fn checksum_matches_rendered_bytes() {
        let bundle = sample_bundle();
        let artifact = bundle.render(ExportFormat::Csv).unwrap();

        assert_eq!(artifact.checksum.len(), 64);
        assert_eq!(artifact.checksum, sha256_hex(&artifact.bytes));
    }

    #[test]
    fn sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
