use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use pretty_assertions::assert_eq;
use rayon::prelude::*;
use rustysbml::parser::{ContentSource, read_sbml_with};
use rustysbml::{
    Document, ErrorCode, Severity, has_bzip2, has_zlib, read_sbml, read_sbml_from_string,
    write_sbml, write_sbml_to_string,
};
use std::collections::HashMap;
use walkdir::WalkDir;

fn corpus() -> Vec<Utf8PathBuf> {
    let root = Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/models");
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| Utf8PathBuf::from_path_buf(e.into_path()).ok())
        .filter(|p| p.extension() == Some("xml"))
        .collect();
    files.sort();
    assert!(files.len() >= 8, "model corpus missing under {}", root);
    files
}

fn load(path: &Utf8Path) -> Document {
    let doc = read_sbml(path);
    assert_eq!(
        doc.errors().count_at_least(Severity::Warning),
        0,
        "{}: {:?}",
        path,
        doc.errors()
    );
    doc
}

#[test]
fn canonical_models_are_reproduced_exactly() {
    for path in corpus() {
        let text = std::fs::read_to_string(&path).unwrap();
        let doc = load(&path);
        assert_eq!(write_sbml_to_string(&doc), text, "{}", path);
    }
}

#[test]
fn reading_written_text_gives_the_same_document() {
    for path in corpus() {
        let doc = load(&path);
        let again = read_sbml_from_string(&write_sbml_to_string(&doc));
        assert_eq!(again, doc, "{}", path);
    }
}

fn round_trip_through(extension: &str, available: bool) {
    let dir = tempfile::tempdir().unwrap();
    for path in corpus() {
        let mut doc = load(&path);
        let target = Utf8PathBuf::from_path_buf(dir.path().join(format!("test.xml.{}", extension)))
            .unwrap();

        if !available {
            assert!(!write_sbml(&mut doc, &target), "{}", path);
            assert_eq!(
                doc.error(0).map(|e| e.code),
                Some(ErrorCode::CompressionUnsupported)
            );
            assert!(!target.exists());
            continue;
        }

        assert!(write_sbml(&mut doc, &target), "{}: {:?}", path, doc.errors());
        let reread = read_sbml(&target);
        assert_eq!(reread.num_errors(), 0, "{}: {:?}", path, reread.errors());
        assert_eq!(reread.to_sbml(), doc.to_sbml(), "{}", path);
    }
}

#[test]
fn gzip_round_trip() {
    round_trip_through("gz", has_zlib());
}

#[test]
fn zip_round_trip() {
    round_trip_through("zip", has_zlib());
}

#[test]
fn bzip2_round_trip() {
    round_trip_through("bz2", has_bzip2());
}

#[cfg(feature = "zlib")]
#[test]
fn zip_entry_is_named_after_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = Utf8PathBuf::from_path_buf(dir.path().join("model.xml.zip")).unwrap();
    let mut doc = Document::new();
    doc.create_model_with_id("m");
    assert!(write_sbml(&mut doc, &target));

    let file = std::fs::File::open(&target).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert_eq!(names, vec!["model.xml"]);
}

#[test]
fn documents_serialize_independently_across_threads() {
    let docs: Vec<Document> = corpus().iter().map(|p| load(p)).collect();
    let sequential: Vec<String> = docs.iter().map(write_sbml_to_string).collect();
    let parallel: Vec<String> = docs.par_iter().map(write_sbml_to_string).collect();
    assert_eq!(parallel, sequential);
}

struct MemSource {
    files: HashMap<String, String>,
}

impl ContentSource for MemSource {
    fn read_to_string(&mut self, path: &Utf8Path) -> Result<String> {
        self.files
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("not found: {}", path))
    }
}

#[test]
fn custom_sources_feed_the_reader() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sbml xmlns="http://www.sbml.org/sbml/level3/version1/core" level="3" version="1">
  <model id="mem">
    <listOfParameters>
      <parameter id="k" value="INF" constant="true"/>
    </listOfParameters>
  </model>
</sbml>
"#;
    let mut files = HashMap::new();
    files.insert("mem://model.xml".to_string(), xml.to_string());
    let mut source = MemSource { files };

    let doc = read_sbml_with(&mut source, Utf8Path::new("mem://model.xml"));
    assert_eq!(doc.num_errors(), 0);
    let k = doc.model().and_then(|m| m.parameter("k")).unwrap();
    assert_eq!(k.value, Some(f64::INFINITY));
    assert_eq!(write_sbml_to_string(&doc), xml);

    let missing = read_sbml_with(&mut source, Utf8Path::new("mem://other.xml"));
    assert_eq!(
        missing.error(0).map(|e| e.code),
        Some(ErrorCode::XmlFileUnreadable)
    );
}

#[test]
fn attribute_whitespace_survives_reading_back() {
    let mut doc = Document::new();
    let model = doc.create_model_with_id("m");
    let cell = model.create_compartment();
    cell.id = Some("cell".into());
    cell.name = Some("line1\nline2\tx".into());

    let first = write_sbml_to_string(&doc);
    let again = read_sbml_from_string(&first);
    assert_eq!(again.num_errors(), 0, "{:?}", again.errors());
    assert_eq!(
        again.model().and_then(|m| m.compartment("cell")).and_then(|c| c.name.as_deref()),
        Some("line1\nline2\tx")
    );
    assert_eq!(write_sbml_to_string(&again), first);
}
