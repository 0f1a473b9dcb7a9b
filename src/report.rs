use crate::attribute::Attribute;
use crate::ranking::RankedValue;
use clap::ValueEnum;
use csv::WriterBuilder;
use log::info;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to prepare output location {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write report {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to write report {}: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },
}

/// Serialization used for the statistics report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Xml,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xml => "xml",
            ReportFormat::Csv => "csv",
        }
    }
}

pub fn report_file_name(attribute: Attribute, format: ReportFormat) -> String {
    format!("statistics_by_{}.{}", attribute.name(), format.extension())
}

/// Writes the ranked entries to `statistics_by_<attribute>.<format>` inside `output_dir`.
pub fn write_report<P: AsRef<Path>>(
    output_dir: P,
    attribute: Attribute,
    entries: &[RankedValue],
    format: ReportFormat,
) -> Result<PathBuf, ReportError> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir).map_err(|source| ReportError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(report_file_name(attribute, format));
    match format {
        ReportFormat::Xml => write_xml(&path, attribute, entries)?,
        ReportFormat::Csv => write_csv(&path, entries)?,
    }

    info!("Wrote {} entries to {}", entries.len(), path.display());
    Ok(path)
}

fn write_xml(path: &Path, attribute: Attribute, entries: &[RankedValue]) -> Result<(), ReportError> {
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let xml_error = |source| ReportError::Xml {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = XmlWriter::new_with_indent(BufWriter::new(file), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(
            BytesStart::new("statistics").with_attributes([("attribute", attribute.name())]),
        ))
        .map_err(xml_error)?;
    for entry in entries {
        let count = entry.count.to_string();
        writer.write_event(Event::Start(BytesStart::new("item"))).map_err(xml_error)?;
        for (tag, text) in [("value", entry.value.as_str()), ("count", count.as_str())] {
            writer.write_event(Event::Start(BytesStart::new(tag))).map_err(xml_error)?;
            writer.write_event(Event::Text(BytesText::new(text))).map_err(xml_error)?;
            writer.write_event(Event::End(BytesEnd::new(tag))).map_err(xml_error)?;
        }
        writer.write_event(Event::End(BytesEnd::new("item"))).map_err(xml_error)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("statistics")))
        .map_err(xml_error)?;

    let mut inner = writer.into_inner();
    inner.write_all(b"\n").map_err(io_error)?;
    inner.flush().map_err(io_error)
}

fn write_csv(path: &Path, entries: &[RankedValue]) -> Result<(), ReportError> {
    let csv_error = |source| ReportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(["value", "count"]).map_err(csv_error)?;
    for entry in entries {
        writer.serialize(entry).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use tempfile::TempDir;

    /// Reads back `(value, count)` pairs in document order.
    fn read_items(xml: &str) -> Vec<(String, usize)> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut items = Vec::new();
        let mut current_tag = String::new();
        let mut value = String::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(start) => {
                    current_tag = String::from_utf8(start.name().as_ref().to_vec()).unwrap();
                }
                Event::Text(text) => match current_tag.as_str() {
                    "value" => value = text.unescape().unwrap().into_owned(),
                    "count" => items.push((value.clone(), text.unescape().unwrap().parse().unwrap())),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        items
    }

    #[test]
    fn xml_has_statistics_structure() {
        let dir = TempDir::new().unwrap();
        let entries = vec![RankedValue::new("fantasy", 3), RankedValue::new("romance", 2)];

        let path = write_report(dir.path(), Attribute::Genres, &entries, ReportFormat::Xml).unwrap();

        assert_eq!(path.file_name().unwrap(), "statistics_by_genres.xml");
        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<statistics attribute=\"genres\">"));
        assert!(xml.contains("<item>"));
        assert!(xml.contains("<value>fantasy</value>"));
        assert!(xml.contains("<count>3</count>"));
        assert_eq!(
            read_items(&xml),
            vec![("fantasy".to_string(), 3), ("romance".to_string(), 2)]
        );
    }

    #[test]
    fn empty_statistics_produce_well_formed_xml() {
        let dir = TempDir::new().unwrap();

        let path = write_report(dir.path(), Attribute::Genres, &[], ReportFormat::Xml).unwrap();

        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.contains("<statistics attribute=\"genres\">"));
        assert!(xml.contains("</statistics>"));
        assert!(!xml.contains("<item>"));
        assert!(read_items(&xml).is_empty());
    }

    #[test]
    fn xml_values_are_escaped() {
        let dir = TempDir::new().unwrap();
        let entries = vec![RankedValue::new("Romeo & Juliet <1597>", 1)];

        let path = write_report(dir.path(), Attribute::Author, &entries, ReportFormat::Xml).unwrap();

        let xml = fs::read_to_string(&path).unwrap();
        assert!(xml.contains("Romeo &amp; Juliet &lt;1597&gt;"));
        assert_eq!(read_items(&xml), vec![("Romeo & Juliet <1597>".to_string(), 1)]);
    }

    #[test]
    fn csv_rows_follow_given_order() {
        let dir = TempDir::new().unwrap();
        let entries = vec![RankedValue::new("fantasy", 3), RankedValue::new("Austen, Jane", 2)];

        let path = write_report(dir.path().join("nested"), Attribute::Genres, &entries, ReportFormat::Csv).unwrap();

        assert_eq!(path.file_name().unwrap(), "statistics_by_genres.csv");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "value,count\nfantasy,3\n\"Austen, Jane\",2\n"
        );
    }

    #[test]
    fn empty_csv_still_has_a_header() {
        let dir = TempDir::new().unwrap();
        let path = write_report(dir.path(), Attribute::Author, &[], ReportFormat::Csv).unwrap();

        assert_eq!(path.file_name().unwrap(), "statistics_by_author.csv");
        assert_eq!(fs::read_to_string(&path).unwrap(), "value,count\n");
    }

    #[test]
    fn xml_is_the_default_format() {
        assert_eq!(ReportFormat::default(), ReportFormat::Xml);
        assert_eq!(report_file_name(Attribute::YearPublished, ReportFormat::default()), "statistics_by_year_published.xml");
    }
}
