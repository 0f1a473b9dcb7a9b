use serde::de::{Deserializer, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// One parsed book entry. Owned by the task that read it and dropped after extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_author")]
    pub author: Option<String>,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_genres")]
    pub genres: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AuthorField {
    Name(String),
    Object { name: Option<String> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenresField {
    Joined(String),
    List(Vec<Option<String>>),
}

fn deserialize_author<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<AuthorField>::deserialize(deserializer)?;
    Ok(match field {
        Some(AuthorField::Name(name)) => Some(name),
        Some(AuthorField::Object { name }) => name,
        None => None,
    })
}

// "Dystopian, Political Fiction" and ["Dystopian", "Political Fiction"] are both accepted.
fn deserialize_genres<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<GenresField>::deserialize(deserializer)?;
    let genres = match field {
        Some(GenresField::Joined(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
            .map(str::to_string)
            .collect(),
        Some(GenresField::List(list)) => list
            .into_iter()
            .flatten()
            .map(|genre| genre.trim().to_string())
            .filter(|genre| !genre.is_empty())
            .collect(),
        None => Vec::new(),
    };
    Ok(genres)
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON content: {0}")]
    Json(#[from] serde_json::Error),
}

/// Produces the records stored in one input file.
///
/// Implementations are shared by every worker of a calculation, so they must
/// not keep per-file state between calls.
pub trait RecordSource: Send + Sync {
    /// Streams every record of `path` into `on_record` and returns how many were read.
    fn read_records(
        &self,
        path: &Path,
        on_record: &mut dyn FnMut(Book),
    ) -> Result<usize, SourceError>;
}

/// Reads files holding a single JSON array of book objects.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonBookSource;

impl JsonBookSource {
    pub fn new() -> Self {
        Self
    }
}

impl RecordSource for JsonBookSource {
    fn read_records(
        &self,
        path: &Path,
        on_record: &mut dyn FnMut(Book),
    ) -> Result<usize, SourceError> {
        let file = File::open(path)?;
        let mut deserializer = serde_json::Deserializer::from_reader(BufReader::new(file));
        let count = deserializer.deserialize_seq(BookArrayVisitor { on_record })?;
        deserializer.end()?;
        Ok(count)
    }
}

struct BookArrayVisitor<'a> {
    on_record: &'a mut dyn FnMut(Book),
}

impl<'de, 'a> Visitor<'de> for BookArrayVisitor<'a> {
    type Value = usize;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON array of book objects")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<usize, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut count = 0;
        while let Some(book) = seq.next_element::<Book>()? {
            (self.on_record)(book);
            count += 1;
        }
        Ok(count)
    }
}
