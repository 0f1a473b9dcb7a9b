use crate::record::Book;
use clap::ValueEnum;
use std::borrow::Cow;
use std::fmt;

/// Which field of a book contributes values to the frequency table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Attribute {
    #[value(name = "author")]
    Author,
    #[value(name = "genres")]
    Genres,
    #[value(name = "year_published")]
    YearPublished,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Author, Attribute::Genres, Attribute::YearPublished];

    /// Stable lowercase name, used on the command line and in report file names.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Author => "author",
            Attribute::Genres => "genres",
            Attribute::YearPublished => "year_published",
        }
    }

    /// Raw values exactly as stored on the record, before trimming.
    pub fn extract<'a>(self, book: &'a Book) -> Vec<Cow<'a, str>> {
        match self {
            Attribute::Author => book.author.as_deref().map(Cow::Borrowed).into_iter().collect(),
            Attribute::Genres => book.genres.iter().map(|genre| Cow::Borrowed(genre.as_str())).collect(),
            Attribute::YearPublished => book
                .year_published
                .map(|year| Cow::Owned(year.to_string()))
                .into_iter()
                .collect(),
        }
    }

    /// Trimmed, non-empty values to count. Case is preserved.
    pub fn normalized_values<'a>(self, book: &'a Book) -> impl Iterator<Item = Cow<'a, str>> {
        self.extract(book).into_iter().filter_map(|raw| match raw {
            Cow::Borrowed(value) => Some(value.trim())
                .filter(|trimmed| !trimmed.is_empty())
                .map(Cow::Borrowed),
            Cow::Owned(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| Cow::Owned(trimmed.to_string()))
            }
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
