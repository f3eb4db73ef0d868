//! CSV backend: one row per record behind a fixed header.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{DuplicatePolicy, MovieStore, StoreError};
use crate::movie::{Collection, Movie, NO_POSTER};

const HEADER: &str = "title,rating,year,poster";

/// File-backed store holding the collection as CSV rows under the header
/// `title,rating,year,poster`.
///
/// Inserts under the default [`DuplicatePolicy::Append`] add a single row
/// to the end of the file without reading it first. Delete and update have
/// no in-place primitive in this format, so they load everything, mutate,
/// and rewrite the whole file.
///
/// Loading maps columns by header name, so files with reordered columns
/// still parse. When a file carries several rows for one title, the last
/// row wins.
pub struct CsvStore {
    path: PathBuf,
    on_duplicate: DuplicatePolicy,
}

impl CsvStore {
    /// Open a store at `path`, creating the file with only the header row
    /// when it does not exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            fs::write(&path, format!("{}\n", HEADER))
                .map_err(|e| StoreError::Write(e.to_string()))?;
            info!("created store file {}", path.display());
        }
        Ok(CsvStore {
            path,
            on_duplicate: DuplicatePolicy::Append,
        })
    }

    /// Replace the duplicate-insert policy (appending by default).
    ///
    /// `Reject` and `Overwrite` give up the O(1) insert: both must read
    /// the file first, and `Overwrite` rewrites it.
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, movies: &Collection) -> Result<(), StoreError> {
        let mut contents = String::from(HEADER);
        contents.push('\n');
        for (title, movie) in movies {
            contents.push_str(&encode_row(title, movie));
            contents.push('\n');
        }
        fs::write(&self.path, contents).map_err(|e| StoreError::Write(e.to_string()))
    }

    fn append_row(&self, title: &str, movie: &Movie) -> Result<(), StoreError> {
        let missing = !self.path.exists();
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let mut chunk = String::new();
        if missing {
            chunk.push_str(HEADER);
            chunk.push('\n');
        }
        chunk.push_str(&encode_row(title, movie));
        chunk.push('\n');
        file.write_all(chunk.as_bytes())
            .map_err(|e| StoreError::Write(e.to_string()))
    }
}

impl MovieStore for CsvStore {
    fn load(&self) -> Result<Collection, StoreError> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))?;
        parse_collection(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    fn add(&self, title: &str, movie: Movie) -> Result<(), StoreError> {
        match self.on_duplicate {
            DuplicatePolicy::Append => self.append_row(title, &movie),
            DuplicatePolicy::Reject => {
                if self.list().contains_key(title) {
                    return Err(StoreError::AlreadyExists {
                        title: title.to_string(),
                    });
                }
                self.append_row(title, &movie)
            }
            DuplicatePolicy::Overwrite => {
                let mut movies = self.list();
                movies.insert(title.to_string(), movie);
                self.save(&movies)
            }
        }
    }

    fn delete(&self, title: &str) -> Result<(), StoreError> {
        let mut movies = self.list();
        if movies.remove(title).is_none() {
            return Err(StoreError::NotFound {
                title: title.to_string(),
            });
        }
        self.save(&movies)
    }

    fn update_rating(&self, title: &str, rating: f64) -> Result<(), StoreError> {
        let mut movies = self.list();
        match movies.get_mut(title) {
            Some(movie) => movie.rating = rating,
            None => {
                return Err(StoreError::NotFound {
                    title: title.to_string(),
                })
            }
        }
        self.save(&movies)
    }
}

fn parse_collection(contents: &str) -> Result<Collection, String> {
    let mut rows = parse_rows(contents).into_iter();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Collection::new()),
    };
    let column = |name: &str| header.iter().position(|h| h.trim() == name);
    let title_col = column("title");
    let rating_col = column("rating");
    let year_col = column("year");
    let poster_col = column("poster");

    let mut movies = Collection::new();
    for row in rows {
        let title = required_field(&row, title_col, "title")?.to_string();
        let rating = required_field(&row, rating_col, "rating")?
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("non-numeric rating in row for '{}'", title))?;
        let year = required_field(&row, year_col, "year")?
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("non-numeric year in row for '{}'", title))?;
        let poster = poster_col
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or(NO_POSTER)
            .to_string();
        movies.insert(
            title,
            Movie {
                year,
                rating,
                poster,
            },
        );
    }
    Ok(movies)
}

fn required_field<'a>(
    row: &'a [String],
    col: Option<usize>,
    name: &str,
) -> Result<&'a str, String> {
    col.and_then(|i| row.get(i))
        .map(String::as_str)
        .ok_or_else(|| format!("row missing required column '{}'", name))
}

fn encode_row(title: &str, movie: &Movie) -> String {
    format!(
        "{},{},{},{}",
        encode_field(title),
        encode_field(&movie.rating.to_string()),
        encode_field(&movie.year.to_string()),
        encode_field(&movie.poster),
    )
}

fn encode_field(field: &str) -> String {
    let needs_quotes = field
        .chars()
        .any(|c| matches!(c, ',' | '"' | '\n' | '\r'));
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into rows of fields. Quoted fields may contain commas,
/// doubled quotes, and line breaks. Blank lines are skipped.
fn parse_rows(input: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Distinguishes a blank line from a row whose only field is empty.
    let mut row_started = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if row_started || !row.is_empty() || !field.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                row_started = false;
            }
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }
    if row_started || !row.is_empty() || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CsvStore {
        CsvStore::new(dir.path().join("movies.csv")).unwrap()
    }

    #[test]
    fn new_creates_file_with_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "title,rating,year,poster\n"
        );
    }

    #[test]
    fn new_leaves_existing_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, "title,rating,year,poster\nMatrix,8.7,1999,m.jpg\n").unwrap();

        let store = CsvStore::new(&path).unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn columns_are_mapped_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, "year,title,poster,rating\n1999,Matrix,m.jpg,8.7\n").unwrap();

        let store = CsvStore::new(&path).unwrap();
        let movies = store.load().unwrap();
        assert_eq!(movies["Matrix"], Movie::new(1999, 8.7, "m.jpg"));
    }

    #[test]
    fn missing_poster_column_yields_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, "title,rating,year\nMatrix,8.7,1999\n").unwrap();

        let store = CsvStore::new(&path).unwrap();
        assert_eq!(store.load().unwrap()["Matrix"].poster, NO_POSTER);
    }

    #[test]
    fn short_row_yields_sentinel_poster() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(&path, "title,rating,year,poster\nMatrix,8.7,1999\n").unwrap();

        let store = CsvStore::new(&path).unwrap();
        assert_eq!(store.load().unwrap()["Matrix"].poster, NO_POSTER);
    }

    #[test]
    fn non_numeric_year_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(
            &path,
            "title,rating,year,poster\nMatrix,8.7,1999,m.jpg\nBrazil,7.9,later,b.jpg\n",
        )
        .unwrap();

        let store = CsvStore::new(&path).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn later_rows_shadow_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.csv");
        fs::write(
            &path,
            "title,rating,year,poster\nMatrix,8.7,1999,old.jpg\nMatrix,9.0,1999,new.jpg\n",
        )
        .unwrap();

        let store = CsvStore::new(&path).unwrap();
        let movies = store.load().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies["Matrix"], Movie::new(1999, 9.0, "new.jpg"));
    }

    #[test]
    fn empty_file_loads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "").unwrap();

        assert_eq!(store.load().unwrap(), Collection::new());
    }

    // --- Row codec ---

    #[test]
    fn fields_with_commas_and_quotes_round_trip() {
        let movie = Movie::new(1954, 8.1, r#"a "weird", poster.jpg"#);
        let row = encode_row("20,000 Leagues Under the Sea", &movie);
        let parsed = parse_rows(&row);
        assert_eq!(
            parsed,
            vec![vec![
                "20,000 Leagues Under the Sea".to_string(),
                "8.1".to_string(),
                "1954".to_string(),
                r#"a "weird", poster.jpg"#.to_string(),
            ]]
        );
    }

    #[test]
    fn quoted_fields_may_contain_line_breaks() {
        let rows = parse_rows("\"a\nb\",c\n");
        assert_eq!(rows, vec![vec!["a\nb".to_string(), "c".to_string()]]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let rows = parse_rows("a,b\n\nc,d\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a", "b"]);
        assert_eq!(rows[1], vec!["c", "d"]);
    }

    #[test]
    fn crlf_line_endings_parse() {
        let rows = parse_rows("title,rating,year,poster\r\nMatrix,8.7,1999,m.jpg\r\n");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Matrix");
    }

    #[test]
    fn final_row_without_newline_parses() {
        let rows = parse_rows("a,b");
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }
}
