//! Interactive menu session over any movie store.
//!
//! The app owns a store plus the website settings and drives a numbered
//! menu over any `BufRead`/`Write` pair, so sessions can be scripted in
//! tests with in-memory buffers.
//!
//! ## Example
//!
//! ```ignore
//! use std::io;
//!
//! use cinevault::{JsonStore, MovieApp};
//!
//! let store = JsonStore::new("movies.json")?;
//! let app = MovieApp::new(store).with_page_title("Family Movies");
//! app.run(&mut io::stdin().lock(), &mut io::stdout())?;
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[cfg(feature = "lookup")]
use crate::lookup::MetadataSource;
use crate::movie::{Movie, NO_POSTER};
use crate::storage::{MovieStore, StoreError};
use crate::website;

/// Menu-driven catalog session bound to one store.
pub struct MovieApp<S: MovieStore> {
    store: S,
    page_title: String,
    template: Option<PathBuf>,
    output: PathBuf,
    #[cfg(feature = "lookup")]
    lookup: Option<Box<dyn MetadataSource>>,
}

impl<S: MovieStore> MovieApp<S> {
    pub fn new(store: S) -> Self {
        MovieApp {
            store,
            page_title: "My Movie Catalog".to_string(),
            template: None,
            output: PathBuf::from("movies.html"),
            #[cfg(feature = "lookup")]
            lookup: None,
        }
    }

    /// Heading shown above the menu and on the generated website.
    pub fn with_page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = title.into();
        self
    }

    /// Website template file. Without one the built-in template is used.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Some(path.into());
        self
    }

    /// Where the generated website is written (`movies.html` by default).
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }

    /// Metadata source behind the "add by lookup" menu entry. The entry
    /// only appears once a source is configured.
    #[cfg(feature = "lookup")]
    pub fn with_lookup(mut self, source: Box<dyn MetadataSource>) -> Self {
        self.lookup = Some(source);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the menu loop until the user exits or `input` reaches EOF.
    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<()> {
        writeln!(output, "********** {} **********", self.page_title)?;
        loop {
            writeln!(output)?;
            self.print_menu(output)?;
            let prompt = format!("Enter choice (0-{}): ", self.menu_limit());
            let choice = match prompt_line(input, output, &prompt)? {
                Some(choice) => choice,
                None => return Ok(()),
            };
            writeln!(output)?;
            match choice.trim() {
                "0" => {
                    writeln!(output, "Goodbye!")?;
                    return Ok(());
                }
                "1" => self.list_movies(output)?,
                "2" => self.add_movie(input, output)?,
                "3" => self.delete_movie(input, output)?,
                "4" => self.update_rating(input, output)?,
                "5" => self.stats(output)?,
                "6" => self.generate_website(output)?,
                #[cfg(feature = "lookup")]
                "7" if self.lookup.is_some() => self.add_from_lookup(input, output)?,
                _ => writeln!(
                    output,
                    "Invalid choice, please enter a number between 0 and {}.",
                    self.menu_limit()
                )?,
            }
        }
    }

    fn menu_limit(&self) -> u8 {
        #[cfg(feature = "lookup")]
        if self.lookup.is_some() {
            return 7;
        }
        6
    }

    fn print_menu<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(output, "Menu:")?;
        writeln!(output, "0. Exit")?;
        writeln!(output, "1. List movies")?;
        writeln!(output, "2. Add movie")?;
        writeln!(output, "3. Delete movie")?;
        writeln!(output, "4. Update movie rating")?;
        writeln!(output, "5. Stats")?;
        writeln!(output, "6. Generate website")?;
        #[cfg(feature = "lookup")]
        if self.lookup.is_some() {
            writeln!(output, "7. Add movie by title lookup")?;
        }
        Ok(())
    }

    fn list_movies<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let movies = self.store.list();
        if movies.is_empty() {
            writeln!(output, "No movies found.")?;
            return Ok(());
        }
        writeln!(output, "{} movies in total", movies.len())?;
        let mut entries: Vec<(&String, &Movie)> = movies.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (title, movie) in entries {
            writeln!(
                output,
                "{} - Year: {}, Rating: {}, Poster: {}",
                title, movie.year, movie.rating, movie.poster
            )?;
        }
        Ok(())
    }

    fn add_movie<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<()> {
        let title = match prompt_line(input, output, "Enter movie title: ")? {
            Some(title) => title.trim().to_string(),
            None => return Ok(()),
        };
        if title.is_empty() {
            writeln!(output, "Movie title must not be empty.")?;
            return Ok(());
        }

        let year = match prompt_line(input, output, "Enter movie release year: ")? {
            Some(raw) => match raw.trim().parse::<i32>() {
                Ok(year) => year,
                Err(_) => {
                    writeln!(output, "Please enter a valid year.")?;
                    return Ok(());
                }
            },
            None => return Ok(()),
        };

        let rating = match self.prompt_rating(input, output, "Enter movie rating (0.0 - 10.0): ")? {
            Some(rating) => rating,
            None => return Ok(()),
        };

        let poster = match prompt_line(input, output, "Enter movie poster URL or path: ")? {
            Some(poster) => {
                let poster = poster.trim();
                if poster.is_empty() {
                    NO_POSTER.to_string()
                } else {
                    poster.to_string()
                }
            }
            None => return Ok(()),
        };

        match self.store.add(&title, Movie::new(year, rating, poster)) {
            Ok(()) => writeln!(output, "Movie '{}' added successfully.", title)?,
            Err(e) => writeln!(output, "{}", describe(&e))?,
        }
        Ok(())
    }

    fn delete_movie<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<()> {
        let title = match prompt_line(input, output, "Enter movie title to delete: ")? {
            Some(title) => title.trim().to_string(),
            None => return Ok(()),
        };
        match self.store.delete(&title) {
            Ok(()) => writeln!(output, "Movie '{}' deleted successfully.", title)?,
            Err(e) => writeln!(output, "{}", describe(&e))?,
        }
        Ok(())
    }

    fn update_rating<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> io::Result<()> {
        let title = match prompt_line(input, output, "Enter movie title: ")? {
            Some(title) => title.trim().to_string(),
            None => return Ok(()),
        };
        let rating = match self.prompt_rating(input, output, "Enter new movie rating (0.0 - 10.0): ")? {
            Some(rating) => rating,
            None => return Ok(()),
        };
        match self.store.update_rating(&title, rating) {
            Ok(()) => writeln!(output, "Movie '{}' rating updated successfully.", title)?,
            Err(e) => writeln!(output, "{}", describe(&e))?,
        }
        Ok(())
    }

    // Only well-formed ratings in range reach the store. Returns None
    // when the value was refused or input ended, either way the command
    // is abandoned.
    fn prompt_rating<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        prompt: &str,
    ) -> io::Result<Option<f64>> {
        let raw = match prompt_line(input, output, prompt)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        match raw.trim().parse::<f64>() {
            Ok(rating) if (0.0..=10.0).contains(&rating) => Ok(Some(rating)),
            _ => {
                writeln!(output, "Please enter a rating between 0.0 and 10.0.")?;
                Ok(None)
            }
        }
    }

    fn stats<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let movies = self.store.list();
        if movies.is_empty() {
            writeln!(output, "No movies found.")?;
            return Ok(());
        }
        let total = movies.len();
        let average = movies.values().map(|m| m.rating).sum::<f64>() / total as f64;
        writeln!(output, "Total movies: {}", total)?;
        writeln!(output, "Average rating: {:.2}", average)?;
        Ok(())
    }

    fn generate_website<W: Write>(&self, output: &mut W) -> io::Result<()> {
        let movies = self.store.list();
        let result = website::generate(
            self.template.as_deref(),
            &self.output,
            &self.page_title,
            &movies,
        );
        match result {
            Ok(()) => writeln!(output, "Website was generated successfully.")?,
            Err(e) => writeln!(output, "Website generation failed: {}", e)?,
        }
        Ok(())
    }

    #[cfg(feature = "lookup")]
    fn add_from_lookup<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<()> {
        let source = match &self.lookup {
            Some(source) => source,
            None => return Ok(()),
        };
        let title = match prompt_line(input, output, "Enter movie title: ")? {
            Some(title) => title.trim().to_string(),
            None => return Ok(()),
        };
        if title.is_empty() {
            writeln!(output, "Movie title must not be empty.")?;
            return Ok(());
        }
        match source.find(&title) {
            Ok(found) => {
                let movie = Movie::new(found.year, found.rating, found.poster);
                match self.store.add(&found.title, movie) {
                    Ok(()) => writeln!(output, "Movie '{}' added successfully.", found.title)?,
                    Err(e) => writeln!(output, "{}", describe(&e))?,
                }
            }
            Err(e) => writeln!(output, "Lookup failed: {}", e)?,
        }
        Ok(())
    }
}

fn describe(err: &StoreError) -> String {
    match err {
        StoreError::NotFound { title } => format!("Movie '{}' not found.", title),
        StoreError::AlreadyExists { title } => format!("Movie '{}' already exists.", title),
        StoreError::Corrupt(cause) => format!("Movie storage is unreadable: {}", cause),
        StoreError::Write(cause) => format!("Could not save changes: {}", cause),
    }
}

/// Print `prompt` without a newline and read one line. `None` means EOF.
fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n').to_string();
    Ok(Some(line))
}
