//! Static website generation from a movie collection.
//!
//! A template is plain HTML carrying two placeholders,
//! `__TEMPLATE_TITLE__` and `__TEMPLATE_MOVIE_GRID__`. Rendering
//! substitutes both and escapes every value taken from the collection,
//! so titles and poster paths cannot inject markup.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::movie::{Collection, Movie};

/// Template compiled into the binary, used when no template path is given.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/index.html");

const TITLE_PLACEHOLDER: &str = "__TEMPLATE_TITLE__";
const GRID_PLACEHOLDER: &str = "__TEMPLATE_MOVIE_GRID__";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebsiteError {
    /// The template file could not be read.
    Template(String),
    /// The rendered page could not be written.
    Output(String),
}

impl fmt::Display for WebsiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebsiteError::Template(cause) => write!(f, "cannot read template: {}", cause),
            WebsiteError::Output(cause) => write!(f, "cannot write website: {}", cause),
        }
    }
}

impl Error for WebsiteError {}

/// Render `template` with the page title and the movie grid substituted.
///
/// Grid entries are ordered by title, so the same collection always
/// renders to the same page.
pub fn render(template: &str, page_title: &str, movies: &Collection) -> String {
    template
        .replace(TITLE_PLACEHOLDER, &escape(page_title))
        .replace(GRID_PLACEHOLDER, &movie_grid(movies))
}

/// Render the collection and write the page to `output`. Reads the
/// template from `template` when given, otherwise uses
/// [`DEFAULT_TEMPLATE`].
pub fn generate(
    template: Option<&Path>,
    output: &Path,
    page_title: &str,
    movies: &Collection,
) -> Result<(), WebsiteError> {
    let template = match template {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| WebsiteError::Template(format!("{}: {}", path.display(), e)))?,
        None => DEFAULT_TEMPLATE.to_string(),
    };
    let page = render(&template, page_title, movies);
    fs::write(output, page)
        .map_err(|e| WebsiteError::Output(format!("{}: {}", output.display(), e)))?;
    info!("wrote {}", output.display());
    Ok(())
}

fn movie_grid(movies: &Collection) -> String {
    let mut entries: Vec<(&String, &Movie)> = movies.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut grid = String::new();
    for (title, movie) in entries {
        grid.push_str("<li>\n");
        grid.push_str("<div class=\"movie\">\n");
        grid.push_str(&format!(
            "<img class=\"movie-poster\" src=\"{}\"/>\n",
            escape(&movie.poster)
        ));
        grid.push_str(&format!(
            "<div class=\"movie-title\">{}</div>\n",
            escape(title)
        ));
        grid.push_str(&format!("<div class=\"movie-year\">{}</div>\n", movie.year));
        grid.push_str("</div>\n");
        grid.push_str("</li>\n");
    }
    grid
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_replaces_markup_characters() {
        assert_eq!(
            escape(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn render_substitutes_both_placeholders() {
        let mut movies = Collection::new();
        movies.insert("Matrix".to_string(), Movie::new(1999, 8.7, "m.jpg"));

        let page = render(DEFAULT_TEMPLATE, "My Catalog", &movies);
        assert!(!page.contains(TITLE_PLACEHOLDER));
        assert!(!page.contains(GRID_PLACEHOLDER));
        assert!(page.contains("<title>My Catalog</title>"));
        assert!(page.contains("<div class=\"movie-title\">Matrix</div>"));
        assert!(page.contains("<div class=\"movie-year\">1999</div>"));
        assert!(page.contains("<img class=\"movie-poster\" src=\"m.jpg\"/>"));
    }

    #[test]
    fn grid_is_sorted_by_title() {
        let mut movies = Collection::new();
        movies.insert("Zardoz".to_string(), Movie::new(1974, 5.8, "z.jpg"));
        movies.insert("Alien".to_string(), Movie::new(1979, 8.5, "a.jpg"));

        let grid = movie_grid(&movies);
        let alien = grid.find("Alien").unwrap();
        let zardoz = grid.find("Zardoz").unwrap();
        assert!(alien < zardoz);
    }

    #[test]
    fn movie_fields_are_escaped_in_the_grid() {
        let mut movies = Collection::new();
        movies.insert(
            "Fast & Furious".to_string(),
            Movie::new(2001, 6.8, r#"posters/"fast".jpg"#),
        );

        let grid = movie_grid(&movies);
        assert!(grid.contains("Fast &amp; Furious"));
        assert!(grid.contains("posters/&quot;fast&quot;.jpg"));
        assert!(!grid.contains(r#"src="posters/"fast""#));
    }

    #[test]
    fn generate_writes_the_rendered_page() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movies.html");
        let mut movies = Collection::new();
        movies.insert("Matrix".to_string(), Movie::new(1999, 8.7, "m.jpg"));

        generate(None, &output, "My Catalog", &movies).unwrap();

        let page = fs::read_to_string(&output).unwrap();
        assert!(page.contains("Matrix"));
    }

    #[test]
    fn generate_with_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("movies.html");
        let template = dir.path().join("absent.html");

        let err = generate(
            Some(template.as_path()),
            &output,
            "My Catalog",
            &Collection::new(),
        );
        assert!(matches!(err, Err(WebsiteError::Template(_))));
        assert!(!output.exists());
    }
}
