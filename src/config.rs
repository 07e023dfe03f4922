//! Optional config file loading. Search order: ./booksoup.toml, then
//! $XDG_CONFIG_HOME/booksoup/config.toml (or ~/.config/booksoup/config.toml).

use serde::Deserialize;
use std::path::PathBuf;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Index page of the book when no URL is given on the command line.
    pub base_url: Option<String>,
    /// Default output directory when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// Output format: html (default) or markdown.
    pub format: Option<String>,
    /// Maximum number of pages fetched at once. Unset means one worker per chapter.
    pub concurrency: Option<usize>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// CSS selector of the chapter list container on the index page.
    pub nav_selector: Option<String>,
    /// CSS selector of the content region kept from each chapter page.
    pub content_selector: Option<String>,
}

/// Search order: (1) ./booksoup.toml, (2) $XDG_CONFIG_HOME/booksoup/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    load_config_from(&config_search_paths()?)
}

fn config_search_paths() -> Result<Vec<PathBuf>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("booksoup.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("booksoup").join("config.toml"));
    }
    Ok(paths)
}

/// Load the first of `paths` that exists. Later paths are not consulted.
pub fn load_config_from(paths: &[PathBuf]) -> Result<Option<Config>, String> {
    for path in paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            tracing::debug!("Loaded config from {}", path.display());
            return Ok(Some(config));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_config() {
        let c: Config = toml::from_str("").unwrap();
        assert!(c.base_url.is_none());
        assert!(c.output_dir.is_none());
        assert!(c.format.is_none());
        assert!(c.concurrency.is_none());
        assert!(c.user_agent.is_none());
        assert!(c.timeout_secs.is_none());
        assert!(c.nav_selector.is_none());
        assert!(c.content_selector.is_none());
    }

    #[test]
    fn parse_full_config() {
        let s = r#"
            base_url = "https://books.example.com/guide/"
            output_dir = "out"
            format = "markdown"
            concurrency = 8
            user_agent = "Custom/1.0"
            timeout_secs = 60
            nav_selector = "nav.toc"
            content_selector = "main article"
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert_eq!(c.base_url.as_deref(), Some("https://books.example.com/guide/"));
        assert_eq!(c.output_dir.as_deref(), Some(std::path::Path::new("out")));
        assert_eq!(c.format.as_deref(), Some("markdown"));
        assert_eq!(c.concurrency, Some(8));
        assert_eq!(c.user_agent.as_deref(), Some("Custom/1.0"));
        assert_eq!(c.timeout_secs, Some(60));
        assert_eq!(c.nav_selector.as_deref(), Some("nav.toc"));
        assert_eq!(c.content_selector.as_deref(), Some("main article"));
    }

    #[test]
    fn parse_partial_config() {
        let s = r#"
            concurrency = 4
        "#;
        let c: Config = toml::from_str(s).unwrap();
        assert!(c.base_url.is_none());
        assert!(c.output_dir.is_none());
        assert_eq!(c.concurrency, Some(4));
        assert!(c.timeout_secs.is_none());
    }

    #[test]
    fn negative_concurrency_rejected() {
        assert!(toml::from_str::<Config>("concurrency = -1").is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        assert!(toml::from_str::<Config>("output_dir = [").is_err());
    }

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "booksoup_config_{}_{}.toml",
            std::process::id(),
            name
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn search_paths_start_in_working_directory() {
        let paths = config_search_paths().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(paths[0], cwd.join("booksoup.toml"));
        if let Some(d) = dirs::config_dir() {
            assert_eq!(paths[1], d.join("booksoup").join("config.toml"));
        }
    }

    #[test]
    fn first_existing_config_wins() {
        let local = temp_config("local", "concurrency = 2");
        let user = temp_config("user", "concurrency = 9\nformat = \"markdown\"");
        let c = load_config_from(&[local.clone(), user.clone()])
            .unwrap()
            .unwrap();
        assert_eq!(c.concurrency, Some(2));
        assert!(c.format.is_none());
        let _ = std::fs::remove_file(&local);
        let _ = std::fs::remove_file(&user);
    }

    #[test]
    fn missing_first_config_falls_through() {
        let missing = std::env::temp_dir().join(format!(
            "booksoup_config_{}_absent.toml",
            std::process::id()
        ));
        let user = temp_config("fallback", "timeout_secs = 5");
        let c = load_config_from(&[missing, user.clone()]).unwrap().unwrap();
        assert_eq!(c.timeout_secs, Some(5));
        let _ = std::fs::remove_file(&user);
    }

    #[test]
    fn no_config_files_is_none() {
        let missing = PathBuf::from("/nonexistent_dir_booksoup_xyz/config.toml");
        assert!(load_config_from(&[missing]).unwrap().is_none());
        assert!(load_config_from(&[]).unwrap().is_none());
    }

    #[test]
    fn invalid_config_file_errors_before_later_paths() {
        let bad = temp_config("bad", "output_dir = [");
        let good = temp_config("good", "concurrency = 3");
        let err = load_config_from(&[bad.clone(), good.clone()]).unwrap_err();
        assert!(err.starts_with("Invalid config"));
        let _ = std::fs::remove_file(&bad);
        let _ = std::fs::remove_file(&good);
    }
}
