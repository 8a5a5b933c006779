use std::fs;
use std::path::Path;

use log::{debug, error};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use url::Url;

/// Root of the public Gameday directory tree.
pub const WEB_ROOT: &str = "http://gd2.mlb.com/components/game/mlb/";

/// Outcome of a batch download or upload: how many files landed and which
/// URLs failed. Failures are reported for the caller to log or re-drive;
/// nothing is retried.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub completed: usize,
    pub failures: Vec<String>,
}

/// Pull hyperlink targets out of a directory-listing page. Targets are
/// filtered by `prefix` (all links when None) and resolved against the
/// page URL.
pub fn extract_links(page: &str, html: &str, prefix: Option<&str>) -> Vec<String> {
    let Ok(base) = Url::parse(page) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let anchor = Selector::parse("a").unwrap();
    document
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| prefix.map_or(true, |p| href.starts_with(p)))
        .filter_map(|href| base.join(href).ok())
        .map(|resolved| resolved.to_string())
        .collect()
}

/// Crawls Gameday directory listings over one blocking HTTP client.
///
/// The year/month/day/game stages each take the previous stage's output
/// and narrow by link prefix; every stage is lazy, so a downstream
/// consumer drives the fetches one listing at a time.
pub struct Scraper {
    client: Client,
}

impl Scraper {
    pub fn new(client: Client) -> Self {
        Scraper { client }
    }

    /// Fetch one directory-listing page and return its matching links.
    /// A failed fetch is logged and yields nothing; the crawl moves on.
    pub fn links(&self, page: &str, prefix: Option<&str>) -> Vec<String> {
        let body = self
            .client
            .get(page)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text());
        match body {
            Ok(body) => extract_links(page, &body, prefix),
            Err(err) => {
                error!("listing fetch failed: {} raised {}", page, err);
                Vec::new()
            }
        }
    }

    fn scrape<'a, I>(&'a self, roots: I, prefix: &'static str) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        roots
            .into_iter()
            .flat_map(move |root| self.links(&root, Some(prefix)))
    }

    /// From the root URL, yield URLs to the available years.
    pub fn years(&self, root: &str) -> impl Iterator<Item = String> + '_ {
        self.scrape(Some(root.to_string()), "year_")
    }

    /// Yield URLs to the available months for every year.
    pub fn months<'a, I>(&'a self, years: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        self.scrape(years, "month_")
    }

    /// Yield URLs to the available days for every month.
    pub fn days<'a, I>(&'a self, months: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        self.scrape(months, "day_")
    }

    /// Yield URLs to the available games for every day.
    pub fn games<'a, I>(&'a self, days: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        self.scrape(days, "gid_")
    }

    /// Yield URLs to the relevant files for every game: the roster, the
    /// game metadata, and the play-by-play under the innings subdirectory.
    pub fn files<'a, I>(&'a self, games: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        games.into_iter().flat_map(move |game| {
            let mut found = self.links(&game, Some("players.xml"));
            found.extend(self.links(&game, Some("game.xml")));
            match Url::parse(&game).and_then(|url| url.join("inning/")) {
                Ok(inning) => found.extend(self.links(inning.as_str(), Some("inning_all.xml"))),
                Err(err) => error!("bad game url: {} raised {}", game, err),
            }
            found
        })
    }
}

/// Download `urls` into `root`, mirroring each as host + path. URLs whose
/// path has no filename component are directory pages and are skipped.
/// A failed fetch is recorded and the batch keeps going.
pub fn download<I>(client: &Client, urls: I, root: &Path) -> FetchReport
where
    I: IntoIterator<Item = String>,
{
    let mut completed = 0;
    let mut failures = Vec::new();

    for url in urls {
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!("download error: {} raised {}", url, err);
                failures.push(url);
                continue;
            }
        };
        let (directory, filename) = match parsed.path().rsplit_once('/') {
            Some(split) => split,
            None => ("", parsed.path()),
        };
        // Skip directory pages.
        if filename.is_empty() {
            continue;
        }

        let mut target = root.join(parsed.host_str().unwrap_or_default());
        target.push(directory.trim_start_matches('/'));

        // Ignore if the target directory already existed.
        if let Err(err) = fs::create_dir_all(&target) {
            error!("download error: {} raised {}", url, err);
            failures.push(url);
            continue;
        }

        let body = client
            .get(parsed.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text());
        let body = match body {
            Ok(body) => body,
            Err(err) => {
                error!("download error: {} raised {}", url, err);
                failures.push(url);
                continue;
            }
        };

        if let Err(err) = fs::write(target.join(filename), body) {
            error!("download error: {} raised {}", url, err);
            failures.push(url);
            continue;
        }

        debug!("downloaded {}", url);
        completed += 1;
    }

    FetchReport {
        completed,
        failures,
    }
}
