use chrono::{Datelike, NaiveDate};

/// A partial calendar date bounding one end of a crawl range.
///
/// `parts` counts how many fields the input supplied: 1 for a bare year,
/// 2 for year and month, 3 for a full date. Absent or unparseable input
/// yields the unbounded boundary (no date, zero parts), which callers
/// replace with a pipeline default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub date: Option<NaiveDate>,
    pub parts: u8,
}

impl Boundary {
    pub const UNBOUNDED: Boundary = Boundary {
        date: None,
        parts: 0,
    };
}

/// Parse a boundary date string in `YYYY`, `YYYY-MM`, or `YYYY-MM-DD` form.
/// Missing fields default to the first month or day of the period.
pub fn get_boundary(input: Option<&str>) -> Boundary {
    let Some(input) = input else {
        return Boundary::UNBOUNDED;
    };

    let fields: Vec<&str> = input.split('-').collect();
    if fields.len() > 3 {
        return Boundary::UNBOUNDED;
    }

    let mut numbers = [1u32; 3];
    for (i, field) in fields.iter().enumerate() {
        match field.parse::<u32>() {
            Ok(number) => numbers[i] = number,
            Err(_) => return Boundary::UNBOUNDED,
        }
    }

    match NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2]) {
        Some(date) => Boundary {
            date: Some(date),
            parts: fields.len() as u8,
        },
        None => Boundary::UNBOUNDED,
    }
}

/// Render the date portion of a Gameday URL, truncated to `parts`
/// fragments: `year_2014/month_06/day_17/`.
pub fn boundary_url(date: NaiveDate, parts: u8) -> String {
    let fragments = [
        format!("year_{:04}", date.year()),
        format!("month_{:02}", date.month()),
        format!("day_{:02}", date.day()),
    ];
    let mut url = fragments[..(parts as usize).min(3)].join("/");
    url.push('/');
    url
}

/// Yield candidate URLs within the inclusive range `[start, stop]`.
///
/// Containment is checked in both directions because deeper pages contain
/// a shallower boundary URL as a substring (a game page under a day
/// contains that day's URL). Once a candidate matches `start`, every
/// following candidate is yielded; the first candidate matching `stop`
/// ends the iteration after being yielded itself.
pub fn inclusive_urls<I>(urls: I, start: String, stop: String) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = String>,
{
    let mut urls = urls.into_iter();
    let mut in_range = false;
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        for url in urls.by_ref() {
            if start.contains(url.as_str()) || url.contains(start.as_str()) {
                in_range = true;
            }
            if stop.contains(url.as_str()) || url.contains(stop.as_str()) {
                done = true;
            }
            if in_range {
                return Some(url);
            }
            if done {
                return None;
            }
        }
        None
    })
}
