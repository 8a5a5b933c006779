use std::collections::HashMap;

use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Attribute map of one XML element.
pub type Attributes = HashMap<String, String>;

/// A game's source data is malformed or structurally incomplete. The
/// importer treats any variant as grounds to skip the whole game
/// directory rather than partially import it.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("{0}")]
    Incomplete(&'static str),
}

/// One element of a parsed Gameday document. These documents carry all
/// their data in attributes, so text content is dropped.
#[derive(Debug, Default, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Attributes,
    pub children: Vec<Element>,
}

impl Element {
    /// First descendant named `name`, depth first.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in &self.children {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant named `name`, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }
}

fn read_element(start: &BytesStart) -> Result<Element, ParseError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

/// Parse a whole document into its root element.
pub fn parse_document(xml: &str) -> Result<Element, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(read_element(&start)?),
            Event::Empty(start) => {
                let element = read_element(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(ParseError::Incomplete("document has no root element"))
}

/// Attribute map of the root game element, verbatim.
pub fn get_game(doc: &Element) -> Attributes {
    doc.attrs.clone()
}

/// The two team elements of a game document, in document order.
pub fn get_teams(doc: &Element) -> Result<Vec<Attributes>, ParseError> {
    let teams: Vec<Attributes> = doc
        .find_all("team")
        .into_iter()
        .map(|team| team.attrs.clone())
        .collect();
    // We should only ever get two teams.
    if teams.len() != 2 {
        return Err(ParseError::Incomplete("expected exactly two team elements"));
    }
    Ok(teams)
}

/// Every player element's attributes. Rosters carry no count constraint.
pub fn get_players(doc: &Element) -> Vec<Attributes> {
    doc.find_all("player")
        .into_iter()
        .map(|player| player.attrs.clone())
        .collect()
}

/// The umpire working home plate. Exactly one umpire record flows
/// downstream, so a crew without a home-plate position is an error.
pub fn get_plate_umpire(doc: &Element) -> Result<Attributes, ParseError> {
    let umpires = doc.find_all("umpire");
    if umpires.is_empty() {
        return Err(ParseError::Incomplete("no umpire elements"));
    }
    umpires
        .into_iter()
        .find(|umpire| umpire.attrs.get("position").map(String::as_str) == Some("home"))
        .map(|umpire| umpire.attrs.clone())
        .ok_or(ParseError::Incomplete("no umpire at home plate"))
}

/// The stadium the game was played in.
pub fn get_stadium(doc: &Element) -> Result<Attributes, ParseError> {
    doc.find("stadium")
        .map(|stadium| stadium.attrs.clone())
        .ok_or(ParseError::Incomplete("no stadium element"))
}

/// Game date from the roster document's root, which carries it as
/// `date="June 17, 2014"`.
pub fn get_date(doc: &Element) -> Result<NaiveDate, ParseError> {
    let date = doc
        .attrs
        .get("date")
        .ok_or(ParseError::Incomplete("roster has no date"))?;
    NaiveDate::parse_from_str(date, "%B %d, %Y")
        .map_err(|_| ParseError::Incomplete("roster date is unreadable"))
}

/// One batter's plate appearance with its nested pitch, pickoff, and
/// runner events.
#[derive(Debug, Clone, PartialEq)]
pub struct AtBat {
    pub attrs: Attributes,
    pub pitches: Vec<Attributes>,
    pub pickoffs: Vec<Attributes>,
    pub runners: Vec<Attributes>,
}

/// At-bat records from a play-by-play document. A game with no at-bats
/// never happened.
pub fn get_atbats(doc: &Element) -> Result<Vec<AtBat>, ParseError> {
    let atbats: Vec<AtBat> = doc
        .find_all("atbat")
        .into_iter()
        .map(|atbat| AtBat {
            attrs: atbat.attrs.clone(),
            pitches: collect_attrs(atbat, "pitch"),
            pickoffs: collect_attrs(atbat, "po"),
            runners: collect_attrs(atbat, "runner"),
        })
        .collect();
    if atbats.is_empty() {
        return Err(ParseError::Incomplete("no atbat elements"));
    }
    Ok(atbats)
}

/// Pitch elements flattened across every at-bat.
pub fn get_pitches(doc: &Element) -> Vec<Attributes> {
    doc.find_all("atbat")
        .into_iter()
        .flat_map(|atbat| collect_attrs(atbat, "pitch"))
        .collect()
}

/// Action elements flattened across the document. Actions sit beside
/// at-bats within each half inning.
pub fn get_actions(doc: &Element) -> Vec<Attributes> {
    doc.find_all("action")
        .into_iter()
        .map(|action| action.attrs.clone())
        .collect()
}

fn collect_attrs(parent: &Element, name: &str) -> Vec<Attributes> {
    parent
        .find_all(name)
        .into_iter()
        .map(|element| element.attrs.clone())
        .collect()
}
