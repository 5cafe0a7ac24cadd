//! Typed per-corpus metadata
//!
//! The vector store hands metadata back as an open string map. Each corpus
//! gets a fixed record with optional fields instead, so missing data is
//! handled where it is used. A key that is absent and a key whose value is
//! blank both become `None`, for every item alike.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::Corpus;

/// Metadata exactly as stored alongside an embedding
pub type RawMetadata = BTreeMap<String, String>;

/// Render JSON metadata values (strings, numbers, booleans) as strings; nulls are dropped
pub fn raw_from_json(metadata: Map<String, Value>) -> RawMetadata {
  metadata
    .into_iter()
    .filter_map(|(key, value)| match value {
      Value::String(text) => Some((key, text)),
      Value::Null => None,
      other => Some((key, other.to_string())),
    })
    .collect()
}

// Store keys, as written by the ingestion loaders
const COURSE_CODE: &str = "course code";
const COURSE_DESCRIPTION: &str = "course description";
const COURSE_SEMESTER: &str = "semester taught";
const COURSE_INSTRUCTOR: &str = "taught by";
const COURSE_PREREQUISITES: &str = "prerequisites";
const COURSE_MEETING_TIMES: &str = "meeting times";
const COURSE_CREDITS: &str = "credits";
const COURSE_SOURCE: &str = "source";

const FACULTY_NAME: &str = "name";
const FACULTY_TITLES: &str = "titles";
const FACULTY_BIO: &str = "bio";
const FACULTY_PROFILE_URL: &str = "profile_url";

const EVENT_TITLE: &str = "title";
const EVENT_SUBTITLE: &str = "subtitle";
const EVENT_TYPE: &str = "type";
const EVENT_DESCRIPTION: &str = "description";
const EVENT_START: &str = "start";
const EVENT_END: &str = "end";
const EVENT_LOCATION: &str = "location";
const EVENT_COST: &str = "cost";
const EVENT_TAGS: &str = "tags";
const EVENT_PERMALINK: &str = "permalink";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseMetadata {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub code: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub semester: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub instructor: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prerequisites: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub meeting_times: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub credits: Option<String>,
  /// Catalog the course came from
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyMetadata {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub titles: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bio: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub profile_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub subtitle: Option<String>,
  #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
  pub event_type: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cost: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tags: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub permalink: Option<String>,
}

/// Metadata of one retrieved item, tagged with its corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "corpus", rename_all = "lowercase")]
pub enum ItemMetadata {
  Course(CourseMetadata),
  Faculty(FacultyMetadata),
  Event(EventMetadata),
}

fn field(raw: &RawMetadata, key: &str) -> Option<String> {
  raw.get(key).map(|value| value.trim()).filter(|value| !value.is_empty()).map(str::to_string)
}

impl CourseMetadata {
  pub fn from_raw(raw: &RawMetadata) -> Self {
    Self {
      code: field(raw, COURSE_CODE),
      description: field(raw, COURSE_DESCRIPTION),
      semester: field(raw, COURSE_SEMESTER),
      instructor: field(raw, COURSE_INSTRUCTOR),
      prerequisites: field(raw, COURSE_PREREQUISITES),
      meeting_times: field(raw, COURSE_MEETING_TIMES),
      credits: field(raw, COURSE_CREDITS),
      source: field(raw, COURSE_SOURCE),
    }
  }
}

impl FacultyMetadata {
  pub fn from_raw(raw: &RawMetadata) -> Self {
    Self {
      name: field(raw, FACULTY_NAME),
      titles: field(raw, FACULTY_TITLES),
      bio: field(raw, FACULTY_BIO),
      profile_url: field(raw, FACULTY_PROFILE_URL),
    }
  }
}

impl EventMetadata {
  pub fn from_raw(raw: &RawMetadata) -> Self {
    Self {
      title: field(raw, EVENT_TITLE),
      subtitle: field(raw, EVENT_SUBTITLE),
      event_type: field(raw, EVENT_TYPE),
      description: field(raw, EVENT_DESCRIPTION),
      start: field(raw, EVENT_START),
      end: field(raw, EVENT_END),
      location: field(raw, EVENT_LOCATION),
      cost: field(raw, EVENT_COST),
      tags: field(raw, EVENT_TAGS),
      permalink: field(raw, EVENT_PERMALINK),
    }
  }
}

impl ItemMetadata {
  /// Interpret raw store metadata according to the corpus it was read from
  pub fn from_raw(corpus: Corpus, raw: &RawMetadata) -> Self {
    match corpus {
      Corpus::Course => ItemMetadata::Course(CourseMetadata::from_raw(raw)),
      Corpus::Faculty => ItemMetadata::Faculty(FacultyMetadata::from_raw(raw)),
      Corpus::Event => ItemMetadata::Event(EventMetadata::from_raw(raw)),
    }
  }

  pub fn corpus(&self) -> Corpus {
    match self {
      ItemMetadata::Course(_) => Corpus::Course,
      ItemMetadata::Faculty(_) => Corpus::Faculty,
      ItemMetadata::Event(_) => Corpus::Event,
    }
  }

  /// Headline field: course code, faculty name or event title
  pub fn title(&self) -> Option<&str> {
    match self {
      ItemMetadata::Course(course) => course.code.as_deref(),
      ItemMetadata::Faculty(faculty) => faculty.name.as_deref(),
      ItemMetadata::Event(event) => event.title.as_deref(),
    }
  }

  /// Secondary field used in compact listings
  pub fn descriptor(&self) -> Option<&str> {
    match self {
      ItemMetadata::Course(course) => course.description.as_deref(),
      ItemMetadata::Faculty(faculty) => faculty.titles.as_deref(),
      ItemMetadata::Event(event) => event.event_type.as_deref().or(event.subtitle.as_deref()),
    }
  }
}
