use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three independently embedded collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
  Course,
  Faculty,
  Event,
}

impl Corpus {
  /// Every corpus, in the order results are presented
  pub const ALL: [Corpus; 3] = [Corpus::Course, Corpus::Faculty, Corpus::Event];

  /// Name of the vector store collection backing this corpus
  pub fn collection_name(&self) -> &'static str {
    match self {
      Corpus::Course => "courses",
      Corpus::Faculty => "faculty",
      Corpus::Event => "events",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Corpus::Course => "course",
      Corpus::Faculty => "faculty",
      Corpus::Event => "event",
    }
  }
}

impl fmt::Display for Corpus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}
