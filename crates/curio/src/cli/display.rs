//! Display formatting utilities for CLI output

use colored::*;

use crate::models::{Corpus, ItemMetadata, PipelineResult, RetrievedMatch};

const WRAP_WIDTH: usize = 80;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(current_line);
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

fn heading(corpus: Corpus) -> &'static str {
  match corpus {
    Corpus::Course => "Courses",
    Corpus::Faculty => "Faculty",
    Corpus::Event => "Events",
  }
}

/// Secondary facts shown under an item's title
fn details(metadata: &ItemMetadata) -> Vec<String> {
  let labelled = |label: &str, value: &Option<String>| value.as_ref().map(|v| format!("{label}: {v}"));

  let fields = match metadata {
    ItemMetadata::Course(course) => vec![
      labelled("Taught by", &course.instructor),
      labelled("Semester", &course.semester),
      labelled("Meets", &course.meeting_times),
      labelled("Credits", &course.credits),
      labelled("Prerequisites", &course.prerequisites),
    ],
    ItemMetadata::Faculty(faculty) => {
      vec![labelled("Title", &faculty.titles), labelled("Profile", &faculty.profile_url)]
    }
    ItemMetadata::Event(event) => vec![
      labelled("Type", &event.event_type),
      labelled("When", &event.start),
      labelled("Where", &event.location),
      labelled("Cost", &event.cost),
      labelled("Link", &event.permalink),
    ],
  };

  fields.into_iter().flatten().collect()
}

/// One ranked item, indented, without a trailing newline
pub fn render_match(rank: usize, item: &RetrievedMatch) -> String {
  let mut out = format!(
    "{:>3}. {} {}",
    rank,
    item.title().bold(),
    format!("(distance {:.4})", item.distance).dimmed()
  );

  for detail in details(&item.metadata) {
    out.push_str(&format!("\n     {}", detail.dimmed()));
  }

  if item.has_explanation() {
    for line in wrap_text(&item.explanation, WRAP_WIDTH - 5) {
      out.push_str(&format!("\n     {line}"));
    }
  }

  out
}

pub fn render_section(corpus: Corpus, items: &[RetrievedMatch]) -> String {
  let mut out = format!("{}", heading(corpus).blue().bold());

  if items.is_empty() {
    out.push_str(&format!("\n     {}", format!("No matching {} found.", heading(corpus).to_lowercase()).dimmed()));
    return out;
  }

  for (index, item) in items.iter().enumerate() {
    out.push('\n');
    out.push_str(&render_match(index + 1, item));
  }
  out
}

/// Warn about corpora whose search failed and were shown as empty
pub fn display_degraded(degraded: &[Corpus]) {
  if degraded.is_empty() {
    return;
  }

  let names: Vec<&str> = degraded.iter().map(|corpus| corpus.collection_name()).collect();
  bentley::spotlight(&format!(
    "Search unavailable for: {}\nThose results are shown as empty.",
    names.join(", ")
  ));
}

pub fn display_result(result: &PipelineResult) {
  display_degraded(&result.degraded);

  println!();
  for line in wrap_text(&result.narrative, WRAP_WIDTH) {
    println!("{line}");
  }

  for corpus in Corpus::ALL {
    println!();
    println!("{}", render_section(corpus, result.matches(corpus)));
  }
  println!();
}
