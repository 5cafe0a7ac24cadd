//! Prompt construction for every generation call the pipeline makes

use crate::models::{ConversationTurn, ItemMetadata, RetrievedMatch};
use crate::services::ChatMessage;

pub const COURSE_DESCRIPTION_LIMIT: usize = 200;
pub const FACULTY_BIO_LIMIT: usize = 300;
pub const EVENT_DESCRIPTION_LIMIT: usize = 300;
const LISTING_DESCRIPTOR_LIMIT: usize = 80;

const ADVISOR_PERSONA: &str = "You are a warm, knowledgeable academic advisor. A student has shared a \
learning goal with you, and you have found courses, faculty and campus events that can help them reach \
it. Each item has already been explained to the student individually. Reply in 3-4 sentences of plain \
conversational prose with no bullet points or lists. Acknowledge the goal, sketch how the courses form \
a learning path, mention the people and events worth their time when there are any, and end by \
inviting the student to refine or narrow the goal.";

/// `"Student: ..."` / `"Advisor: ..."` lines, oldest first
pub fn format_history(turns: &[ConversationTurn]) -> String {
  turns
    .iter()
    .map(|turn| format!("{}: {}", turn.role.speaker(), turn.content))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Cut `text` to at most `max_chars` characters, marking the cut with "..."
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
  match text.char_indices().nth(max_chars) {
    Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
    None => text.to_string(),
  }
}

fn or_unknown(value: Option<&str>) -> &str {
  value.unwrap_or("Not listed")
}

/// Prompt asking for a 2-6 keyword retrieval query
pub fn refine_prompt(goal: &str, history: &[ConversationTurn]) -> String {
  let mut prompt = String::from("You are extracting a search query from a student's learning goal.\n\n");

  if !history.is_empty() {
    prompt.push_str("Previous conversation:\n");
    prompt.push_str(&format_history(history));
    prompt.push_str("\n\n");
  }

  prompt.push_str(&format!("Student's goal: \"{goal}\"\n\n"));
  prompt.push_str(
    "Extract the core academic topic(s) that would help this student meet their goal. Return ONLY a \
short search query (2-6 keywords, no explanation, no punctuation). Examples: \"negotiations conflict \
resolution\", \"machine learning neural networks\", \"consulting strategy frameworks\".\n\nSearch query:",
  );
  prompt
}

fn item_section(item: &RetrievedMatch) -> (String, &'static str, &'static str) {
  match &item.metadata {
    ItemMetadata::Course(course) => {
      let description = course
        .description
        .as_deref()
        .map(|d| truncate_chars(d, COURSE_DESCRIPTION_LIMIT))
        .unwrap_or_else(|| "Not listed".to_string());
      (
        format!(
          "Course being considered:\n- Code: {}\n- Description: {}\n- Instructor: {}",
          or_unknown(course.code.as_deref()),
          description,
          or_unknown(course.instructor.as_deref()),
        ),
        "how this course helps the student achieve their goal. Reference the student's goal and the course content",
        "This course",
      )
    }
    ItemMetadata::Faculty(faculty) => {
      let bio = faculty
        .bio
        .as_deref()
        .map(|b| truncate_chars(b, FACULTY_BIO_LIMIT))
        .unwrap_or_else(|| "Not listed".to_string());
      (
        format!(
          "Faculty member being considered:\n- Name: {}\n- Title: {}\n- Bio: {}",
          or_unknown(faculty.name.as_deref()),
          or_unknown(faculty.titles.as_deref()),
          bio,
        ),
        "why connecting with this faculty member would help the student achieve their goal. Reference both the goal and their specific expertise",
        "This professor",
      )
    }
    ItemMetadata::Event(event) => {
      let description = event
        .description
        .as_deref()
        .map(|d| truncate_chars(d, EVENT_DESCRIPTION_LIMIT))
        .unwrap_or_else(|| "Not listed".to_string());
      (
        format!(
          "Campus event being considered:\n- Title: {}\n- Type: {}\n- Description: {}",
          or_unknown(event.title.as_deref()),
          or_unknown(event.event_type.as_deref()),
          description,
        ),
        "how attending this event moves the student toward their goal. Reference the goal and what happens at the event",
        "This event",
      )
    }
  }
}

/// Prompt asking why one retrieved item serves the goal
pub fn explanation_prompt(item: &RetrievedMatch, goal: &str, history: &[ConversationTurn]) -> String {
  let (section, ask, banned_opening) = item_section(item);

  let mut prompt = String::new();
  if !history.is_empty() {
    prompt.push_str("Conversation so far:\n");
    prompt.push_str(&format_history(history));
    prompt.push_str("\n\n");
  }

  prompt.push_str(&format!("A student's learning goal: \"{goal}\"\n\n{section}\n\n"));
  prompt.push_str(&format!(
    "In 1-2 sentences, explain specifically {ask}. Be concrete. Do not start with \"{banned_opening}\".\n\nExplanation:"
  ));
  prompt
}

fn listing(heading: &str, items: &[RetrievedMatch], limit: usize) -> String {
  if items.is_empty() {
    return format!("[{heading}]\nNo matching {} found.", heading.to_lowercase());
  }

  let lines: Vec<String> = items
    .iter()
    .take(limit)
    .enumerate()
    .map(|(index, item)| match item.metadata.descriptor() {
      Some(descriptor) => format!(
        "{}. {} - {}",
        index + 1,
        item.title(),
        truncate_chars(descriptor, LISTING_DESCRIPTOR_LIMIT)
      ),
      None => format!("{}. {}", index + 1, item.title()),
    })
    .collect();

  format!("[{heading}]\n{}", lines.join("\n"))
}

/// Chat framing for the final narrative: persona, recent turns, then the goal with compact listings
pub fn synthesis_messages(
  goal: &str,
  courses: &[RetrievedMatch],
  faculty: &[RetrievedMatch],
  events: &[RetrievedMatch],
  history: &[ConversationTurn],
  listing_limit: usize,
) -> Vec<ChatMessage> {
  let mut messages = Vec::with_capacity(history.len() + 2);
  messages.push(ChatMessage::system(ADVISOR_PERSONA));
  messages.extend(history.iter().map(ChatMessage::from));

  let body = [
    format!("My learning goal: {goal}"),
    listing("Courses", courses, listing_limit),
    listing("Faculty", faculty, listing_limit),
    listing("Events", events, listing_limit),
  ]
  .join("\n\n");
  messages.push(ChatMessage::user(body));

  messages
}
