//! solquiz-report — HTML and text views of a question collection.

pub mod html;
pub mod text;

pub use html::{generate_html, write_html_report};
pub use text::{generate_text_report, render_questions, title_case};
