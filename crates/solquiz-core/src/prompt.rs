//! Prompt construction for feasibility assessment and question drafting.

use crate::model::QuestionType;
use crate::standards::{Objective, Standard};

/// System prompt for feasibility assessment.
pub const ASSESSMENT_SYSTEM_PROMPT: &str = "You are an educational assessment expert specializing in creating age-appropriate quiz questions.";

/// System prompt for question drafting.
pub const QUESTION_SYSTEM_PROMPT: &str = "You are an expert elementary and secondary education teacher who creates engaging, age-appropriate quiz questions.";

/// Reading-level guidance for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeGuidance {
    pub max_sentence_length: u32,
    pub complexity: &'static str,
}

/// Look up reading-level guidance for a grade label such as `"Grade 3"`.
pub fn grade_guidance(grade_level: &str) -> Option<GradeGuidance> {
    let (max_sentence_length, complexity) = match grade_level.trim() {
        "K" | "Kindergarten" => (8, "very simple"),
        "Grade 1" => (10, "simple"),
        "Grade 2" => (12, "simple"),
        "Grade 3" => (15, "moderate"),
        "Grade 4" => (18, "moderate"),
        "Grade 5" => (20, "moderate"),
        "Grade 6" => (22, "moderate"),
        "Grade 7" | "Grade 8" => (25, "advanced"),
        "High School" => (30, "advanced"),
        _ => return None,
    };
    Some(GradeGuidance {
        max_sentence_length,
        complexity,
    })
}

fn guidance_line(grade_level: &str) -> String {
    match grade_guidance(grade_level) {
        Some(g) => format!(
            "\nReading level: keep sentences under {} words; {} vocabulary.",
            g.max_sentence_length, g.complexity
        ),
        None => String::new(),
    }
}

fn objectives_json(objectives: &[Objective]) -> String {
    serde_json::to_string_pretty(objectives).unwrap_or_else(|_| "[]".to_string())
}

/// Prompt asking whether a standard can be assessed with text questions.
pub fn feasibility_prompt(standard: &Standard, grade_level: &str) -> String {
    format!(
        r#"Analyze the following educational standard and determine if it can be assessed using text-based quiz questions.

Grade Level: {grade_level}
Standard ID: {id}
Standard Statement: {statement}

Objectives:
{objectives}

Please analyze:
1. Can this standard be assessed via text-based questions? (feasible/partially_feasible/not_feasible)
2. Why or why not?
3. What types of questions would work best? (multiple_choice, fill_in_blank, true_false, short_answer)
4. Does this require visual aids or diagrams?
5. Does this require hands-on physical activities?

Respond in JSON format:
{{
    "feasibility": "feasible|partially_feasible|not_feasible",
    "reasoning": "explanation of your assessment",
    "suggested_question_types": ["type1", "type2"],
    "requires_visual_aids": true/false,
    "requires_hands_on": true/false
}}"#,
        id = standard.id,
        statement = standard.statement,
        objectives = objectives_json(&standard.objectives),
    )
}

/// Prompt asking for one question of a given type.
pub fn question_prompt(
    standard: &Standard,
    grade_level: &str,
    question_type: QuestionType,
    objective: Option<&Objective>,
) -> String {
    let focus = objective
        .map(|o| format!("\nSpecific Objective: {}", o.text))
        .unwrap_or_default();

    format!(
        r#"Create an age-appropriate quiz question for the following educational standard.

Grade Level: {grade_level}
Standard ID: {id}
Standard Statement: {statement}{focus}

Question Type: {question_type}

Requirements:
1. Use age-appropriate vocabulary and sentence structure for {grade_level}{guidance}
2. Question should directly assess understanding of the standard
3. For multiple choice: provide 4 options with one correct answer, and make the correct answer exactly match one option
4. For fill in blank: indicate the blank with _____
5. Include a brief explanation of why the answer is correct
6. Rate difficulty as: easy, medium, or hard

Respond in JSON format:
{{
    "question_text": "the question",
    "correct_answer": "the correct answer",
    "options": ["option1", "option2", "option3", "option4"],
    "explanation": "why this answer is correct",
    "difficulty_level": "easy|medium|hard"
}}
Only include "options" for multiple choice questions."#,
        id = standard.id,
        statement = standard.statement,
        guidance = guidance_line(grade_level),
    )
}
