use criterion::{black_box, criterion_group, criterion_main, Criterion};

use solquiz_core::standards::parse_standards_str;
use solquiz_core::traits::extract_json_object;

fn bench_extract_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_json");

    let bare = r#"{"feasibility": "feasible", "reasoning": "Counting is verbal."}"#;

    let fenced = r#"Here is my assessment:

```json
{
    "feasibility": "partially_feasible",
    "reasoning": "Some parts need a number line.",
    "suggested_question_types": ["multiple_choice", "true_false"],
    "requires_visual_aids": true,
    "requires_hands_on": false
}
```

Let me know if you need anything else."#;

    let prose = "Sure! {\"question_text\": \"What is 2 + 3?\", \"correct_answer\": \"5\"} Hope that helps.";

    group.bench_function("bare", |b| b.iter(|| extract_json_object(black_box(bare))));
    group.bench_function("fenced", |b| {
        b.iter(|| extract_json_object(black_box(fenced)))
    });
    group.bench_function("prose", |b| b.iter(|| extract_json_object(black_box(prose))));

    group.finish();
}

fn bench_standards_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("standards_parsing");

    let small = generate_standards_json(1, 10);
    let medium = generate_standards_json(5, 40);
    let large = generate_standards_json(20, 60);

    group.bench_function("1x10", |b| {
        b.iter(|| parse_standards_str(black_box(&small), black_box("bench.json")))
    });
    group.bench_function("5x40", |b| {
        b.iter(|| parse_standards_str(black_box(&medium), black_box("bench.json")))
    });
    group.bench_function("20x60", |b| {
        b.iter(|| parse_standards_str(black_box(&large), black_box("bench.json")))
    });

    group.finish();
}

fn generate_standards_json(documents: usize, standards_per_doc: usize) -> String {
    let docs: Vec<serde_json::Value> = (0..documents)
        .map(|d| {
            let standards: Vec<serde_json::Value> = (0..standards_per_doc)
                .map(|s| {
                    serde_json::json!({
                        "id": format!("{d}.S.{s}"),
                        "statement": format!("The student will demonstrate skill {s}."),
                        "knowledge_and_skills": {
                            "objectives": [
                                {"text": format!("Objective one for {s}.")},
                                {"text": format!("Objective two for {s}.")}
                            ]
                        }
                    })
                })
                .collect();
            serde_json::json!({
                "document": {
                    "title": "Benchmark Standards",
                    "grade_level": format!("Grade {d}"),
                    "course_name": "Mathematics",
                    "year": 2023,
                    "strands": [{"code": "S", "name": "Strand", "standards": standards}]
                }
            })
        })
        .collect();
    serde_json::json!({"total_documents": documents, "documents": docs}).to_string()
}

criterion_group!(benches, bench_extract_json, bench_standards_parsing);
criterion_main!(benches);
