// Synthetic talent/job records shared by the integration tests

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use talent_match::models::RawExample;

pub const ROLES: &[&str] = &[
    "backend", "frontend", "data", "devops", "mobile", "ml", "security", "qa",
];
pub const SENIORITIES: &[&str] = &["junior", "mid", "senior", "lead"];
pub const DEGREES: &[&str] = &["none", "apprenticeship", "associate", "bachelor", "master", "doctorate"];
pub const LANGUAGES: &[&str] = &["en", "de", "fr"];
pub const RATINGS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2"];

fn pick<'a>(rng: &mut StdRng, options: &'a [&'a str], count: usize) -> Vec<&'a str> {
    options.choose_multiple(rng, count).copied().collect()
}

fn languages(rng: &mut StdRng, count: usize) -> Vec<Value> {
    pick(rng, LANGUAGES, count)
        .into_iter()
        .map(|title| json!({ "title": title, "rating": RATINGS[rng.gen_range(0..RATINGS.len())] }))
        .collect()
}

pub fn talent(id: usize, roles: &[&str], seniority: &str, degree: &str, salary: f64) -> Value {
    json!({
        "id": format!("talent-{}", id),
        "job_roles": roles,
        "seniority": seniority,
        "degree": degree,
        "salary_expectation": salary,
        "languages": [{ "title": "en", "rating": "B2" }]
    })
}

pub fn job(id: usize, roles: &[&str], seniorities: &[&str], min_degree: &str, max_salary: f64) -> Value {
    json!({
        "id": format!("job-{}", id),
        "job_roles": roles,
        "seniorities": seniorities,
        "min_degree": min_degree,
        "max_salary": max_salary,
        "languages": [{ "title": "en", "rating": "B1" }]
    })
}

pub fn random_talent(rng: &mut StdRng, id: usize) -> Value {
    let n_roles = rng.gen_range(1..=4);
    let n_languages = rng.gen_range(1..=3);
    json!({
        "id": format!("talent-{}", id),
        "job_roles": pick(rng, ROLES, n_roles),
        "seniority": SENIORITIES[rng.gen_range(0..SENIORITIES.len())],
        "degree": DEGREES[rng.gen_range(0..DEGREES.len())],
        "salary_expectation": rng.gen_range(30_000..120_000),
        "languages": languages(rng, n_languages)
    })
}

pub fn random_job(rng: &mut StdRng, id: usize) -> Value {
    let n_roles = rng.gen_range(1..=3);
    let n_seniorities = rng.gen_range(1..=2);
    let n_languages = rng.gen_range(0..=2);
    json!({
        "id": format!("job-{}", id),
        "job_roles": pick(rng, ROLES, n_roles),
        "seniorities": pick(rng, SENIORITIES, n_seniorities),
        "min_degree": DEGREES[rng.gen_range(0..DEGREES.len())],
        "max_salary": rng.gen_range(40_000..130_000),
        "languages": languages(rng, n_languages)
    })
}

fn strings(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Ground truth for generated pairs: enough role overlap, an accepted
/// seniority and an expectation within budget
pub fn is_match(talent: &Value, job: &Value) -> bool {
    let talent_roles = strings(&talent["job_roles"]);
    let job_roles = strings(&job["job_roles"]);
    let overlap = job_roles.iter().filter(|r| talent_roles.contains(*r)).count();
    let role_fit = overlap * 2 >= job_roles.len();
    let seniority_fit = strings(&job["seniorities"]).contains(&talent["seniority"].as_str().unwrap_or(""));
    let salary_fit = talent["salary_expectation"].as_f64() <= job["max_salary"].as_f64();
    role_fit && seniority_fit && salary_fit
}

/// Labeled examples; roughly half of the jobs are built around their talent
/// so both classes are well represented
pub fn raw_dataset(n: usize, seed: u64) -> Vec<RawExample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let talent = random_talent(&mut rng, i);
            let mut job = random_job(&mut rng, i);
            if rng.gen_bool(0.5) {
                job["job_roles"] = talent["job_roles"].clone();
                job["seniorities"] = json!([talent["seniority"].clone()]);
            }
            let label = is_match(&talent, &job);
            RawExample {
                talent,
                job,
                label: Some(json!(label)),
            }
        })
        .collect()
}

pub fn write_json_lines(examples: &[RawExample], path: &std::path::Path) {
    let lines: Vec<String> = examples
        .iter()
        .map(|example| serde_json::to_string(example).unwrap())
        .collect();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, lines.join("\n")).unwrap();
}
