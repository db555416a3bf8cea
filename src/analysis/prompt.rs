use super::AnalysisResult;
use crate::Result;
use serde_json::{Map, Value};
use tracing::warn;

const INSTRUCTIONS: &str = r#"You are given an image containing mathematical expressions, equations or graphical problems. Solve them.
Follow PEMDAS: Parentheses, Exponents, Multiplication and Division (left to right), Addition and Subtraction (left to right).
The image contains exactly one of the following cases:
1. A simple expression such as 2 + 2 or 3 * 4 - 5 / 6. Return a list with one object: [{"expr": "2 + 2", "result": 4}].
2. A set of equations such as x^2 + 2x + 1 = 0 or 3y + 4x = 0. Solve for every variable and return one object per variable, each with "assign": true: [{"expr": "x", "result": 2, "assign": true}, {"expr": "y", "result": 5, "assign": true}].
3. Variable assignments such as x = 4 or y = 5. Return one object per assignment with "assign": true.
4. A graphical word problem (cars colliding, trigonometry, Pythagoras, forces, and so on) drawn as a picture. Pay attention to colours in the drawing. Return a list with one object: [{"expr": "<the problem>", "result": <answer>}].
5. An abstract concept such as love, history, a famous quote or a scene. Return a list with one object whose "expr" explains the drawing and whose "result" names the concept.
Any variable below already has a value; substitute it wherever it appears in the image:
"#;

const OUTPUT_RULES: &str = r#"
Reply with a JSON array of objects with the keys "expr", "result" and optionally "assign". Use double quotes for strings and true/false for booleans. Do not wrap the array in Markdown or add any other text."#;

/// Builds the analysis instruction with the caller's known variables.
pub fn analysis_prompt(vars: &Map<String, Value>) -> Result<String> {
    let vars_json = serde_json::to_string_pretty(vars)?;
    Ok(format!("{INSTRUCTIONS}{vars_json}\n{OUTPUT_RULES}"))
}

/// Parses the model's reply into results. A reply that is not a JSON list of
/// results, optionally inside a Markdown code fence, yields an empty list.
pub fn parse_reply(reply: &str) -> Vec<AnalysisResult> {
    let body = strip_code_fence(reply);

    match serde_json::from_str::<Vec<AnalysisResult>>(body) {
        Ok(results) => results,
        Err(list_err) => match serde_json::from_str::<AnalysisResult>(body) {
            Ok(single) => vec![single],
            Err(_) => {
                warn!("Could not parse analysis reply: {}", list_err);
                Vec::new()
            }
        },
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    match rest.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => rest.trim(),
    }
}
