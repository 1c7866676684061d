use crate::domain::entities::{Request, Response};
use colored::Colorize;
use serde_json::Value;

/// Pretty JSON rendering of `body`, or `None` if it is not JSON
pub fn pretty_json(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    serde_json::to_string_pretty(&json).ok()
}

pub fn print_response_body(body: &str) {
    match pretty_json(body) {
        Some(pretty) => println!("{}", pretty.green()),
        None => println!("{}", body.white()),
    }
}

/// Status line followed by the response headers
pub fn print_status(response: &Response) {
    let line = format!("Status: {}", response.status);
    if response.status.is_success() {
        println!("{}", line.cyan());
    } else {
        println!("{}", line.red());
    }
    for (name, value) in &response.headers {
        println!("{}: {}", name.bold(), value);
    }
}

pub fn print_request_info(request: &Request) {
    println!("{}", request.pretty().yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_json() {
        assert_eq!(
            pretty_json(r#"{"a":[1,2]}"#).unwrap(),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
    }

    #[test]
    fn non_json_is_not_formatted() {
        assert_eq!(pretty_json("<html></html>"), None);
        assert_eq!(pretty_json(""), None);
    }
}
