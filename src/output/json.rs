//! JSON output formatter
//!
//! Writes the matrix exactly as CI consumes it: `{"include":[...]}` on one
//! line, or indented with `--pretty`.

use crate::orchestrator::RunResult;
use crate::output::OutputFormatter;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, result: &RunResult, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = result.matrix.to_json(self.pretty)?;
        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SemverLabel;
    use crate::output::tests::group;
    use crate::output::MatrixOutput;

    fn result() -> RunResult {
        RunResult {
            matrix: MatrixOutput::assemble(
                vec![group("left-pad", "1.2.0", "1.3.0", SemverLabel::Minor)],
                None,
            ),
            ..RunResult::default()
        }
    }

    fn render(formatter: &JsonFormatter, result: &RunResult) -> String {
        let mut out = Vec::new();
        formatter.format(result, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_compact_output_is_one_line() {
        let out = render(&JsonFormatter::new(false), &result());
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with(r#"{"include":[{"packages":[{"name":"left-pad""#));
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let out = render(&JsonFormatter::new(true), &result());
        assert!(out.lines().count() > 1);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["include"][0]["groupLatestVersion"], "1.3.0");
        assert_eq!(value["include"][0]["slug"], "left-pad-slug");
    }

    #[test]
    fn test_empty_result() {
        let out = render(&JsonFormatter::new(false), &RunResult::default());
        assert_eq!(out, "{\"include\":[]}\n");
    }
}
