pub mod csv_out;
pub mod minimal;
pub mod table;

use colored::Colorize;
use serde_json::Value;

use crate::OutputFormat;

/// How a computation envelope should be rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Drop methodology, assumptions and metadata; keep only `result`.
    pub result_only: bool,
    /// Single-line JSON.
    pub compact: bool,
}

pub fn format_output(format: &OutputFormat, value: &Value, opts: RenderOptions) {
    match format {
        OutputFormat::Json => {
            if opts.result_only {
                warn_to_stderr(value);
            }
            match render_json(value, opts) {
                Ok(s) => println!("{s}"),
                Err(e) => eprintln!("{}: {}", "error".red().bold(), e),
            }
        }
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Serialize an envelope as JSON. Values that are not envelopes (no
/// `result` key) are rendered whole even with `result_only`.
pub fn render_json(value: &Value, opts: RenderOptions) -> serde_json::Result<String> {
    let shown = if opts.result_only {
        value.get("result").unwrap_or(value)
    } else {
        value
    };
    if opts.compact {
        serde_json::to_string(shown)
    } else {
        serde_json::to_string_pretty(shown)
    }
}

// Warnings would vanish with the envelope, so surface them on stderr.
fn warn_to_stderr(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        for w in warnings.iter().filter_map(Value::as_str) {
            eprintln!("{}: {}", "warning".yellow().bold(), w);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope() -> Value {
        json!({
            "result": { "emi": "44186.98" },
            "methodology": "Reducing-balance EMI",
            "assumptions": { "principal": "5000000" },
            "warnings": ["EMI rounded to 2 dp"],
        })
    }

    #[test]
    fn full_envelope_by_default() {
        let s = render_json(&envelope(), RenderOptions::default()).unwrap();
        assert!(s.contains("methodology"));
        assert!(s.contains('\n'));
    }

    #[test]
    fn result_only_compact() {
        let opts = RenderOptions {
            result_only: true,
            compact: true,
        };
        let s = render_json(&envelope(), opts).unwrap();
        assert_eq!(s, r#"{"emi":"44186.98"}"#);
    }

    #[test]
    fn result_only_passes_through_bare_values() {
        let opts = RenderOptions {
            result_only: true,
            compact: true,
        };
        let s = render_json(&json!({ "emi": "1.00" }), opts).unwrap();
        assert_eq!(s, r#"{"emi":"1.00"}"#);
    }
}
