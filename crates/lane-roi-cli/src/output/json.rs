use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_json(&mut stdout.lock(), value) {
        eprintln!("JSON serialization error: {}", e);
    }
}

fn write_json<W: Write>(w: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ends_with_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({"net": 1.5})).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\n  \"net\": 1.5\n}\n");
    }
}
