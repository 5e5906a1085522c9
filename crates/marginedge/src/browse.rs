//! Read-only, numbered-menu walk through a JSON document.
//!
//! Objects list their keys by number (`0` or `b` goes back), arrays take a
//! zero-based index (`b` goes back), scalars print their value and wait for
//! Enter. `q` quits from anywhere, as does end of input. Bad input prints a
//! diagnostic and prompts again.

use serde_json::Value;
use std::io::{self, BufRead, Write};

enum Step {
    Back,
    Quit,
}

/// Interactive browser over any line-based input and output.
pub struct Browser<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Browser<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    /// Browse `root` until the user quits or backs out of the top level.
    pub fn run(&mut self, root: &Value) -> io::Result<()> {
        let mut path = Vec::new();
        self.explore(root, &mut path)?;
        Ok(())
    }

    /// Consume the browser, returning the output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// One trimmed line, or `None` at end of input.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_path(&mut self, path: &[String]) -> io::Result<()> {
        writeln!(self.out, "\nCurrent path: /{}", path.join("/"))
    }

    fn explore(&mut self, value: &Value, path: &mut Vec<String>) -> io::Result<Step> {
        match value {
            Value::Object(map) => loop {
                self.print_path(path)?;
                let keys: Vec<&String> = map.keys().collect();
                for (i, key) in keys.iter().enumerate() {
                    writeln!(self.out, "{}. {key}", i + 1)?;
                }
                writeln!(self.out, "0. Go back")?;

                let Some(choice) = self.prompt("Enter your choice (or 'q' to quit): ")? else {
                    return Ok(Step::Quit);
                };
                match choice.to_lowercase().as_str() {
                    "q" => return Ok(Step::Quit),
                    "0" | "b" => return Ok(Step::Back),
                    _ => {}
                }
                let picked = choice
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| keys.get(i).copied());
                match picked {
                    Some(key) => {
                        path.push(key.clone());
                        let step = self.explore(&map[key], path)?;
                        path.pop();
                        if let Step::Quit = step {
                            return Ok(Step::Quit);
                        }
                    }
                    None => writeln!(self.out, "Invalid choice. Please try again.")?,
                }
            },
            Value::Array(items) => {
                self.print_path(path)?;
                writeln!(self.out, "This is a list with {} items.", items.len())?;
                loop {
                    let Some(choice) =
                        self.prompt("Enter item index to view (or 'b' to go back): ")?
                    else {
                        return Ok(Step::Quit);
                    };
                    match choice.to_lowercase().as_str() {
                        "q" => return Ok(Step::Quit),
                        "b" => return Ok(Step::Back),
                        _ => {}
                    }
                    match choice.parse::<usize>().ok().and_then(|i| items.get(i).map(|v| (i, v))) {
                        Some((i, item)) => {
                            path.push(format!("[{i}]"));
                            let step = self.explore(item, path)?;
                            path.pop();
                            if let Step::Quit = step {
                                return Ok(Step::Quit);
                            }
                            self.print_path(path)?;
                        }
                        None => writeln!(self.out, "Invalid index. Please try again.")?,
                    }
                }
            }
            scalar => {
                self.print_path(path)?;
                writeln!(self.out, "Value: {scalar}")?;
                match self.prompt("Press Enter to go back...")? {
                    Some(_) => Ok(Step::Back),
                    None => Ok(Step::Quit),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn run(doc: &Value, keys: &str) -> String {
        let mut browser = Browser::new(Cursor::new(keys.as_bytes().to_vec()), Vec::new());
        browser.run(doc).unwrap();
        String::from_utf8(browser.into_output()).unwrap()
    }

    fn doc() -> Value {
        json!({
            "count": 3,
            "vendors": [{"vendorName": "Sysco"}]
        })
    }

    #[test]
    fn walks_into_nested_values() {
        let out = run(&doc(), "2\n0\n1\n\nb\nq\n");
        assert!(out.contains("2. vendors"));
        assert!(out.contains("This is a list with 1 items."));
        assert!(out.contains("Current path: /vendors/[0]/vendorName"));
        assert!(out.contains("Value: \"Sysco\""));
    }

    #[test]
    fn invalid_input_reprompts() {
        let out = run(&doc(), "9\nabc\nq\n");
        assert_eq!(out.matches("Invalid choice. Please try again.").count(), 2);
    }

    #[test]
    fn bad_index_reprompts() {
        let out = run(&doc(), "2\n5\nq\n");
        assert!(out.contains("Invalid index. Please try again."));
    }

    #[test]
    fn back_from_top_level_ends() {
        let out = run(&doc(), "0\n");
        assert!(out.contains("Current path: /"));
    }

    #[test]
    fn end_of_input_quits() {
        let out = run(&doc(), "1\n");
        assert!(out.contains("Value: 3"));
    }
}
