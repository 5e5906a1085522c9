//! The question-and-answer loop.

use marginedge::analytics::DataSummary;
use marginedge::assistant::Assistant;
use std::io::{self, BufRead, Write};
use tracing::error;

use crate::prompt::{FAREWELL, failure_message};

/// Human-readable overview of the loaded snapshot.
pub fn format_summary(s: &DataSummary) -> String {
    let mut out = format!(
        "Data summary:\n  Restaurant units: {}\n  Categories: {}\n  Products: {}\n  Vendors: {}\n  Orders: {} ({} line items)\n  Total order spend: ${:.2}",
        s.restaurant_units, s.categories, s.products, s.vendors, s.orders, s.line_items,
        s.total_order_spend,
    );
    if let (Some(first), Some(last)) = (&s.first_invoice, &s.last_invoice) {
        out.push_str(&format!("\n  Invoices: {first} to {last}"));
    }
    out
}

/// Read questions from `input` until `quit` (any case) or end of input.
///
/// A failed turn is reported in persona and the loop continues.
pub async fn run<R: BufRead, W: Write>(
    assistant: &mut Assistant,
    mut input: R,
    mut out: W,
) -> io::Result<()> {
    loop {
        write!(out, "Human: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            writeln!(out, "{FAREWELL}")?;
            return Ok(());
        }
        let question = line.trim();
        if question.eq_ignore_ascii_case("quit") {
            writeln!(out, "{FAREWELL}")?;
            return Ok(());
        }
        if question.is_empty() {
            continue;
        }

        writeln!(out, "Betty: Analyzing data. Please stand by.")?;
        match assistant.ask(question).await {
            Ok(reply) => writeln!(out, "Betty: {reply}")?,
            Err(e) => {
                error!("Error querying chat model: {e}");
                writeln!(out, "{}", failure_message(&e))?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginedge::assistant::AssistantConfig;
    use marginedge::chat::{ChatBackend, ChatCompletion, ChatRequest};
    use marginedge::tools::ToolSet;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct Replies(Mutex<VecDeque<Result<String, String>>>);

    impl ChatBackend for Replies {
        fn chat<'a>(
            &'a self,
            _body: &'a ChatRequest,
        ) -> Pin<Box<dyn Future<Output = Result<ChatCompletion, String>> + Send + 'a>> {
            let next = self
                .0
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no reply".into()));
            Box::pin(async move {
                next.map(|text| ChatCompletion {
                    content: Some(text),
                    ..Default::default()
                })
            })
        }
    }

    fn assistant(replies: Vec<Result<String, String>>) -> Assistant {
        Assistant::new(
            Replies(Mutex::new(replies.into())),
            ToolSet::new(),
            AssistantConfig::new("m", "Be Betty."),
        )
    }

    async fn session(a: &mut Assistant, input: &str) -> String {
        let mut out = Vec::new();
        run(a, Cursor::new(input.as_bytes().to_vec()), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn answers_until_quit() {
        let mut a = assistant(vec![Ok("Sysco. 40 dollars.".into())]);
        let out = session(&mut a, "top vendor?\nQUIT\nignored\n").await;

        assert!(out.contains("Betty: Sysco. 40 dollars."));
        assert!(out.ends_with("Betty: I'll be back.\n"));
        assert_eq!(a.history().len(), 2);
    }

    #[tokio::test]
    async fn failed_turn_keeps_the_loop_going() {
        let mut a = assistant(vec![Err("HTTP 500".into()), Ok("Recovered.".into())]);
        let out = session(&mut a, "one\ntwo\n").await;

        assert!(out.contains("Mission failure. Details: HTTP 500"));
        assert!(out.contains("Betty: Recovered."));
        assert_eq!(a.history().len(), 2);
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let mut a = assistant(vec![]);
        let out = session(&mut a, "\n   \nquit\n").await;
        assert!(!out.contains("Analyzing"));
    }

    #[test]
    fn summary_lists_counts_and_range() {
        let s = DataSummary {
            restaurant_units: 1,
            categories: 2,
            products: 3,
            vendors: 4,
            orders: 5,
            line_items: 6,
            first_invoice: Some("2024-06-01".into()),
            last_invoice: Some("2024-06-30".into()),
            total_order_spend: 1234.5,
        };
        let text = format_summary(&s);
        assert!(text.contains("Orders: 5 (6 line items)"));
        assert!(text.contains("$1234.50"));
        assert!(text.contains("2024-06-01 to 2024-06-30"));
    }
}
