use chrono::NaiveDate;
use std::io::{BufRead, Write};

use tally_core::{Amount, Money};
use tally_receipts::{Confirmation, ConfirmReceipt, ReceiptReview};

/// Line-oriented confirmation prompt.
///
/// For each receipt: Enter accepts the suggested merchant, a number picks a
/// candidate, `n` clears the merchant, `s` skips, `q` cancels the batch.
pub struct TerminalConfirm<R, W> {
    input: R,
    output: W,
    today: NaiveDate,
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    pub fn new(input: R, output: W, today: NaiveDate) -> Self {
        Self { input, output, today }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{prompt}");
        let _ = self.output.flush();
        self.read_line()
    }

    fn show(&mut self, review: &ReceiptReview<'_>) {
        let draft = &review.reconciliation.draft;
        let _ = writeln!(self.output, "\nReceipt: {}", review.path.display());
        let _ = writeln!(
            self.output,
            "  description: {}",
            draft.description.as_deref().unwrap_or("-")
        );
        let _ = writeln!(
            self.output,
            "  date:        {}",
            draft.date.map(|d| d.to_string()).unwrap_or_else(|| format!("- (defaults to {})", self.today))
        );
        if let Some(coord) = draft.coordinate {
            let _ = writeln!(self.output, "  location:    {coord}");
        }
        for (i, merchant) in review.candidates.iter().enumerate() {
            let miles = review
                .reconciliation
                .ranked
                .iter()
                .find(|r| Some(r.merchant_id()) == merchant.id)
                .map(|r| format!("{:.2} mi", r.distance_miles))
                .unwrap_or_default();
            let marker = if merchant.id.is_some() && merchant.id == draft.merchant_id { "*" } else { " " };
            let _ = writeln!(self.output, "  {marker}{:>2}) {} {miles}", i + 1, merchant.name);
        }
    }
}

impl<R: BufRead, W: Write> ConfirmReceipt for TerminalConfirm<R, W> {
    fn confirm(&mut self, review: &ReceiptReview<'_>) -> Confirmation {
        self.show(review);
        let mut draft = review.reconciliation.draft.clone();

        loop {
            let Some(choice) = self.ask("[Enter] accept, 1-9 merchant, n no merchant, s skip, q quit: ") else {
                return Confirmation::Cancel;
            };
            match choice.as_str() {
                "" => break,
                "s" => return Confirmation::Skip,
                "q" => return Confirmation::Cancel,
                "n" => {
                    draft.merchant_id = None;
                    break;
                }
                other => match other.parse::<usize>() {
                    Ok(n) if (1..=review.candidates.len()).contains(&n) => {
                        draft.merchant_id = review.candidates[n - 1].id;
                        break;
                    }
                    _ => {
                        let _ = writeln!(self.output, "  ? '{other}'");
                    }
                },
            }
        }

        let mut tx = draft.into_transaction(self.today);

        while tx.description.trim().is_empty() {
            match self.ask("Description: ") {
                Some(text) => tx.description = text,
                None => return Confirmation::Cancel,
            }
        }

        loop {
            let Some(text) = self.ask("Amount (blank when done): ") else {
                break;
            };
            if text.is_empty() {
                break;
            }
            match text.parse::<Money>() {
                Ok(money) => tx.amounts.push(Amount::new(money, None)),
                Err(e) => {
                    let _ = writeln!(self.output, "  {e}");
                }
            }
        }

        Confirmation::Accept(tx)
    }
}
