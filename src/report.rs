use crate::engine::Summary;
use crate::transaction::Transaction;
use std::fmt;
use std::fmt::Formatter;

const RULE_WIDTH: usize = 70;

const TABLE_HEADER: &str = "Date                | Type    | Amount    | Category        | Notes";

/// Renders a titled table of transactions, one display line per transaction,
/// framed by horizontal rules.
pub fn render_table<'a, I>(title: &str, transactions: I) -> String
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let rule = "-".repeat(RULE_WIDTH);

    let mut out = format!("{}:\n{}\n{}\n{}\n", title, rule, TABLE_HEADER, rule);
    for tx in transactions {
        out.push_str(&tx.to_string());
        out.push('\n');
    }
    out.push_str(&rule);

    out
}

/// Title for a filtered table, naming each criterion or "All" when it was not
/// supplied.
pub fn filter_title(kind: Option<&str>, category: Option<&str>) -> String {
    let kind = kind
        .filter(|kind| !kind.is_empty())
        .map(str::to_lowercase);
    let category = category.filter(|category| !category.is_empty());

    format!(
        "Filtered Transactions (Type: {}, Category: {})",
        kind.as_deref().unwrap_or("All"),
        category.unwrap_or("All")
    )
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Financial Summary:")?;
        writeln!(f, "Total Income:  ${:.2}", self.income)?;
        writeln!(f, "Total Expenses: ${:.2}", self.expense)?;
        write!(f, "Net Balance:    ${:.2}", self.net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Kind;

    #[test]
    fn should_render_table() {
        let transactions = [
            Transaction::new(Kind::Income, 100.0, "Salary", "June")
                .with_timestamp("2024-06-01 09:30:00"),
            Transaction::new(Kind::Expense, 42.5, "Food", "")
                .with_timestamp("2024-06-02 12:15:00"),
        ];

        let rule = "-".repeat(70);
        let expected = [
            "All Transactions:",
            rule.as_str(),
            "Date                | Type    | Amount    | Category        | Notes",
            rule.as_str(),
            "2024-06-01 09:30:00 | Income  | $  100.00 | Salary          | June",
            "2024-06-02 12:15:00 | Expense | $   42.50 | Food            | ",
            rule.as_str(),
        ]
        .join("\n");

        assert_eq!(render_table("All Transactions", &transactions), expected);
    }

    #[test]
    fn should_line_up_header_with_rows() {
        let tx = Transaction::new(Kind::Expense, 5.0, "Food", "")
            .with_timestamp("2024-06-02 12:15:00")
            .to_string();

        // Every column separator in the header sits where the rows put theirs.
        let separators = |line: &str| -> Vec<usize> {
            line.match_indices(" | ").map(|(idx, _)| idx).collect()
        };
        assert_eq!(separators(TABLE_HEADER), separators(&tx));
    }

    #[test]
    fn should_title_filtered_tables() {
        assert_eq!(
            filter_title(Some("EXPENSE"), None),
            "Filtered Transactions (Type: expense, Category: All)"
        );
        assert_eq!(
            filter_title(Some(""), Some("Food")),
            "Filtered Transactions (Type: All, Category: Food)"
        );
    }

    #[test]
    fn should_render_summary() {
        let summary = Summary {
            income: 125.5,
            expense: 50.25,
            net: 75.25,
        };

        assert_eq!(
            summary.to_string(),
            "Financial Summary:\n\
             Total Income:  $125.50\n\
             Total Expenses: $50.25\n\
             Net Balance:    $75.25"
        );
    }
}
