use ratatui::style::Color;

/// Categories offered by the expense form. Records coming back from the
/// server may still carry any string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseCategory {
    Food,
    Transportation,
    Entertainment,
    Health,
    Utilities,
    Others,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Health => "Health",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Others => "Others",
        }
    }

    pub fn all() -> Vec<ExpenseCategory> {
        vec![
            ExpenseCategory::Food,
            ExpenseCategory::Transportation,
            ExpenseCategory::Entertainment,
            ExpenseCategory::Health,
            ExpenseCategory::Utilities,
            ExpenseCategory::Others,
        ]
    }

    pub fn names() -> &'static [&'static str] {
        &["Food", "Transportation", "Entertainment", "Health", "Utilities", "Others"]
    }
}

/// Badge color for an expense category; unknown names get the "Other" color.
pub fn category_color(name: &str) -> Color {
    match name {
        "Food" => Color::Rgb(0xff, 0x63, 0x84),
        "Transport" | "Transportation" => Color::Rgb(0x36, 0xa2, 0xeb),
        "Entertainment" => Color::Rgb(0xff, 0xce, 0x56),
        "Health" => Color::Rgb(0x8b, 0xc3, 0x4a),
        "Groceries" => Color::Rgb(0xff, 0xa5, 0x00),
        "Bills" | "Utilities" => Color::Rgb(0x20, 0xb2, 0xaa),
        _ => Color::Rgb(0x9c, 0x27, 0xb0),
    }
}

/// Badge color for an income source; unknown names get the "Other" color.
pub fn source_color(name: &str) -> Color {
    match name {
        "Salary" => Color::Rgb(0x2e, 0xcc, 0x71),
        "Freelance" => Color::Rgb(0x34, 0x98, 0xdb),
        "Investment" => Color::Rgb(0x9b, 0x59, 0xb6),
        "Business" => Color::Rgb(0xe6, 0x7e, 0x22),
        _ => Color::Rgb(0x95, 0xa5, 0xa6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_variants() {
        let from_variants: Vec<&str> = ExpenseCategory::all().iter().map(|c| c.as_str()).collect();
        assert_eq!(from_variants, ExpenseCategory::names());
    }

    #[test]
    fn unknown_keys_fall_back_to_other() {
        assert_eq!(category_color("Pets"), category_color("Other"));
        assert_eq!(source_color("Lottery"), source_color("Other"));
        assert_ne!(category_color("Food"), category_color("Other"));
    }
}
