use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Stylize};
use unicode_width::UnicodeWidthStr;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    let accent = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Blue)));
    let good = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let bad = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .usage(accent)
        .header(accent)
        .literal(good)
        .invalid(bad)
        .error(bad)
        .valid(good)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Color Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const NAVY: Color = Color::Rgb {
        r: 120,
        g: 160,
        b: 255,
    };
    pub const GRASS: Color = Color::Rgb {
        r: 60,
        g: 200,
        b: 110,
    };
    pub const CLAY: Color = Color::Rgb {
        r: 230,
        g: 140,
        b: 60,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const CHALK: Color = Color::Rgb {
        r: 240,
        g: 240,
        b: 230,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

pub mod box_chars {
    pub const SINGLE_HORIZONTAL: &str = "─";
    pub const SINGLE_VERTICAL: &str = "│";

    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const DIAMOND: &str = "◆";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.with(colors::GRASS).bold(),
        message.with(colors::GRASS)
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        " {} {}",
        box_chars::CROSS_MARK.with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::CLAY).bold(),
        message.with(colors::CLAY)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Section Headers
// ═══════════════════════════════════════════════════════════════════════════════

const SECTION_WIDTH: usize = 60;

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;
    let trailing = SECTION_WIDTH.saturating_sub(title_len + 4 + padding);

    println!();
    println!(
        "{}{} {} {}{}",
        box_chars::ROUND_TOP_LEFT.with(colors::NAVY),
        box_chars::SINGLE_HORIZONTAL.repeat(padding).with(colors::NAVY),
        title.with(colors::NAVY).bold().attribute(Attribute::Italic),
        box_chars::SINGLE_HORIZONTAL.repeat(trailing).with(colors::NAVY),
        box_chars::ROUND_TOP_RIGHT.with(colors::NAVY)
    );
}

pub fn print_section_footer() {
    println!(
        "{}{}{}",
        box_chars::ROUND_BOTTOM_LEFT.with(colors::NAVY),
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH)
            .with(colors::NAVY),
        box_chars::ROUND_BOTTOM_RIGHT.with(colors::NAVY)
    );
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Key-Value and List Display
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::NAVY),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::CHALK)
    );
}

pub fn print_key_value_highlight(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::DIAMOND.with(colors::CLAY),
        format!("{}:", key).with(colors::NAVY).bold(),
        value.with(colors::GRASS).bold()
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    println!(
        "{}{}  {}",
        "  ".repeat(indent),
        box_chars::ARROW_RIGHT.with(colors::NAVY),
        item.with(colors::CHALK)
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

/// Formats an optional rate with `decimals` places, "-" when missing.
pub fn format_rate(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

/// Box-drawn table. Cells that parse as numbers are right-aligned.
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

fn pad_cell(cell: &str, width: usize) -> String {
    let padding = " ".repeat(width.saturating_sub(cell.width()));
    if is_numeric(cell) {
        format!("{}{}", padding, cell)
    } else {
        format!("{}{}", cell, padding)
    }
}

impl TableBuilder {
    pub fn new(headers: &[&str]) -> Self {
        TableBuilder {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            col_widths: headers.iter().map(|h| h.width()).collect(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn border(&self, left: &str, junction: &str, right: &str) -> String {
        let segments: Vec<String> = self
            .col_widths
            .iter()
            .map(|w| box_chars::SINGLE_HORIZONTAL.repeat(w + 2))
            .collect();
        format!("{}{}{}", left, segments.join(junction), right)
    }

    fn line(&self, cells: &[String]) -> String {
        let padded: Vec<String> = self
            .col_widths
            .iter()
            .enumerate()
            .map(|(i, width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {} ", pad_cell(cell, *width))
            })
            .collect();
        format!(
            "{}{}{}",
            box_chars::SINGLE_VERTICAL,
            padded.join(box_chars::SINGLE_VERTICAL),
            box_chars::SINGLE_VERTICAL
        )
    }

    /// Plain table lines, without colors.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.border(
            box_chars::ROUND_TOP_LEFT,
            box_chars::T_TOP,
            box_chars::ROUND_TOP_RIGHT,
        ));
        lines.push(self.line(&self.headers));
        lines.push(self.border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT));
        for row in &self.rows {
            lines.push(self.line(row));
        }
        lines.push(self.border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        ));
        lines
    }

    pub fn print(&self) {
        for (i, line) in self.render().into_iter().enumerate() {
            if i == 1 {
                println!("{}", line.with(colors::NAVY).bold());
            } else if i < 3 || i == self.rows.len() + 3 {
                println!("{}", line.with(colors::NAVY));
            } else {
                println!("{}", line.with(colors::CHALK));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_render_aligns_columns() {
        let mut table = TableBuilder::new(&["Date", "Records"]);
        table.add_row(vec!["2025-08-01".to_string(), "312".to_string()]);
        table.add_row(vec!["2025-08-02".to_string(), "4".to_string()]);

        let lines = table.render();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "╭────────────┬─────────╮");
        assert_eq!(lines[1], "│ Date       │ Records │");
        assert_eq!(lines[3], "│ 2025-08-01 │     312 │");
        assert_eq!(lines[4], "│ 2025-08-02 │       4 │");
        assert_eq!(lines[5], "╰────────────┴─────────╯");
        assert!(lines.iter().all(|l| l.width() == lines[0].width()));
    }

    #[test]
    fn test_table_short_rows_are_padded() {
        let mut table = TableBuilder::new(&["Name", "Role", "Pitches"]);
        table.add_row(vec!["De La Cruz, Elly".to_string()]);
        let lines = table.render();
        assert_eq!(lines[3].width(), lines[0].width());
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Some(0.3333), 3), "0.333");
        assert_eq!(format_rate(Some(2.5), 2), "2.50");
        assert_eq!(format_rate(None, 3), "-");
    }
}
