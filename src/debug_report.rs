use icosearch::relation::{STALE_LABEL, Token};
use icosearch::results::{ResultGroup, ResultSet};
use icosearch::{RelationReport, ResultRecord, Side};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_relation(report: &RelationReport, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Relation: \"{}\"", report.input), ansi::CYAN)));
    println!("{}", palette.dim(format!("   against {} queried coin(s)", report.coin_count)));

    println!("\n{}", palette.paint("━━━ Tokens ━━━", ansi::GRAY));
    if report.lexemes.is_empty() {
        println!("{}", palette.dim("  No tokens recognised"));
        println!("\n{}", palette.paint("Recognised tokens:", ansi::YELLOW));
        println!("  • C<n> coin labels (uppercase C, 1-based)");
        println!("  • AND, OR, NOT (uppercase only)");
        println!("  • ( and )");
    }
    for (idx, lexeme) in report.lexemes.iter().enumerate() {
        let text = &report.input[lexeme.span.start..lexeme.span.end];
        let kind = match lexeme.token {
            Token::CoinRef(_) => palette.paint("coin", ansi::GREEN),
            _ => palette.paint(lexeme.token.css_class(), ansi::BLUE),
        };
        println!(
            "  {} {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(text),
            palette.dim("│"),
            kind,
            palette.paint(format!("span {}..{}", lexeme.span.start, lexeme.span.end), ansi::YELLOW),
        );
    }

    println!("\n{}", palette.paint("━━━ Canonical ━━━", ansi::GRAY));
    println!("  {}", palette.bold(format!("{:?}", report.canonical)));

    println!("\n{}", palette.paint("━━━ Visual ━━━", ansi::GRAY));
    let row: Vec<String> = report
        .visual
        .iter()
        .map(|node| match node.token {
            Token::CoinRef(_) if node.text == STALE_LABEL => palette.paint(&node.text, ansi::RED),
            Token::CoinRef(_) => palette.paint(&node.text, ansi::GREEN),
            _ => palette.paint(&node.text, ansi::BLUE),
        })
        .collect();
    println!("  {}", row.join(" "));
    for node in &report.visual {
        println!("    {}", palette.dim(node.to_html()));
    }

    println!("\n{}", palette.paint("━━━ Issues ━━━", ansi::GRAY));
    if report.issues.is_empty() {
        println!("  {}", palette.paint("✓ well-formed", ansi::GREEN));
    }
    for issue in &report.issues {
        println!("  {} {}", palette.paint("✗", ansi::RED), issue);
    }
    println!();
}

pub fn print_results(results: &ResultSet, group_field: &str, color: bool) {
    let palette = ansi::Palette::new(color);
    let sort = match results.sort_spec() {
        Some(spec) => format!("sorted by {} ({})", spec.field, spec.direction.as_str()),
        None => "unsorted".to_string(),
    };
    println!(
        "\n{} {}",
        palette.bold(palette.paint(format!("⚙  Results: {} record(s)", results.len()), ansi::CYAN)),
        palette.dim(format!("│ {sort} │ grouped by {group_field}")),
    );

    let groups = results.current_page_view(group_field);
    println!("\n{}", palette.paint(format!("━━━ {} ━━━", results.page_label()), ansi::GRAY));
    if groups.is_empty() {
        println!("{}", palette.dim("  No results on this page"));
    }
    for group in &groups {
        print_group(group, &palette);
    }

    let nav = [(results.has_previous(), "◀ previous"), (results.has_next(), "next ▶")]
        .iter()
        .map(|(enabled, label)| if *enabled { palette.paint(label, ansi::BLUE) } else { palette.dim(label) })
        .collect::<Vec<_>>()
        .join("  ");
    println!("\n  {nav}\n");
}

fn print_group(group: &ResultGroup<'_>, palette: &ansi::Palette) {
    println!(
        "  {} {}",
        palette.bold(palette.paint(&group.key, ansi::YELLOW)),
        palette.dim(format!("({})", group.records.len()))
    );
    for record in &group.records {
        println!("    {}", fmt_record_compact(record, palette));
    }
}

fn fmt_record_compact(record: &ResultRecord, palette: &ansi::Palette) -> String {
    let mut parts = vec![palette.paint(record.id().unwrap_or("?"), ansi::GREEN)];
    if let Some(weight) = record.weight() {
        parts.push(palette.dim(format!("{weight} g")));
    }
    if let Some(diameter) = record.max_diameter() {
        parts.push(palette.dim(format!("⌀ {diameter} mm")));
    }
    if let Some(place) = record.location().or(record.region()) {
        parts.push(palette.paint(place, ansi::BLUE));
    }
    if let Some(date) = record.date() {
        parts.push(palette.dim(date));
    }
    if let Some(desc) = record.description(Side::Obverse) {
        parts.push(palette.dim(format!("obv: {desc}")));
    }
    parts.join(&format!(" {} ", palette.dim("│")))
}
