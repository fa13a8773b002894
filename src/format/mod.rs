//! Output formatting for product records (table, JSON, markdown, CSV).

use crate::aldi::ProductRecord;
use crate::config::OutputFormat;

/// Formats records for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a list of records.
    pub fn format_records(&self, records: &[ProductRecord]) -> String {
        if records.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_records(records),
            OutputFormat::Table => self.table_records(records),
            OutputFormat::Markdown => self.markdown_records(records),
            OutputFormat::Csv => self.csv_records(records),
        }
    }

    // JSON formatting

    fn json_records(&self, records: &[ProductRecord]) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_records(&self, records: &[ProductRecord]) -> String {
        let price_width = 9;
        let unit_width = 20;
        let shop_width = 12;
        let live_width = 4;
        let title_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<price_width$}  {:<unit_width$}  {:<shop_width$}  {:<live_width$}  {}",
            "Price", "Unit price", "Shop", "Live", "Title"
        ));
        lines.push(format!(
            "{:-<price_width$}  {:-<unit_width$}  {:-<shop_width$}  \
             {:-<live_width$}  {:-<title_width$}",
            "", "", "", "", ""
        ));

        for record in records {
            let price_str = format!("{:.2} €", record.price);
            let unit_str = truncate(record.unit_price.as_deref().unwrap_or("-"), unit_width);
            let shop_str = truncate(&record.supermarket_name, shop_width);
            let live_str = if record.is_live { "Yes" } else { "No" };

            lines.push(format!(
                "{:>price_width$}  {:<unit_width$}  {:<shop_width$}  {:<live_width$}  {}",
                price_str,
                unit_str,
                shop_str,
                live_str,
                truncate(&record.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} products", records.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();

        lines.push("| Price | Unit price | Shop | Brand | Name |".to_string());
        lines.push("|-------|------------|------|-------|------|".to_string());

        for record in records {
            let live_marker = if record.is_live { " ✓" } else { "" };

            lines.push(format!(
                "| {:.2} € | {} | {}{} | {} | [{}]({}) |",
                record.price,
                record.unit_price.as_deref().unwrap_or(""),
                record.supermarket_name,
                live_marker,
                record.brand.as_deref().unwrap_or(""),
                truncate(record.name(), 40),
                record.url
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products found*", records.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "supermarket_name,title,brand,price,unit_price,url,is_live,timestamp".to_string()
    }

    fn csv_records(&self, records: &[ProductRecord]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for record in records {
            let brand = record.brand.as_deref().map(Self::csv_escape).unwrap_or_default();
            let unit_price = record.unit_price.as_deref().map(Self::csv_escape).unwrap_or_default();

            lines.push(format!(
                "{},{},{},{},{},{},{},{}",
                Self::csv_escape(&record.supermarket_name),
                Self::csv_escape(&record.title),
                brand,
                record.price,
                unit_price,
                Self::csv_escape(&record.url),
                record.is_live,
                record.timestamp.format("%Y-%m-%dT%H:%M:%S")
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

/// Shortens `s` to at most `width` characters, ending in "..." when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }

    let kept: String = s.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_record() -> ProductRecord {
        ProductRecord::builder("Aldi Süd")
            .title("MILSANI Frische Vollmilch 3,5 %")
            .price(1.19)
            .unit_price(Some("1 l = 1,19 €".to_string()))
            .url("https://www.aldi-sued.de/de/p/milsani-vollmilch")
            .timestamp(
                NaiveDate::from_ymd_opt(2025, 11, 27).unwrap().and_hms_opt(10, 30, 0).unwrap(),
            )
            .build()
            .unwrap()
    }

    fn make_minimal_record() -> ProductRecord {
        ProductRecord::builder("Aldi Süd").title("Butter").price(2.29).build().unwrap()
    }

    fn make_long_title_record() -> ProductRecord {
        ProductRecord::builder("Aldi Süd")
            .title("Sehr langer Produkttitel für Käse mit Kräutern, der über 50 Zeichen hinausgeht")
            .price(3.49)
            .build()
            .unwrap()
    }

    #[test]
    fn test_json_records() {
        let formatter = Formatter::new(OutputFormat::Json);
        let output = formatter.format_records(&[make_record(), make_minimal_record()]);

        assert!(output.starts_with('['));
        assert!(output.contains("\"supermarket_name\": \"Aldi Süd\""));
        assert!(output.contains("\"brand\": \"MILSANI\""));
        assert!(output.contains("\"price\": 1.19"));
        assert!(output.contains("\"is_live\": true"));
        assert!(output.contains("2025-11-27T10:30:00"));

        let parsed: Vec<ProductRecord> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_json_empty() {
        let formatter = Formatter::new(OutputFormat::Json);
        assert_eq!(formatter.format_records(&[]), "[]");
    }

    #[test]
    fn test_table_records() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_record(), make_minimal_record()]);

        assert!(output.contains("Price"));
        assert!(output.contains("Unit price"));
        assert!(output.contains("1.19 €"));
        assert!(output.contains("1 l = 1,19 €"));
        assert!(output.contains("Butter"));
        assert!(output.contains("Total: 2 products"));
    }

    #[test]
    fn test_table_empty() {
        let formatter = Formatter::new(OutputFormat::Table);
        assert_eq!(formatter.format_records(&[]), "No products found.");
    }

    #[test]
    fn test_table_truncates_long_title_on_char_boundary() {
        let formatter = Formatter::new(OutputFormat::Table);
        let output = formatter.format_records(&[make_long_title_record()]);

        assert!(output.contains("..."));
        assert!(!output.contains("hinausgeht"));
    }

    #[test]
    fn test_markdown_records() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        let output = formatter.format_records(&[make_record()]);

        assert!(output.contains("| Price | Unit price | Shop | Brand | Name |"));
        assert!(output.contains("| 1.19 € |"));
        assert!(output.contains("Aldi Süd ✓"));
        assert!(output.contains("| MILSANI | [Frische Vollmilch 3,5 %]("));
        assert!(output.contains("(https://www.aldi-sued.de/de/p/milsani-vollmilch) |"));
        assert!(output.contains("*1 products found*"));
    }

    #[test]
    fn test_markdown_empty() {
        let formatter = Formatter::new(OutputFormat::Markdown);
        assert_eq!(formatter.format_records(&[]), "No products found.");
    }

    #[test]
    fn test_csv_records() {
        let formatter = Formatter::new(OutputFormat::Csv);
        let output = formatter.format_records(&[make_record()]);
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "supermarket_name,title,brand,price,unit_price,url,is_live,timestamp");
        assert_eq!(
            lines[1],
            "Aldi Süd,\"MILSANI Frische Vollmilch 3,5 %\",MILSANI,1.19,\"1 l = 1,19 €\",\
             https://www.aldi-sued.de/de/p/milsani-vollmilch,true,2025-11-27T10:30:00"
        );
    }

    #[test]
    fn test_csv_empty() {
        let formatter = Formatter::new(OutputFormat::Csv);
        assert_eq!(
            formatter.format_records(&[]),
            "supermarket_name,title,brand,price,unit_price,url,is_live,timestamp"
        );
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(Formatter::csv_escape("plain"), "plain");
        assert_eq!(Formatter::csv_escape("a,b"), "\"a,b\"");
        assert_eq!(Formatter::csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(Formatter::csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("kurz", 10), "kurz");
        assert_eq!(truncate("Käsekuchen", 10), "Käsekuchen");
        assert_eq!(truncate("Käsekuchen mit Sahne", 10), "Käsekuc...");
    }
}
