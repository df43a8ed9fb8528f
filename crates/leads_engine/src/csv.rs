pub const CSV_MIME_TYPE: &str = "text/csv";
pub const CSV_HEADER: [&str; 5] = ["Company", "Email", "Phone", "Industry", "Size"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRow {
    pub company: String,
    pub email: String,
    pub phone: String,
    pub industry: String,
    pub size: String,
}

impl LeadRow {
    fn fields(&self) -> [&str; 5] {
        [
            self.company.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.industry.as_str(),
            self.size.as_str(),
        ]
    }
}

/// Where the rows of a finished run come from.
pub trait LeadSource: Send + Sync {
    fn rows(&self, run_id: &str, limit: u32) -> Vec<LeadRow>;
}

/// Fixed sample rows; the simulated pipeline has no real result set.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleLeadSource;

impl LeadSource for SampleLeadSource {
    fn rows(&self, _run_id: &str, limit: u32) -> Vec<LeadRow> {
        let samples = [
            (
                "TechCorp Ottawa",
                "contact@techcorp.ca",
                "613-555-0123",
                "Technology",
                "51-200",
            ),
            (
                "Ottawa Health Solutions",
                "info@ohsolutions.ca",
                "613-555-0456",
                "Healthcare",
                "11-50",
            ),
        ];
        samples
            .into_iter()
            .take(limit as usize)
            .map(|(company, email, phone, industry, size)| LeadRow {
                company: company.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                industry: industry.to_string(),
                size: size.to_string(),
            })
            .collect()
    }
}

/// Render a header row plus one line per lead, `\n` terminated.
pub fn render_csv(rows: &[LeadRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, &CSV_HEADER);
    for row in rows {
        push_record(&mut out, &row.fields());
    }
    out
}

fn push_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push('\n');
}

/// RFC 4180: quote fields holding a delimiter, quote or line break, and
/// double any embedded quote.
fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field.contains([',', '"', '\n', '\r']);
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(company: &str) -> LeadRow {
        LeadRow {
            company: company.to_string(),
            email: "a@b.ca".to_string(),
            phone: "613".to_string(),
            industry: "Tech".to_string(),
            size: "1-10".to_string(),
        }
    }

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(
            render_csv(&[row("Acme")]),
            "Company,Email,Phone,Industry,Size\nAcme,a@b.ca,613,Tech,1-10\n"
        );
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        let csv = render_csv(&[row("Smith, \"Jones\" & Co")]);
        assert!(csv.contains("\"Smith, \"\"Jones\"\" & Co\",a@b.ca"));
    }

    #[test]
    fn sample_source_honours_limit() {
        assert_eq!(SampleLeadSource.rows("run", 1).len(), 1);
        assert_eq!(SampleLeadSource.rows("run", 1000).len(), 2);
    }
}
